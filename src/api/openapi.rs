//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::api::dto::{BroadcastRequest, BroadcastResponse, CredentialsRequest, CredentialsResponse};
use crate::api::handlers::system::HealthResponse;
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "wshub",
        description = "Channel-scoped WebSocket publish/subscribe hub"
    ),
    paths(
        crate::api::handlers::credentials::issue_credentials,
        crate::api::handlers::broadcast::broadcast,
        crate::api::handlers::system::health_handler,
        crate::ws::handler::ws_handler,
    ),
    components(schemas(
        CredentialsRequest,
        CredentialsResponse,
        BroadcastRequest,
        BroadcastResponse,
        HealthResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Credentials", description = "Connection token issuance"),
        (name = "Broadcast", description = "One-shot fan-out to a channel"),
        (name = "Subscribe", description = "WebSocket subscription"),
        (name = "System", description = "Health and metadata"),
    )
)]
pub struct ApiDoc;

//! Credential issuance handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CredentialsRequest, CredentialsResponse};
use crate::app_state::AppState;
use crate::domain::ChannelId;
use crate::error::{ErrorResponse, HubError};

/// `POST /credentials` — Issue a connection token for a channel.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for a malformed body or an empty
/// channel, and [`HubError::Internal`] if signing fails.
#[utoipa::path(
    post,
    path = "/credentials",
    tag = "Credentials",
    summary = "Issue a connection credential",
    description = "Signs a short-lived token scoped to one channel. Present it as `?token=` when opening `/ws`.",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = CredentialsResponse),
        (status = 400, description = "Missing or empty channel", body = ErrorResponse),
        (status = 500, description = "Signing failed", body = ErrorResponse),
    )
)]
pub async fn issue_credentials(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HubError> {
    let Json(req) = body.map_err(|e| HubError::InvalidRequest(e.body_text()))?;
    let channel = ChannelId::new(req.channel)?;
    let issued = state.credentials.issue(&channel)?;
    Ok(Json(CredentialsResponse::from(issued)))
}

/// Credential routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/credentials", post(issue_credentials))
}

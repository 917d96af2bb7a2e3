//! HTTP layer: route handlers, DTOs, OpenAPI document and app assembly.
//!
//! Routes live at the root (`/credentials`, `/broadcast`, `/ws`,
//! `/health`) to stay compatible with existing clients.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;
use openapi::ApiDoc;

/// Builds the REST router (credentials, broadcast, health).
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the complete application: REST routes, the `/ws` endpoint, API
/// docs, tracing and permissive CORS.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::HubConfig;
    use crate::domain::{ChannelId, ConnectionHandle};

    fn state() -> AppState {
        let Ok(state) = AppState::from_config(&HubConfig::default()) else {
            panic!("default config is valid");
        };
        state
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        let Ok(req) = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("valid request");
        };
        req
    }

    fn get(uri: &str) -> Request<Body> {
        let Ok(req) = Request::get(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        req
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("readable body");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("json body");
        };
        value
    }

    #[tokio::test]
    async fn credentials_issues_valid_token() {
        let state = state();
        let app = build_app(state.clone());

        let Ok(response) = app
            .oneshot(post_json("/credentials", r#"{"channel":"room1"}"#))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["channel"], "room1");
        let Some(token) = body["token"].as_str() else {
            panic!("token field");
        };
        let Ok(channel) = state.credentials.validate(token) else {
            panic!("issued token should validate");
        };
        assert_eq!(channel.as_str(), "room1");
    }

    #[tokio::test]
    async fn credentials_rejects_empty_or_malformed_body() {
        for body in [r#"{"channel":""}"#, "{}", "not json"] {
            let Ok(response) = build_app(state())
                .oneshot(post_json("/credentials", body))
                .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_joined_connection() {
        let state = state();
        let (handle, mut rx) = ConnectionHandle::new(4);
        let Ok(room) = ChannelId::new("room1") else {
            panic!("valid channel");
        };
        state.hub.join(&room, handle).await;

        let Ok(response) = build_app(state.clone())
            .oneshot(post_json(
                "/broadcast",
                r#"{"channel":"room1","message":"hi"}"#,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "accepted");

        let Ok(Some(msg)) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await else {
            panic!("broadcast should be delivered");
        };
        assert_eq!(&*msg, "hi");
    }

    #[tokio::test]
    async fn broadcast_to_empty_channel_is_accepted() {
        let Ok(response) = build_app(state())
            .oneshot(post_json(
                "/broadcast",
                r#"{"channel":"nobody","message":"hi"}"#,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn broadcast_rejects_missing_fields() {
        for body in [
            r#"{"channel":"room1"}"#,
            r#"{"message":"hi"}"#,
            r#"{"channel":"","message":"hi"}"#,
        ] {
            let Ok(response) = build_app(state()).oneshot(post_json("/broadcast", body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        }
    }

    #[tokio::test]
    async fn ws_without_token_is_unauthorized() {
        let Ok(response) = build_app(state()).oneshot(get("/ws")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let Ok(response) = build_app(state()).oneshot(get("/ws?token=garbage")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn ws_with_token_but_no_upgrade_is_bad_request() {
        let state = state();
        let Ok(room) = ChannelId::new("room1") else {
            panic!("valid channel");
        };
        let Ok(issued) = state.credentials.issue(&room) else {
            panic!("issue should succeed");
        };

        let uri = format!("/ws?token={}", issued.token);
        let Ok(response) = build_app(state.clone()).oneshot(get(&uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let state = state();
        let Ok(room) = ChannelId::new("room1") else {
            panic!("valid channel");
        };
        state.hub.join(&room, ConnectionHandle::new(1).0).await;

        let Ok(response) = build_app(state).oneshot(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["channels"], 1);
        assert_eq!(body["connections"], 1);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let Ok(response) = build_app(state()).oneshot(get("/api-docs/openapi.json")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

//! Broadcast handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{BroadcastRequest, BroadcastResponse};
use crate::app_state::AppState;
use crate::domain::{ChannelId, Payload};
use crate::error::{ErrorResponse, HubError};

/// `POST /broadcast` — Send a message to every subscriber of a channel.
///
/// Responds as soon as the fan-out is dispatched.
///
/// # Errors
///
/// Returns [`HubError::InvalidRequest`] for a malformed body or an empty
/// channel or message.
#[utoipa::path(
    post,
    path = "/broadcast",
    tag = "Broadcast",
    summary = "Broadcast a message to a channel",
    description = "Delivers `message` as a text frame to every connection currently subscribed to `channel`. Best effort: no delivery confirmation, no persistence.",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Fan-out dispatched", body = BroadcastResponse),
        (status = 400, description = "Missing channel or message", body = ErrorResponse),
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    body: Result<Json<BroadcastRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HubError> {
    let Json(req) = body.map_err(|e| HubError::InvalidRequest(e.body_text()))?;
    let channel = ChannelId::new(req.channel)?;
    if req.message.is_empty() {
        return Err(HubError::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }

    state
        .broadcaster
        .dispatch(channel.clone(), Payload::from(req.message));

    Ok(Json(BroadcastResponse {
        status: "accepted".to_string(),
        channel: channel.into(),
        accepted_at: Utc::now(),
    }))
}

/// Broadcast routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/broadcast", post(broadcast))
}

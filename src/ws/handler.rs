//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;

use super::connection::{ConnectionState, run_connection};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, HubError};

/// Query parameters for `GET /ws`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WsParams {
    /// Connection credential from `POST /credentials`.
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /ws` — Upgrade to a WebSocket subscribed to the token's channel.
///
/// The credential is checked before the upgrade, so a rejected request
/// never touches the hub.
///
/// # Errors
///
/// Returns [`HubError::Unauthorized`] for a missing, invalid or expired
/// token and [`HubError::UpgradeFailed`] when the request is not a valid
/// WebSocket upgrade.
#[utoipa::path(
    get,
    path = "/ws",
    tag = "Subscribe",
    summary = "Open a channel subscription",
    description = "Validates the credential and upgrades to a WebSocket. Every message broadcast to the credential's channel is delivered as a text frame.",
    params(WsParams),
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 400, description = "Not a WebSocket upgrade request", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
    )
)]
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, HubError> {
    let token = params.token.unwrap_or_default();
    let channel = state.credentials.validate(&token).inspect_err(|e| {
        tracing::info!(error = %e, "ws credential rejected");
    })?;

    let ws = ws.map_err(|e| HubError::UpgradeFailed(e.to_string()))?;
    tracing::debug!(%channel, state = %ConnectionState::Upgrading, "ws upgrading");

    let hub = Arc::clone(&state.hub);
    let settings = state.connection;
    let shutdown = state.supervisor.shutdown_token();
    let guard = state.supervisor.guard();
    let failed_channel = channel.clone();

    let response = ws
        .on_failed_upgrade(move |e| {
            tracing::warn!(
                channel = %failed_channel,
                state = %ConnectionState::Failed,
                error = %e,
                "ws upgrade failed"
            );
        })
        .on_upgrade(move |socket| async move {
            let _guard = guard;
            run_connection(socket, channel, hub, settings, shutdown).await;
        });

    Ok(response.into_response())
}

//! REST endpoint handlers organized by resource.

pub mod broadcast;
pub mod credentials;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes the credential and broadcast routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(credentials::routes())
        .merge(broadcast::routes())
}

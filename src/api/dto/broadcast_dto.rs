//! Broadcast DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /broadcast`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Target channel. Must be non-empty.
    #[serde(default)]
    pub channel: String,
    /// Text delivered verbatim to every subscriber. Must be non-empty.
    #[serde(default)]
    pub message: String,
}

/// Response body for `POST /broadcast`.
///
/// Acceptance only means the fan-out was started; delivery outcomes are
/// never reported back.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastResponse {
    /// Always `"accepted"`.
    pub status: String,
    /// Channel the message was dispatched to.
    pub channel: String,
    /// When the fan-out was dispatched.
    pub accepted_at: DateTime<Utc>,
}

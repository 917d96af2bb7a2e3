//! Credential issuance DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::IssuedCredential;

/// Request body for `POST /credentials`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    /// Channel the token should grant access to. Must be non-empty.
    #[serde(default)]
    pub channel: String,
}

/// Response body for `POST /credentials`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CredentialsResponse {
    /// Signed connection token, passed as `?token=` to `GET /ws`.
    pub token: String,
    /// Channel the token is scoped to.
    pub channel: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedCredential> for CredentialsResponse {
    fn from(issued: IssuedCredential) -> Self {
        Self {
            token: issued.token,
            channel: issued.channel.into(),
            expires_at: issued.expires_at,
        }
    }
}

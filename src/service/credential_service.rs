//! Credential service: issues and validates channel-scoped connection tokens.
//!
//! Tokens are HS256 JWTs carrying the `channel` a bearer may subscribe to
//! and an `exp`; tokens issued here also carry `iat`. Nothing is stored
//! server-side: a token is valid exactly when its signature checks out
//! against the shared secret and its expiry has not passed. There is no
//! revocation; a token can be replayed until it expires.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::ChannelId;
use crate::error::HubError;

/// Claims embedded in every connection token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelClaims {
    /// Channel the bearer is allowed to join.
    pub channel: String,
    /// Expiry as unix seconds.
    pub exp: i64,
    /// Issue time as unix seconds. Tokens minted without it are accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// A freshly signed token together with what it grants.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Encoded JWT.
    pub token: String,
    /// Channel the token is scoped to.
    pub channel: ChannelId,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Reason a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// No token was presented.
    #[error("missing token")]
    Missing,

    /// The token is not a well-formed JWT for this service.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature does not match the shared secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token's `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Signature is fine but the claims are unusable.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),
}

impl From<jsonwebtoken::errors::Error> for CredentialError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                Self::InvalidClaims(err.to_string())
            }
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Issues and validates connection credentials with a shared secret.
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl CredentialService {
    /// Creates a service signing with `secret` and issuing tokens valid
    /// for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] for an empty secret and
    /// [`ConfigError::InvalidTtl`] for a zero or out-of-range TTL.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let ttl_secs = i64::try_from(ttl.as_secs())
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTtl(ttl.as_secs()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        })
    }

    /// Returns the configured token lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Signs a token for `channel` that expires after the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Internal`] if signing fails.
    pub fn issue(&self, channel: &ChannelId) -> Result<IssuedCredential, HubError> {
        let issued_at = Utc::now().timestamp();
        let exp = issued_at.saturating_add(self.ttl_secs);
        let token = self.sign(channel, issued_at, exp)?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| HubError::Internal("token expiry out of range".to_string()))?;

        tracing::debug!(%channel, %expires_at, "credential issued");
        Ok(IssuedCredential {
            token,
            channel: channel.clone(),
            expires_at,
        })
    }

    /// Checks `token` and returns the channel it grants.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] describing why the token was rejected:
    /// empty, malformed, bad signature, expired, or a missing, non-string
    /// or empty `channel` claim.
    pub fn validate(&self, token: &str) -> Result<ChannelId, CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }
        let data = jsonwebtoken::decode::<ChannelClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;
        ChannelId::new(data.claims.channel)
            .map_err(|_| CredentialError::InvalidClaims("empty channel".to_string()))
    }

    fn sign(&self, channel: &ChannelId, iat: i64, exp: i64) -> Result<String, HubError> {
        let claims = ChannelClaims {
            channel: channel.as_str().to_string(),
            exp,
            iat: Some(iat),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| HubError::Internal(format!("failed to sign token: {e}")))
    }
}

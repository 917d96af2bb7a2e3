//! Hub configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Default credential lifetime in seconds.
pub const DEFAULT_JWT_TTL_SECS: u64 = 600;

/// Secret used when `JWT_SECRET` is unset. Only suitable for development.
const DEV_JWT_SECRET: &str = "secret";

/// Configuration problems that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` or `HTTP_PORT` did not form a socket address.
    #[error("invalid listen address: {0}")]
    InvalidListenAddr(#[from] std::net::AddrParseError),

    /// The signing secret is set but empty.
    #[error("JWT_SECRET must not be empty")]
    EmptySecret,

    /// The credential TTL is zero or too large.
    #[error("JWT_TTL must be a positive number of seconds, got {0}")]
    InvalidTtl(u64),
}

/// Top-level hub configuration.
///
/// Loaded once at startup via [`HubConfig::from_env`].
#[derive(Clone)]
pub struct HubConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Shared HS256 secret for connection credentials.
    pub jwt_secret: String,

    /// Lifetime of an issued credential in seconds.
    pub jwt_ttl_secs: u64,

    /// Capacity of each connection's outbound queue.
    pub connection_buffer: usize,

    /// Upper bound on a single WebSocket write, in seconds.
    pub write_timeout_secs: u64,

    /// How long shutdown waits for connections to deregister, in seconds.
    pub shutdown_grace_secs: u64,
}

impl std::fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubConfig")
            .field("listen_addr", &self.listen_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("connection_buffer", &self.connection_buffer)
            .field("write_timeout_secs", &self.write_timeout_secs)
            .field("shutdown_grace_secs", &self.shutdown_grace_secs)
            .finish()
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_secs: DEFAULT_JWT_TTL_SECS,
            connection_buffer: 64,
            write_timeout_secs: 15,
            shutdown_grace_secs: 15,
        }
    }
}

impl HubConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. `LISTEN_ADDR`
    /// takes precedence over `HTTP_PORT`. Calls `dotenvy::dotenv().ok()`
    /// to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the listen address cannot be parsed,
    /// `JWT_SECRET` is set to an empty string, or `JWT_TTL` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr.parse()?,
            Err(_) => {
                let port = std::env::var("HTTP_PORT").unwrap_or_else(|_| "8080".to_string());
                format!("0.0.0.0:{port}").parse()?
            }
        };

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("JWT_SECRET not set; using the insecure development secret");
                defaults.jwt_secret
            }
        };

        let config = Self {
            listen_addr,
            jwt_secret,
            jwt_ttl_secs: parse_env("JWT_TTL", defaults.jwt_ttl_secs),
            connection_buffer: parse_env("CONNECTION_BUFFER", defaults.connection_buffer),
            write_timeout_secs: parse_env("WRITE_TIMEOUT_SECS", defaults.write_timeout_secs),
            shutdown_grace_secs: parse_env("SHUTDOWN_GRACE_SECS", defaults.shutdown_grace_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants that make a config unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] or [`ConfigError::InvalidTtl`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.jwt_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl(self.jwt_ttl_secs));
        }
        Ok(())
    }

    /// Credential lifetime as a [`Duration`].
    #[must_use]
    pub const fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_ttl_secs)
    }

    /// Socket write bound as a [`Duration`].
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Shutdown grace period as a [`Duration`].
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

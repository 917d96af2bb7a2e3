//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, HubConfig};
use crate::domain::Hub;
use crate::service::{BroadcastService, CredentialService};
use crate::supervisor::Supervisor;

/// Per-connection transport limits handed to each lifecycle task.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Capacity of a connection's outbound queue.
    pub outbound_capacity: usize,
    /// Upper bound on one socket write.
    pub write_timeout: Duration,
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Issues and validates connection credentials.
    pub credentials: Arc<CredentialService>,
    /// Channel membership registry.
    pub hub: Arc<Hub>,
    /// Fan-out of broadcast requests.
    pub broadcaster: BroadcastService,
    /// Shutdown signal and task tracking.
    pub supervisor: Supervisor,
    /// Limits applied to every upgraded connection.
    pub connection: ConnectionSettings,
}

impl AppState {
    /// Builds the full component graph from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the signing secret or TTL is unusable.
    pub fn from_config(config: &HubConfig) -> Result<Self, ConfigError> {
        let credentials = Arc::new(CredentialService::new(
            &config.jwt_secret,
            config.jwt_ttl(),
        )?);
        let hub = Arc::new(Hub::new());
        let supervisor = Supervisor::new();
        let broadcaster = BroadcastService::new(Arc::clone(&hub), supervisor.clone());

        Ok(Self {
            credentials,
            hub,
            broadcaster,
            supervisor,
            connection: ConnectionSettings {
                outbound_capacity: config.connection_buffer,
                write_timeout: config.write_timeout(),
            },
        })
    }
}

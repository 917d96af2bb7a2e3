//! Connection identity and the registry-side handle to a live connection.
//!
//! The socket itself is owned by its lifecycle task in [`crate::ws`]. What
//! the [`super::Hub`] stores is a [`ConnectionHandle`]: the connection's
//! [`ConnectionId`] plus the sending half of its bounded outbound queue.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

/// A broadcast message body, shared by every recipient of one broadcast.
pub type Payload = Arc<str>;

/// Unique identifier for one live connection.
///
/// Wraps a UUID v4 generated when the connection is upgraded. Member sets
/// in the hub are keyed by it, so removal is by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a payload could not be handed to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection's writer has already shut down.
    #[error("connection closed")]
    Closed,

    /// The connection's outbound queue is full (slow peer).
    #[error("outbound queue full")]
    QueueFull,
}

/// Non-owning reference to a live connection, held by the hub.
///
/// Cloning is cheap: it clones the queue sender, not the socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<Payload>,
}

impl ConnectionHandle {
    /// Creates a handle with a fresh [`ConnectionId`] and an outbound queue
    /// of the given capacity. The receiver goes to the socket writer.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (outbound, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            outbound,
        };
        (handle, rx)
    }

    /// Returns the connection's identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueues `payload` for this connection without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::QueueFull`] when the peer is not keeping up
    /// and [`DeliveryError::Closed`] when the writer is gone.
    pub fn try_deliver(&self, payload: Payload) -> Result<(), DeliveryError> {
        self.outbound.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

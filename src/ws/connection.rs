//! WebSocket connection lifecycle.
//!
//! One task per upgraded connection. The task joins the hub, then parks on
//! three things at once: the shutdown signal, the end of the peer's inbound
//! stream, and its own outbound queue, which it drains into the socket.
//! Whatever ends the loop, the task leaves the hub before the socket is
//! released, and it does both exactly once on its only exit path.

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::app_state::ConnectionSettings;
use crate::domain::{ChannelId, ConnectionHandle, Hub};

/// Lifecycle states of a subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// HTTP request is being promoted to a WebSocket.
    Upgrading,
    /// Registered with the hub and receiving broadcasts.
    Active,
    /// Deregistering and releasing the socket.
    Closing,
    /// Socket released; terminal.
    Closed,
    /// Upgrade failed before registration; terminal.
    Failed,
}

impl ConnectionState {
    /// Returns the lowercase state name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upgrading => "upgrading",
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an active connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Shutdown,
    PeerClosed,
    ReadFailed,
    WriteFailed,
    WriteTimedOut,
}

impl CloseReason {
    /// Whether the socket can still carry a close frame.
    const fn sends_close_frame(self) -> bool {
        matches!(self, Self::Shutdown)
    }
}

/// Runs a subscriber connection from registration to teardown.
///
/// Inbound application messages are read only to notice that the peer
/// went away; their content is ignored.
pub async fn run_connection(
    socket: WebSocket,
    channel: ChannelId,
    hub: Arc<Hub>,
    settings: ConnectionSettings,
    shutdown: CancellationToken,
) {
    let (ws_tx, ws_rx) = socket.split();
    drive(ws_tx, ws_rx, channel, hub, settings, shutdown).await;
}

/// Lifecycle loop over the two halves of a socket.
async fn drive<Tx, Rx, E>(
    mut ws_tx: Tx,
    mut ws_rx: Rx,
    channel: ChannelId,
    hub: Arc<Hub>,
    settings: ConnectionSettings,
    shutdown: CancellationToken,
) where
    Tx: Sink<Message> + Unpin,
    Tx::Error: fmt::Display,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let (handle, mut outbound) = ConnectionHandle::new(settings.outbound_capacity);
    let connection_id = handle.id();

    hub.join(&channel, handle).await;
    tracing::info!(%channel, %connection_id, state = %ConnectionState::Active, "ws connected");

    let reason = loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break CloseReason::Shutdown,
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break CloseReason::PeerClosed,
                Some(Err(e)) => {
                    tracing::debug!(%connection_id, error = %e, "ws read failed");
                    break CloseReason::ReadFailed;
                }
                Some(Ok(_)) => {}
            },
            payload = outbound.recv() => {
                // The hub holds a sender until we leave, so the queue
                // cannot close underneath us.
                let Some(payload) = payload else {
                    break CloseReason::Shutdown;
                };
                let write = ws_tx.send(Message::text(String::from(&*payload)));
                match tokio::time::timeout(settings.write_timeout, write).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(%channel, %connection_id, error = %e, "ws write failed");
                        break CloseReason::WriteFailed;
                    }
                    Err(_) => {
                        tracing::warn!(%channel, %connection_id, "ws write timed out");
                        break CloseReason::WriteTimedOut;
                    }
                }
            }
        }
    };

    tracing::debug!(%connection_id, state = %ConnectionState::Closing, ?reason, "ws closing");
    hub.leave(&channel, connection_id).await;

    if reason.sends_close_frame() {
        let frame = CloseFrame {
            code: close_code::AWAY,
            reason: "server shutting down".into(),
        };
        let close = ws_tx.send(Message::Close(Some(frame)));
        match tokio::time::timeout(settings.write_timeout, close).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(%connection_id, error = %e, "ws close frame failed"),
            Err(_) => tracing::debug!(%connection_id, "ws close frame timed out"),
        }
    }
    drop(ws_tx);
    drop(ws_rx);

    tracing::info!(%channel, %connection_id, state = %ConnectionState::Closed, "ws disconnected");
}

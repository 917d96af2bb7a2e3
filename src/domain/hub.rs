//! Channel membership registry.
//!
//! [`Hub`] maps each [`ChannelId`] to the connections currently subscribed
//! to it. The whole map sits behind a single [`tokio::sync::RwLock`]:
//! joins and leaves take the write lock, snapshots take the read lock and
//! copy the member handles out before any delivery happens.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ChannelId, ConnectionHandle, ConnectionId};

/// Registry of live connections grouped by channel.
///
/// # Concurrency
///
/// - Joins and leaves are serialized across all channels.
/// - Any number of snapshots may run concurrently.
/// - A snapshot sees the member set either before or after a given join or
///   leave, never in between.
#[derive(Debug, Default)]
pub struct Hub {
    channels: RwLock<HashMap<ChannelId, HashMap<ConnectionId, ConnectionHandle>>>,
}

impl Hub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle` to the member set of `channel`.
    ///
    /// Each connection joins once, on upgrade. Member sets are keyed by
    /// [`ConnectionId`], so a repeated join cannot create a duplicate.
    pub async fn join(&self, channel: &ChannelId, handle: ConnectionHandle) {
        let mut map = self.channels.write().await;
        let members = map.entry(channel.clone()).or_default();
        members.insert(handle.id(), handle);
        tracing::debug!(%channel, members = members.len(), "connection joined");
    }

    /// Removes the connection `id` from `channel`.
    ///
    /// Returns `false` if it was not a member, which is not an error. A
    /// channel whose last member leaves is pruned from the map.
    pub async fn leave(&self, channel: &ChannelId, id: ConnectionId) -> bool {
        let mut map = self.channels.write().await;
        let Some(members) = map.get_mut(channel) else {
            return false;
        };
        let removed = members.remove(&id).is_some();
        if members.is_empty() {
            map.remove(channel);
        }
        if removed {
            tracing::debug!(%channel, connection_id = %id, "connection left");
        }
        removed
    }

    /// Returns the members of `channel` at the instant of the call.
    ///
    /// An unknown channel yields an empty vector.
    pub async fn snapshot(&self, channel: &ChannelId) -> Vec<ConnectionHandle> {
        let map = self.channels.read().await;
        map.get(channel)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of members currently in `channel`.
    pub async fn member_count(&self, channel: &ChannelId) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, HashMap::len)
    }

    /// Returns the number of channels that have at least one member.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Returns the total number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.channels.read().await.values().map(HashMap::len).sum()
    }
}

//! Domain layer: channel and connection identity, and the membership hub.
//!
//! This module contains the server-side model of who is subscribed to
//! what: validated channel names, connection handles with their outbound
//! queues, and the [`Hub`] registry that the dispatcher reads and the
//! connection lifecycle writes.

pub mod channel_id;
pub mod connection;
pub mod hub;

pub use channel_id::ChannelId;
pub use connection::{ConnectionHandle, ConnectionId, DeliveryError, Payload};
pub use hub::Hub;

//! WebSocket layer: credential-gated upgrade and connection lifecycle.
//!
//! The endpoint at `/ws` is one-directional in practice: subscribers only
//! receive broadcast text frames, and anything they send is discarded.

pub mod connection;
pub mod handler;

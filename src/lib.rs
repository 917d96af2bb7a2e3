//! # wshub
//!
//! Channel-scoped WebSocket publish/subscribe hub.
//!
//! Clients obtain a short-lived signed credential for a channel, open a
//! WebSocket with it, and from then on receive every message any caller
//! broadcasts to that channel. Delivery is best effort, in memory, and
//! single process: nothing is persisted or acknowledged.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)      POST /credentials, POST /broadcast
//!     ├── WS Handler (ws/)          GET /ws?token=…
//!     │
//!     ├── CredentialService (service/)
//!     ├── BroadcastService (service/)
//!     │
//!     ├── Hub (domain/)             channel → live connections
//!     └── Supervisor                shutdown signal + task tracking
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod supervisor;
pub mod ws;

//! Service layer: credential issuance/validation and broadcast fan-out.

pub mod broadcast_service;
pub mod credential_service;

pub use broadcast_service::{BroadcastService, DeliveryReport};
pub use credential_service::{CredentialError, CredentialService, IssuedCredential};

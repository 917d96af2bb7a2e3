//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names (`channel`, `message`, `token`) are part of the wire
//! contract with existing clients and must not be renamed.

pub mod broadcast_dto;
pub mod credential_dto;

pub use broadcast_dto::*;
pub use credential_dto::*;

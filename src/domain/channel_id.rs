//! Validated channel name.
//!
//! [`ChannelId`] is a newtype around the caller-chosen channel string. The
//! only rule is that it must not be empty; any other string is a valid,
//! opaque channel name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// Name of a broadcast channel.
///
/// Channels are never registered up front: one exists while it has at
/// least one member in the [`super::Hub`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel name, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, HubError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HubError::InvalidRequest(
                "channel must not be empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    /// Returns the channel name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = HubError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

//! Transport lifecycle states.

use super::TransportDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a transport type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportState {
    /// Known but not exported; also reported for unknown types.
    #[default]
    NotReady,
    /// Export in progress.
    Registering,
    /// Exported and available through the registry.
    Registered,
    /// Removed from the registry.
    Undeployed,
}

impl TransportState {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotReady => "NOT_READY",
            Self::Registering => "REGISTERING",
            Self::Registered => "REGISTERED",
            Self::Undeployed => "UNDEPLOYED",
        }
    }

    /// Returns whether the registry may move from `self` to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::NotReady | Self::Registered | Self::Undeployed,
                Self::Registering
            ) | (Self::Registering, Self::Registered | Self::NotReady)
                | (Self::Registered | Self::NotReady, Self::Undeployed)
        )
    }
}

impl TryFrom<&str> for TransportState {
    type Error = TransportDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "NOT_READY" => Ok(Self::NotReady),
            "REGISTERING" => Ok(Self::Registering),
            "REGISTERED" => Ok(Self::Registered),
            "UNDEPLOYED" => Ok(Self::Undeployed),
            _ => Err(TransportDomainError::UnknownState(value.to_owned())),
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

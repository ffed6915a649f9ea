//! Message exchange patterns.

use super::TransportDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interaction shape of a transport: direction, role and synchronicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mep {
    /// Receives requests and answers in the same exchange.
    InboundRequestSync,
    /// Receives requests and answers later.
    InboundRequestAsync,
    /// Receives responses within the exchange that requested them.
    InboundResponseSync,
    /// Receives responses to earlier requests.
    InboundResponseAsync,
    /// Sends requests and waits for the answer in the same exchange.
    OutboundRequestSync,
    /// Sends requests whose answers arrive later.
    OutboundRequestAsync,
    /// Sends responses within the exchange that requested them.
    OutboundResponseSync,
    /// Sends responses to earlier requests.
    OutboundResponseAsync,
}

impl Mep {
    /// Every pattern, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::InboundRequestSync,
        Self::InboundRequestAsync,
        Self::InboundResponseSync,
        Self::InboundResponseAsync,
        Self::OutboundRequestSync,
        Self::OutboundRequestAsync,
        Self::OutboundResponseSync,
        Self::OutboundResponseAsync,
    ];

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InboundRequestSync => "INBOUND_REQUEST_SYNC",
            Self::InboundRequestAsync => "INBOUND_REQUEST_ASYNC",
            Self::InboundResponseSync => "INBOUND_RESPONSE_SYNC",
            Self::InboundResponseAsync => "INBOUND_RESPONSE_ASYNC",
            Self::OutboundRequestSync => "OUTBOUND_REQUEST_SYNC",
            Self::OutboundRequestAsync => "OUTBOUND_REQUEST_ASYNC",
            Self::OutboundResponseSync => "OUTBOUND_RESPONSE_SYNC",
            Self::OutboundResponseAsync => "OUTBOUND_RESPONSE_ASYNC",
        }
    }

    /// Returns whether messages arrive from outside.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(
            self,
            Self::InboundRequestSync
                | Self::InboundRequestAsync
                | Self::InboundResponseSync
                | Self::InboundResponseAsync
        )
    }

    /// Returns whether the transport starts the exchange.
    #[must_use]
    pub const fn is_request(self) -> bool {
        matches!(
            self,
            Self::InboundRequestSync
                | Self::InboundRequestAsync
                | Self::OutboundRequestSync
                | Self::OutboundRequestAsync
        )
    }

    /// Returns whether the reply travels in the same exchange.
    #[must_use]
    pub const fn is_sync(self) -> bool {
        matches!(
            self,
            Self::InboundRequestSync
                | Self::InboundResponseSync
                | Self::OutboundRequestSync
                | Self::OutboundResponseSync
        )
    }
}

impl TryFrom<&str> for Mep {
    type Error = TransportDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|mep| mep.as_str() == normalized)
            .ok_or_else(|| TransportDomainError::UnknownMep(value.to_owned()))
    }
}

impl fmt::Display for Mep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Transport SPI.

use crate::context::{ProjectId, ProjectUuid};
use crate::message::Message;
use crate::plugin::{Capability, DiscoveryPolicy};
use crate::transport::domain::{Mep, TransportDescriptor, TransportDomainError, TransportState};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A deployed transport.
///
/// Operations a transport's exchange pattern does not support return
/// [`TransportError::Unsupported`]; the defaults do exactly that.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the static description.
    fn descriptor(&self) -> &TransportDescriptor;

    /// Returns the exchange pattern.
    fn mep(&self) -> Mep {
        self.descriptor().mep()
    }

    /// Returns the path prefix inbound endpoints are published under.
    fn endpoint_prefix(&self) -> Option<&str> {
        None
    }

    /// Sends `message` for session `session_id`; any reply arrives later
    /// through the registry's event sink.
    async fn send(
        &self,
        message: Message,
        session_id: &str,
        project_uuid: Option<ProjectUuid>,
    ) -> TransportResult<()> {
        let _ = (message, session_id, project_uuid);
        Err(self.unsupported("send"))
    }

    /// Returns a message received for `session_id`, if any.
    async fn receive(&self, session_id: &str) -> TransportResult<Option<Message>> {
        let _ = session_id;
        Err(self.unsupported("receive"))
    }

    /// Sends `message` and waits for the reply in the same exchange.
    async fn send_receive_sync(
        &self,
        message: Message,
        project_id: Option<ProjectId>,
    ) -> TransportResult<Message> {
        let _ = (message, project_id);
        Err(self.unsupported("send_receive_sync"))
    }

    /// Builds the error for an operation this transport does not offer.
    fn unsupported(&self, operation: &'static str) -> TransportError {
        TransportError::Unsupported {
            transport: self.descriptor().type_name().to_owned(),
            mep: self.mep(),
            operation,
        }
    }
}

/// Plugin capability for transports; units may ship any number of them.
#[derive(Debug, Clone, Copy)]
pub struct TransportCapability;

impl Capability for TransportCapability {
    type Descriptor = TransportDescriptor;
    type Instance = dyn Transport;
    const NAME: &'static str = "transport";
    const POLICY: DiscoveryPolicy = DiscoveryPolicy::Unrestricted;
}

/// Errors raised by transports and the registry.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No transport of this type is registered.
    #[error("transport '{0}' is not deployed")]
    NotDeployed(String),

    /// The operation is not offered by the transport's exchange pattern.
    #[error("transport '{transport}' ({mep}) does not support {operation}")]
    Unsupported {
        /// Transport type name.
        transport: String,
        /// The transport's exchange pattern.
        mep: Mep,
        /// Rejected operation.
        operation: &'static str,
    },

    /// The remote side or export hook failed.
    #[error("transport '{transport}' failed: {source}")]
    Remote {
        /// Transport type name.
        transport: String,
        /// Original failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Transport configuration is invalid.
    #[error(transparent)]
    Domain(#[from] TransportDomainError),

    /// The lifecycle state machine rejected a move.
    #[error("transport '{transport}' cannot move from {from} to {to}")]
    InvalidTransition {
        /// Transport type name.
        transport: String,
        /// Current state.
        from: TransportState,
        /// Requested state.
        to: TransportState,
    },

    /// No event sink is installed to receive inbound messages.
    #[error("no event sink installed for inbound transport messages")]
    NoEventSink,

    /// Registry state lock was poisoned.
    #[error("transport registry state unavailable: {0}")]
    Registry(String),
}

impl TransportError {
    /// Wraps a remote failure of `transport`.
    pub fn remote(
        transport: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Remote {
            transport: transport.into(),
            source: Arc::new(err),
        }
    }
}

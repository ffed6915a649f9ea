//! Export hook run when a transport is registered.

use super::{Transport, TransportResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Publishes transports to the outside world (endpoints, listeners).
#[async_trait]
pub trait TransportExporter: Send + Sync {
    /// Makes `transport` reachable.
    async fn export(&self, transport: Arc<dyn Transport>) -> TransportResult<()>;

    /// Withdraws the transport of type `type_name`.
    async fn unexport(&self, type_name: &str) -> TransportResult<()>;
}

//! Shared world state for transport registry BDD scenarios.

use mockingbird::transport::adapters::{InMemoryTransportExporter, LoopbackTransport};
use mockingbird::transport::domain::{Mep, TransportDescriptor};
use mockingbird::transport::ports::{Transport, TransportError};
use mockingbird::transport::services::TransportRegistry;
use rstest::fixture;
use std::sync::Arc;

/// Scenario world for transport registry behaviour tests.
pub struct RegistryWorld {
    /// Exporter shared with the registry, used to inject failures.
    pub exporter: Arc<InMemoryTransportExporter>,
    /// The registry under test.
    pub registry: TransportRegistry<InMemoryTransportExporter>,
    /// Transports queued for registration.
    pub pending: Vec<LoopbackTransport>,
    /// Type names accepted by the last registration pass.
    pub registered: Vec<String>,
    /// Result of the last unregister call.
    pub last_unregister: Option<Result<(), TransportError>>,
}

impl RegistryWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        let exporter = Arc::new(InMemoryTransportExporter::new());
        Self {
            registry: TransportRegistry::new(Arc::clone(&exporter)),
            exporter,
            pending: Vec::new(),
            registered: Vec::new(),
            last_unregister: None,
        }
    }

    /// Registers every queued transport and records the accepted types.
    pub fn register_pending(&mut self) {
        let transports: Vec<Arc<dyn Transport>> = self
            .pending
            .drain(..)
            .map(|transport| Arc::new(transport) as _)
            .collect();
        self.registered = run_async(self.registry.register_all(transports));
    }
}

impl Default for RegistryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RegistryWorld {
    RegistryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds a synchronous loopback transport for `type_name`.
///
/// # Errors
///
/// Returns an error when the type name is blank.
pub fn sync_transport(type_name: &str) -> Result<LoopbackTransport, eyre::Report> {
    let descriptor = TransportDescriptor::new(
        type_name,
        type_name.to_uppercase(),
        Mep::OutboundRequestSync,
    )?;
    Ok(LoopbackTransport::new(descriptor))
}

//! Port contracts for transports, export hooks and inbound events.

mod event_sink;
mod exporter;
mod transport;

pub use event_sink::EventSink;
pub use exporter::TransportExporter;
pub use transport::{Transport, TransportCapability, TransportError, TransportResult};

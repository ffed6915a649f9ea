//! In-memory transport adapters.

mod exporter;
mod loopback;

pub use exporter::InMemoryTransportExporter;
pub use loopback::{LoopbackTransport, SentMessage};

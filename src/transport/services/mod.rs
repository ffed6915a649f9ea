//! Transport orchestration services.

mod registry;

pub use registry::TransportRegistry;

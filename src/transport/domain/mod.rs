//! Transport descriptors, exchange patterns and lifecycle states.

mod descriptor;
mod error;
mod mep;
mod state;

pub use descriptor::{PropertyDescriptor, TransportDescriptor};
pub use error::TransportDomainError;
pub use mep::Mep;
pub use state::TransportState;

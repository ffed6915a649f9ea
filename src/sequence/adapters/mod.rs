//! Adapter implementations for identifier and counter ports.

pub mod memory;
pub mod postgres;

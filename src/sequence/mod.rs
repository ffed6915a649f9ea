//! Collision-free identifiers and per-scope sequence counters.
//!
//! - [`services::IdGenerator`] hands out object identifiers from two
//!   independent batched pools (configuration and reporting objects).
//! - [`services::CounterEngine`] issues zero-padded daily indices scoped to
//!   an owner-set.
//! - [`services::PrefixGenerator`] attaches and strips fixed-width
//!   identifier prefixes.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

//! Pluggable transports and their lifecycle registry.
//!
//! A transport is described by a [`domain::TransportDescriptor`] and
//! implemented behind the [`ports::Transport`] SPI. The
//! [`services::TransportRegistry`] exports transports through a
//! [`ports::TransportExporter`], tracks each type's
//! [`domain::TransportState`], hands out live handles by type name, and
//! relays inbound asynchronous messages to one [`ports::EventSink`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

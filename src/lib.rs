//! Mockingbird: service virtualization engine for integration testing.
//!
//! Mockingbird stands in for real systems while a test runs. It sends and
//! receives messages over pluggable transports, correlates asynchronous
//! replies with the sessions waiting for them, runs scripted call chains
//! with conditional gating, extracts parameters from message bodies and
//! allocates identifiers and daily counters.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and invariants with no infrastructure dependencies
//! - **Ports**: Async trait contracts for external collaborators
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration over the ports
//!
//! # Modules
//!
//! - [`condition`]: Boolean condition lists gating steps
//! - [`extraction`]: Message parameter extraction strategies
//! - [`plugin`]: Plugin catalog, factory table and loader
//! - [`interceptor`]: Ordered message transforms
//! - [`transport`]: Transport SPI and lifecycle registry
//! - [`session`]: Reply correlation by session id
//! - [`step`]: Call chains, step instances and iterators
//! - [`sequence`]: Identifier pools, prefixes and daily counters
//! - [`execution`]: End-to-end call-chain runner

pub mod condition;
pub mod config;
pub mod context;
pub mod execution;
pub mod extraction;
pub mod interceptor;
pub mod message;
pub mod persistence;
pub mod plugin;
pub mod sequence;
pub mod session;
pub mod step;
pub mod telemetry;
pub mod transport;

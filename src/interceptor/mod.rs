//! Ordered, conditionally applicable message transforms.
//!
//! Interceptors are declared by [`InterceptorDescriptor`]s and implemented
//! by plugins loaded through [`crate::plugin::PluginLoader`]. The
//! [`InterceptorPipeline`] feeds a message through every active interceptor
//! that applies to the current environment and system, in ascending order.

mod domain;
mod pipeline;
mod ports;

pub use domain::{ApplicabilityRule, InterceptorDescriptor};
pub use pipeline::InterceptorPipeline;
pub use ports::{Interceptor, InterceptorCapability, InterceptorError, InterceptorResult};

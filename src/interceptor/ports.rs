//! Interceptor SPI.

use super::domain::InterceptorDescriptor;
use crate::message::Message;
use crate::plugin::{Capability, DiscoveryPolicy, PluginError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A message transform, constructed from its [`InterceptorDescriptor`].
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Transforms `message`.
    async fn apply(&self, message: Message) -> InterceptorResult<Message>;
}

/// Plugin capability for interceptors; one implementation per unit.
#[derive(Debug, Clone, Copy)]
pub struct InterceptorCapability;

impl Capability for InterceptorCapability {
    type Descriptor = InterceptorDescriptor;
    type Instance = dyn Interceptor;
    const NAME: &'static str = "interceptor";
    const POLICY: DiscoveryPolicy = DiscoveryPolicy::ExactlyOnePerUnit;
}

/// Errors raised by interceptors and the pipeline.
#[derive(Debug, Clone, Error)]
pub enum InterceptorError {
    /// The implementation could not be loaded or constructed.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The implementation failed to transform the message.
    #[error("interceptor '{interceptor}' failed: {source}")]
    Transform {
        /// Name of the failing interceptor.
        interceptor: String,
        /// Original failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The instance cache lock was poisoned.
    #[error("interceptor cache unavailable: {0}")]
    Cache(String),
}

impl InterceptorError {
    /// Wraps an implementation failure.
    pub fn transform(
        interceptor: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transform {
            interceptor: interceptor.into(),
            source: Arc::new(err),
        }
    }
}

/// Result type for interceptor operations.
pub type InterceptorResult<T> = Result<T, InterceptorError>;

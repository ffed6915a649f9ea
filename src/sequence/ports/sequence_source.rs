//! Backing sequence port for identifier batches.

use crate::persistence::ObjectId;
use crate::sequence::domain::IdKind;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for sequence source operations.
pub type SequenceSourceResult<T> = Result<T, SequenceSourceError>;

/// Source of fresh identifier batches.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    /// Fetches the next `size` identifiers for the given pool.
    ///
    /// Identifiers must never repeat across calls.
    async fn next_batch(&self, kind: IdKind, size: u32) -> SequenceSourceResult<Vec<ObjectId>>;
}

/// Errors returned by sequence source implementations.
#[derive(Debug, Clone, Error)]
pub enum SequenceSourceError {
    /// The backing sequence is exhausted.
    #[error("{0} identifier sequence exhausted")]
    Exhausted(IdKind),

    /// Backing store failure.
    #[error("sequence source error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl SequenceSourceError {
    /// Wraps a backing-store failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

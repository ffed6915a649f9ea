//! Repository port for daily counters.

use crate::sequence::domain::{Counter, OwnerSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for counter repository operations.
pub type CounterRepositoryResult<T> = Result<T, CounterRepositoryError>;

/// Persistence contract for counters; one row per owner-set per day.
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Finds the counter for an exact owner-set on a given day.
    ///
    /// `Ok(None)` means no index was issued yet; lookup failures are errors.
    async fn find(
        &self,
        owners: &OwnerSet,
        date: NaiveDate,
    ) -> CounterRepositoryResult<Option<Counter>>;

    /// Inserts or updates a counter in its own independent transaction.
    ///
    /// A failure of whatever operation requested the index must not roll
    /// this write back.
    async fn save_detached(&self, counter: &Counter) -> CounterRepositoryResult<()>;

    /// Deletes counters dated before `date` and returns how many were removed.
    async fn delete_before(&self, date: NaiveDate) -> CounterRepositoryResult<u64>;
}

/// Errors returned by counter repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CounterRepositoryError {
    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted counter data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CounterRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

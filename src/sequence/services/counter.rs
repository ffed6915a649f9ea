//! Daily counters keyed by owner-set.

use super::SequenceResult;
use crate::sequence::{
    domain::{Counter, CounterFormat, OwnerSet, SequenceDomainError},
    ports::CounterRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Issues per-day, per-owner-set indices such as `"01"`, `"02"`, ...
///
/// Calls are serialized on one process-wide guard; the read-modify-write of
/// a counter never interleaves with another caller's.
pub struct CounterEngine<R, C>
where
    R: CounterRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    guard: Mutex<()>,
}

impl<R, C> CounterEngine<R, C>
where
    R: CounterRepository,
    C: Clock + Send + Sync,
{
    /// Creates a counter engine.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            guard: Mutex::new(()),
        }
    }

    /// Issues the next index for `owners` today, rendered with `format`.
    ///
    /// The first call for an owner-set on a given day returns index 1. The
    /// updated counter is written in its own transaction before the value is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`super::SequenceError::Domain`] when the format is unsupported
    /// or the counter is exhausted, and [`super::SequenceError::Repository`]
    /// when persistence fails.
    pub async fn next_index(&self, owners: &OwnerSet, format: &str) -> SequenceResult<String> {
        let counter_format = CounterFormat::new(format)?;
        let _serialized = self.guard.lock().await;
        let today = self.clock.utc().date_naive();

        let counter = match self.repository.find(owners, today).await? {
            Some(mut existing) => {
                if let Err(err) = existing.advance(counter_format) {
                    if matches!(err, SequenceDomainError::CounterExhausted { .. }) {
                        warn!(owner_set = %owners, error = %err, "daily counter exhausted");
                    }
                    return Err(err.into());
                }
                existing
            }
            None => Counter::first(owners.clone(), today, counter_format),
        };

        self.repository.save_detached(&counter).await?;
        debug!(owner_set = %owners, index = counter.index(), "issued counter index");
        Ok(counter.rendered())
    }

    /// Deletes counters dated before today and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`super::SequenceError::Repository`] when deletion fails.
    pub async fn purge_stale(&self) -> SequenceResult<u64> {
        let today = self.clock.utc().date_naive();
        let removed = self.repository.delete_before(today).await?;
        debug!(removed, "purged stale counters");
        Ok(removed)
    }
}

//! Batched identifier generation over two independent pools.

use super::{SequenceError, SequenceResult};
use crate::config::SequenceConfig;
use crate::persistence::ObjectId;
use crate::sequence::{domain::IdKind, ports::SequenceSource};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Hands out identifiers from locally cached batches.
///
/// Each pool refills from the [`SequenceSource`] only when it runs dry. The
/// refill happens while the pool's lock is held, so concurrent callers never
/// trigger overlapping fetches or receive the same identifier twice.
pub struct IdGenerator<S>
where
    S: SequenceSource,
{
    source: Arc<S>,
    batch_size: u32,
    configuration: Mutex<VecDeque<ObjectId>>,
    reporting: Mutex<VecDeque<ObjectId>>,
}

impl<S> IdGenerator<S>
where
    S: SequenceSource,
{
    /// Creates a generator with empty pools.
    #[must_use]
    pub fn new(source: Arc<S>, config: &SequenceConfig) -> Self {
        Self {
            source,
            batch_size: config.id_batch_size,
            configuration: Mutex::new(VecDeque::new()),
            reporting: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns the next configuration-object identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] when the pool is empty and the refill fails
    /// or yields nothing.
    pub async fn generate(&self) -> SequenceResult<ObjectId> {
        self.next(IdKind::Configuration).await
    }

    /// Returns the next reporting-object identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] when the pool is empty and the refill fails
    /// or yields nothing.
    pub async fn generate_reporting_id(&self) -> SequenceResult<ObjectId> {
        self.next(IdKind::Reporting).await
    }

    /// Fetches one more batch into the given pool and returns its new size.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] when the source fails or yields nothing.
    pub async fn refill(&self, kind: IdKind) -> SequenceResult<usize> {
        let mut pool = self.pool(kind).lock().await;
        self.fill(kind, &mut pool).await?;
        Ok(pool.len())
    }

    /// Returns how many identifiers are cached for the given pool.
    pub async fn pending(&self, kind: IdKind) -> usize {
        self.pool(kind).lock().await.len()
    }

    async fn next(&self, kind: IdKind) -> SequenceResult<ObjectId> {
        let mut pool = self.pool(kind).lock().await;
        if pool.is_empty() {
            self.fill(kind, &mut pool).await?;
        }
        pool.pop_front().ok_or(SequenceError::EmptyBatch(kind))
    }

    async fn fill(&self, kind: IdKind, pool: &mut VecDeque<ObjectId>) -> SequenceResult<()> {
        let batch = self.source.next_batch(kind, self.batch_size).await?;
        if batch.is_empty() {
            return Err(SequenceError::EmptyBatch(kind));
        }
        debug!(pool = %kind, fetched = batch.len(), "refilled identifier pool");
        pool.extend(batch);
        Ok(())
    }

    const fn pool(&self, kind: IdKind) -> &Mutex<VecDeque<ObjectId>> {
        match kind {
            IdKind::Configuration => &self.configuration,
            IdKind::Reporting => &self.reporting,
        }
    }
}

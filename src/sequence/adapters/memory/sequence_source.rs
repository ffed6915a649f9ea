//! In-memory identifier sequence.

use crate::persistence::ObjectId;
use crate::sequence::{
    domain::IdKind,
    ports::{SequenceSource, SequenceSourceError, SequenceSourceResult},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic in-memory sequence, one counter per identifier pool.
#[derive(Debug)]
pub struct InMemorySequenceSource {
    configuration: AtomicU64,
    reporting: AtomicU64,
}

impl Default for InMemorySequenceSource {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl InMemorySequenceSource {
    /// Creates a sequence starting at 1 for both pools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence whose first identifier is `first` for both pools.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            configuration: AtomicU64::new(first),
            reporting: AtomicU64::new(first),
        }
    }

    const fn counter(&self, kind: IdKind) -> &AtomicU64 {
        match kind {
            IdKind::Configuration => &self.configuration,
            IdKind::Reporting => &self.reporting,
        }
    }
}

#[async_trait]
impl SequenceSource for InMemorySequenceSource {
    async fn next_batch(&self, kind: IdKind, size: u32) -> SequenceSourceResult<Vec<ObjectId>> {
        let span = u64::from(size);
        let start = self.counter(kind).fetch_add(span, Ordering::SeqCst);
        let end = start
            .checked_add(span)
            .ok_or(SequenceSourceError::Exhausted(kind))?;
        Ok((start..end).map(ObjectId::new).collect())
    }
}

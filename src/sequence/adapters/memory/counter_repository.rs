//! In-memory counter repository.

use crate::sequence::{
    domain::{Counter, OwnerSet},
    ports::{CounterRepository, CounterRepositoryError, CounterRepositoryResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory counter repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCounterRepository {
    counters: Arc<RwLock<HashMap<(OwnerSet, NaiveDate), Counter>>>,
}

impl InMemoryCounterRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterRepository for InMemoryCounterRepository {
    async fn find(
        &self,
        owners: &OwnerSet,
        date: NaiveDate,
    ) -> CounterRepositoryResult<Option<Counter>> {
        let counters = self.counters.read().map_err(|err| {
            CounterRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(counters.get(&(owners.clone(), date)).cloned())
    }

    async fn save_detached(&self, counter: &Counter) -> CounterRepositoryResult<()> {
        let mut counters = self.counters.write().map_err(|err| {
            CounterRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        counters.insert((counter.owners().clone(), counter.date()), counter.clone());
        Ok(())
    }

    async fn delete_before(&self, date: NaiveDate) -> CounterRepositoryResult<u64> {
        let mut counters = self.counters.write().map_err(|err| {
            CounterRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let before = counters.len();
        counters.retain(|(_, counter_date), _| *counter_date >= date);
        Ok(u64::try_from(before.saturating_sub(counters.len())).unwrap_or(u64::MAX))
    }
}

//! `PostgreSQL` repository implementation for daily counters.

use super::{SequencePgPool, models::CounterRow, schema::counters};
use crate::sequence::{
    domain::{Counter, CounterFormat, OwnerSet},
    ports::{CounterRepository, CounterRepositoryError, CounterRepositoryResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

/// `PostgreSQL`-backed counter repository.
#[derive(Debug, Clone)]
pub struct PostgresCounterRepository {
    pool: SequencePgPool,
}

impl PostgresCounterRepository {
    /// Creates a repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: SequencePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> CounterRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CounterRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(CounterRepositoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(CounterRepositoryError::persistence)?
    }
}

#[async_trait]
impl CounterRepository for PostgresCounterRepository {
    async fn find(
        &self,
        owners: &OwnerSet,
        date: NaiveDate,
    ) -> CounterRepositoryResult<Option<Counter>> {
        let owner_key = owners.canonical();
        self.run_blocking(move |connection| {
            let row = counters::table
                .filter(counters::owner_key.eq(&owner_key))
                .filter(counters::counter_date.eq(date))
                .select(CounterRow::as_select())
                .first::<CounterRow>(connection)
                .optional()
                .map_err(CounterRepositoryError::persistence)?;
            row.map(row_to_counter).transpose()
        })
        .await
    }

    async fn save_detached(&self, counter: &Counter) -> CounterRepositoryResult<()> {
        let row = to_row(counter)?;

        // The pooled connection is dedicated to this call, so the transaction
        // below is independent of anything the caller has open.
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::insert_into(counters::table)
                        .values(&row)
                        .on_conflict((counters::owner_key, counters::counter_date))
                        .do_update()
                        .set((
                            counters::format.eq(&row.format),
                            counters::counter_index.eq(row.counter_index),
                        ))
                        .execute(tx)
                })
                .map_err(CounterRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn delete_before(&self, date: NaiveDate) -> CounterRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(counters::table.filter(counters::counter_date.lt(date)))
                .execute(connection)
                .map_err(CounterRepositoryError::persistence)?;
            u64::try_from(deleted).map_err(CounterRepositoryError::invalid_persisted_data)
        })
        .await
    }
}

fn to_row(counter: &Counter) -> CounterRepositoryResult<CounterRow> {
    Ok(CounterRow {
        owner_key: counter.owners().canonical(),
        owners: counter.owners().keys().map(str::to_owned).collect(),
        counter_date: counter.date(),
        format: counter.format().pattern().to_owned(),
        counter_index: i32::try_from(counter.index())
            .map_err(CounterRepositoryError::invalid_persisted_data)?,
    })
}

fn row_to_counter(row: CounterRow) -> CounterRepositoryResult<Counter> {
    let owners = OwnerSet::new(row.owners).map_err(CounterRepositoryError::invalid_persisted_data)?;
    let format =
        CounterFormat::new(row.format).map_err(CounterRepositoryError::invalid_persisted_data)?;
    let index =
        u32::try_from(row.counter_index).map_err(CounterRepositoryError::invalid_persisted_data)?;
    Ok(Counter::from_persisted(owners, row.counter_date, format, index))
}

//! `PostgreSQL` sequence source drawing batches with `nextval`.

use super::{SequencePgPool, models::SequenceValueRow};
use crate::persistence::ObjectId;
use crate::sequence::{
    domain::IdKind,
    ports::{SequenceSource, SequenceSourceError, SequenceSourceResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};

const BATCH_QUERY: &str = "SELECT nextval($1::regclass) AS id FROM generate_series(1, $2)";

/// Identifier batches backed by two database sequences.
#[derive(Debug, Clone)]
pub struct PostgresSequenceSource {
    pool: SequencePgPool,
    configuration_sequence: String,
    reporting_sequence: String,
}

impl PostgresSequenceSource {
    /// Creates a source using the `configuration_id_seq` and
    /// `reporting_id_seq` sequences.
    #[must_use]
    pub fn new(pool: SequencePgPool) -> Self {
        Self {
            pool,
            configuration_sequence: "configuration_id_seq".to_owned(),
            reporting_sequence: "reporting_id_seq".to_owned(),
        }
    }

    /// Overrides the sequence names.
    #[must_use]
    pub fn with_sequence_names(
        mut self,
        configuration: impl Into<String>,
        reporting: impl Into<String>,
    ) -> Self {
        self.configuration_sequence = configuration.into();
        self.reporting_sequence = reporting.into();
        self
    }

    fn sequence_name(&self, kind: IdKind) -> String {
        match kind {
            IdKind::Configuration => self.configuration_sequence.clone(),
            IdKind::Reporting => self.reporting_sequence.clone(),
        }
    }
}

#[async_trait]
impl SequenceSource for PostgresSequenceSource {
    async fn next_batch(&self, kind: IdKind, size: u32) -> SequenceSourceResult<Vec<ObjectId>> {
        let pool = self.pool.clone();
        let sequence = self.sequence_name(kind);
        let count = i32::try_from(size).map_err(SequenceSourceError::backend)?;

        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SequenceSourceError::backend)?;
            let rows = diesel::sql_query(BATCH_QUERY)
                .bind::<Text, _>(sequence)
                .bind::<Integer, _>(count)
                .load::<SequenceValueRow>(&mut connection)
                .map_err(SequenceSourceError::backend)?;
            to_object_ids(rows)
        })
        .await
        .map_err(SequenceSourceError::backend)?
    }
}

fn to_object_ids(rows: Vec<SequenceValueRow>) -> SequenceSourceResult<Vec<ObjectId>> {
    rows.into_iter()
        .map(|row| {
            u64::try_from(row.id)
                .map(ObjectId::new)
                .map_err(SequenceSourceError::backend)
        })
        .collect()
}

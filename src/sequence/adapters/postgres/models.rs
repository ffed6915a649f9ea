//! Row models for sequence persistence.

use super::schema::counters;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

/// Stored counter row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = counters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct CounterRow {
    pub owner_key: String,
    pub owners: Vec<String>,
    pub counter_date: NaiveDate,
    pub format: String,
    pub counter_index: i32,
}

/// One value drawn from a database sequence.
#[derive(Debug, Clone, QueryableByName)]
pub(super) struct SequenceValueRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
}

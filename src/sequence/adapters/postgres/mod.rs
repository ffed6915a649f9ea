//! `PostgreSQL` adapters for identifier batches and daily counters.

mod counter_repository;
mod models;
mod schema;
mod sequence_source;

pub use counter_repository::PostgresCounterRepository;
pub use sequence_source::PostgresSequenceSource;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type for sequence adapters.
pub type SequencePgPool = Pool<ConnectionManager<PgConnection>>;

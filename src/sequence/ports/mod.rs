//! Port contracts for identifier and counter persistence.

mod counter_repository;
mod sequence_source;

pub use counter_repository::{CounterRepository, CounterRepositoryError, CounterRepositoryResult};
pub use sequence_source::{SequenceSource, SequenceSourceError, SequenceSourceResult};

//! In-memory adapters for identifier and counter ports.

mod counter_repository;
mod sequence_source;

pub use counter_repository::InMemoryCounterRepository;
pub use sequence_source::InMemorySequenceSource;

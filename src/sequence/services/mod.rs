//! Services issuing identifiers, daily counters and prefixed values.

mod counter;
mod id_generator;
mod prefix;

pub use counter::CounterEngine;
pub use id_generator::IdGenerator;
pub use prefix::PrefixGenerator;

use crate::sequence::{
    domain::{IdKind, SequenceDomainError},
    ports::{CounterRepositoryError, SequenceSourceError},
};
use thiserror::Error;

/// Service-level errors for sequence operations.
#[derive(Debug, Clone, Error)]
pub enum SequenceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] SequenceDomainError),
    /// The backing sequence failed.
    #[error(transparent)]
    Source(#[from] SequenceSourceError),
    /// Counter persistence failed.
    #[error(transparent)]
    Repository(#[from] CounterRepositoryError),
    /// The backing sequence returned no identifiers.
    #[error("sequence source returned an empty {0} batch")]
    EmptyBatch(IdKind),
}

/// Result type for sequence service operations.
pub type SequenceResult<T> = Result<T, SequenceError>;

//! Running call chains end to end.
//!
//! [`ChainRunner`] walks a chain with the step iterator and, for every
//! situation step, gates it on its conditions, renders the outbound
//! message, passes it through the interceptors, exchanges it over the
//! registered transport, correlates asynchronous replies through the
//! session handler and mines the reply into the step context.

mod runner;
mod session_sink;

pub use runner::{ChainRunner, PollingPolicy, RunnerServices};
pub use session_sink::SessionEventSink;

use crate::condition::ConditionError;
use crate::context::TemplateError;
use crate::extraction::ExtractionError;
use crate::interceptor::InterceptorError;
use crate::persistence::{ObjectId, PersistenceError};
use crate::sequence::services::SequenceError;
use crate::session::SessionError;
use crate::step::domain::StepDomainError;
use crate::transport::ports::TransportError;
use thiserror::Error;

/// Errors raised while running a chain.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Condition list is misconfigured.
    #[error(transparent)]
    Condition(#[from] ConditionError),
    /// A parsing rule failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// An interceptor failed.
    #[error(transparent)]
    Interceptor(#[from] InterceptorError),
    /// The transport is missing or failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Session bookkeeping failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The step status machine rejected a move.
    #[error(transparent)]
    Step(#[from] StepDomainError),
    /// No session identifier could be allocated.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// Chain lookup failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// A message template did not render.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// No call chain exists with this identifier.
    #[error("call chain {0} not found")]
    ChainNotFound(ObjectId),
    /// No object manager is registered for call chains.
    #[error("no object manager registered for call chains")]
    MissingChainManager,
}

/// Result type for chain execution.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

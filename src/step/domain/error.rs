//! Error types for step execution records.

use super::StepStatus;
use crate::persistence::ObjectId;
use thiserror::Error;

/// Errors raised while driving a step instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepDomainError {
    /// The status machine rejected a move.
    #[error("step {step_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Step being executed.
        step_id: ObjectId,
        /// Current status.
        from: StepStatus,
        /// Requested status.
        to: StepStatus,
    },

    /// No retry is left.
    #[error("step {step_id} used all {max_attempts} attempt(s)")]
    AttemptsExhausted {
        /// Step being executed.
        step_id: ObjectId,
        /// Configured attempt limit.
        max_attempts: u32,
    },

    /// Unrecognized status name.
    #[error("unknown step status '{0}'")]
    UnknownStatus(String),
}

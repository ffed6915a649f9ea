//! Step model, status machine and execution records.

mod error;
mod instance;
mod model;
mod status;

pub use error::StepDomainError;
pub use instance::StepInstance;
pub use model::{CallChain, Situation, Step, StepTarget};
pub use status::StepStatus;

/// Result type for step domain operations.
pub type StepResult<T> = Result<T, StepDomainError>;

//! Boolean condition lists gating step execution.
//!
//! A condition list is evaluated left to right. Each condition's combinator
//! joins it to the condition that follows; the last condition carries none.
//! Evaluation stops early once the running result is false and no `OR`
//! remains ahead that could still flip it.

mod domain;
mod evaluator;

pub use domain::{Combinator, ConditionError, ConditionKind, ConditionParameter, ConditionResult};
pub use evaluator::ConditionEvaluator;

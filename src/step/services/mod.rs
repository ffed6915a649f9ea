//! Iteration over runnable steps.

mod iterator;

pub use iterator::{CallChainStepIterator, SituationStepIterator};

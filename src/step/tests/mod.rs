//! Unit tests for the step model and iterators.

mod iterator_tests;

use crate::persistence::ObjectId;
use crate::step::domain::{Situation, Step};

pub(super) fn situation_step(id: u64, name: &str) -> Step {
    Step::situation(
        ObjectId::new(id),
        name,
        Some(Situation::new(ObjectId::new(id + 1000), name, "rest")),
    )
}

//! Scripted steps and their per-run execution records.
//!
//! A [`domain::CallChain`] is an ordered list of [`domain::Step`]s, each
//! pointing at a [`domain::Situation`] or at an embedded chain. The
//! iterators in [`services`] walk a container, skip administrative gaps,
//! disabled steps and steps whose target is missing, and hand out one
//! [`domain::StepInstance`] per runnable step.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;

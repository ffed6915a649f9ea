//! Iterators materializing one [`StepInstance`] per runnable step.

use crate::context::InstanceContext;
use crate::persistence::ObjectId;
use crate::step::domain::{CallChain, Step, StepInstance, StepTarget};
use std::slice;
use tracing::{debug, warn};

/// Returns `step` when it is present, enabled and its target resolves.
fn runnable(slot: Option<&Step>) -> Option<&Step> {
    let step = slot?;
    if !step.is_enabled() {
        debug!(step_id = %step.id(), "skipping disabled step");
        return None;
    }
    if !step.target().is_resolved() {
        debug!(step_id = %step.id(), "skipping step with missing target");
        return None;
    }
    Some(step)
}

/// Walks the step list of one container without expanding embedded chains.
pub struct SituationStepIterator<'a> {
    container_id: ObjectId,
    steps: slice::Iter<'a, Option<Step>>,
    parent: &'a InstanceContext,
    lookahead: Option<&'a Step>,
}

impl<'a> SituationStepIterator<'a> {
    /// Iterates `steps` owned by `container_id` under `parent`.
    #[must_use]
    pub fn new(
        container_id: ObjectId,
        steps: &'a [Option<Step>],
        parent: &'a InstanceContext,
    ) -> Self {
        Self {
            container_id,
            steps: steps.iter(),
            parent,
            lookahead: None,
        }
    }

    /// Returns whether another runnable step remains.
    pub fn has_next(&mut self) -> bool {
        if self.lookahead.is_none() {
            self.lookahead = self.advance();
        }
        self.lookahead.is_some()
    }

    fn advance(&mut self) -> Option<&'a Step> {
        self.steps.by_ref().find_map(|slot| runnable(slot.as_ref()))
    }
}

impl Iterator for SituationStepIterator<'_> {
    type Item = StepInstance;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.lookahead.take().or_else(|| self.advance())?;
        Some(StepInstance::for_step(
            step,
            self.parent,
            Some(self.container_id),
        ))
    }
}

struct Frame<'a> {
    chain_id: ObjectId,
    steps: slice::Iter<'a, Option<Step>>,
}

impl<'a> Frame<'a> {
    fn of(chain: &'a CallChain) -> Self {
        Self {
            chain_id: chain.id(),
            steps: chain.steps().iter(),
        }
    }
}

/// Walks a call chain, expanding embedded chains in place.
///
/// Declared order is preserved. An embedded chain that is already being
/// expanded higher up is skipped.
pub struct CallChainStepIterator<'a> {
    frames: Vec<Frame<'a>>,
    parent: &'a InstanceContext,
    lookahead: Option<(&'a Step, ObjectId)>,
}

impl<'a> CallChainStepIterator<'a> {
    /// Iterates `chain` under `parent`.
    #[must_use]
    pub fn new(chain: &'a CallChain, parent: &'a InstanceContext) -> Self {
        Self {
            frames: vec![Frame::of(chain)],
            parent,
            lookahead: None,
        }
    }

    /// Returns whether another runnable step remains.
    pub fn has_next(&mut self) -> bool {
        if self.lookahead.is_none() {
            self.lookahead = self.advance();
        }
        self.lookahead.is_some()
    }

    fn advance(&mut self) -> Option<(&'a Step, ObjectId)> {
        loop {
            let frame = self.frames.last_mut()?;
            let chain_id = frame.chain_id;
            let Some(slot) = frame.steps.next() else {
                self.frames.pop();
                continue;
            };
            let Some(step) = runnable(slot.as_ref()) else {
                continue;
            };
            match step.target() {
                StepTarget::Chain(Some(embedded)) => {
                    if self.frames.iter().any(|open| open.chain_id == embedded.id()) {
                        warn!(
                            step_id = %step.id(),
                            chain_id = %embedded.id(),
                            "skipping re-entrant embedded chain"
                        );
                        continue;
                    }
                    self.frames.push(Frame::of(embedded));
                }
                _ => return Some((step, chain_id)),
            }
        }
    }
}

impl Iterator for CallChainStepIterator<'_> {
    type Item = StepInstance;

    fn next(&mut self) -> Option<Self::Item> {
        let (step, chain_id) = self.lookahead.take().or_else(|| self.advance())?;
        Some(StepInstance::for_step(step, self.parent, Some(chain_id)))
    }
}

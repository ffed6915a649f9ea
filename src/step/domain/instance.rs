//! Per-run execution record of one step.

use super::{Step, StepDomainError, StepResult, StepStatus, StepTarget};
use crate::condition::ConditionParameter;
use crate::context::InstanceContext;
use crate::message::Message;
use crate::persistence::ObjectId;
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Execution record created by the step iterators.
///
/// Owns the step's context, a child of the run context with a fresh leaf
/// sub-context, and for situation steps the exchanged messages.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInstance {
    step_id: ObjectId,
    name: String,
    parent_id: Option<ObjectId>,
    target: StepTarget,
    conditions: Vec<ConditionParameter>,
    context: InstanceContext,
    status: StepStatus,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    outgoing: Option<Message>,
    incoming: Option<Message>,
    attempt: u32,
    max_attempts: u32,
    error: Option<String>,
}

impl StepInstance {
    /// Materializes `step` under `parent`, owned by container `parent_id`.
    #[must_use]
    pub fn for_step(step: &Step, parent: &InstanceContext, parent_id: Option<ObjectId>) -> Self {
        Self {
            step_id: step.id(),
            name: step.name().to_owned(),
            parent_id,
            target: step.target().clone(),
            conditions: step.conditions().to_vec(),
            context: parent.child(),
            status: StepStatus::NotStarted,
            started_at: None,
            finished_at: None,
            outgoing: None,
            incoming: None,
            attempt: 0,
            max_attempts: step.max_attempts(),
            error: None,
        }
    }

    /// Marks the instance in progress and stamps the start time.
    ///
    /// # Errors
    ///
    /// Returns [`StepDomainError::InvalidStatusTransition`] unless the
    /// instance has not started.
    pub fn start(&mut self, clock: &impl Clock) -> StepResult<()> {
        self.transition_to(StepStatus::InProgress)?;
        self.started_at = Some(clock.utc());
        self.attempt = 1;
        Ok(())
    }

    /// Marks the instance passed.
    ///
    /// # Errors
    ///
    /// Returns [`StepDomainError::InvalidStatusTransition`] unless the
    /// instance is in progress.
    pub fn finish(&mut self, clock: &impl Clock) -> StepResult<()> {
        self.complete(StepStatus::Passed, clock)
    }

    /// Marks the instance failed with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`StepDomainError::InvalidStatusTransition`] unless the
    /// instance is in progress.
    pub fn fail(&mut self, reason: impl Into<String>, clock: &impl Clock) -> StepResult<()> {
        self.complete(StepStatus::Failed, clock)?;
        self.error = Some(reason.into());
        Ok(())
    }

    /// Marks the instance stopped.
    ///
    /// # Errors
    ///
    /// Returns [`StepDomainError::InvalidStatusTransition`] when the
    /// instance already finished.
    pub fn stop(&mut self, clock: &impl Clock) -> StepResult<()> {
        self.complete(StepStatus::Stopped, clock)
    }

    /// Marks the instance failed by timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StepDomainError::InvalidStatusTransition`] unless the
    /// instance is in progress.
    pub fn time_out(&mut self, clock: &impl Clock) -> StepResult<()> {
        self.complete(StepStatus::FailedByTimeout, clock)?;
        self.error = Some("no reply before timeout".to_owned());
        Ok(())
    }

    /// Starts the next attempt and returns its number.
    ///
    /// # Errors
    ///
    /// Returns [`StepDomainError::AttemptsExhausted`] when every attempt was
    /// used.
    pub fn next_attempt(&mut self) -> StepResult<u32> {
        if !self.has_attempts_left() {
            return Err(StepDomainError::AttemptsExhausted {
                step_id: self.step_id,
                max_attempts: self.max_attempts,
            });
        }
        self.attempt = self.attempt.saturating_add(1);
        Ok(self.attempt)
    }

    /// Returns whether another attempt is allowed.
    #[must_use]
    pub const fn has_attempts_left(&self) -> bool {
        self.attempt < self.max_attempts
    }

    fn complete(&mut self, status: StepStatus, clock: &impl Clock) -> StepResult<()> {
        self.transition_to(status)?;
        self.finished_at = Some(clock.utc());
        Ok(())
    }

    fn transition_to(&mut self, status: StepStatus) -> StepResult<()> {
        if !self.status.can_transition_to(status) {
            return Err(StepDomainError::InvalidStatusTransition {
                step_id: self.step_id,
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        Ok(())
    }

    /// Records the message sent by this step.
    pub fn set_outgoing(&mut self, message: Message) {
        self.outgoing = Some(message);
    }

    /// Records the reply received by this step.
    pub fn set_incoming(&mut self, message: Message) {
        self.incoming = Some(message);
    }

    /// Returns the step identifier.
    #[must_use]
    pub const fn step_id(&self) -> ObjectId {
        self.step_id
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the container the step was taken from.
    #[must_use]
    pub const fn parent_id(&self) -> Option<ObjectId> {
        self.parent_id
    }

    /// Returns the resolved step target.
    #[must_use]
    pub const fn target(&self) -> &StepTarget {
        &self.target
    }

    /// Returns the conditions gating the step.
    #[must_use]
    pub fn conditions(&self) -> &[ConditionParameter] {
        &self.conditions
    }

    /// Returns the step context.
    #[must_use]
    pub const fn context(&self) -> &InstanceContext {
        &self.context
    }

    /// Returns the step context for updates.
    pub const fn context_mut(&mut self) -> &mut InstanceContext {
        &mut self.context
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> StepStatus {
        self.status
    }

    /// Returns when the step started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the step finished.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns the message sent.
    #[must_use]
    pub const fn outgoing(&self) -> Option<&Message> {
        self.outgoing.as_ref()
    }

    /// Returns the reply received.
    #[must_use]
    pub const fn incoming(&self) -> Option<&Message> {
        self.incoming.as_ref()
    }

    /// Returns the current attempt number, zero before the start.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns the attempt limit.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the recorded failure reason.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

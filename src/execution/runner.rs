//! Call-chain runner.

use super::{ExecutionError, ExecutionResult};
use crate::condition::ConditionEvaluator;
use crate::context::{InstanceContext, TemplateEngine};
use crate::extraction::{MessageParameter, MessageParameterExtractor};
use crate::interceptor::InterceptorPipeline;
use crate::message::Message;
use crate::persistence::{ObjectId, ObjectManagers};
use crate::sequence::ports::SequenceSource;
use crate::sequence::services::{IdGenerator, PrefixGenerator};
use crate::session::SessionHandler;
use crate::step::domain::{CallChain, Situation, StepInstance, StepStatus, StepTarget};
use crate::step::services::CallChainStepIterator;
use crate::transport::ports::{Transport, TransportError, TransportExporter};
use crate::transport::services::TransportRegistry;
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Back-off used while waiting for asynchronous replies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollingPolicy {
    /// First pause between polls.
    pub interval: Duration,
    /// Longest pause between polls.
    pub max_interval: Duration,
    /// Growth factor of the pause; `1.0` keeps it fixed.
    pub multiplier: f64,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

/// Collaborators a [`ChainRunner`] drives.
pub struct RunnerServices<E: TransportExporter, S: SequenceSource> {
    /// Deployed transports.
    pub registry: Arc<TransportRegistry<E>>,
    /// Reply correlation.
    pub sessions: Arc<SessionHandler>,
    /// Outbound message transforms.
    pub interceptors: Arc<InterceptorPipeline>,
    /// Reply parameter extraction.
    pub extractor: Arc<MessageParameterExtractor>,
    /// Step and validation condition evaluation.
    pub conditions: Arc<ConditionEvaluator>,
    /// Message template rendering.
    pub templates: Arc<TemplateEngine>,
    /// Source of session identifiers.
    pub ids: Arc<IdGenerator<S>>,
    /// Prefix stamped on session identifiers.
    pub session_prefix: PrefixGenerator,
    /// Chain lookup for [`ChainRunner::run_by_id`].
    pub managers: Arc<ObjectManagers>,
}

/// Runs call chains step by step.
///
/// A failed or timed-out step ends the run; the returned records include
/// it. Autosaved reply parameters flow into the context of later steps.
pub struct ChainRunner<E, S, C>
where
    E: TransportExporter,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    services: RunnerServices<E, S>,
    clock: Arc<C>,
    polling: PollingPolicy,
    environment_id: Option<String>,
    system_id: Option<String>,
}

impl<E, S, C> ChainRunner<E, S, C>
where
    E: TransportExporter,
    S: SequenceSource,
    C: Clock + Send + Sync,
{
    /// Creates a runner with the default polling policy and no target
    /// environment.
    #[must_use]
    pub fn new(services: RunnerServices<E, S>, clock: Arc<C>) -> Self {
        Self {
            services,
            clock,
            polling: PollingPolicy::default(),
            environment_id: None,
            system_id: None,
        }
    }

    /// Replaces the polling policy.
    #[must_use]
    pub const fn with_polling(mut self, polling: PollingPolicy) -> Self {
        self.polling = polling;
        self
    }

    /// Sets the environment and system interceptors are matched against.
    #[must_use]
    pub fn with_target(
        mut self,
        environment_id: Option<String>,
        system_id: Option<String>,
    ) -> Self {
        self.environment_id = environment_id;
        self.system_id = system_id;
        self
    }

    /// Loads the chain `chain_id` and runs it.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::MissingChainManager`] or
    /// [`ExecutionError::ChainNotFound`] when the chain cannot be loaded,
    /// and the errors of [`Self::run`].
    pub async fn run_by_id(
        &self,
        chain_id: ObjectId,
        context: &InstanceContext,
    ) -> ExecutionResult<Vec<StepInstance>> {
        let manager = self
            .services
            .managers
            .manager::<CallChain>()?
            .ok_or(ExecutionError::MissingChainManager)?;
        let chain = manager
            .get(chain_id)
            .await?
            .ok_or(ExecutionError::ChainNotFound(chain_id))?;
        self.run(&chain, context).await
    }

    /// Runs every runnable step of `chain` under `context`.
    ///
    /// Step failures are recorded on the failing instance rather than
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Step`] when a failure cannot be recorded.
    pub async fn run(
        &self,
        chain: &CallChain,
        context: &InstanceContext,
    ) -> ExecutionResult<Vec<StepInstance>> {
        info!(chain_id = %chain.id(), chain = chain.name(), "running call chain");
        let mut executed = Vec::new();
        let mut carried = Map::new();

        for mut instance in CallChainStepIterator::new(chain, context) {
            for (key, value) in &carried {
                instance.context_mut().insert(key, Value::clone(value));
            }

            match self.execute(&mut instance).await {
                Ok(saved) => {
                    for parameter in saved.iter().filter(|parameter| parameter.is_autosave()) {
                        carried.insert(parameter.name().to_owned(), parameter.to_value());
                    }
                }
                Err(err) => {
                    error!(step_id = %instance.step_id(), error = %err, "step failed");
                    if instance.status() == StepStatus::InProgress {
                        instance.fail(err.to_string(), self.clock.as_ref())?;
                    }
                }
            }

            let halted = matches!(
                instance.status(),
                StepStatus::Failed | StepStatus::FailedByTimeout
            );
            executed.push(instance);
            if halted {
                warn!(chain_id = %chain.id(), "call chain halted");
                break;
            }
        }
        Ok(executed)
    }

    async fn execute(&self, instance: &mut StepInstance) -> ExecutionResult<Vec<MessageParameter>> {
        let StepTarget::Situation(Some(situation)) = instance.target().clone() else {
            return Ok(Vec::new());
        };
        let clock = self.clock.as_ref();
        instance.start(clock)?;

        if !self
            .services
            .conditions
            .is_applicable(instance.context(), instance.conditions())?
        {
            debug!(step_id = %instance.step_id(), "step conditions not met");
            instance.stop(clock)?;
            return Ok(Vec::new());
        }

        let transport = self.services.registry.find(situation.transport())?;
        transport
            .descriptor()
            .validate_properties(situation.transport_properties())
            .map_err(TransportError::from)?;

        loop {
            let outgoing = self.render(&situation, instance.context()).await?;
            instance.set_outgoing(outgoing.clone());

            let Some(reply) = self
                .exchange(transport.as_ref(), outgoing, instance.context())
                .await?
            else {
                warn!(
                    step_id = %instance.step_id(),
                    transport = situation.transport(),
                    "no reply before timeout"
                );
                instance.time_out(clock)?;
                return Ok(Vec::new());
            };

            let parameters = self.services.extractor.extract_all(
                situation.parsing_rules(),
                &reply,
                instance.context(),
            )?;
            MessageParameterExtractor::save_into(&parameters, instance.context_mut());
            instance.set_incoming(reply);

            if self
                .services
                .conditions
                .is_applicable(instance.context(), situation.validation())?
            {
                instance.finish(clock)?;
                return Ok(parameters);
            }
            if !instance.has_attempts_left() {
                instance.fail("reply validation failed", clock)?;
                return Ok(parameters);
            }
            let attempt = instance.next_attempt()?;
            debug!(step_id = %instance.step_id(), attempt, "retrying step");
        }
    }

    async fn render(
        &self,
        situation: &Situation,
        context: &InstanceContext,
    ) -> ExecutionResult<Message> {
        let templates = &self.services.templates;
        let mut message = Message::new(templates.resolve(situation.template(), context)?);
        for (name, template) in situation.headers() {
            message = message.with_header(name.clone(), templates.resolve(template, context)?);
        }
        Ok(self
            .services
            .interceptors
            .apply(
                situation.interceptors(),
                message,
                self.environment_id.as_deref(),
                self.system_id.as_deref(),
            )
            .await?)
    }

    async fn exchange(
        &self,
        transport: &dyn Transport,
        message: Message,
        context: &InstanceContext,
    ) -> ExecutionResult<Option<Message>> {
        if transport.mep().is_sync() {
            let reply = transport
                .send_receive_sync(message, context.project_id())
                .await?;
            return Ok(Some(reply));
        }

        let reporting_id = self.services.ids.generate_reporting_id().await?;
        let session_id = self.services.session_prefix.prefixed(reporting_id);
        transport
            .send(message, &session_id, context.project_uuid())
            .await?;
        let reply = self
            .services
            .sessions
            .wait_response(
                &session_id,
                self.polling.interval,
                self.polling.max_interval,
                self.polling.multiplier,
            )
            .await?;
        if reply.is_none() {
            self.services.sessions.remove(&session_id)?;
        }
        Ok(reply)
    }
}

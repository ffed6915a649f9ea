//! Immutable scripted data: situations, steps and call chains.

use crate::condition::ConditionParameter;
use crate::extraction::ParsingRule;
use crate::interceptor::InterceptorDescriptor;
use crate::persistence::{ObjectId, Storable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single scripted exchange with one transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    id: ObjectId,
    name: String,
    parent_id: Option<ObjectId>,
    transport: String,
    template: String,
    headers: BTreeMap<String, String>,
    transport_properties: BTreeMap<String, String>,
    parsing_rules: Vec<ParsingRule>,
    validation: Vec<ConditionParameter>,
    interceptors: Vec<InterceptorDescriptor>,
}

impl Situation {
    /// Creates a situation sending through the transport of type `transport`.
    #[must_use]
    pub fn new(id: ObjectId, name: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            transport: transport.into(),
            template: String::new(),
            headers: BTreeMap::new(),
            transport_properties: BTreeMap::new(),
            parsing_rules: Vec::new(),
            validation: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    /// Sets the owning object, typically the operation.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: ObjectId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets the outbound body template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Adds an outbound header template.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.headers.insert(name.into(), template.into());
        self
    }

    /// Sets a configured transport property.
    #[must_use]
    pub fn with_transport_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.transport_properties.insert(name.into(), value.into());
        self
    }

    /// Adds a rule applied to the reply.
    #[must_use]
    pub fn with_parsing_rule(mut self, rule: ParsingRule) -> Self {
        self.parsing_rules.push(rule);
        self
    }

    /// Adds a condition the reply must satisfy.
    #[must_use]
    pub fn with_validation(mut self, condition: ConditionParameter) -> Self {
        self.validation.push(condition);
        self
    }

    /// Adds an interceptor for outbound messages.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: InterceptorDescriptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the transport type name.
    #[must_use]
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Returns the outbound body template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the outbound header templates.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the configured transport properties.
    #[must_use]
    pub const fn transport_properties(&self) -> &BTreeMap<String, String> {
        &self.transport_properties
    }

    /// Returns the reply parsing rules.
    #[must_use]
    pub fn parsing_rules(&self) -> &[ParsingRule] {
        &self.parsing_rules
    }

    /// Returns the reply validation conditions.
    #[must_use]
    pub fn validation(&self) -> &[ConditionParameter] {
        &self.validation
    }

    /// Returns the outbound interceptors.
    #[must_use]
    pub fn interceptors(&self) -> &[InterceptorDescriptor] {
        &self.interceptors
    }
}

impl Storable for Situation {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn parent_id(&self) -> Option<ObjectId> {
        self.parent_id
    }
}

/// What a step runs. `None` marks a dangling reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum StepTarget {
    /// Runs a situation.
    Situation(Option<Situation>),
    /// Expands an embedded call chain in place.
    Chain(Option<CallChain>),
}

impl StepTarget {
    /// Returns whether the referenced object is present.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        match self {
            Self::Situation(situation) => situation.is_some(),
            Self::Chain(chain) => chain.is_some(),
        }
    }

    fn referenced_id(&self) -> Option<ObjectId> {
        match self {
            Self::Situation(situation) => situation.as_ref().map(Situation::id),
            Self::Chain(chain) => chain.as_ref().map(CallChain::id),
        }
    }
}

/// One entry of a call chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    id: ObjectId,
    name: String,
    enabled: bool,
    target: StepTarget,
    conditions: Vec<ConditionParameter>,
    max_attempts: u32,
}

impl Step {
    /// Creates an enabled step running `situation`.
    #[must_use]
    pub fn situation(id: ObjectId, name: impl Into<String>, situation: Option<Situation>) -> Self {
        Self::with_target(id, name, StepTarget::Situation(situation))
    }

    /// Creates an enabled step expanding the embedded `chain`.
    #[must_use]
    pub fn embedded(id: ObjectId, name: impl Into<String>, chain: Option<CallChain>) -> Self {
        Self::with_target(id, name, StepTarget::Chain(chain))
    }

    fn with_target(id: ObjectId, name: impl Into<String>, target: StepTarget) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            target,
            conditions: Vec::new(),
            max_attempts: 1,
        }
    }

    /// Disables the step.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Adds a condition gating the step.
    #[must_use]
    pub fn with_condition(mut self, condition: ConditionParameter) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Sets how often the step runs while its validation fails, at least once.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the step is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the step target.
    #[must_use]
    pub const fn target(&self) -> &StepTarget {
        &self.target
    }

    /// Returns the gating conditions.
    #[must_use]
    pub fn conditions(&self) -> &[ConditionParameter] {
        &self.conditions
    }

    /// Returns the attempt limit.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Ordered script of steps. Empty slots are administrative gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallChain {
    id: ObjectId,
    name: String,
    parent_id: Option<ObjectId>,
    steps: Vec<Option<Step>>,
}

impl CallChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            steps: Vec::new(),
        }
    }

    /// Sets the owning folder or project object.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: ObjectId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(Some(step));
        self
    }

    /// Appends an empty slot.
    #[must_use]
    pub fn with_gap(mut self) -> Self {
        self.steps.push(None);
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the step slots in declared order.
    #[must_use]
    pub fn steps(&self) -> &[Option<Step>] {
        &self.steps
    }
}

impl Storable for CallChain {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn parent_id(&self) -> Option<ObjectId> {
        self.parent_id
    }

    fn references(&self) -> Vec<ObjectId> {
        self.steps
            .iter()
            .flatten()
            .filter_map(|step| step.target.referenced_id())
            .collect()
    }
}

//! Interceptor descriptors and applicability rules.

use crate::persistence::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One environment/system pair an interceptor is scoped to.
///
/// Blank identifiers are treated as unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicabilityRule {
    #[serde(default)]
    environment_id: Option<String>,
    #[serde(default)]
    system_id: Option<String>,
}

impl ApplicabilityRule {
    /// Creates a rule from optional identifiers.
    #[must_use]
    pub fn new(environment_id: Option<&str>, system_id: Option<&str>) -> Self {
        Self {
            environment_id: environment_id.map(str::to_owned),
            system_id: system_id.map(str::to_owned),
        }
    }

    /// Returns whether the rule admits the given environment and system.
    ///
    /// | environment | system | applies when |
    /// |---|---|---|
    /// | blank | blank | never |
    /// | set | blank | environment matches |
    /// | blank | set | system matches |
    /// | set | set | both match |
    #[must_use]
    pub fn applies(&self, environment_id: Option<&str>, system_id: Option<&str>) -> bool {
        let rule_environment = non_blank(self.environment_id.as_deref());
        let rule_system = non_blank(self.system_id.as_deref());
        match (rule_environment, rule_system) {
            (None, None) => false,
            (Some(environment), None) => environment_id == Some(environment),
            (None, Some(system)) => system_id == Some(system),
            (Some(environment), Some(system)) => {
                environment_id == Some(environment) && system_id == Some(system)
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Declared interceptor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorDescriptor {
    id: ObjectId,
    name: String,
    type_name: String,
    order: u32,
    active: bool,
    #[serde(default)]
    rules: Vec<ApplicabilityRule>,
    #[serde(default)]
    parameters: BTreeMap<String, String>,
}

impl InterceptorDescriptor {
    /// Creates an active, always-applicable descriptor.
    #[must_use]
    pub fn new(
        id: ObjectId,
        name: impl Into<String>,
        type_name: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_name: type_name.into(),
            order,
            active: true,
            rules: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Adds an applicability rule.
    #[must_use]
    pub fn with_rule(mut self, rule: ApplicabilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a parameter handed to the implementation.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the implementation type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the ordering index.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Returns whether the interceptor is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the applicability rules.
    #[must_use]
    pub fn rules(&self) -> &[ApplicabilityRule] {
        &self.rules
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns whether the interceptor applies; no rules means always.
    #[must_use]
    pub fn is_applicable(&self, environment_id: Option<&str>, system_id: Option<&str>) -> bool {
        self.rules.is_empty()
            || self
                .rules
                .iter()
                .any(|rule| rule.applies(environment_id, system_id))
    }
}

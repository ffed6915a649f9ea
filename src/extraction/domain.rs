//! Parsing rules, extracted parameters and errors.

use crate::context::{InstanceContext, TemplateEngine, TemplateError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Extraction strategy a rule is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParsingKind {
    /// Regex over the message body.
    Regex,
    /// XPath over the body parsed as XML.
    Xpath,
    /// Regex over the request's URI parameters.
    RegexUri,
    /// JSONPath over the body parsed as JSON.
    JsonPath,
    /// Header lookup, optionally narrowed by a regex.
    RegexHeader,
}

impl ParsingKind {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "REGEX",
            Self::Xpath => "XPATH",
            Self::RegexUri => "REGEX_URI",
            Self::JsonPath => "JSON_PATH",
            Self::RegexHeader => "REGEX_HEADER",
        }
    }

    /// Returns where in the message the strategy looks.
    #[must_use]
    pub const fn location(self) -> &'static str {
        match self {
            Self::Regex | Self::Xpath | Self::JsonPath => "body",
            Self::RegexUri => "uri parameters",
            Self::RegexHeader => "headers",
        }
    }
}

impl fmt::Display for ParsingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative instruction producing one named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingRule {
    name: String,
    expression: String,
    #[serde(default)]
    resolved: Option<String>,
    kind: ParsingKind,
    #[serde(default)]
    multiple: bool,
    #[serde(default)]
    autosave: bool,
}

impl ParsingRule {
    /// Creates a single-value rule that is not saved to the context.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParsingKind, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            resolved: None,
            kind,
            multiple: false,
            autosave: false,
        }
    }

    /// Collects every match instead of the first.
    #[must_use]
    pub const fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Saves the extracted parameter into the run context.
    #[must_use]
    pub const fn autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Expands macros in the raw expression and stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the expression cannot be rendered.
    pub fn resolve(
        &mut self,
        context: &InstanceContext,
        templates: &TemplateEngine,
    ) -> Result<(), TemplateError> {
        self.resolved = Some(templates.resolve(&self.expression, context)?);
        Ok(())
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw expression.
    #[must_use]
    pub fn raw_expression(&self) -> &str {
        &self.expression
    }

    /// Returns the resolved expression, falling back to the raw one.
    #[must_use]
    pub fn expression(&self) -> &str {
        self.resolved.as_deref().unwrap_or(&self.expression)
    }

    /// Returns the strategy kind.
    #[must_use]
    pub const fn kind(&self) -> ParsingKind {
        self.kind
    }

    /// Returns whether every match is collected.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Returns whether the parameter is saved into the context.
    #[must_use]
    pub const fn is_autosave(&self) -> bool {
        self.autosave
    }
}

/// Named values extracted by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParameter {
    name: String,
    values: Vec<String>,
    multiple: bool,
    autosave: bool,
}

impl MessageParameter {
    /// Builds the parameter for `rule`, keeping only the first value unless
    /// the rule is multiple.
    #[must_use]
    pub fn for_rule(rule: &ParsingRule, mut values: Vec<String>) -> Self {
        if !rule.is_multiple() {
            values.truncate(1);
        }
        Self {
            name: rule.name().to_owned(),
            values,
            multiple: rule.is_multiple(),
            autosave: rule.is_autosave(),
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the extracted values in match order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns whether the parameter holds a list.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Returns whether the parameter is saved into the context.
    #[must_use]
    pub const fn is_autosave(&self) -> bool {
        self.autosave
    }

    /// Renders the parameter as a context value: a string for single
    /// parameters, an array for multiple ones.
    #[must_use]
    pub fn to_value(&self) -> Value {
        if self.multiple {
            Value::Array(self.values.iter().cloned().map(Value::String).collect())
        } else {
            Value::String(self.first().unwrap_or_default().to_owned())
        }
    }
}

/// Errors raised while extracting parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The rule's expression is malformed for its strategy.
    #[error("parsing rule '{rule}' has an invalid expression for {location}: {reason}")]
    InvalidExpression {
        /// Rule name.
        rule: String,
        /// Part of the message the rule targets.
        location: &'static str,
        /// Failure reason.
        reason: String,
    },

    /// The rule's expression could not be resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ExtractionError {
    pub(crate) fn invalid(rule: &ParsingRule, reason: impl fmt::Display) -> Self {
        Self::InvalidExpression {
            rule: rule.name().to_owned(),
            location: rule.kind().location(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for extraction.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

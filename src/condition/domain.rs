//! Condition model and errors.

use crate::context::TemplateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Test applied to a context key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionKind {
    /// The key is present.
    Exists,
    /// The key is absent.
    NotExists,
    /// String equality with the resolved value.
    Equals,
    /// String inequality with the resolved value.
    NotEquals,
    /// The actual value fully matches the resolved value as a regex.
    Matches,
    /// The actual value does not fully match the resolved regex.
    NotMatches,
    /// Numeric `actual < expected`.
    Less,
    /// Numeric `actual > expected`.
    Greater,
}

impl ConditionKind {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "EXISTS",
            Self::NotExists => "NOTEXISTS",
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOTEQUALS",
            Self::Matches => "MATCHES",
            Self::NotMatches => "NOTMATCHES",
            Self::Less => "LESS",
            Self::Greater => "GREATER",
        }
    }

    /// Returns whether the kind only tests key presence.
    #[must_use]
    pub const fn is_presence_check(self) -> bool {
        matches!(self, Self::Exists | Self::NotExists)
    }
}

impl TryFrom<&str> for ConditionKind {
    type Error = ConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "EXISTS" => Ok(Self::Exists),
            "NOTEXISTS" => Ok(Self::NotExists),
            "EQUALS" => Ok(Self::Equals),
            "NOTEQUALS" => Ok(Self::NotEquals),
            "MATCHES" => Ok(Self::Matches),
            "NOTMATCHES" => Ok(Self::NotMatches),
            "LESS" => Ok(Self::Less),
            "GREATER" => Ok(Self::Greater),
            _ => Err(ConditionError::UnknownKind(value.to_owned())),
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean operator joining a condition to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl Combinator {
    /// Applies the operator.
    #[must_use]
    pub const fn combine(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
        }
    }
}

impl TryFrom<&str> for Combinator {
    type Error = ConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(ConditionError::UnknownCombinator(value.to_owned())),
        }
    }
}

/// One entry of a condition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionParameter {
    name: String,
    kind: ConditionKind,
    #[serde(default)]
    value: String,
    #[serde(default)]
    combinator: Option<Combinator>,
    #[serde(default)]
    order: u32,
}

impl ConditionParameter {
    /// Creates a condition on the context key `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ConditionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: String::new(),
            combinator: None,
            order: 0,
        }
    }

    /// Sets the comparison value; it may contain macro expressions.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the combinator joining this condition to the next.
    #[must_use]
    pub const fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = Some(combinator);
        self
    }

    /// Sets the position of the condition within its list.
    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Returns the context key under test.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the condition kind.
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Returns the raw comparison value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the combinator.
    #[must_use]
    pub const fn combinator(&self) -> Option<Combinator> {
        self.combinator
    }

    /// Returns the order index.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }
}

/// Errors raised while evaluating a condition list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConditionError {
    /// A non-terminal condition carries no combinator.
    #[error(
        "condition '{name}' at order {order} has no combinator but is followed by another condition"
    )]
    MissingCombinator {
        /// Context key of the offending condition.
        name: String,
        /// Order index of the offending condition.
        order: u32,
    },

    /// A MATCHES or NOTMATCHES value is not a valid regex.
    #[error("condition '{name}' has invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Context key of the offending condition.
        name: String,
        /// Resolved pattern.
        pattern: String,
        /// Compiler failure reason.
        reason: String,
    },

    /// The comparison value could not be resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Unrecognized condition kind name.
    #[error("unknown condition kind '{0}'")]
    UnknownKind(String),

    /// Unrecognized combinator name.
    #[error("unknown condition combinator '{0}'")]
    UnknownCombinator(String),
}

/// Result type for condition evaluation.
pub type ConditionResult<T> = Result<T, ConditionError>;

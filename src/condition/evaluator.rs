//! Condition list evaluation over an [`InstanceContext`].

use super::domain::{Combinator, ConditionError, ConditionKind, ConditionParameter, ConditionResult};
use crate::context::{InstanceContext, TemplateEngine};
use crate::persistence::{LEGACY_CONDITIONS_SETTING, ProjectSettings};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::error;

/// Evaluates condition lists against a run's context.
#[derive(Clone)]
pub struct ConditionEvaluator {
    settings: Arc<dyn ProjectSettings>,
    templates: Arc<TemplateEngine>,
}

impl ConditionEvaluator {
    /// Creates an evaluator reading the legacy switch from `settings`.
    #[must_use]
    pub const fn new(settings: Arc<dyn ProjectSettings>, templates: Arc<TemplateEngine>) -> Self {
        Self {
            settings,
            templates,
        }
    }

    /// Returns whether `conditions` hold for `context`.
    ///
    /// Conditions are taken in ascending order index. An empty list is
    /// always applicable.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::MissingCombinator`] when a condition other
    /// than the last has no combinator, and pattern or macro errors raised
    /// by individual conditions.
    pub fn is_applicable(
        &self,
        context: &InstanceContext,
        conditions: &[ConditionParameter],
    ) -> ConditionResult<bool> {
        let mut ordered: Vec<&ConditionParameter> = conditions.iter().collect();
        ordered.sort_by_key(|condition| condition.order());

        let Some(first) = ordered.first() else {
            return Ok(true);
        };
        let mut result = self.evaluate(context, first)?;

        for (offset, pair) in ordered.windows(2).enumerate() {
            let [previous, current] = pair else {
                continue;
            };
            let combinator = previous.combinator().ok_or_else(|| {
                error!(
                    condition = previous.name(),
                    order = previous.order(),
                    "condition is missing its combinator"
                );
                ConditionError::MissingCombinator {
                    name: previous.name().to_owned(),
                    order: previous.order(),
                }
            })?;

            let or_ahead = ordered
                .get(offset..)
                .unwrap_or_default()
                .iter()
                .any(|condition| condition.combinator() == Some(Combinator::Or));
            if !result && !or_ahead {
                return Ok(false);
            }

            let outcome = self.evaluate(context, current)?;
            result = combinator.combine(result, outcome);
        }
        Ok(result)
    }

    fn evaluate(
        &self,
        context: &InstanceContext,
        condition: &ConditionParameter,
    ) -> ConditionResult<bool> {
        let kind = condition.kind();
        match kind {
            ConditionKind::Exists => return Ok(context.contains(condition.name())),
            ConditionKind::NotExists => return Ok(!context.contains(condition.name())),
            _ => {}
        }

        let Some(actual) = context.get_string(condition.name()) else {
            return Ok(self.missing_key_outcome(context, kind));
        };
        let expected = self.templates.resolve(condition.value(), context)?;

        let outcome = match kind {
            ConditionKind::Equals => actual == expected,
            ConditionKind::NotEquals => actual != expected,
            ConditionKind::Matches => full_match(condition, &expected, &actual)?,
            ConditionKind::NotMatches => !full_match(condition, &expected, &actual)?,
            ConditionKind::Less => compare_numbers(&actual, &expected) == Some(Ordering::Less),
            ConditionKind::Greater => {
                compare_numbers(&actual, &expected) == Some(Ordering::Greater)
            }
            ConditionKind::Exists | ConditionKind::NotExists => false,
        };
        Ok(outcome)
    }

    fn missing_key_outcome(&self, context: &InstanceContext, kind: ConditionKind) -> bool {
        let legacy = context
            .project_id()
            .is_some_and(|project| self.settings.get_bool(project, LEGACY_CONDITIONS_SETTING));
        legacy && matches!(kind, ConditionKind::NotEquals | ConditionKind::NotMatches)
    }
}

fn full_match(
    condition: &ConditionParameter,
    pattern: &str,
    actual: &str,
) -> ConditionResult<bool> {
    let anchored = format!("^(?:{pattern})$");
    let regex = Regex::new(&anchored).map_err(|err| ConditionError::InvalidPattern {
        name: condition.name().to_owned(),
        pattern: pattern.to_owned(),
        reason: err.to_string(),
    })?;
    Ok(regex.is_match(actual))
}

fn compare_numbers(actual: &str, expected: &str) -> Option<Ordering> {
    let left = actual.trim().parse::<f64>().ok()?;
    let right = expected.trim().parse::<f64>().ok()?;
    left.partial_cmp(&right)
}

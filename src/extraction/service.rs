//! Rule dispatch and context saving.

use super::domain::{ExtractionResult, MessageParameter, ParsingKind, ParsingRule};
use super::strategies::{
    ExtractionStrategy, JsonPathStrategy, RegexHeaderStrategy, RegexStrategy, RegexUriStrategy,
    XpathStrategy,
};
use crate::config::ExtractionConfig;
use crate::context::{InstanceContext, TemplateEngine};
use crate::message::Message;
use std::sync::Arc;
use tracing::debug;

/// Turns messages into named parameters.
#[derive(Debug, Clone)]
pub struct MessageParameterExtractor {
    config: ExtractionConfig,
    templates: Arc<TemplateEngine>,
}

impl MessageParameterExtractor {
    /// Creates an extractor.
    #[must_use]
    pub const fn new(config: ExtractionConfig, templates: Arc<TemplateEngine>) -> Self {
        Self { config, templates }
    }

    /// Applies one rule to `message`.
    ///
    /// Macros in the rule's expression are resolved against `context` first.
    ///
    /// # Errors
    ///
    /// Returns [`super::ExtractionError::InvalidExpression`] when the
    /// expression is malformed for its strategy, and
    /// [`super::ExtractionError::Template`] when macro resolution fails.
    pub fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        context: &InstanceContext,
    ) -> ExtractionResult<MessageParameter> {
        let mut resolved = rule.clone();
        resolved.resolve(context, &self.templates)?;

        let values = strategy_for(resolved.kind()).extract(&resolved, message, &self.config)?;
        let parameter = MessageParameter::for_rule(&resolved, values);
        debug!(
            rule = parameter.name(),
            kind = %resolved.kind(),
            values = parameter.values().len(),
            "extracted message parameter"
        );
        Ok(parameter)
    }

    /// Applies every rule in order.
    ///
    /// # Errors
    ///
    /// Returns the first rule failure; see [`Self::extract`].
    pub fn extract_all(
        &self,
        rules: &[ParsingRule],
        message: &Message,
        context: &InstanceContext,
    ) -> ExtractionResult<Vec<MessageParameter>> {
        rules
            .iter()
            .map(|rule| self.extract(rule, message, context))
            .collect()
    }

    /// Writes every autosave parameter into `context` under its name.
    pub fn save_into(parameters: &[MessageParameter], context: &mut InstanceContext) {
        for parameter in parameters.iter().filter(|parameter| parameter.is_autosave()) {
            context.insert(parameter.name(), parameter.to_value());
        }
    }
}

fn strategy_for(kind: ParsingKind) -> &'static dyn ExtractionStrategy {
    match kind {
        ParsingKind::Regex => &RegexStrategy,
        ParsingKind::Xpath => &XpathStrategy,
        ParsingKind::RegexUri => &RegexUriStrategy,
        ParsingKind::JsonPath => &JsonPathStrategy,
        ParsingKind::RegexHeader => &RegexHeaderStrategy,
    }
}

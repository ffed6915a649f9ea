//! Regex matching over the request's URI parameters.

use super::{ExtractionStrategy, regex_body};
use crate::config::ExtractionConfig;
use crate::context::value_to_string;
use crate::extraction::domain::{ExtractionResult, ParsingRule};
use crate::message::{Message, URI_PARAMETERS_PROPERTY};

pub(in crate::extraction) struct RegexUriStrategy;

impl ExtractionStrategy for RegexUriStrategy {
    fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        config: &ExtractionConfig,
    ) -> ExtractionResult<Vec<String>> {
        let compiled = regex_body::compile(rule, rule.expression(), config)?;
        let Some(parameters) = message.connection_property(URI_PARAMETERS_PROPERTY) else {
            return Ok(Vec::new());
        };
        let haystack = value_to_string(parameters);
        Ok(regex_body::collect_matches(
            &compiled,
            &haystack,
            rule.is_multiple(),
        ))
    }
}

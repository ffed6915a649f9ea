//! Regex matching over the message body, plus the helpers shared by the
//! other regex-based strategies.

use super::ExtractionStrategy;
use crate::config::ExtractionConfig;
use crate::extraction::domain::{ExtractionError, ExtractionResult, ParsingRule};
use crate::message::Message;
use regex::{Regex, RegexBuilder};

pub(in crate::extraction) struct RegexStrategy;

impl ExtractionStrategy for RegexStrategy {
    fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        config: &ExtractionConfig,
    ) -> ExtractionResult<Vec<String>> {
        let regex = compile(rule, rule.expression(), config)?;
        Ok(collect_matches(&regex, message.body(), rule.is_multiple()))
    }
}

/// Compiles `pattern` under the configured size limit.
pub(super) fn compile(
    rule: &ParsingRule,
    pattern: &str,
    config: &ExtractionConfig,
) -> ExtractionResult<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(config.regex_size_limit)
        .build()
        .map_err(|err| ExtractionError::invalid(rule, err))
}

/// Emits capture group 1 when the pattern has one, else the whole match.
pub(super) fn collect_matches(regex: &Regex, haystack: &str, multiple: bool) -> Vec<String> {
    let group = usize::from(regex.captures_len() > 1);
    let mut values = Vec::new();
    for captures in regex.captures_iter(haystack) {
        if let Some(found) = captures.get(group) {
            values.push(found.as_str().to_owned());
            if !multiple {
                break;
            }
        }
    }
    values
}

//! Header lookup with an optional narrowing regex.
//!
//! Expressions take the form `name` or `name/regex`. The name `*` renders
//! every non-internal header as a `name=value` line.

use super::{ExtractionStrategy, regex_body};
use crate::config::ExtractionConfig;
use crate::extraction::domain::{ExtractionResult, ParsingRule};
use crate::message::Message;

const ALL_HEADERS: &str = "*";

pub(in crate::extraction) struct RegexHeaderStrategy;

impl ExtractionStrategy for RegexHeaderStrategy {
    fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        config: &ExtractionConfig,
    ) -> ExtractionResult<Vec<String>> {
        let expression = rule.expression();
        let (name, pattern) = match expression.split_once('/') {
            Some((header, regex_text)) => (header.trim(), Some(regex_text)),
            None => (expression.trim(), None),
        };
        let compiled = pattern
            .map(|raw| regex_body::compile(rule, raw, config))
            .transpose()?;

        let candidates = if name == ALL_HEADERS {
            vec![all_headers(message)]
        } else {
            message
                .header(name)
                .map(|value| value.values().into_iter().map(str::to_owned).collect())
                .unwrap_or_default()
        };

        let mut values = Vec::new();
        for candidate in candidates {
            match &compiled {
                Some(matcher) => {
                    values.extend(regex_body::collect_matches(
                        matcher,
                        &candidate,
                        rule.is_multiple(),
                    ));
                }
                None => values.push(candidate),
            }
            if !rule.is_multiple() && !values.is_empty() {
                break;
            }
        }
        Ok(values)
    }
}

fn all_headers(message: &Message) -> String {
    message
        .headers()
        .iter()
        .filter(|(name, _)| !Message::is_internal_header(name))
        .map(|(name, value)| format!("{name}={}", value.joined()))
        .collect::<Vec<_>>()
        .join("\n")
}

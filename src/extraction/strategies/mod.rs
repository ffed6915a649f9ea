//! Per-kind extraction strategies.

mod json_path;
mod regex_body;
mod regex_header;
mod regex_uri;
mod xpath;

pub(super) use json_path::JsonPathStrategy;
pub(super) use regex_body::RegexStrategy;
pub(super) use regex_header::RegexHeaderStrategy;
pub(super) use regex_uri::RegexUriStrategy;
pub(super) use xpath::XpathStrategy;

use super::domain::{ExtractionResult, ParsingRule};
use crate::config::ExtractionConfig;
use crate::message::Message;

/// One way of turning a message into parameter values.
pub(super) trait ExtractionStrategy: Send + Sync {
    /// Returns the values `rule` yields for `message`, in match order.
    ///
    /// Strategies may return more values than the rule keeps; single-value
    /// rules stop early where matching is lazy.
    fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        config: &ExtractionConfig,
    ) -> ExtractionResult<Vec<String>>;
}

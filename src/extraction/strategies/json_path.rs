//! JSONPath queries over the message body.

use super::ExtractionStrategy;
use crate::config::ExtractionConfig;
use crate::context::value_to_string;
use crate::extraction::domain::{ExtractionError, ExtractionResult, ParsingRule};
use crate::message::Message;
use serde_json::Value;
use serde_json_path::JsonPath;

pub(in crate::extraction) struct JsonPathStrategy;

impl ExtractionStrategy for JsonPathStrategy {
    fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        _config: &ExtractionConfig,
    ) -> ExtractionResult<Vec<String>> {
        let path =
            JsonPath::parse(rule.expression()).map_err(|err| ExtractionError::invalid(rule, err))?;
        let Ok(document) = serde_json::from_str::<Value>(message.body()) else {
            return Ok(Vec::new());
        };

        let values = path
            .query(&document)
            .all()
            .into_iter()
            .flat_map(|node| match node {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .filter(|value| !value.is_null())
            .map(value_to_string)
            .collect();
        Ok(values)
    }
}

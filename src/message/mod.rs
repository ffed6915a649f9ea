//! Messages exchanged with virtualized systems.
//!
//! A [`Message`] carries a textual body, transport headers (single or
//! list-valued) and the connection properties a transport used or needs to
//! deliver it. Transports, interceptors and parsing rules all operate on
//! this one type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Header name prefix reserved for engine-internal bookkeeping headers.
pub const INTERNAL_HEADER_PREFIX: &str = "__";

/// Connection property holding the URI parameters of an inbound request.
pub const URI_PARAMETERS_PROPERTY: &str = "uri_parameters";

/// Value of a single message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Header with exactly one value.
    Single(String),
    /// Header repeated with several values, in arrival order.
    List(Vec<String>),
}

impl HeaderValue {
    /// Returns all values in order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::List(values) => values.first().map(String::as_str),
        }
    }

    /// Renders the header value the way it is serialized on the wire.
    #[must_use]
    pub fn joined(&self) -> String {
        self.values().join(",")
    }
}

/// A message travelling through the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    body: String,
    #[serde(default)]
    headers: BTreeMap<String, HeaderValue>,
    #[serde(default)]
    connection_properties: BTreeMap<String, Value>,
}

impl Message {
    /// Creates a message with the given body and no headers.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: BTreeMap::new(),
            connection_properties: BTreeMap::new(),
        }
    }

    /// Adds or replaces a single-valued header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into(), HeaderValue::Single(value.into()));
        self
    }

    /// Adds or replaces a list-valued header.
    #[must_use]
    pub fn with_list_header(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.headers.insert(
            name.into(),
            HeaderValue::List(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Adds or replaces a connection property.
    #[must_use]
    pub fn with_connection_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.connection_properties.insert(name.into(), value);
        self
    }

    /// Returns the message body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replaces the message body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Returns all headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, HeaderValue> {
        &self.headers
    }

    /// Returns a header by exact name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Returns all connection properties.
    #[must_use]
    pub const fn connection_properties(&self) -> &BTreeMap<String, Value> {
        &self.connection_properties
    }

    /// Returns a connection property by name.
    #[must_use]
    pub fn connection_property(&self, name: &str) -> Option<&Value> {
        self.connection_properties.get(name)
    }

    /// Merges connection properties, overwriting existing keys.
    pub fn extend_connection_properties(
        &mut self,
        properties: impl IntoIterator<Item = (String, Value)>,
    ) {
        self.connection_properties.extend(properties);
    }

    /// Returns whether a header name is reserved for engine bookkeeping.
    #[must_use]
    pub fn is_internal_header(name: &str) -> bool {
        name.starts_with(INTERNAL_HEADER_PREFIX)
    }
}

//! Named parameters mined out of messages by declarative parsing rules.
//!
//! A [`ParsingRule`] names one strategy (regex over the body, XPath, regex
//! over URI parameters, JSONPath, or headers). The
//! [`MessageParameterExtractor`] dispatches each rule to its strategy and
//! returns a [`MessageParameter`] holding one value, or every value when the
//! rule asks for multiple. No match is never an error: the parameter is
//! simply empty.

mod domain;
mod service;
mod strategies;

pub use domain::{ExtractionError, ExtractionResult, MessageParameter, ParsingKind, ParsingRule};
pub use service::MessageParameterExtractor;

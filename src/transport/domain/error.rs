//! Error types for transport domain values.

use thiserror::Error;

/// Errors raised while validating transport configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportDomainError {
    /// A mandatory property has neither a value nor a default.
    #[error("transport '{transport}' is missing mandatory property '{property}'")]
    MissingMandatoryProperty {
        /// Transport type name.
        transport: String,
        /// Property name.
        property: String,
    },

    /// Unrecognized exchange pattern name.
    #[error("unknown message exchange pattern '{0}'")]
    UnknownMep(String),

    /// Unrecognized lifecycle state name.
    #[error("unknown transport state '{0}'")]
    UnknownState(String),

    /// Transport type names must not be blank.
    #[error("transport type name must not be empty")]
    EmptyTypeName,
}

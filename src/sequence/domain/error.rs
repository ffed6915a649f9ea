//! Error types for sequence domain values.

use thiserror::Error;

/// Errors raised while constructing or advancing sequence values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequenceDomainError {
    /// Counter owner-sets must name at least one key.
    #[error("counter owner-set must not be empty")]
    EmptyOwnerSet,

    /// Owner keys must not contain the canonical separator `,`.
    #[error("owner key '{0}' must not contain ','")]
    InvalidOwnerKey(String),

    /// Only two- and three-digit counter formats are supported.
    #[error("unsupported counter format '{0}': expected a width of 2 or 3")]
    UnsupportedFormat(String),

    /// The next index does not fit the format width.
    #[error("counter for [{owners}] exhausted: index {attempted} exceeds maximum {max}")]
    CounterExhausted {
        /// Canonical owner-set rendering.
        owners: String,
        /// Index that was requested.
        attempted: u32,
        /// Largest index the format can render.
        max: u32,
    },

    /// Identifier prefixes are exactly three ASCII alphanumerics.
    #[error("invalid identifier prefix '{0}': expected 3 ASCII alphanumeric characters")]
    InvalidPrefix(String),

    /// A prefixed value is shorter than the prefix itself.
    #[error("value '{0}' is too short to carry an identifier prefix")]
    ValueTooShort(String),
}

//! Prefixed identifier rendering and parsing.

use super::SequenceResult;
use crate::persistence::ObjectId;
use crate::sequence::domain::{IdPrefix, PREFIX_LEN, SequenceDomainError};

/// Renders identifiers behind a fixed three-character prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixGenerator {
    prefix: IdPrefix,
}

impl PrefixGenerator {
    /// Creates a generator for the given prefix.
    #[must_use]
    pub const fn new(prefix: IdPrefix) -> Self {
        Self { prefix }
    }

    /// Returns the prefix.
    #[must_use]
    pub const fn prefix(&self) -> &IdPrefix {
        &self.prefix
    }

    /// Renders `id` with the prefix prepended.
    #[must_use]
    pub fn prefixed(&self, id: ObjectId) -> String {
        format!("{}{id}", self.prefix)
    }

    /// Strips the leading prefix from `value`.
    ///
    /// Exactly [`PREFIX_LEN`] characters are removed whatever they are.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::ValueTooShort`] when `value` has fewer
    /// than [`PREFIX_LEN`] characters.
    pub fn remove_prefix(value: &str) -> SequenceResult<&str> {
        if value.chars().count() == PREFIX_LEN {
            return Ok("");
        }
        let (offset, _) = value
            .char_indices()
            .nth(PREFIX_LEN)
            .ok_or_else(|| SequenceDomainError::ValueTooShort(value.to_owned()))?;
        Ok(value.get(offset..).unwrap_or_default())
    }
}

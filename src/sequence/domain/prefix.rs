//! Fixed-width identifier prefixes.

use super::SequenceDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters every identifier prefix occupies.
///
/// Prefix removal strips exactly this many characters; prefixes of any
/// other width are rejected at construction.
pub const PREFIX_LEN: usize = 3;

/// Validated identifier prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Validates a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceDomainError::InvalidPrefix`] unless the value is
    /// exactly [`PREFIX_LEN`] ASCII alphanumeric characters.
    pub fn new(value: impl Into<String>) -> Result<Self, SequenceDomainError> {
        let raw = value.into();
        let valid = raw.len() == PREFIX_LEN && raw.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(SequenceDomainError::InvalidPrefix(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the prefix text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdPrefix {
    type Error = SequenceDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdPrefix> for String {
    fn from(value: IdPrefix) -> Self {
        value.0
    }
}

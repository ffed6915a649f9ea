//! Domain model for identifier pools and sequence counters.

mod counter;
mod error;
mod prefix;

pub use counter::{Counter, CounterFormat, OwnerSet};
pub use error::SequenceDomainError;
pub use prefix::{IdPrefix, PREFIX_LEN};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier pool an object identifier is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    /// Configuration objects (situations, chains, transports).
    Configuration,
    /// Reporting objects (run records, step instances).
    Reporting,
}

impl IdKind {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Reporting => "reporting",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Step execution status.

use super::StepDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a step instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Created by the iterator, not run yet.
    #[default]
    NotStarted,
    /// Running.
    InProgress,
    /// Completed and validated.
    Passed,
    /// Completed with a failure.
    Failed,
    /// Stopped before completion.
    Stopped,
    /// No reply arrived in time.
    FailedByTimeout,
}

impl StepStatus {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
            Self::FailedByTimeout => "FAILED_BY_TIMEOUT",
        }
    }

    /// Returns whether the status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Failed | Self::Stopped | Self::FailedByTimeout
        )
    }

    /// Returns whether a step may move from `self` to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::NotStarted, Self::InProgress | Self::Stopped)
                | (
                    Self::InProgress,
                    Self::Passed | Self::Failed | Self::Stopped | Self::FailedByTimeout
                )
        )
    }
}

impl TryFrom<&str> for StepStatus {
    type Error = StepDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "NOT_STARTED" => Ok(Self::NotStarted),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "PASSED" => Ok(Self::Passed),
            "FAILED" => Ok(Self::Failed),
            "STOPPED" => Ok(Self::Stopped),
            "FAILED_BY_TIMEOUT" => Ok(Self::FailedByTimeout),
            _ => Err(StepDomainError::UnknownStatus(value.to_owned())),
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/*!
 * Core Types
 * Common types used across the crate
 */

use serde::{Deserialize, Serialize};

/// Common result type for signal operations
pub type SignalResult<T> = Result<T, super::errors::SignalError>;

/// Common result type for harness operations
pub type HarnessResult<T> = Result<T, super::errors::HarnessError>;

/// Outcome of a `complete` call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// This call moved the signal from pending to completed
    Completed,
    /// The signal was already completed; nothing changed
    Ignored,
}

impl Completion {
    #[inline]
    pub fn is_first(&self) -> bool {
        matches!(self, Completion::Completed)
    }
}

/// What to do when a completed signal is completed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first payload and report `Completion::Ignored`
    #[default]
    Ignore,
    /// Keep the first payload and fail with `SignalError::AlreadyCompleted`
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Reject => "reject",
        }
    }

    /// Parse a policy name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

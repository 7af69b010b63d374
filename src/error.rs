//! Construction-time errors
//!
//! Nothing inside a running simulation fails: degenerate contacts, unpaid
//! dues and no-op queen checks are all handled locally. Only bad setup is
//! rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of its valid range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Matches are played by 2, 3 or 4 players.
    #[error("unsupported player count {0} (expected 2-4)")]
    PlayerCount(usize),

    /// Config or settings JSON could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

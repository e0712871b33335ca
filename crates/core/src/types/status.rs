//! Account flow statuses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a password reset request.
///
/// A successful reset carries whatever status string the backend returned.
/// Any failure collapses to [`PasswordResetStatus::Error`], which renders as
/// the literal `"error"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PasswordResetStatus {
    /// Status string reported by the backend.
    Backend(String),
    /// The reset request failed.
    Error,
}

impl PasswordResetStatus {
    /// Literal used for a failed reset.
    pub const ERROR: &'static str = "error";

    /// The status as the UI sees it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Backend(status) => status,
            Self::Error => Self::ERROR,
        }
    }

    /// Whether the reset failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for PasswordResetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PasswordResetStatus {
    fn from(status: String) -> Self {
        if status == Self::ERROR {
            Self::Error
        } else {
            Self::Backend(status)
        }
    }
}

impl From<PasswordResetStatus> for String {
    fn from(status: PasswordResetStatus) -> Self {
        match status {
            PasswordResetStatus::Backend(status) => status,
            PasswordResetStatus::Error => PasswordResetStatus::ERROR.to_string(),
        }
    }
}

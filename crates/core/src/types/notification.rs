//! User-facing notifications.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A transient message surfaced to the user. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// How the UI should style the message.
    pub severity: NotificationSeverity,
    /// The message text.
    pub message: String,
}

impl Notification {
    /// Create a notification.
    #[must_use]
    pub fn new(severity: NotificationSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Create an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationSeverity::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notification() {
        let n = Notification::error("Invalid login");
        assert_eq!(n.severity, NotificationSeverity::Error);
        assert_eq!(n.message, "Invalid login");
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(NotificationSeverity::Error.to_string(), "error");
        assert_eq!(NotificationSeverity::default().to_string(), "info");
    }
}

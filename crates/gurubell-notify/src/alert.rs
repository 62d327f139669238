//! Desktop alert model.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// How insistently the desktop should present an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Regular informational alert
    Normal,
    /// Stays on screen and may bypass do-not-disturb
    Critical,
}

/// Buttons offered on the token-expired alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    /// Focus the app and open the token editor
    UpdateTokenNow,
    /// Snooze reminders for half an hour
    RemindMeLater,
}

impl AlertAction {
    /// Button label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UpdateTokenNow => "Update Token Now",
            Self::RemindMeLater => "Remind Me Later",
        }
    }
}

/// What triggered an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// New jobs appeared in the feed
    NewJobs,
    /// The credential was rejected
    TokenExpired,
    /// The credential is still expired
    TokenReminder,
    /// A new credential was saved
    TokenSaved,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NewJobs => "new_jobs",
            Self::TokenExpired => "token_expired",
            Self::TokenReminder => "token_reminder",
            Self::TokenSaved => "token_saved",
        };
        f.write_str(name)
    }
}

/// When an alert closes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTimeout {
    /// Stays until the user interacts with it
    Never,
    /// Closes after the given delay
    After(Duration),
}

/// A fully rendered desktop alert, ready for a [`NotificationSink`].
///
/// [`NotificationSink`]: crate::NotificationSink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopAlert {
    /// What triggered the alert
    pub kind: AlertKind,
    /// Headline
    pub title: String,
    /// Body text, may span several lines
    pub body: String,
    /// Presentation urgency
    pub urgency: Urgency,
    /// Auto-dismiss behavior
    pub timeout: AlertTimeout,
    /// Play the platform sound
    pub sound: bool,
    /// Buttons, in display order
    pub actions: Vec<AlertAction>,
}

impl DesktopAlert {
    /// Normal-urgency alert without actions that closes after `timeout`.
    #[must_use]
    pub fn transient(
        kind: AlertKind,
        title: impl Into<String>,
        body: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            urgency: Urgency::Normal,
            timeout: AlertTimeout::After(timeout),
            sound: true,
            actions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        assert_eq!(AlertAction::UpdateTokenNow.label(), "Update Token Now");
        assert_eq!(AlertAction::RemindMeLater.label(), "Remind Me Later");
    }

    #[test]
    fn test_transient_defaults() {
        let alert = DesktopAlert::transient(
            AlertKind::TokenSaved,
            "Saved",
            "Token saved",
            Duration::from_secs(5),
        );
        assert_eq!(alert.urgency, Urgency::Normal);
        assert_eq!(alert.timeout, AlertTimeout::After(Duration::from_secs(5)));
        assert!(alert.actions.is_empty());
        assert_eq!(alert.kind.to_string(), "token_saved");
    }
}

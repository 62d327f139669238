//! Alert sinks.

use crate::alert::{AlertTimeout, DesktopAlert, Urgency};
use thiserror::Error;

/// Failure to show an alert.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The platform has no notification service
    #[error("desktop notifications are not supported on this system")]
    Unsupported,

    /// The notification service refused the alert
    #[error("failed to deliver notification: {0}")]
    Delivery(String),
}

/// Something that can put an alert in front of the user.
///
/// Implementations must not block for long; they are called from the event
/// pump between scheduler events.
pub trait NotificationSink: Send + Sync {
    /// Whether alerts can be shown at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Show one alert.
    fn show(&self, alert: &DesktopAlert) -> Result<(), NotifyError>;
}

/// Headless sink that writes every alert to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn show(&self, alert: &DesktopAlert) -> Result<(), NotifyError> {
        let timeout_secs = match alert.timeout {
            AlertTimeout::Never => None,
            AlertTimeout::After(delay) => Some(delay.as_secs()),
        };
        let actions: Vec<&str> = alert.actions.iter().map(|a| a.label()).collect();

        match alert.urgency {
            Urgency::Critical => tracing::warn!(
                target: "gurubell::alert",
                kind = %alert.kind,
                ?timeout_secs,
                ?actions,
                "{}: {}",
                alert.title,
                alert.body
            ),
            Urgency::Normal => tracing::info!(
                target: "gurubell::alert",
                kind = %alert.kind,
                ?timeout_secs,
                sound = alert.sound,
                "{}: {}",
                alert.title,
                alert.body
            ),
        }
        Ok(())
    }
}

//! Turns watch events into desktop alerts.
//!
//! Delivery is best effort: a failing sink is logged and otherwise ignored,
//! so notification problems never reach the scheduler.

use crate::alert::{AlertAction, AlertKind, AlertTimeout, DesktopAlert, Urgency};
use crate::sink::{NotificationSink, NotifyError};
use gurubell_core::{
    NewJobsPayload, NotificationPreferences, NotificationsConfig, TokenReminderPayload, WatchEvent,
};
use std::sync::Arc;
use std::time::Duration;

/// Auto-dismiss delays of the transient alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSettings {
    /// New-jobs alert
    pub job_alert_timeout: Duration,
    /// Token-saved confirmation
    pub token_saved_timeout: Duration,
    /// Expired-token reminder
    pub reminder_timeout: Duration,
}

impl AlertSettings {
    /// Read delays from the `[notifications]` config section.
    #[must_use]
    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self {
            job_alert_timeout: Duration::from_secs(config.job_alert_timeout_secs),
            token_saved_timeout: Duration::from_secs(config.token_saved_timeout_secs),
            reminder_timeout: Duration::from_secs(config.reminder_timeout_secs),
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self::from_config(&NotificationsConfig::default())
    }
}

/// What happened to an event passed to [`NotificationDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An alert was shown
    Delivered(AlertKind),
    /// The event does not produce an alert, or preferences turned it off
    Suppressed,
    /// The sink failed; the error was logged
    Failed(NotifyError),
}

/// Stateless event-to-alert translation plus delivery.
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
    settings: AlertSettings,
}

impl NotificationDispatcher {
    /// Create a dispatcher delivering to `sink`.
    pub fn new(sink: Arc<dyn NotificationSink>, settings: AlertSettings) -> Self {
        Self { sink, settings }
    }

    /// Render the alert for `event`, if it has one under `prefs`.
    ///
    /// Token alerts ignore the system-notifications toggle; they are the only
    /// way a headless user learns that polling stopped.
    #[must_use]
    pub fn build_alert(
        &self,
        event: &WatchEvent,
        prefs: &NotificationPreferences,
    ) -> Option<DesktopAlert> {
        match event {
            WatchEvent::NewJobs(payload) if prefs.system_notifications_enabled => {
                Some(self.new_jobs_alert(payload, prefs))
            }
            WatchEvent::TokenExpired(payload) if payload.first_occurrence => {
                Some(token_expired_alert())
            }
            WatchEvent::TokenReminder(payload) => Some(self.reminder_alert(payload)),
            WatchEvent::TokenSaved => Some(DesktopAlert::transient(
                AlertKind::TokenSaved,
                "Token Updated Successfully!",
                "Your Bearer token has been updated. Job monitoring will resume automatically.",
                self.settings.token_saved_timeout,
            )),
            _ => None,
        }
    }

    /// Build and show the alert for `event`. Never fails.
    pub fn dispatch(&self, event: &WatchEvent, prefs: &NotificationPreferences) -> DispatchOutcome {
        let Some(alert) = self.build_alert(event, prefs) else {
            return DispatchOutcome::Suppressed;
        };

        if !self.sink.is_supported() {
            tracing::warn!(kind = %alert.kind, "Desktop notifications unavailable, alert dropped");
            return DispatchOutcome::Failed(NotifyError::Unsupported);
        }

        match self.sink.show(&alert) {
            Ok(()) => DispatchOutcome::Delivered(alert.kind),
            Err(e) => {
                tracing::warn!(kind = %alert.kind, error = %e, "Failed to show alert");
                DispatchOutcome::Failed(e)
            }
        }
    }

    fn new_jobs_alert(
        &self,
        payload: &NewJobsPayload,
        prefs: &NotificationPreferences,
    ) -> DesktopAlert {
        let plural = if payload.count == 1 { "" } else { "s" };
        let title = format!("{} New Programming Job{plural} Found!", payload.count);

        let body = if prefs.show_job_titles {
            let mut lines: Vec<String> = payload
                .preview
                .iter()
                .map(|title| format!("• {title}"))
                .collect();
            if payload.overflow > 0 {
                lines.push(format!("...and {} more jobs", payload.overflow));
            }
            lines.join("\n")
        } else {
            format!(
                "{} new programming job{plural} just posted on Guru.",
                payload.count
            )
        };

        DesktopAlert {
            sound: prefs.sound_enabled,
            ..DesktopAlert::transient(
                AlertKind::NewJobs,
                title,
                body,
                self.settings.job_alert_timeout,
            )
        }
    }

    fn reminder_alert(&self, payload: &TokenReminderPayload) -> DesktopAlert {
        let elapsed = match payload.hours_expired {
            0 => "some time".to_string(),
            1 => "1 hour".to_string(),
            n => format!("{n} hours"),
        };
        DesktopAlert::transient(
            AlertKind::TokenReminder,
            "Token Still Expired",
            format!(
                "Your token has been expired for {elapsed}. Update it to continue monitoring jobs."
            ),
            self.settings.reminder_timeout,
        )
    }
}

fn token_expired_alert() -> DesktopAlert {
    DesktopAlert {
        kind: AlertKind::TokenExpired,
        title: "Guru Job Alert - Token Expired!".to_string(),
        body: "Your Bearer token has expired. Click here to update it and resume job monitoring."
            .to_string(),
        urgency: Urgency::Critical,
        timeout: AlertTimeout::Never,
        sound: true,
        actions: vec![AlertAction::UpdateTokenNow, AlertAction::RemindMeLater],
    }
}

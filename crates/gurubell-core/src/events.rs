//! Events produced by the poll scheduler and the application shell.
//!
//! A single event stream feeds both the notification dispatcher and the UI
//! layer. Events serialize as `{"event": "<name>", "payload": ...}`.

use crate::types::{JobRecord, JobSet};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Payload of a `new-jobs-notification` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJobsPayload {
    /// Number of new jobs
    pub count: usize,
    /// Full records of the new jobs, in feed order
    pub jobs: Vec<JobRecord>,
    /// Titles of all new jobs
    pub titles: Vec<String>,
    /// Titles shown in the desktop alert
    pub preview: Vec<String>,
    /// Number of new jobs not covered by `preview`
    pub overflow: usize,
}

impl NewJobsPayload {
    /// Build a payload, capping the preview at `preview_len` titles.
    #[must_use]
    pub fn new(jobs: Vec<JobRecord>, preview_len: usize) -> Self {
        let titles: Vec<String> = jobs.iter().map(|job| job.title.clone()).collect();
        let preview: Vec<String> = titles.iter().take(preview_len).cloned().collect();
        Self {
            count: jobs.len(),
            overflow: jobs.len() - preview.len(),
            jobs,
            titles,
            preview,
        }
    }
}

/// Payload of a `token-expired` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExpiredPayload {
    /// Message of the rejected request
    pub error: String,
    /// HTTP status of the rejected request, 0 when there was none
    pub status_code: u16,
    /// When the credential was first seen expired
    pub timestamp: DateTime<Utc>,
    /// Whether this is the first expiry of the current cycle
    #[serde(skip)]
    pub first_occurrence: bool,
}

/// Payload of a token reminder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReminderPayload {
    /// When the credential was first seen expired
    pub expired_at: DateTime<Utc>,
    /// Whole hours since `expired_at`
    pub hours_expired: i64,
}

/// Everything the watcher reports to the outside world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum WatchEvent {
    /// The filtered job set of the latest successful poll
    JobsUpdated(JobSet),
    /// Jobs that were not present in the previous poll
    #[serde(rename = "new-jobs-notification")]
    NewJobs(NewJobsPayload),
    /// The credential was rejected
    TokenExpired(TokenExpiredPayload),
    /// The UI should open the token editor
    ShowTokenUpdateModal,
    /// A poll failed for a reason other than authentication
    ScrapingError(String),
    /// Periodic nag while the credential stays expired
    TokenReminder(TokenReminderPayload),
    /// A new credential was saved
    TokenSaved,
}

impl WatchEvent {
    /// Channel name of the event as seen by the UI layer.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JobsUpdated(_) => "jobs-updated",
            Self::NewJobs(_) => "new-jobs-notification",
            Self::TokenExpired(_) => "token-expired",
            Self::ShowTokenUpdateModal => "show-token-update-modal",
            Self::ScrapingError(_) => "scraping-error",
            Self::TokenReminder(_) => "token-reminder",
            Self::TokenSaved => "token-saved",
        }
    }

    /// Whether the UI layer subscribes to this event.
    ///
    /// Reminders and save confirmations only produce desktop alerts.
    #[must_use]
    pub fn is_ui_event(&self) -> bool {
        !matches!(self, Self::TokenReminder(_) | Self::TokenSaved)
    }
}

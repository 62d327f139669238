//! The poll session: one repeating job poll and one reminder timer.
//!
//! All mutable state lives in a single [`Shared`] block behind a mutex that is
//! never held across an await. Every session start bumps a generation counter;
//! a tick whose generation is stale when its fetch returns drops its result,
//! so nothing touches the job set after [`PollScheduler::stop`] returns.

use crate::diff::diff;
use crate::timer::{TimerGauge, TimerHandle};
use crate::token::{classify, AuthFailureKind, TokenHealthTracker, TokenState};
use chrono::Utc;
use gurubell_core::{
    AppConfig, BearerToken, JobSet, NewJobsPayload, TokenExpiredPayload, TokenReminderPayload,
    WatchEvent,
};
use gurubell_source::{CategoryFilter, JobSource, RawResponse, RequestError};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Timing knobs of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Period of the poll timer
    pub poll_interval: Duration,
    /// Delay before the first reminder of an expiry cycle
    pub reminder_delay: Duration,
    /// Delay between reminders
    pub reminder_cadence: Duration,
    /// Delay before the first reminder after "Remind Me Later"
    pub snooze_delay: Duration,
    /// Titles listed in new-jobs previews
    pub preview_titles: usize,
}

impl SchedulerSettings {
    /// Derive settings from the application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let minutes = |m: u64| Duration::from_secs(m * 60);
        Self {
            poll_interval: config.polling.interval(),
            reminder_delay: minutes(config.reminders.initial_delay_minutes),
            reminder_cadence: minutes(config.reminders.cadence_minutes),
            snooze_delay: minutes(config.reminders.snooze_minutes),
            preview_titles: config.notifications.preview_titles,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Run state of the poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    /// No timer armed
    Stopped,
    /// Validation fetch in flight
    Starting,
    /// Timer armed and ticking
    Active,
}

/// Failure of a scheduler operation.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The credential was rejected; the expiry path already ran
    #[error("token expired or invalid: {0}")]
    TokenExpired(RequestError),

    /// Any other request failure
    #[error(transparent)]
    Request(RequestError),

    /// Another start or a stop happened while this start was validating
    #[error("session was restarted or stopped before it could start")]
    Superseded,
}

/// Result of a token validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The search endpoint accepted the token
    Valid,
    /// The search endpoint rejected the token
    Expired(RequestError),
}

struct Shared {
    state: PollState,
    generation: u64,
    previous: JobSet,
    first_poll: bool,
    token: TokenHealthTracker,
    reminders_dismissed: bool,
    reminder_generation: u64,
    timer: Option<TimerHandle>,
    reminder: Option<TimerHandle>,
}

struct Inner {
    source: Arc<dyn JobSource>,
    filter: CategoryFilter,
    settings: SchedulerSettings,
    events: UnboundedSender<WatchEvent>,
    shared: Mutex<Shared>,
    poll_timers: Arc<TimerGauge>,
    reminder_timers: Arc<TimerGauge>,
}

/// Owns the poll session and the reminder session.
///
/// Results flow out through the event channel handed to [`PollScheduler::new`];
/// callers never mutate the session state directly.
pub struct PollScheduler {
    inner: Arc<Inner>,
}

impl PollScheduler {
    /// Create a stopped scheduler.
    pub fn new(
        source: Arc<dyn JobSource>,
        filter: CategoryFilter,
        settings: SchedulerSettings,
        events: UnboundedSender<WatchEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                filter,
                settings,
                events,
                shared: Mutex::new(Shared {
                    state: PollState::Stopped,
                    generation: 0,
                    previous: Vec::new(),
                    first_poll: true,
                    token: TokenHealthTracker::new(),
                    reminders_dismissed: false,
                    reminder_generation: 0,
                    timer: None,
                    reminder: None,
                }),
                poll_timers: Arc::new(TimerGauge::default()),
                reminder_timers: Arc::new(TimerGauge::default()),
            }),
        }
    }

    /// Start polling with `token`.
    ///
    /// Any running session is stopped first. One validation fetch runs before
    /// the timer is armed; if it fails no timer is armed and the session ends
    /// up `Stopped`.
    pub async fn start(&self, token: &BearerToken) -> Result<(), WatchError> {
        let session_id = Uuid::new_v4();
        let generation = {
            let mut shared = self.inner.lock();
            shared.timer = None;
            Inner::cancel_reminder(&mut shared);
            shared.generation += 1;
            shared.state = PollState::Starting;
            shared.previous.clear();
            shared.first_poll = true;
            shared.token.clear_expiry();
            shared.reminders_dismissed = false;
            shared.generation
        };
        debug!(%session_id, "Validating token before polling");

        let result = self.inner.source.fetch_jobs(token).await;

        let mut shared = self.inner.lock();
        if shared.generation != generation {
            debug!(%session_id, "Start superseded");
            return Err(WatchError::Superseded);
        }

        match result {
            Ok(_) => {
                self.inner.record_auth_success(&mut shared);
                // A manual fetch may have seeded the diff while validating.
                shared.previous.clear();
                shared.first_poll = true;
                shared.state = PollState::Active;
                self.inner
                    .spawn_ticker(&mut shared, token.clone(), generation, session_id);
                info!(
                    %session_id,
                    interval = ?self.inner.settings.poll_interval,
                    "Job polling started"
                );
                Ok(())
            }
            Err(err) => {
                shared.state = PollState::Stopped;
                match classify(&err) {
                    AuthFailureKind::AuthExpired => {
                        self.inner.handle_auth_failure(&mut shared, &err);
                        Err(WatchError::TokenExpired(err))
                    }
                    AuthFailureKind::Other => {
                        warn!(%session_id, error = %err, "Token validation failed");
                        Err(WatchError::Request(err))
                    }
                }
            }
        }
    }

    /// Stop polling.
    ///
    /// Clears the previous job set and the expired flag. The expiry timestamp
    /// and the reminder session are left alone.
    pub fn stop(&self) {
        let mut shared = self.inner.lock();
        shared.timer = None;
        shared.generation += 1;
        shared.state = PollState::Stopped;
        shared.previous.clear();
        shared.first_poll = true;
        shared.token.clear_expired_flag();
        info!("Job polling stopped");
    }

    /// Stop polling and cancel reminders, e.g. when the host shuts down.
    pub fn shutdown(&self) {
        let mut shared = self.inner.lock();
        shared.timer = None;
        Inner::cancel_reminder(&mut shared);
        shared.generation += 1;
        shared.state = PollState::Stopped;
        shared.previous.clear();
        shared.first_poll = true;
    }

    /// One-shot fetch outside the timer.
    ///
    /// On success the filtered set becomes the previous set for the next tick
    /// and the expiry state is cleared. An auth failure runs the full expiry
    /// path, stopping any active session.
    pub async fn fetch_manual(&self, token: &BearerToken) -> Result<JobSet, WatchError> {
        let result = self.inner.source.fetch_jobs(token).await;

        let mut shared = self.inner.lock();
        match result {
            Ok(raw) => {
                let jobs = self.inner.filter.apply(raw.results);
                shared.previous.clone_from(&jobs);
                shared.first_poll = false;
                self.inner.record_auth_success(&mut shared);
                info!(count = jobs.len(), "Manual fetch completed");
                Ok(jobs)
            }
            Err(err) => match classify(&err) {
                AuthFailureKind::AuthExpired => {
                    self.inner.handle_auth_failure(&mut shared, &err);
                    Err(WatchError::TokenExpired(err))
                }
                AuthFailureKind::Other => Err(WatchError::Request(err)),
            },
        }
    }

    /// Check a token against the search endpoint without touching the session.
    pub async fn validate(&self, token: &BearerToken) -> Result<ValidationOutcome, RequestError> {
        match self.inner.source.fetch_jobs(token).await {
            Ok(_) => {
                let mut shared = self.inner.lock();
                self.inner.record_auth_success(&mut shared);
                Ok(ValidationOutcome::Valid)
            }
            Err(err) => match classify(&err) {
                AuthFailureKind::AuthExpired => {
                    self.inner.lock().token.mark_invalid();
                    Ok(ValidationOutcome::Expired(err))
                }
                AuthFailureKind::Other => Err(err),
            },
        }
    }

    /// Reset token tracking after a new token was saved.
    pub fn on_token_saved(&self) {
        let mut shared = self.inner.lock();
        shared.token.reset();
        Inner::cancel_reminder(&mut shared);
        shared.reminders_dismissed = false;
    }

    /// Record an authenticated success observed outside the scheduler.
    pub fn on_auth_success(&self) {
        let mut shared = self.inner.lock();
        self.inner.record_auth_success(&mut shared);
    }

    /// Stop reminding until the next expiry cycle.
    pub fn dismiss_reminders(&self) {
        let mut shared = self.inner.lock();
        Inner::cancel_reminder(&mut shared);
        shared.reminders_dismissed = true;
        info!("Token reminders dismissed");
    }

    /// Re-arm reminders after the snooze delay.
    ///
    /// Returns `false` when there is no expiry to remind about.
    pub fn snooze_reminders(&self) -> bool {
        let mut shared = self.inner.lock();
        if shared.token.state().last_expired_at.is_none() {
            return false;
        }
        shared.reminders_dismissed = false;
        let delay = self.inner.settings.snooze_delay;
        self.inner.arm_reminder(&mut shared, delay);
        info!(?delay, "Token reminder snoozed");
        true
    }

    /// Current run state.
    #[must_use]
    pub fn state(&self) -> PollState {
        self.inner.lock().state
    }

    /// Snapshot of the token tracker.
    #[must_use]
    pub fn token_state(&self) -> TokenState {
        self.inner.lock().token.state().clone()
    }

    /// The job set the next tick will be compared against.
    #[must_use]
    pub fn previous_jobs(&self) -> JobSet {
        self.inner.lock().previous.clone()
    }

    /// Armed poll timers, never more than one.
    #[must_use]
    pub fn active_timer_count(&self) -> usize {
        self.inner.poll_timers.live()
    }

    /// Highest number of poll timers ever armed at once.
    #[must_use]
    pub fn peak_timer_count(&self) -> usize {
        self.inner.poll_timers.peak()
    }

    /// Armed reminder timers, never more than one.
    #[must_use]
    pub fn active_reminder_count(&self) -> usize {
        self.inner.reminder_timers.live()
    }

    /// Highest number of reminder timers ever armed at once.
    #[must_use]
    pub fn peak_reminder_count(&self) -> usize {
        self.inner.reminder_timers.peak()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: WatchEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped, event discarded");
        }
    }

    fn cancel_reminder(shared: &mut Shared) {
        shared.reminder = None;
        shared.reminder_generation += 1;
    }

    fn record_auth_success(&self, shared: &mut Shared) {
        let was_expired = shared.token.state().last_expired_at.is_some();
        shared.token.on_auth_success();
        Self::cancel_reminder(shared);
        if was_expired {
            info!("Token accepted again, expiry cleared");
        }
    }

    /// Expiry path shared by start, ticks and manual fetches.
    fn handle_auth_failure(self: &Arc<Self>, shared: &mut Shared, err: &RequestError) {
        shared.timer = None;
        shared.generation += 1;
        shared.state = PollState::Stopped;
        shared.previous.clear();
        shared.first_poll = true;

        let now = Utc::now();
        let first_occurrence = shared.token.on_auth_failure(now);
        if first_occurrence {
            warn!(status = err.status_or_zero(), error = %err, "Token expired or invalid");
            shared.reminders_dismissed = false;
            let delay = self.settings.reminder_delay;
            self.arm_reminder(shared, delay);
        } else {
            debug!(status = err.status_or_zero(), "Token still expired");
        }

        self.emit(WatchEvent::TokenExpired(TokenExpiredPayload {
            error: err.message.clone(),
            status_code: err.status_or_zero(),
            timestamp: shared.token.state().last_expired_at.unwrap_or(now),
            first_occurrence,
        }));
    }

    fn spawn_ticker(
        self: &Arc<Self>,
        shared: &mut Shared,
        token: BearerToken,
        generation: u64,
        session_id: Uuid,
    ) {
        let inner = Arc::clone(self);
        let period = self.settings.poll_interval;

        shared.timer = Some(TimerHandle::spawn(
            Arc::clone(&self.poll_timers),
            move |cancel| async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        _ = interval.tick() => {}
                    }

                    let result = tokio::select! {
                        () = cancel.cancelled() => break,
                        result = inner.source.fetch_jobs(&token) => result,
                    };

                    if !inner.apply_tick(generation, result) {
                        break;
                    }
                }
                debug!(%session_id, "Poll timer exited");
            },
        ));
    }

    /// Apply one tick's fetch result. Returns `false` when the timer must exit.
    fn apply_tick(
        self: &Arc<Self>,
        generation: u64,
        result: Result<RawResponse, RequestError>,
    ) -> bool {
        let mut shared = self.lock();
        if shared.generation != generation || shared.state != PollState::Active {
            debug!("Discarding tick of a stopped session");
            return false;
        }

        match result {
            Ok(raw) => {
                let jobs = self.filter.apply(raw.results);
                let new_jobs = diff(&shared.previous, &jobs, shared.first_poll);
                shared.previous.clone_from(&jobs);
                shared.first_poll = false;
                self.record_auth_success(&mut shared);

                debug!(total = jobs.len(), new = new_jobs.len(), "Tick completed");
                self.emit(WatchEvent::JobsUpdated(jobs));
                if !new_jobs.is_empty() {
                    info!(count = new_jobs.len(), "New jobs found");
                    self.emit(WatchEvent::NewJobs(NewJobsPayload::new(
                        new_jobs,
                        self.settings.preview_titles,
                    )));
                }
                true
            }
            Err(err) => match classify(&err) {
                AuthFailureKind::AuthExpired => {
                    self.handle_auth_failure(&mut shared, &err);
                    false
                }
                AuthFailureKind::Other => {
                    warn!(error = %err, "Job polling failed, retrying next tick");
                    self.emit(WatchEvent::ScrapingError(err.to_string()));
                    true
                }
            },
        }
    }

    /// Replace any reminder timer with one that first fires after `delay`.
    fn arm_reminder(self: &Arc<Self>, shared: &mut Shared, delay: Duration) {
        Self::cancel_reminder(shared);
        let generation = shared.reminder_generation;
        let inner = Arc::clone(self);
        let cadence = self.settings.reminder_cadence;

        shared.reminder = Some(TimerHandle::spawn(
            Arc::clone(&self.reminder_timers),
            move |cancel| async move {
                let mut wait = delay;
                loop {
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(wait) => {}
                    }
                    if !inner.fire_reminder(generation) {
                        break;
                    }
                    wait = cadence;
                }
            },
        ));
    }

    /// Emit one reminder. Returns `false` when the reminder timer must exit.
    fn fire_reminder(&self, generation: u64) -> bool {
        let mut shared = self.lock();
        if shared.reminder_generation != generation || shared.reminders_dismissed {
            return false;
        }

        let now = Utc::now();
        let (Some(expired_at), Some(hours_expired)) = (
            shared.token.state().last_expired_at,
            shared.token.hours_expired(now),
        ) else {
            Self::cancel_reminder(&mut shared);
            return false;
        };

        debug!(hours_expired, "Token reminder");
        self.emit(WatchEvent::TokenReminder(TokenReminderPayload {
            expired_at,
            hours_expired,
        }));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_default_config() {
        let settings = SchedulerSettings::default();
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.reminder_delay, Duration::from_secs(15 * 60));
        assert_eq!(settings.reminder_cadence, Duration::from_secs(15 * 60));
        assert_eq!(settings.snooze_delay, Duration::from_secs(30 * 60));
        assert_eq!(settings.preview_titles, 3);
    }

    #[test]
    fn test_watch_error_display() {
        let err = WatchError::TokenExpired(RequestError::http(401, "Unauthorized"));
        assert!(err.to_string().starts_with("token expired or invalid"));

        let err = WatchError::Request(RequestError::http(500, "boom"));
        assert_eq!(err.to_string(), "request failed with status 500: boom");
    }
}

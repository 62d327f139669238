//! Job scraping command handlers.

use super::resolve_token;
use crate::error::CommandError;
use crate::feed::JobFeed;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use gurubell_core::JobSet;
use gurubell_scheduler::PollState;
use serde::Serialize;
use tracing::info;

/// Result of `get_scraping_status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingStatus {
    /// Run state of the poll session
    pub state: PollState,
    /// Poll timers currently armed
    pub active_timers: usize,
    /// Time of the last job list update
    pub last_updated: Option<DateTime<Utc>>,
    /// Jobs in the current list
    pub total_jobs: usize,
    /// New jobs since the counter was last cleared
    pub new_jobs_count: usize,
    /// Whether the token is currently considered expired
    pub token_expired: bool,
}

/// Start polling with the given or stored token.
///
/// Returns once the validation fetch succeeded and the timer is armed.
pub async fn start_job_scraping(
    state: &AppState,
    token: Option<String>,
) -> Result<(), CommandError> {
    let token = resolve_token(state, token).await?;
    state.scheduler.start(&token).await?;
    state.update_feed(JobFeed::clear_new_jobs);
    info!("Job scraping started");
    Ok(())
}

/// Stop polling.
pub fn stop_job_scraping(state: &AppState) {
    state.scheduler.stop();
}

/// Fetch once outside the timer and show the result in the feed.
pub async fn fetch_jobs_manual(
    state: &AppState,
    token: Option<String>,
) -> Result<JobSet, CommandError> {
    let token = resolve_token(state, token).await?;
    let jobs = state.scheduler.fetch_manual(&token).await?;
    state.update_feed(|feed| feed.replace_jobs(jobs.clone()));
    Ok(jobs)
}

/// Snapshot of the poll session and the feed counters.
pub fn get_scraping_status(state: &AppState) -> ScrapingStatus {
    let feed = state.feed();
    ScrapingStatus {
        state: state.scheduler.state(),
        active_timers: state.scheduler.active_timer_count(),
        last_updated: feed.last_updated,
        total_jobs: feed.total_jobs,
        new_jobs_count: feed.new_jobs_count,
        token_expired: state.scheduler.token_state().expired,
    }
}

/// The in-app job feed.
pub fn get_job_feed(state: &AppState) -> JobFeed {
    state.feed()
}

/// Mark all new jobs as seen.
pub fn clear_new_jobs(state: &AppState) {
    state.update_feed(JobFeed::clear_new_jobs);
}

//! In-app job feed folded from watch events.

use chrono::{DateTime, Utc};
use gurubell_core::{JobRecord, JobSet, WatchEvent};
use serde::Serialize;

/// New jobs prepended per notification.
const RECENT_PER_NOTIFICATION: usize = 5;
/// Cap on `recent_new_jobs`.
const RECENT_MAX: usize = 15;

/// What the UI shows: the current job list plus a "new since you looked"
/// counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFeed {
    /// Latest filtered job list
    pub jobs: JobSet,
    /// Length of `jobs`
    pub total_jobs: usize,
    /// When `jobs` was last replaced
    pub last_updated: Option<DateTime<Utc>>,
    /// New jobs since the counter was last cleared
    pub new_jobs_count: usize,
    /// Most recent new jobs, newest first
    pub recent_new_jobs: Vec<JobRecord>,
}

impl JobFeed {
    /// Fold one event into the feed. Events without feed content are ignored.
    pub fn apply(&mut self, event: &WatchEvent) {
        match event {
            WatchEvent::JobsUpdated(jobs) => self.replace_jobs(jobs.clone()),
            WatchEvent::NewJobs(payload) => {
                self.new_jobs_count += payload.count;
                let mut recent: Vec<JobRecord> = payload
                    .jobs
                    .iter()
                    .take(RECENT_PER_NOTIFICATION)
                    .cloned()
                    .collect();
                recent.append(&mut self.recent_new_jobs);
                recent.truncate(RECENT_MAX);
                self.recent_new_jobs = recent;
            }
            _ => {}
        }
    }

    /// Replace the job list, e.g. after a manual fetch.
    pub fn replace_jobs(&mut self, jobs: JobSet) {
        self.total_jobs = jobs.len();
        self.jobs = jobs;
        self.last_updated = Some(Utc::now());
    }

    /// Reset the new-job counters.
    pub fn clear_new_jobs(&mut self) {
        self.new_jobs_count = 0;
        self.recent_new_jobs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gurubell_core::NewJobsPayload;

    fn jobs(prefix: &str, n: usize) -> Vec<JobRecord> {
        (0..n)
            .map(|i| JobRecord::new(format!("{prefix}{i}"), format!("Job {i}"), "Programming & Development"))
            .collect()
    }

    #[test]
    fn test_jobs_updated_replaces_list() {
        let mut feed = JobFeed::default();
        feed.apply(&WatchEvent::JobsUpdated(jobs("a", 4)));
        feed.apply(&WatchEvent::JobsUpdated(jobs("b", 2)));

        assert_eq!(feed.total_jobs, 2);
        assert_eq!(feed.jobs[0].project_id.as_str(), "b0");
        assert!(feed.last_updated.is_some());
    }

    #[test]
    fn test_new_jobs_prepend_and_cap() {
        let mut feed = JobFeed::default();
        for batch in ["a", "b", "c", "d"] {
            feed.apply(&WatchEvent::NewJobs(NewJobsPayload::new(jobs(batch, 7), 3)));
        }

        assert_eq!(feed.new_jobs_count, 28);
        assert_eq!(feed.recent_new_jobs.len(), 15);
        assert_eq!(feed.recent_new_jobs[0].project_id.as_str(), "d0");
        assert_eq!(feed.recent_new_jobs[5].project_id.as_str(), "c0");
    }

    #[test]
    fn test_clear_new_jobs() {
        let mut feed = JobFeed::default();
        feed.apply(&WatchEvent::NewJobs(NewJobsPayload::new(jobs("a", 2), 3)));
        feed.clear_new_jobs();
        assert_eq!(feed.new_jobs_count, 0);
        assert!(feed.recent_new_jobs.is_empty());
    }

    #[test]
    fn test_other_events_leave_feed_alone() {
        let mut feed = JobFeed::default();
        feed.apply(&WatchEvent::ScrapingError("server error".to_string()));
        assert_eq!(feed, JobFeed::default());
    }
}

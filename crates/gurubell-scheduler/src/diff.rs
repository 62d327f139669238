//! Job diff engine - finds postings absent from the previous poll.

use gurubell_core::{JobRecord, ProjectId};
use std::collections::HashSet;

/// Return the jobs of `current` whose identity is not in `previous`.
///
/// On the first poll of a session nothing is reported, so a cold start
/// never floods the user with the whole first page.
pub fn diff(previous: &[JobRecord], current: &[JobRecord], is_first_poll: bool) -> Vec<JobRecord> {
    if is_first_poll {
        return Vec::new();
    }

    let seen: HashSet<&ProjectId> = previous.iter().map(|job| &job.project_id).collect();
    current
        .iter()
        .filter(|job| !seen.contains(&job.project_id))
        .cloned()
        .collect()
}

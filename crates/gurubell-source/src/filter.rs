//! Category filter applied to every raw response.

use gurubell_core::{JobRecord, JobSet, SourceConfig};

/// Keeps only jobs whose `CategoryName` equals the configured category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    category_name: String,
}

impl CategoryFilter {
    /// Filter on an exact category name.
    #[must_use]
    pub fn new(category_name: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
        }
    }

    /// Filter on the category configured for the search endpoint.
    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.category_name.clone())
    }

    /// The category being matched.
    #[must_use]
    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    /// Whether a single job belongs to the category.
    #[must_use]
    pub fn matches(&self, job: &JobRecord) -> bool {
        job.category_name == self.category_name
    }

    /// Drop every job outside the category, preserving order.
    #[must_use]
    pub fn apply(&self, jobs: Vec<JobRecord>) -> JobSet {
        jobs.into_iter().filter(|job| self.matches(job)).collect()
    }
}

//! Shared types used across the Gurubell application.
//!
//! Job records keep the field names of the job board's search API so that the
//! same payload can be handed to the UI layer unchanged.

use crate::error::GuruError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use zeroize::Zeroizing;

/// Stable identity of a job posting.
///
/// The search API returns project IDs as numbers; string IDs are accepted
/// as well and both are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a new `ProjectId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "invalid ProjectID: expected string or number, got {other}"
            ))),
        }
    }
}

/// A single job posting as returned by the search API.
///
/// Records are immutable once fetched; each poll replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Identity of the posting
    #[serde(rename = "ProjectID")]
    pub project_id: ProjectId,
    /// Job title
    #[serde(rename = "Title", default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Full description
    #[serde(rename = "Description", default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Category the job was posted under
    #[serde(rename = "CategoryName", default, deserialize_with = "null_as_default")]
    pub category_name: String,
    /// Human readable budget, e.g. "$250-$500"
    #[serde(rename = "BudgetAmountShortDescription", default)]
    pub budget: Option<String>,
    /// Employer's country
    #[serde(rename = "EmployerCountryName", default)]
    pub employer_country: Option<String>,
    /// Employer's display name
    #[serde(rename = "DisplayName", default)]
    pub employer_name: Option<String>,
    /// Posting time as epoch milliseconds in textual form
    #[serde(
        rename = "DatePosted",
        default,
        deserialize_with = "deserialize_epoch_millis"
    )]
    pub date_posted: Option<String>,
    /// Skill names
    #[serde(rename = "Skills", default, deserialize_with = "deserialize_skills")]
    pub skills: Vec<String>,
    /// Number of freelancers who applied
    #[serde(rename = "TotalApplied", default, deserialize_with = "null_as_default")]
    pub total_applied: u32,
    /// URL slug of the job detail page
    #[serde(rename = "SeoUrl", default)]
    pub seo_url: Option<String>,
}

impl JobRecord {
    /// Create a record with only identity, title and category set.
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        title: impl Into<String>,
        category_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: ProjectId::new(project_id),
            title: title.into(),
            description: String::new(),
            category_name: category_name.into(),
            budget: None,
            employer_country: None,
            employer_name: None,
            date_posted: None,
            skills: Vec::new(),
            total_applied: 0,
            seo_url: None,
        }
    }

    /// Parse `DatePosted` into a UTC timestamp.
    #[must_use]
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.date_posted.as_deref()?.trim().parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Link to the job detail page on the given site.
    #[must_use]
    pub fn url(&self, base_url: &str) -> Option<String> {
        let slug = self.seo_url.as_deref().filter(|s| !s.is_empty())?;
        Some(format!(
            "{}/d/{}",
            base_url.trim_end_matches('/'),
            slug.trim_start_matches('/')
        ))
    }
}

/// Ordered job records of one poll, already filtered by category.
pub type JobSet = Vec<JobRecord>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn deserialize_epoch_millis<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_skills<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(map) => ["Name", "SkillName", "Title"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
        .collect())
}

/// The bearer credential used to authenticate against the search API.
///
/// The secret is zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Create a token from user input, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns `GuruError::Configuration` if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, GuruError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(GuruError::Configuration(
                "bearer token is required".to_string(),
            ));
        }
        Ok(Self(Zeroizing::new(trimmed.to_string())))
    }

    /// Access the raw secret, e.g. to build the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

/// What is currently known about the stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenValidity {
    /// Not checked since it was saved
    #[default]
    Unknown,
    /// Last authenticated call succeeded
    Valid,
    /// Last authenticated call was rejected
    Invalid,
}

/// User preferences for desktop alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationPreferences {
    /// Show desktop alerts for new jobs
    #[serde(rename = "systemNotifications")]
    pub system_notifications_enabled: bool,
    /// Play a sound with alerts
    #[serde(rename = "soundEnabled")]
    pub sound_enabled: bool,
    /// Include job titles in alert bodies
    #[serde(rename = "showJobTitles")]
    pub show_job_titles: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            system_notifications_enabled: true,
            sound_enabled: true,
            show_job_titles: true,
        }
    }
}

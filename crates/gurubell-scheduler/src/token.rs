//! Token health tracking.
//!
//! Decides whether a failed request means the bearer token expired, and keeps
//! the expiry flag and timestamp that drive the expired-token alert and the
//! reminder nag.

use chrono::{DateTime, Utc};
use gurubell_core::TokenValidity;
use gurubell_source::RequestError;
use serde::Serialize;

/// Message fragments that mark a failure as an authentication problem.
const AUTH_MESSAGE_PATTERNS: [&str; 4] = [
    "unauthorized",
    "invalid token",
    "token expired",
    "authentication failed",
];

/// How a failed request should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureKind {
    /// The credential was rejected; stop polling and nag the user
    AuthExpired,
    /// Anything else; reported as a scraping error
    Other,
}

/// Classify a request failure.
///
/// 401 and 403 are always auth failures, as is any message mentioning one
/// of [`AUTH_MESSAGE_PATTERNS`] (case-insensitive).
#[must_use]
pub fn classify(error: &RequestError) -> AuthFailureKind {
    if matches!(error.status_code, Some(401 | 403)) {
        return AuthFailureKind::AuthExpired;
    }

    let message = error.message.to_lowercase();
    if AUTH_MESSAGE_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
    {
        AuthFailureKind::AuthExpired
    } else {
        AuthFailureKind::Other
    }
}

/// Snapshot of what is known about the credential.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenState {
    /// Result of the last authenticated call
    pub validity: TokenValidity,
    /// Whether the expired alert has fired for the current cycle
    pub expired: bool,
    /// When the current expiry cycle started
    pub last_expired_at: Option<DateTime<Utc>>,
}

/// Tracks credential expiry across polls.
#[derive(Debug, Default)]
pub struct TokenHealthTracker {
    state: TokenState,
}

impl TokenHealthTracker {
    /// Create a tracker in the `unknown` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &TokenState {
        &self.state
    }

    /// Whether the expired alert has already fired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state.expired
    }

    /// Record an auth-classified failure.
    ///
    /// Returns `true` only for the first failure of an expiry cycle; that is
    /// the call that must raise the primary alert.
    pub fn on_auth_failure(&mut self, now: DateTime<Utc>) -> bool {
        self.state.validity = TokenValidity::Invalid;
        if self.state.expired {
            return false;
        }
        self.state.expired = true;
        self.state.last_expired_at = Some(now);
        true
    }

    /// Record a rejected validation without opening an expiry cycle.
    pub fn mark_invalid(&mut self) {
        self.state.validity = TokenValidity::Invalid;
    }

    /// Record a successful authenticated call.
    pub fn on_auth_success(&mut self) {
        self.state = TokenState {
            validity: TokenValidity::Valid,
            expired: false,
            last_expired_at: None,
        };
    }

    /// Forget everything after a new token was saved.
    pub fn reset(&mut self) {
        self.state = TokenState::default();
    }

    /// Close the expiry cycle without judging the token.
    pub fn clear_expiry(&mut self) {
        self.state.expired = false;
        self.state.last_expired_at = None;
    }

    /// Clear the expired flag but keep `last_expired_at` for reminders.
    pub fn clear_expired_flag(&mut self) {
        self.state.expired = false;
    }

    /// Whole hours elapsed since the expiry cycle started.
    #[must_use]
    pub fn hours_expired(&self, now: DateTime<Utc>) -> Option<i64> {
        self.state
            .last_expired_at
            .map(|at| (now - at).num_hours().max(0))
    }
}

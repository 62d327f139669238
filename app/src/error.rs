//! Error type returned by command handlers.

use gurubell_core::{ConfigError, GuruError};
use gurubell_db::DatabaseError;
use gurubell_scheduler::WatchError;
use gurubell_source::RequestError;
use serde::Serialize;
use std::fmt;

/// Serializable error for the UI boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandError {
    /// Error code for frontend handling (e.g., "TOKEN_EXPIRED")
    pub code: String,
    /// User-friendly error message
    pub message: String,
    /// Optional debugging context (never contains the token)
    pub details: Option<serde_json::Value>,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a command error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// No token was passed and none is stored.
    pub fn token_required() -> Self {
        Self::new(
            "TOKEN_REQUIRED",
            "Bearer token is required. Please set your token first.",
        )
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

fn request_details(err: &RequestError) -> serde_json::Value {
    serde_json::json!({ "statusCode": err.status_or_zero() })
}

/// Auth failures have already been handled by the scheduler by the time
/// they arrive here; the UI only needs the code to show the token editor.
impl From<WatchError> for CommandError {
    fn from(err: WatchError) -> Self {
        match err {
            WatchError::TokenExpired(e) => Self::with_details(
                "TOKEN_EXPIRED",
                format!("Token expired or invalid: {}", e.message),
                request_details(&e),
            ),
            WatchError::Request(e) => e.into(),
            WatchError::Superseded => Self::new(
                "SESSION_SUPERSEDED",
                "Job scraping was restarted or stopped while starting",
            ),
        }
    }
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        Self::with_details(
            "REQUEST_FAILED",
            format!("Failed to fetch jobs: {err}"),
            request_details(&err),
        )
    }
}

impl From<DatabaseError> for CommandError {
    fn from(err: DatabaseError) -> Self {
        Self::new("SETTINGS_ERROR", format!("Settings error: {err}"))
    }
}

impl From<GuruError> for CommandError {
    fn from(err: GuruError) -> Self {
        match err {
            GuruError::Configuration(_) => Self::token_required(),
            GuruError::Config(e) => e.into(),
            GuruError::Io(e) => Self::new("FILESYSTEM_ERROR", format!("Filesystem error: {e}")),
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::new("CONFIG_ERROR", format!("Configuration error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_new() {
        let err = CommandError::new("TEST_CODE", "Test message");
        assert_eq!(err.code, "TEST_CODE");
        assert_eq!(err.message, "Test message");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "TEST_CODE: Test message");
    }

    #[test]
    fn test_token_expired_conversion() {
        let err: CommandError =
            WatchError::TokenExpired(RequestError::http(403, "Forbidden")).into();
        assert_eq!(err.code, "TOKEN_EXPIRED");
        assert_eq!(err.details, Some(serde_json::json!({ "statusCode": 403 })));
    }

    #[test]
    fn test_transport_failure_reports_status_zero() {
        let err: CommandError =
            WatchError::Request(RequestError::transport("connection refused")).into();
        assert_eq!(err.code, "REQUEST_FAILED");
        assert_eq!(err.details, Some(serde_json::json!({ "statusCode": 0 })));
        assert!(err.message.contains("connection refused"));
    }

    #[test]
    fn test_empty_token_is_token_required() {
        let err: CommandError = gurubell_core::BearerToken::new("  ").unwrap_err().into();
        assert_eq!(err.code, "TOKEN_REQUIRED");
    }

    #[test]
    fn test_settings_error_conversion() {
        let err: CommandError = DatabaseError::Migration("boom".to_string()).into();
        assert_eq!(err.code, "SETTINGS_ERROR");
    }

    #[test]
    fn test_error_serialization() {
        let err = CommandError::token_required();
        let json = serde_json::to_string(&err).expect("serialize error");
        assert!(json.contains("TOKEN_REQUIRED"));
    }
}

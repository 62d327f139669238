//! Request failure type of the job source.

use thiserror::Error;

/// A failed call to the search endpoint.
///
/// Transport failures carry no status code; HTTP failures carry the response
/// status and the best message that could be extracted from the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status_code, .message))]
pub struct RequestError {
    /// HTTP status, `None` for transport failures
    pub status_code: Option<u16>,
    /// Human readable failure message
    pub message: String,
}

#[allow(clippy::ref_option)]
fn describe(status_code: &Option<u16>, message: &str) -> String {
    match status_code {
        Some(status) => format!("request failed with status {status}: {message}"),
        None => format!("request failed: {message}"),
    }
}

impl RequestError {
    /// Failure with an HTTP response.
    #[must_use]
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Failure before any response was received.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
        }
    }

    /// Status code as reported to the UI, 0 when there was no response.
    #[must_use]
    pub fn status_or_zero(&self) -> u16 {
        self.status_code.unwrap_or(0)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status_code: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result type alias for job source operations.
pub type Result<T> = std::result::Result<T, RequestError>;

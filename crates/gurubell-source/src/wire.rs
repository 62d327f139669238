//! Response body of the search endpoint.

use gurubell_core::JobRecord;
use serde::Deserialize;

/// Unfiltered jobs of one successful search call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    /// Every job on the requested page, in API order
    pub results: Vec<JobRecord>,
}

impl RawResponse {
    /// Wrap an already parsed job list.
    #[must_use]
    pub fn new(results: Vec<JobRecord>) -> Self {
        Self { results }
    }
}

/// `{"Data": {"Results": [...]}}`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(rename = "Data", default)]
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "Results", default)]
    results: Option<Vec<JobRecord>>,
}

impl From<SearchEnvelope> for RawResponse {
    fn from(envelope: SearchEnvelope) -> Self {
        Self {
            results: envelope
                .data
                .and_then(|data| data.results)
                .unwrap_or_default(),
        }
    }
}

/// Error body shape used by the API for rejected requests.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

//! Gurubell Source - Client for the job board's search API.
//!
//! Issues a single authenticated GET per call against the search endpoint and
//! returns the raw job list. Nothing here retries; the poll scheduler simply
//! tries again on its next tick.
//!
//! # Example
//!
//! ```rust,ignore
//! use gurubell_core::{BearerToken, SourceConfig};
//! use gurubell_source::{CategoryFilter, GuruClient, JobSource};
//!
//! let config = SourceConfig::default();
//! let client = GuruClient::new(&config)?;
//! let raw = client.fetch_jobs(&BearerToken::new(token)?).await?;
//! let jobs = CategoryFilter::from_config(&config).apply(raw.results);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod filter;
pub mod wire;

// Re-export commonly used types
pub use client::{GuruClient, JobSource};
pub use error::{RequestError, Result};
pub use filter::CategoryFilter;
pub use wire::RawResponse;

//! Gurubell Scheduler - the poll/diff/notify state machine.
//!
//! - [`diff`] decides which jobs of a poll are new
//! - [`token`] classifies request failures and tracks credential expiry
//! - [`session`] owns the repeating poll timer and the reminder timer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod diff;
pub mod session;
pub mod timer;
pub mod token;

pub use diff::diff;
pub use session::{PollScheduler, PollState, SchedulerSettings, ValidationOutcome, WatchError};
pub use token::{classify, AuthFailureKind, TokenHealthTracker, TokenState};

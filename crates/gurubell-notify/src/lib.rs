//! Gurubell Notify - desktop alerts for watch events.
//!
//! The dispatcher renders [`DesktopAlert`]s from [`WatchEvent`]s and the
//! user's notification preferences, then hands them to a
//! [`NotificationSink`]. Hosts plug in their platform sink; [`TracingSink`]
//! logs alerts for headless use.
//!
//! [`WatchEvent`]: gurubell_core::WatchEvent

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod alert;
pub mod dispatcher;
pub mod sink;

pub use alert::{AlertAction, AlertKind, AlertTimeout, DesktopAlert, Urgency};
pub use dispatcher::{AlertSettings, DispatchOutcome, NotificationDispatcher};
pub use sink::{NotificationSink, NotifyError, TracingSink};

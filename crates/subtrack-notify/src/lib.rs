//! Notification rendering and dispatch for SubTrack.
//!
//! Turns evaluator decisions into emails and hands them to a
//! [`subtrack_core::notifier::Notifier`]. The production notifier sends
//! over SMTP via lettre; tests inject recording doubles.

pub mod dispatch;
pub mod error;
pub mod render;
pub mod smtp;

pub use dispatch::{DispatchCounts, Dispatcher};
pub use error::{Error, Result};
pub use smtp::{SmtpConfig, SmtpNotifier};

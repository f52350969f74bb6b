//! Clock injection.
//!
//! Date-boundary logic (month rollover, leap years, December→January wrap)
//! is only testable with a pinned "now", so everything that needs the
//! current time takes it from a [`Clock`] rather than calling
//! `Local::now()` directly.

use chrono::{DateTime, Local};

/// Source of the current time, in the server's local time zone.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Local>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// A clock frozen at a fixed instant — useful for testing.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Local> {
    self.0
  }
}

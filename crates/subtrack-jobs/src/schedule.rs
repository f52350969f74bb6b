//! Recurrence rules, evaluated in server-local time.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use subtrack_core::billing::days_in_month;

/// When a job fires. Times are interpreted in the server's local time zone
/// by whoever supplies "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
  /// Every day at `hour:minute`.
  Daily { hour: u32, minute: u32 },
  /// Once a month on `day` (clamped to shorter months) at `hour:minute`.
  Monthly { day: u32, hour: u32, minute: u32 },
}

impl Recurrence {
  pub const fn daily(hour: u32, minute: u32) -> Self {
    Self::Daily { hour, minute }
  }

  pub const fn monthly(day: u32, hour: u32, minute: u32) -> Self {
    Self::Monthly { day, hour, minute }
  }

  /// The first occurrence strictly after `now`.
  pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
    match *self {
      Self::Daily { hour, minute } => {
        let at = time_of(hour, minute);
        let today = now.date().and_time(at);
        if today > now {
          today
        } else {
          next_day(now.date()).and_time(at)
        }
      }
      Self::Monthly { day, hour, minute } => {
        let at = time_of(hour, minute);
        let today = now.date();
        let this_month = month_occurrence(today.year(), today.month(), day, at);
        if this_month > now {
          this_month
        } else if today.month() == 12 {
          month_occurrence(today.year() + 1, 1, day, at)
        } else {
          month_occurrence(today.year(), today.month() + 1, day, at)
        }
      }
    }
  }
}

impl fmt::Display for Recurrence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::Daily { hour, minute } => {
        write!(f, "daily at {hour:02}:{minute:02}")
      }
      Self::Monthly { day, hour, minute } => {
        write!(f, "monthly on day {day} at {hour:02}:{minute:02}")
      }
    }
  }
}

fn time_of(hour: u32, minute: u32) -> NaiveTime {
  NaiveTime::from_hms_opt(hour, minute, 0)
    .expect("recurrence hour/minute are in range")
}

fn next_day(date: NaiveDate) -> NaiveDate {
  date.succ_opt().expect("date within chrono's range")
}

fn month_occurrence(
  year: i32,
  month: u32,
  day: u32,
  at: NaiveTime,
) -> NaiveDateTime {
  let day = day.clamp(1, days_in_month(year, month));
  NaiveDate::from_ymd_opt(year, month, day)
    .expect("day is clamped to the month's length")
    .and_time(at)
}

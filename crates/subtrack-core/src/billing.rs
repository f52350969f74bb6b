//! The billing-cycle date engine.
//!
//! Given a subscription's billing day-of-month, computes the next occurrence
//! from "now" across variable month lengths and year boundaries. A billing
//! day past the end of a short month clamps to that month's last day, so a
//! day-31 subscription renews on 30 April and on 28 (or 29) February.
//!
//! All functions are pure over naive local time; callers obtain "now" from a
//! [`crate::clock::Clock`].

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// True for years with a February 29th.
pub fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1–12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
  match month {
    4 | 6 | 9 | 11 => 30,
    2 if is_leap_year(year) => 29,
    2 => 28,
    _ => 31,
  }
}

/// The next date a subscription with `billing_day` renews, relative to `now`.
///
/// Resolves to this month while the (clamped) billing day is still ahead,
/// otherwise to the same day next month (December wraps into January of the
/// following year), again clamped. The result is always strictly after
/// `now.date()`: a payment due today counts as already passed and rolls to
/// next month — the due-today case is never reported as zero days away.
pub fn next_payment_date(billing_day: u8, now: NaiveDateTime) -> NaiveDate {
  let today = now.date();

  let candidate = clamped_date(today.year(), today.month(), billing_day);
  if candidate > today {
    return candidate;
  }
  if today.month() == 12 {
    clamped_date(today.year() + 1, 1, billing_day)
  } else {
    clamped_date(today.year(), today.month() + 1, billing_day)
  }
}

fn clamped_date(year: i32, month: u32, billing_day: u8) -> NaiveDate {
  let day = u32::from(billing_day).min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(year, month, day)
    .expect("day is clamped to the resolved month's length")
}

/// Whole days from `now` until midnight of the next payment date, truncated
/// toward zero. Non-negative and at most ~31 whenever the system clock is
/// monotonic; a backwards clock jump is not corrected here.
pub fn days_until(billing_day: u8, now: NaiveDateTime) -> i64 {
  let next = next_payment_date(billing_day, now)
    .and_hms_opt(0, 0, 0)
    .expect("midnight is a valid time");
  (next - now).num_days()
}

//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, preference flags as 0/1 integers.

use chrono::{DateTime, Utc};
use subtrack_core::{
  subscription::Subscription,
  user::{NotificationPrefs, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:           String,
  pub email:             String,
  pub monthly_budget:    f64,
  pub payment_reminders: bool,
  pub budget_alerts:     bool,
  pub monthly_summary:   bool,
  pub new_subscription:  bool,
  pub created_at:        String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:        decode_uuid(&self.user_id)?,
      email:          self.email,
      monthly_budget: self.monthly_budget,
      prefs:          NotificationPrefs {
        payment_reminders: self.payment_reminders,
        budget_alerts:     self.budget_alerts,
        monthly_summary:   self.monthly_summary,
        new_subscription:  self.new_subscription,
      },
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub subscription_id: String,
  pub user_id:         String,
  pub name:            String,
  pub monthly_price:   f64,
  pub billing_day:     i64,
  pub created_at:      String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    let billing_day = u8::try_from(self.billing_day).map_err(|_| {
      Error::Decode(format!("billing_day out of range: {}", self.billing_day))
    })?;
    Ok(Subscription {
      subscription_id: decode_uuid(&self.subscription_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      name:            self.name,
      monthly_price:   self.monthly_price,
      billing_day,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

//! Subscription — a recurring monthly charge with a billing day-of-month.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, billing};

/// A subscription owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  pub user_id:         Uuid,
  pub name:            String,
  pub monthly_price:   f64,
  /// Day of month (1–31) the subscription renews. The range is enforced at
  /// creation time; date math clamps it to shorter months.
  pub billing_day:     u8,
  pub created_at:      DateTime<Utc>,
}

impl Subscription {
  /// The next date this subscription renews, relative to `now`.
  pub fn next_payment_date(&self, now: NaiveDateTime) -> NaiveDate {
    billing::next_payment_date(self.billing_day, now)
  }

  /// Whole days from `now` until the next renewal.
  pub fn days_until_payment(&self, now: NaiveDateTime) -> i64 {
    billing::days_until(self.billing_day, now)
  }
}

/// Input to [`crate::store::RecordStore::add_subscription`].
/// `subscription_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSubscription {
  pub user_id:       Uuid,
  pub name:          String,
  pub monthly_price: f64,
  pub billing_day:   u8,
}

impl NewSubscription {
  pub fn new(
    user_id: Uuid,
    name: impl Into<String>,
    monthly_price: f64,
    billing_day: u8,
  ) -> Self {
    Self { user_id, name: name.into(), monthly_price, billing_day }
  }

  /// Creation-time validation, applied by the CRUD layer. Downstream date
  /// math assumes the billing-day range holds and does not re-check it.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    if self.monthly_price <= 0.0 {
      return Err(Error::NonPositivePrice(self.monthly_price));
    }
    if !(1..=31).contains(&self.billing_day) {
      return Err(Error::BillingDayOutOfRange(self.billing_day));
    }
    Ok(())
  }
}

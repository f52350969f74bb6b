//! User — the notification recipient and budget owner.
//!
//! A user holds identity, an optional monthly budget, and four independent
//! opt-in flags, one per notification kind. The scheduled jobs only ever
//! read users; writes come from the CRUD layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Per-user opt-in flags, one per notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
  pub payment_reminders: bool,
  pub budget_alerts:     bool,
  pub monthly_summary:   bool,
  pub new_subscription:  bool,
}

impl Default for NotificationPrefs {
  /// Reminders, budget alerts, and confirmations start on; the monthly
  /// summary is opt-in.
  fn default() -> Self {
    Self {
      payment_reminders: true,
      budget_alerts:     true,
      monthly_summary:   false,
      new_subscription:  true,
    }
  }
}

/// A registered user.
///
/// A `monthly_budget` of zero means no budget is set; budget alerts are only
/// evaluated for users with a positive budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:        Uuid,
  pub email:          String,
  pub monthly_budget: f64,
  pub prefs:          NotificationPrefs,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::add_user`].
/// `user_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:          String,
  pub monthly_budget: f64,
  pub prefs:          NotificationPrefs,
}

impl NewUser {
  /// Convenience constructor: no budget, default preferences.
  pub fn new(email: impl Into<String>) -> Self {
    Self {
      email:          email.into(),
      monthly_budget: 0.0,
      prefs:          NotificationPrefs::default(),
    }
  }

  /// Creation-time validation, applied by the CRUD layer before the record
  /// reaches the store.
  pub fn validate(&self) -> Result<()> {
    if self.email.trim().is_empty() {
      return Err(Error::EmptyEmail);
    }
    if self.monthly_budget < 0.0 {
      return Err(Error::NegativeBudget(self.monthly_budget));
    }
    Ok(())
  }
}

//! Spending totals derived from a user's subscription list.
//!
//! These values are always computed on demand and never persisted.

use serde::Serialize;

use crate::subscription::Subscription;

/// Monthly and yearly totals for a set of subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendingSummary {
  pub monthly_total:      f64,
  pub yearly_total:       f64,
  pub subscription_count: usize,
}

impl SpendingSummary {
  pub fn of(subscriptions: &[Subscription]) -> Self {
    let monthly_total: f64 =
      subscriptions.iter().map(|s| s.monthly_price).sum();
    Self {
      monthly_total,
      yearly_total: monthly_total * 12.0,
      subscription_count: subscriptions.len(),
    }
  }

  /// Amount over `budget`, or `None` when spending is within budget or no
  /// budget is set (`budget <= 0`).
  pub fn overage(&self, budget: f64) -> Option<f64> {
    if budget > 0.0 && self.monthly_total > budget {
      Some(self.monthly_total - budget)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn sub(price: f64) -> Subscription {
    Subscription {
      subscription_id: Uuid::new_v4(),
      user_id:         Uuid::new_v4(),
      name:            "svc".into(),
      monthly_price:   price,
      billing_day:     1,
      created_at:      Utc::now(),
    }
  }

  #[test]
  fn totals_sum_prices() {
    let subs = [sub(9.99), sub(15.0), sub(5.01)];
    let summary = SpendingSummary::of(&subs);
    assert!((summary.monthly_total - 30.0).abs() < 1e-9);
    assert!((summary.yearly_total - 360.0).abs() < 1e-9);
    assert_eq!(summary.subscription_count, 3);
  }

  #[test]
  fn empty_list_is_zero() {
    let summary = SpendingSummary::of(&[]);
    assert_eq!(summary.monthly_total, 0.0);
    assert_eq!(summary.subscription_count, 0);
  }

  #[test]
  fn overage_only_when_over_a_positive_budget() {
    let summary = SpendingSummary::of(&[sub(120.0)]);
    assert_eq!(summary.overage(100.0), Some(20.0));
    assert_eq!(summary.overage(120.0), None);
    assert_eq!(summary.overage(150.0), None);
    // Zero budget means "no budget set", never an overage.
    assert_eq!(summary.overage(0.0), None);
  }
}

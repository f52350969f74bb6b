//! Notification decisions produced by the trigger evaluator.
//!
//! A decision is pure data: which user, which notification kind, and the
//! values needed to render the message. Deciding and dispatching are kept
//! separate so the evaluator stays side-effect-free.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{spending::SpendingSummary, subscription::Subscription, user::User};

/// A payment coming up in exactly the reminder lead time.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReminder {
  pub user:         User,
  pub subscription: Subscription,
  pub due_on:       NaiveDate,
  pub days_until:   i64,
}

/// Monthly spending exceeds the user's positive budget.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetAlert {
  pub user:          User,
  pub monthly_total: f64,
  pub budget:        f64,
  pub overage:       f64,
}

/// The first-of-month spending summary.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
  pub user:          User,
  pub subscriptions: Vec<Subscription>,
  pub totals:        SpendingSummary,
}

/// Confirmation that a subscription was just added. Event-driven (fired by
/// the CRUD layer on creation), not scheduled.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionAdded {
  pub user:         User,
  pub subscription: Subscription,
}

/// Everything this system can decide to send.
#[derive(Debug, Clone, Serialize)]
pub enum Decision {
  PaymentReminder(PaymentReminder),
  BudgetAlert(BudgetAlert),
  MonthlySummary(MonthlySummary),
  SubscriptionAdded(SubscriptionAdded),
}

impl Decision {
  /// The recipient's email address.
  pub fn recipient(&self) -> &str {
    match self {
      Self::PaymentReminder(r) => &r.user.email,
      Self::BudgetAlert(a) => &a.user.email,
      Self::MonthlySummary(s) => &s.user.email,
      Self::SubscriptionAdded(c) => &c.user.email,
    }
  }

  /// Short tag used in logs and counters.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::PaymentReminder(_) => "payment_reminder",
      Self::BudgetAlert(_) => "budget_alert",
      Self::MonthlySummary(_) => "monthly_summary",
      Self::SubscriptionAdded(_) => "subscription_added",
    }
  }
}

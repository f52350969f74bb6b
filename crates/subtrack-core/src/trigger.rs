//! Notification trigger evaluation.
//!
//! Three independent decision procedures, each idempotent and free of side
//! effects: they read the store, apply the billing date engine, and report
//! which notifications are due right now. Dispatch happens elsewhere, and
//! "now" is passed in so the procedures stay deterministic under test.

use chrono::NaiveDateTime;

use crate::{
  billing,
  decision::{BudgetAlert, MonthlySummary, PaymentReminder},
  spending::SpendingSummary,
  store::{RecordStore, UserFilter},
};

/// Days ahead of a payment at which the reminder fires. The comparison is an
/// exact match, not `<=`, so a daily job cadence produces one reminder per
/// billing cycle per subscription.
pub const REMINDER_LEAD_DAYS: i64 = 3;

/// Payment reminders due at `now`: one decision per subscription whose next
/// payment is exactly [`REMINDER_LEAD_DAYS`] away, across all opted-in
/// users.
pub async fn due_payment_reminders<S: RecordStore>(
  store: &S,
  now: NaiveDateTime,
) -> Result<Vec<PaymentReminder>, S::Error> {
  let users = store.find_users(UserFilter::reminder_recipients()).await?;

  let mut due = Vec::new();
  for user in users {
    for subscription in store.subscriptions_for(user.user_id).await? {
      let days_until = billing::days_until(subscription.billing_day, now);
      if days_until == REMINDER_LEAD_DAYS {
        due.push(PaymentReminder {
          user: user.clone(),
          due_on: billing::next_payment_date(subscription.billing_day, now),
          days_until,
          subscription,
        });
      }
    }
  }
  Ok(due)
}

/// Budget alerts due right now: one decision per opted-in user with a
/// positive budget whose monthly total exceeds it. Re-fires on every run
/// while the user stays over budget; there is no debounce.
pub async fn due_budget_alerts<S: RecordStore>(
  store: &S,
) -> Result<Vec<BudgetAlert>, S::Error> {
  let users = store
    .find_users(UserFilter::budget_alert_recipients())
    .await?;

  let mut due = Vec::new();
  for user in users {
    let subscriptions = store.subscriptions_for(user.user_id).await?;
    let totals = SpendingSummary::of(&subscriptions);
    if let Some(overage) = totals.overage(user.monthly_budget) {
      due.push(BudgetAlert {
        monthly_total: totals.monthly_total,
        budget: user.monthly_budget,
        overage,
        user,
      });
    }
  }
  Ok(due)
}

/// Monthly summaries: every opted-in user is unconditionally eligible; the
/// first-of-month schedule provides the periodicity, not this check.
pub async fn due_monthly_summaries<S: RecordStore>(
  store: &S,
) -> Result<Vec<MonthlySummary>, S::Error> {
  let users = store.find_users(UserFilter::summary_recipients()).await?;

  let mut due = Vec::new();
  for user in users {
    let subscriptions = store.subscriptions_for(user.user_id).await?;
    let totals = SpendingSummary::of(&subscriptions);
    due.push(MonthlySummary { user, subscriptions, totals });
  }
  Ok(due)
}

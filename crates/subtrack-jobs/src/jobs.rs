//! The three scheduled notification jobs.
//!
//! Each job is a thin bridge: take "now" from the clock, ask the trigger
//! evaluator for decisions, push them through the dispatcher, log counts.
//! Store failures surface as the job's error and are absorbed by the
//! scheduler loop; send failures are absorbed by the dispatcher.

use std::sync::Arc;

use anyhow::Context as _;
use subtrack_core::{
  clock::Clock, decision::Decision, notifier::Notifier, store::RecordStore,
  trigger,
};
use subtrack_notify::Dispatcher;

use crate::{schedule::Recurrence, scheduler::JobScheduler};

/// Stable job ids; re-registration under the same id replaces rather than
/// duplicates.
pub const PAYMENT_REMINDERS: &str = "payment_reminders";
pub const BUDGET_ALERTS: &str = "budget_alerts";
pub const MONTHLY_SUMMARY: &str = "monthly_summary";

/// Wires the trigger evaluator and dispatcher into schedulable jobs.
pub struct NotificationJobs<S, N> {
  store:      Arc<S>,
  dispatcher: Arc<Dispatcher<N>>,
  clock:      Arc<dyn Clock>,
}

impl<S, N> NotificationJobs<S, N>
where
  S: RecordStore + 'static,
  N: Notifier + 'static,
{
  pub fn new(
    store: Arc<S>,
    dispatcher: Arc<Dispatcher<N>>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self { store, dispatcher, clock }
  }

  /// Register all three jobs: reminders and budget alerts daily at 09:00,
  /// the summary on the first of each month at 09:00.
  pub fn register(self: Arc<Self>, scheduler: &JobScheduler) {
    let jobs = Arc::clone(&self);
    scheduler.add_job(
      PAYMENT_REMINDERS,
      "Send payment reminders",
      Recurrence::daily(9, 0),
      move || {
        let jobs = Arc::clone(&jobs);
        async move { jobs.run_payment_reminders().await }
      },
    );

    let jobs = Arc::clone(&self);
    scheduler.add_job(
      BUDGET_ALERTS,
      "Send budget alerts",
      Recurrence::daily(9, 0),
      move || {
        let jobs = Arc::clone(&jobs);
        async move { jobs.run_budget_alerts().await }
      },
    );

    let jobs = self;
    scheduler.add_job(
      MONTHLY_SUMMARY,
      "Send monthly summaries",
      Recurrence::monthly(1, 9, 0),
      move || {
        let jobs = Arc::clone(&jobs);
        async move { jobs.run_monthly_summaries().await }
      },
    );
  }

  /// Daily: reminders for payments due in exactly three days.
  pub async fn run_payment_reminders(&self) -> anyhow::Result<()> {
    let now = self.clock.now().naive_local();
    let due = trigger::due_payment_reminders(self.store.as_ref(), now)
      .await
      .context("loading payment reminder decisions")?;

    let total = due.len();
    let mut sent = 0;
    for reminder in due {
      if self
        .dispatcher
        .dispatch(&Decision::PaymentReminder(reminder))
        .await
      {
        sent += 1;
      }
    }

    tracing::info!(sent, total, "payment reminder check complete");
    Ok(())
  }

  /// Daily: alerts for users currently over their budget.
  pub async fn run_budget_alerts(&self) -> anyhow::Result<()> {
    let due = trigger::due_budget_alerts(self.store.as_ref())
      .await
      .context("loading budget alert decisions")?;

    let total = due.len();
    let mut sent = 0;
    for alert in due {
      if self.dispatcher.dispatch(&Decision::BudgetAlert(alert)).await {
        sent += 1;
      }
    }

    tracing::info!(sent, total, "budget alert check complete");
    Ok(())
  }

  /// Monthly: the spending summary for every opted-in user.
  pub async fn run_monthly_summaries(&self) -> anyhow::Result<()> {
    let due = trigger::due_monthly_summaries(self.store.as_ref())
      .await
      .context("loading monthly summary decisions")?;

    let total = due.len();
    let mut sent = 0;
    for summary in due {
      if self
        .dispatcher
        .dispatch(&Decision::MonthlySummary(summary))
        .await
      {
        sent += 1;
      }
    }

    tracing::info!(sent, total, "monthly summary job complete");
    Ok(())
  }
}

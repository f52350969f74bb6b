//! Notification dispatch — decision in, boolean out.
//!
//! The dispatcher is the only place a transport error can surface, and it
//! never escapes: failures are logged, counted, and reported as `false` so
//! a bad address or a network blip cannot abort a job's batch.

use std::sync::atomic::{AtomicU64, Ordering};

use subtrack_core::{decision::Decision, notifier::Notifier};

use crate::render;

/// Running totals of send attempts over the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchCounts {
  pub sent:   u64,
  pub failed: u64,
}

/// Renders decisions and hands them to the notifier, absorbing transport
/// failures.
pub struct Dispatcher<N> {
  notifier: N,
  sent:     AtomicU64,
  failed:   AtomicU64,
}

impl<N: Notifier> Dispatcher<N> {
  pub fn new(notifier: N) -> Self {
    Self {
      notifier,
      sent: AtomicU64::new(0),
      failed: AtomicU64::new(0),
    }
  }

  /// Send the email for `decision`. Returns whether delivery succeeded.
  pub async fn dispatch(&self, decision: &Decision) -> bool {
    let email = render::render(decision);
    match self.notifier.send(email).await {
      Ok(()) => {
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
          kind = decision.kind(),
          to = decision.recipient(),
          "notification sent"
        );
        true
      }
      Err(e) => {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
          kind = decision.kind(),
          to = decision.recipient(),
          error = %e,
          "notification send failed"
        );
        false
      }
    }
  }

  /// Dispatch a whole batch sequentially; a failed send never aborts the
  /// rest. Returns how many succeeded.
  pub async fn dispatch_all(&self, decisions: &[Decision]) -> usize {
    let mut sent = 0;
    for decision in decisions {
      if self.dispatch(decision).await {
        sent += 1;
      }
    }
    sent
  }

  /// Process-lifetime totals, for logs and operational visibility.
  pub fn counts(&self) -> DispatchCounts {
    DispatchCounts {
      sent:   self.sent.load(Ordering::Relaxed),
      failed: self.failed.load(Ordering::Relaxed),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::Utc;
  use subtrack_core::{
    decision::{BudgetAlert, Decision},
    notifier::{Notifier, OutboundEmail},
    user::{NotificationPrefs, User},
  };
  use thiserror::Error;
  use uuid::Uuid;

  use super::*;

  #[derive(Debug, Error)]
  #[error("transport refused")]
  struct Refused;

  /// Records every accepted email; fails every send when `failing` is set.
  #[derive(Default)]
  struct MockNotifier {
    failing:  bool,
    accepted: Mutex<Vec<OutboundEmail>>,
  }

  impl Notifier for MockNotifier {
    type Error = Refused;

    async fn send(&self, email: OutboundEmail) -> Result<(), Refused> {
      if self.failing {
        return Err(Refused);
      }
      self.accepted.lock().unwrap().push(email);
      Ok(())
    }
  }

  fn alert() -> Decision {
    Decision::BudgetAlert(BudgetAlert {
      user:          User {
        user_id:        Uuid::new_v4(),
        email:          "x@example.com".into(),
        monthly_budget: 100.0,
        prefs:          NotificationPrefs::default(),
        created_at:     Utc::now(),
      },
      monthly_total: 120.0,
      budget:        100.0,
      overage:       20.0,
    })
  }

  #[tokio::test]
  async fn successful_send_returns_true_and_counts() {
    let dispatcher = Dispatcher::new(MockNotifier::default());

    assert!(dispatcher.dispatch(&alert()).await);
    assert_eq!(dispatcher.counts(), DispatchCounts { sent: 1, failed: 0 });
    assert_eq!(dispatcher.notifier.accepted.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn transport_failure_returns_false_never_propagates() {
    let dispatcher = Dispatcher::new(MockNotifier {
      failing: true,
      ..MockNotifier::default()
    });

    assert!(!dispatcher.dispatch(&alert()).await);
    assert_eq!(dispatcher.counts(), DispatchCounts { sent: 0, failed: 1 });
  }

  #[tokio::test]
  async fn batch_continues_past_failures() {
    let dispatcher = Dispatcher::new(MockNotifier {
      failing: true,
      ..MockNotifier::default()
    });

    let batch = [alert(), alert(), alert()];
    assert_eq!(dispatcher.dispatch_all(&batch).await, 0);
    assert_eq!(dispatcher.counts().failed, 3);
  }
}

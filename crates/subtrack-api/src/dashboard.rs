//! Read-model handlers: the dashboard and the statistics breakdown.
//!
//! Everything here is derived on demand from the subscription list and the
//! injected clock — nothing is persisted.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Serialize;
use subtrack_core::{
  clock::Clock as _, notifier::Notifier, spending::SpendingSummary,
  store::RecordStore, subscription::Subscription,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, subscriptions::require_user};

/// Upcoming payments further out than this are left off the dashboard.
const UPCOMING_WINDOW_DAYS: i64 = 30;

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UpcomingPayment {
  pub subscription: Subscription,
  pub days_until:   i64,
  pub next_date:    NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
  /// Payments within the next 30 days, soonest first.
  pub upcoming:    Vec<UpcomingPayment>,
  pub summary:     SpendingSummary,
  pub over_budget: bool,
}

/// `GET /users/:id/dashboard`
pub async fn dashboard<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  let user = require_user(&state, id).await?;
  let subscriptions = state
    .store
    .subscriptions_for(id)
    .await
    .map_err(ApiError::store)?;

  let now = state.clock.now().naive_local();
  let summary = SpendingSummary::of(&subscriptions);
  let over_budget = summary.overage(user.monthly_budget).is_some();

  let mut upcoming: Vec<UpcomingPayment> = subscriptions
    .into_iter()
    .map(|subscription| UpcomingPayment {
      days_until: subscription.days_until_payment(now),
      next_date:  subscription.next_payment_date(now),
      subscription,
    })
    .filter(|u| u.days_until <= UPCOMING_WINDOW_DAYS)
    .collect();
  upcoming.sort_by_key(|u| u.days_until);

  Ok(Json(Dashboard { upcoming, summary, over_budget }))
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubscriptionCost {
  pub name:    String,
  pub monthly: f64,
  pub yearly:  f64,
}

#[derive(Debug, Serialize)]
pub struct ChartData {
  pub labels: Vec<String>,
  pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct Statistics {
  /// Per-subscription costs, most expensive (yearly) first.
  pub subscriptions: Vec<SubscriptionCost>,
  pub summary:       SpendingSummary,
  pub chart:         ChartData,
}

/// `GET /users/:id/statistics`
pub async fn statistics<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Statistics>, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  require_user(&state, id).await?;
  let subscriptions = state
    .store
    .subscriptions_for(id)
    .await
    .map_err(ApiError::store)?;

  let summary = SpendingSummary::of(&subscriptions);
  let chart = ChartData {
    labels: subscriptions.iter().map(|s| s.name.clone()).collect(),
    values: subscriptions.iter().map(|s| s.monthly_price).collect(),
  };

  let mut costs: Vec<SubscriptionCost> = subscriptions
    .into_iter()
    .map(|s| SubscriptionCost {
      name:    s.name,
      monthly: s.monthly_price,
      yearly:  s.monthly_price * 12.0,
    })
    .collect();
  costs.sort_by(|a, b| b.yearly.total_cmp(&a.yearly));

  Ok(Json(Statistics { subscriptions: costs, summary, chart }))
}

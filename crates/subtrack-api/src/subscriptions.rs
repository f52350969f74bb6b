//! Handlers for `/users/:id/subscriptions` endpoints.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use subtrack_core::{
  decision::{Decision, SubscriptionAdded},
  notifier::Notifier,
  store::RecordStore,
  subscription::{NewSubscription, Subscription},
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /users/:id/subscriptions` — the user's subscriptions, by name.
pub async fn list<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Subscription>>, ApiError>
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
  Ok(Json(subscriptions))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:          String,
  pub monthly_price: f64,
  pub billing_day:   u8,
}

/// `POST /users/:id/subscriptions`
///
/// Validates the billing-day and price invariants here, at creation time;
/// the date engine downstream assumes they hold. On success, fires the
/// opt-in confirmation email — a send failure is logged by the dispatcher
/// and never fails the request.
pub async fn create<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  let input = NewSubscription::new(
    id,
    body.name.trim(),
    body.monthly_price,
    body.billing_day,
  );
  input
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let user = require_user(&state, id).await?;
  let subscription = state
    .store
    .add_subscription(input)
    .await
    .map_err(ApiError::store)?;

  if user.prefs.new_subscription {
    state
      .dispatcher
      .dispatch(&Decision::SubscriptionAdded(SubscriptionAdded {
        user,
        subscription: subscription.clone(),
      }))
      .await;
  }

  Ok((StatusCode::CREATED, Json(subscription)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/:id/subscriptions/:sub_id` — owner-scoped; deleting
/// another user's subscription is indistinguishable from a missing one.
pub async fn delete_one<S, N>(
  State(state): State<ApiState<S, N>>,
  Path((id, sub_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  let deleted = state
    .store
    .delete_subscription(id, sub_id)
    .await
    .map_err(ApiError::store)?;
  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("subscription {sub_id} not found")))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) async fn require_user<S, N>(
  state: &ApiState<S, N>,
  id: Uuid,
) -> Result<subtrack_core::user::User, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))
}

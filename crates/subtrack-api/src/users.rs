//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: `{"email", "monthly_budget"?, "prefs"?}` |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `DELETE` | `/users/:id` | Removes the user and their subscriptions |
//! | `PUT`    | `/users/:id/profile` | Budget + the four preference flags |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use subtrack_core::{
  notifier::Notifier,
  store::RecordStore,
  user::{NewUser, NotificationPrefs, User},
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub email:          String,
  #[serde(default)]
  pub monthly_budget: f64,
  #[serde(default)]
  pub prefs:          Option<NotificationPrefs>,
}

/// `POST /users`
pub async fn create<S, N>(
  State(state): State<ApiState<S, N>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  let input = NewUser {
    email:          body.email.trim().to_string(),
    monthly_budget: body.monthly_budget,
    prefs:          body.prefs.unwrap_or_default(),
  };
  input
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  if state
    .store
    .get_user_by_email(input.email.clone())
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::BadRequest(format!(
      "email already registered: {}",
      input.email
    )));
  }

  let user = state.store.add_user(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/:id`
pub async fn delete_one<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  if state.store.delete_user(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("user {id} not found")))
  }
}

// ─── Update profile ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  pub monthly_budget:    f64,
  pub payment_reminders: bool,
  pub budget_alerts:     bool,
  pub monthly_summary:   bool,
  pub new_subscription:  bool,
}

/// `PUT /users/:id/profile` — budget and notification preferences.
pub async fn update_profile<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ProfileBody>,
) -> Result<Json<User>, ApiError>
where
  S: RecordStore,
  N: Notifier,
{
  if body.monthly_budget < 0.0 {
    return Err(ApiError::BadRequest(
      "monthly budget must not be negative".to_string(),
    ));
  }

  state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  let prefs = NotificationPrefs {
    payment_reminders: body.payment_reminders,
    budget_alerts:     body.budget_alerts,
    monthly_summary:   body.monthly_summary,
    new_subscription:  body.new_subscription,
  };
  let user = state
    .store
    .update_profile(id, body.monthly_budget, prefs)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user))
}

//! JSON REST API for SubTrack.
//!
//! Exposes an axum [`Router`] backed by any
//! [`subtrack_core::store::RecordStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility. The create-subscription endpoint also
//! fires the opt-in confirmation email through the shared dispatcher; all
//! other notification traffic flows through the scheduled jobs.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", subtrack_api::api_router(state))
//! ```

pub mod dashboard;
pub mod error;
pub mod subscriptions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use subtrack_core::{clock::Clock, notifier::Notifier, store::RecordStore};
use subtrack_notify::Dispatcher;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, N> {
  pub store:      Arc<S>,
  pub dispatcher: Arc<Dispatcher<N>>,
  pub clock:      Arc<dyn Clock>,
}

impl<S, N> Clone for ApiState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      dispatcher: Arc::clone(&self.dispatcher),
      clock:      Arc::clone(&self.clock),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(state: ApiState<S, N>) -> Router<()>
where
  S: RecordStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S, N>))
    .route(
      "/users/{id}",
      get(users::get_one::<S, N>).delete(users::delete_one::<S, N>),
    )
    .route("/users/{id}/profile", put(users::update_profile::<S, N>))
    // Subscriptions
    .route(
      "/users/{id}/subscriptions",
      get(subscriptions::list::<S, N>).post(subscriptions::create::<S, N>),
    )
    .route(
      "/users/{id}/subscriptions/{sub_id}",
      axum::routing::delete(subscriptions::delete_one::<S, N>),
    )
    // Read models
    .route("/users/{id}/dashboard", get(dashboard::dashboard::<S, N>))
    .route("/users/{id}/statistics", get(dashboard::statistics::<S, N>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{Local, TimeZone as _};
  use serde_json::{Value, json};
  use subtrack_core::{
    clock::FixedClock,
    notifier::OutboundEmail,
    store::RecordStore as _,
    user::NewUser,
  };
  use subtrack_store_sqlite::SqliteStore;
  use thiserror::Error;
  use tower::ServiceExt as _;

  use super::*;

  #[derive(Debug, Error)]
  #[error("transport refused")]
  struct Refused;

  #[derive(Clone, Default)]
  struct MockNotifier {
    failing:  bool,
    accepted: Arc<Mutex<Vec<OutboundEmail>>>,
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

  struct Harness {
    state:    ApiState<SqliteStore, MockNotifier>,
    accepted: Arc<Mutex<Vec<OutboundEmail>>>,
  }

  /// State pinned at 2024-01-12 09:00 local time.
  async fn harness() -> Harness {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let notifier = MockNotifier::default();
    let accepted = Arc::clone(&notifier.accepted);
    let state = ApiState {
      store:      Arc::new(store),
      dispatcher: Arc::new(Dispatcher::new(notifier)),
      clock:      Arc::new(FixedClock(
        Local.with_ymd_and_hms(2024, 1, 12, 9, 0, 0).unwrap(),
      )),
    };
    Harness { state, accepted }
  }

  async fn request(
    state: ApiState<SqliteStore, MockNotifier>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let response = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_user() {
    let h = harness().await;

    let (status, created) = request(
      h.state.clone(),
      "POST",
      "/users",
      Some(json!({ "email": "alice@example.com", "monthly_budget": 50.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "alice@example.com");
    assert_eq!(created["prefs"]["payment_reminders"], true);

    let id = created["user_id"].as_str().unwrap();
    let (status, fetched) =
      request(h.state, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["user_id"], created["user_id"]);
  }

  #[tokio::test]
  async fn create_user_rejects_bad_input() {
    let h = harness().await;

    let (status, _) = request(
      h.state.clone(),
      "POST",
      "/users",
      Some(json!({ "email": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
      h.state.clone(),
      "POST",
      "/users",
      Some(json!({ "email": "b@example.com", "monthly_budget": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Duplicate email.
    request(
      h.state.clone(),
      "POST",
      "/users",
      Some(json!({ "email": "dup@example.com" })),
    )
    .await;
    let (status, body) = request(
      h.state,
      "POST",
      "/users",
      Some(json!({ "email": "dup@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("registered"));
  }

  #[tokio::test]
  async fn get_missing_user_is_404() {
    let h = harness().await;
    let (status, _) = request(
      h.state,
      "GET",
      &format!("/users/{}", uuid::Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_profile_roundtrip_and_validation() {
    let h = harness().await;
    let user = h
      .state
      .store
      .add_user(NewUser::new("carol@example.com"))
      .await
      .unwrap();

    let (status, updated) = request(
      h.state.clone(),
      "PUT",
      &format!("/users/{}/profile", user.user_id),
      Some(json!({
        "monthly_budget": 120.0,
        "payment_reminders": false,
        "budget_alerts": true,
        "monthly_summary": true,
        "new_subscription": false
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["monthly_budget"], 120.0);
    assert_eq!(updated["prefs"]["monthly_summary"], true);

    let (status, _) = request(
      h.state,
      "PUT",
      &format!("/users/{}/profile", user.user_id),
      Some(json!({
        "monthly_budget": -3.0,
        "payment_reminders": true,
        "budget_alerts": true,
        "monthly_summary": false,
        "new_subscription": true
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Subscriptions ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_subscription_fires_confirmation_when_opted_in() {
    let h = harness().await;
    let user = h
      .state
      .store
      .add_user(NewUser::new("dave@example.com"))
      .await
      .unwrap();

    let (status, created) = request(
      h.state.clone(),
      "POST",
      &format!("/users/{}/subscriptions", user.user_id),
      Some(json!({ "name": "Netflix", "monthly_price": 15.99, "billing_day": 14 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Netflix");
    assert_eq!(created["billing_day"], 14);

    let accepted = h.accepted.lock().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].to, "dave@example.com");
    assert!(accepted[0].subject.contains("New Subscription"));
  }

  #[tokio::test]
  async fn create_subscription_skips_confirmation_when_opted_out() {
    let h = harness().await;
    let mut input = NewUser::new("quiet@example.com");
    input.prefs.new_subscription = false;
    let user = h.state.store.add_user(input).await.unwrap();

    let (status, _) = request(
      h.state.clone(),
      "POST",
      &format!("/users/{}/subscriptions", user.user_id),
      Some(json!({ "name": "Hulu", "monthly_price": 7.99, "billing_day": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(h.accepted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn create_subscription_failure_to_send_does_not_fail_request() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState {
      store:      Arc::new(store),
      dispatcher: Arc::new(Dispatcher::new(MockNotifier {
        failing: true,
        ..MockNotifier::default()
      })),
      clock:      Arc::new(FixedClock(
        Local.with_ymd_and_hms(2024, 1, 12, 9, 0, 0).unwrap(),
      )),
    };
    let user = state
      .store
      .add_user(NewUser::new("fail@example.com"))
      .await
      .unwrap();

    let (status, _) = request(
      state,
      "POST",
      &format!("/users/{}/subscriptions", user.user_id),
      Some(json!({ "name": "Gym", "monthly_price": 30.0, "billing_day": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  #[tokio::test]
  async fn create_subscription_validates_input() {
    let h = harness().await;
    let user = h
      .state
      .store
      .add_user(NewUser::new("erin@example.com"))
      .await
      .unwrap();

    for bad in [
      json!({ "name": "X", "monthly_price": 0.0, "billing_day": 5 }),
      json!({ "name": "X", "monthly_price": 5.0, "billing_day": 0 }),
      json!({ "name": "X", "monthly_price": 5.0, "billing_day": 32 }),
      json!({ "name": " ", "monthly_price": 5.0, "billing_day": 5 }),
    ] {
      let (status, _) = request(
        h.state.clone(),
        "POST",
        &format!("/users/{}/subscriptions", user.user_id),
        Some(bad),
      )
      .await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
    }
  }

  #[tokio::test]
  async fn delete_subscription_enforces_ownership() {
    let h = harness().await;
    let alice = h
      .state
      .store
      .add_user(NewUser::new("alice2@example.com"))
      .await
      .unwrap();
    let bob = h
      .state
      .store
      .add_user(NewUser::new("bob2@example.com"))
      .await
      .unwrap();
    let sub = h
      .state
      .store
      .add_subscription(subtrack_core::subscription::NewSubscription::new(
        bob.user_id,
        "His",
        6.0,
        4,
      ))
      .await
      .unwrap();

    let (status, _) = request(
      h.state.clone(),
      "DELETE",
      &format!(
        "/users/{}/subscriptions/{}",
        alice.user_id, sub.subscription_id
      ),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
      h.state,
      "DELETE",
      &format!(
        "/users/{}/subscriptions/{}",
        bob.user_id, sub.subscription_id
      ),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  // ── Read models ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_sorts_upcoming_and_flags_budget() {
    let h = harness().await;
    let mut input = NewUser::new("dash@example.com");
    input.monthly_budget = 20.0;
    let user = h.state.store.add_user(input).await.unwrap();

    // Clock is pinned at 2024-01-12: day 20 is nearer than day 5 (which has
    // already rolled into February).
    for (name, price, day) in
      [("Far", 15.0, 5u8), ("Near", 10.0, 20u8)]
    {
      h.state
        .store
        .add_subscription(subtrack_core::subscription::NewSubscription::new(
          user.user_id,
          name,
          price,
          day,
        ))
        .await
        .unwrap();
    }

    let (status, body) = request(
      h.state,
      "GET",
      &format!("/users/{}/dashboard", user.user_id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let upcoming = body["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0]["subscription"]["name"], "Near");
    assert_eq!(upcoming[1]["subscription"]["name"], "Far");
    assert!(
      upcoming[0]["days_until"].as_i64().unwrap()
        <= upcoming[1]["days_until"].as_i64().unwrap()
    );

    assert_eq!(body["summary"]["monthly_total"], 25.0);
    assert_eq!(body["over_budget"], true);
  }

  #[tokio::test]
  async fn statistics_sorts_by_yearly_cost() {
    let h = harness().await;
    let user = h
      .state
      .store
      .add_user(NewUser::new("stats@example.com"))
      .await
      .unwrap();

    for (name, price) in [("Cheap", 2.0), ("Pricey", 20.0), ("Mid", 8.0)] {
      h.state
        .store
        .add_subscription(subtrack_core::subscription::NewSubscription::new(
          user.user_id,
          name,
          price,
          10,
        ))
        .await
        .unwrap();
    }

    let (status, body) = request(
      h.state,
      "GET",
      &format!("/users/{}/statistics", user.user_id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let costs = body["subscriptions"].as_array().unwrap();
    assert_eq!(costs[0]["name"], "Pricey");
    assert_eq!(costs[0]["yearly"], 240.0);
    assert_eq!(costs[2]["name"], "Cheap");

    let labels = body["chart"]["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 3);
  }

  #[tokio::test]
  async fn delete_user_returns_204_then_404() {
    let h = harness().await;
    let user = h
      .state
      .store
      .add_user(NewUser::new("gone@example.com"))
      .await
      .unwrap();

    let (status, _) = request(
      h.state.clone(),
      "DELETE",
      &format!("/users/{}", user.user_id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
      h.state,
      "DELETE",
      &format!("/users/{}", user.user_id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}

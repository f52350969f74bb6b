//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`subtrack-store-sqlite` in
//! production). The trigger evaluator and the API layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  subscription::{NewSubscription, Subscription},
  user::{NewUser, NotificationPrefs, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RecordStore::find_users`]. A `None` flag does not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFilter {
  pub payment_reminders: Option<bool>,
  pub budget_alerts:     Option<bool>,
  pub monthly_summary:   Option<bool>,
  /// Restrict to users with `monthly_budget > 0`.
  pub require_budget:    bool,
}

impl UserFilter {
  /// Users eligible for the daily payment-reminder job.
  pub fn reminder_recipients() -> Self {
    Self { payment_reminders: Some(true), ..Self::default() }
  }

  /// Users eligible for the daily budget-alert job. Zero-budget users are
  /// excluded at the query level.
  pub fn budget_alert_recipients() -> Self {
    Self {
      budget_alerts: Some(true),
      require_budget: true,
      ..Self::default()
    }
  }

  /// Users eligible for the first-of-month summary job.
  pub fn summary_recipients() -> Self {
    Self { monthly_summary: Some(true), ..Self::default() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the user/subscription record store.
///
/// Scheduled jobs only ever read through this trait; all writes come from
/// the CRUD layer. All methods return `Send` futures so the trait can be
/// used from multi-threaded async runtimes (tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. `user_id` and `created_at` are assigned
  /// by the store. Fails if the email is already registered.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by email. Returns `None` if not found.
  fn get_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Replace a user's budget and notification preferences.
  fn update_profile(
    &self,
    id: Uuid,
    monthly_budget: f64,
    prefs: NotificationPrefs,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Delete a user and all of their subscriptions. Returns `false` if no
  /// such user exists.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All users matching `filter`.
  fn find_users(
    &self,
    filter: UserFilter,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Create and persist a new subscription for an existing user.
  /// `subscription_id` and `created_at` are assigned by the store.
  fn add_subscription(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Retrieve a subscription by id. Returns `None` if not found.
  fn get_subscription(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// All subscriptions owned by `user_id`, ordered by name.
  fn subscriptions_for(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Delete a subscription, scoped to its owner. Returns `false` if the
  /// subscription does not exist or belongs to a different user.
  fn delete_subscription(
    &self,
    user_id: Uuid,
    subscription_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

//! Error types for `subtrack-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("subscription not found: {0}")]
  SubscriptionNotFound(Uuid),

  #[error("email must not be empty")]
  EmptyEmail,

  #[error("subscription name must not be empty")]
  EmptyName,

  #[error("billing day must be between 1 and 31, got {0}")]
  BillingDayOutOfRange(u8),

  #[error("monthly price must be greater than zero, got {0}")]
  NonPositivePrice(f64),

  #[error("monthly budget must not be negative, got {0}")]
  NegativeBudget(f64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

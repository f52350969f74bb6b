//! Error type for `subtrack-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] subtrack_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("corrupt column value: {0}")]
  Decode(String),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("email already registered: {0}")]
  DuplicateEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

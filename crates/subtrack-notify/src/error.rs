//! Error type for `subtrack-notify`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid email address: {0}")]
  Address(#[from] lettre::address::AddressError),

  #[error("message build error: {0}")]
  Message(#[from] lettre::error::Error),

  #[error("smtp transport error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

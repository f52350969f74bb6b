//! The `Notifier` trait — the outbound email boundary.

use std::future::Future;

/// A rendered email ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
  pub to:        String,
  pub subject:   String,
  pub body_html: String,
}

/// Abstraction over the email transport (SMTP in production, recording
/// doubles in tests).
///
/// Sends may fail for transient (network) or permanent (bad address)
/// reasons; dispatch treats both identically, so the trait does not
/// distinguish them.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send(
    &self,
    email: OutboundEmail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

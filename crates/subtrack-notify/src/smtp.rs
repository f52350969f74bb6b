//! SMTP notifier backed by lettre's async Tokio transport.

use lettre::{
  AsyncSmtpTransport, AsyncTransport as _, Tokio1Executor,
  message::{Mailbox, Message, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use subtrack_core::notifier::{Notifier, OutboundEmail};

use crate::{Error, Result};

/// SMTP connection settings, deserialised from the daemon's `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  pub username: String,
  pub password: String,
  /// The From mailbox, e.g. `"SubTrack <noreply@example.com>"`.
  pub from:     String,
}

fn default_port() -> u16 {
  587
}

/// Production notifier: STARTTLS SMTP relay.
pub struct SmtpNotifier {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from:      Mailbox,
}

impl SmtpNotifier {
  pub fn new(config: &SmtpConfig) -> Result<Self> {
    let from: Mailbox = config.from.parse()?;
    let transport =
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        .port(config.port)
        .credentials(Credentials::new(
          config.username.clone(),
          config.password.clone(),
        ))
        .build();
    Ok(Self { transport, from })
  }
}

impl Notifier for SmtpNotifier {
  type Error = Error;

  async fn send(&self, email: OutboundEmail) -> Result<()> {
    let to: Mailbox = email.to.parse()?;
    let message = Message::builder()
      .from(self.from.clone())
      .to(to)
      .subject(email.subject)
      .header(ContentType::TEXT_HTML)
      .body(email.body_html)?;

    self.transport.send(message).await?;
    Ok(())
  }
}

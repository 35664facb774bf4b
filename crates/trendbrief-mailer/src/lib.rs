//! Best-effort email delivery for trend briefs.
//!
//! [`Notifier`] is the seam the job workers depend on; [`SmtpMailer`] is the
//! lettre-backed SMTP implementation. Delivery is best effort: the caller
//! logs failures but a lost email never fails a pipeline run that has
//! already been persisted.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use trendbrief_core::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("message build error: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("send task aborted: {0}")]
    Join(String),
}

/// Outbound notification channel: (subject, plain-text body, recipient).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one plain-text message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] when the message cannot be built or handed to
    /// the transport.
    async fn send(
        &self,
        to: &str,
        display_name: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError>;
}

/// SMTP delivery via lettre's blocking transport.
///
/// The transport is synchronous; sends run on the blocking thread pool so
/// the async workers are not stalled by SMTP round trips.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from the application's SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Address`] if the from address is invalid, or
    /// [`MailError::Transport`] if the relay host cannot be configured.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("{}: {e}", config.from_address)))?;

        let transport = SmtpTransport::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        display_name: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MailError> {
        let to_mailbox = format!("{display_name} <{to}>")
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("{to}: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string())?;

        let transport = self.transport.clone();
        let result = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailError::Join(e.to_string()))?;

        match result {
            Ok(response) => {
                tracing::debug!(code = %response.code(), "SMTP accepted message");
                Ok(())
            }
            Err(e) => Err(MailError::Transport(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            from_address: "Trendbrief <briefs@example.com>".to_string(),
        }
    }

    #[test]
    fn new_accepts_named_from_address() {
        let mailer = SmtpMailer::new(&config());
        assert!(mailer.is_ok());
    }

    #[test]
    fn new_rejects_malformed_from_address() {
        let mut cfg = config();
        cfg.from_address = "not an address".to_string();
        assert!(
            matches!(SmtpMailer::new(&cfg), Err(MailError::Address(_))),
            "malformed address must fail with MailError::Address"
        );
    }
}

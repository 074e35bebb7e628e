//! Outbound mail for account verification.
//!
//! Delivery sits behind the [`Mailer`] trait so the signup flow can be
//! exercised without a mail relay. [`SmtpMailer`] relays through the
//! configured SMTP server. [`LogMailer`] only notes that a message was
//! produced and serves local development where no relay exists.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::{self, authentication::Credentials},
};
use tracing::info;

/// Subject line used for verification messages.
pub const VERIFICATION_SUBJECT: &str = "Email Verification";

/// SMTP submission port used when none is configured.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Sender mailbox used when none is configured.
pub const DEFAULT_MAIL_FROM: &str = "Health Hub <no-reply@healthhub.local>";

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Failure to hand a message to the delivery channel.
#[derive(Debug, thiserror::Error)]
#[error("failed to deliver mail to {to}: {reason}")]
pub struct MailError {
    /// Intended recipient.
    pub to: String,
    /// Delivery failure description.
    pub reason: String,
}

impl MailError {
    fn new(to: &str, reason: impl ToString) -> Self {
        Self {
            to: to.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Something that can deliver a [`Message`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `message`.
    ///
    /// # Errors
    /// Returns [`MailError`] when the message could not be handed off.
    async fn send(&self, message: &Message) -> Result<(), MailError>;
}

/// Mailer that records each message's envelope in the log and drops it.
///
/// Bodies carry verification codes and are never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &Message) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "mail not relayed: no SMTP server configured"
        );
        Ok(())
    }
}

/// Invalid SMTP settings.
#[derive(Debug, thiserror::Error)]
pub enum MailSetupError {
    /// The sender is not a valid mailbox.
    #[error("invalid sender mailbox '{address}': {source}")]
    Sender {
        /// Configured sender.
        address: String,
        /// Parse failure.
        #[source]
        source: AddressError,
    },
    /// The relay host cannot be used for a STARTTLS session.
    #[error("invalid SMTP relay '{host}': {source}")]
    Relay {
        /// Configured relay host.
        host: String,
        /// Transport failure.
        #[source]
        source: smtp::Error,
    },
}

/// Connection details for an SMTP relay.
#[derive(Debug, Clone, Copy)]
pub struct SmtpSettings<'a> {
    /// Relay host name.
    pub host: &'a str,
    /// Submission port.
    pub port: u16,
    /// Login, when the relay requires authentication.
    pub username: Option<&'a str>,
    /// Password paired with `username`.
    pub password: Option<&'a str>,
    /// Sender mailbox, e.g. `Health Hub <no-reply@example.com>`.
    pub from: &'a str,
}

/// Mailer relaying through an SMTP server over STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Prepare a relay client. No connection is made until the first send.
    ///
    /// # Errors
    /// Returns [`MailSetupError`] when the sender or the relay host is
    /// invalid.
    pub fn new(settings: &SmtpSettings<'_>) -> Result<Self, MailSetupError> {
        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|source| MailSetupError::Sender {
                address: settings.from.to_owned(),
                source,
            })?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(settings.host)
            .map_err(|source| MailSetupError::Relay {
                host: settings.host.to_owned(),
                source,
            })?
            .port(settings.port);
        if let (Some(user), Some(password)) = (settings.username, settings.password) {
            builder = builder.credentials(Credentials::new(user.to_owned(), password.to_owned()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn compose(&self, message: &Message) -> Result<lettre::Message, MailError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::new(&message.to, e))?;
        lettre::Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| MailError::new(&message.to, e))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &Message) -> Result<(), MailError> {
        let email = self.compose(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::new(&message.to, e))?;
        info!(to = %message.to, subject = %message.subject, "mail relayed");
        Ok(())
    }
}

/// Build the verification message carrying `code` for a new account.
#[must_use]
pub fn verification_message(to: &str, first_name: &str, code: u32) -> Message {
    Message {
        to: to.to_owned(),
        subject: VERIFICATION_SUBJECT.to_owned(),
        body: format!(
            "Hello {first_name},\n\nThis is your verification code: {code}\n\nDo not share \
             this code with anyone.\n\nBest,\nHealth Hub"
        ),
    }
}

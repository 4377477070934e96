use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{
        Mailbox, Mailboxes, MultiPart,
        header::{HeaderName, HeaderValue, ReplyTo},
    },
    transport::smtp::authentication::Credentials,
};

use crate::config::{Config, SmtpSecurity};

/// Everything the relay needs to deliver one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: Mailbox,
    pub reply_to: String,
    pub to: Mailbox,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("{0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0}")]
    Unavailable(String),

    #[error("Reply-To must not contain line breaks")]
    HeaderInjection,
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Invalid {field} address '{value}': {source}")]
    Address {
        field: &'static str,
        value: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to configure SMTP relay '{host}': {source}")]
    Relay {
        host: String,
        source: lettre::transport::smtp::Error,
    },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), TransportError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        let relay_error = |source: lettre::transport::smtp::Error| SetupError::Relay {
            host: config.smtp_host.clone(),
            source,
        };

        let builder = match config.smtp_security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(relay_error)?
            }
            SmtpSecurity::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                    .map_err(relay_error)?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };
        let builder = builder.port(config.smtp_port());

        let transport = if config.smtp_username.is_empty() {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port(),
                "SMTP credentials not configured, using unauthenticated connection"
            );
            builder.build()
        } else {
            let creds = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            builder.credentials(creds).build()
        };

        Ok(Self { transport })
    }

    /// Opens a connection to the relay and closes it again.
    pub async fn verify(&self) -> Result<(), TransportError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(TransportError::Unavailable(
                "SMTP relay did not accept the connection".to_string(),
            ))
        }
    }
}

/// Builds the multipart message. Reply-To is passed through as given: a
/// parsable mailbox list becomes a structured header, anything else is
/// written raw as long as it stays on one line.
pub fn build_message(email: OutgoingEmail) -> Result<Message, TransportError> {
    let builder = Message::builder().from(email.from).to(email.to);

    let builder = match email.reply_to.parse::<Mailboxes>() {
        Ok(mailboxes) => builder.header(ReplyTo::from(mailboxes)),
        Err(_) if email.reply_to.contains(['\r', '\n']) => {
            return Err(TransportError::HeaderInjection);
        }
        Err(_) => builder.raw_header(HeaderValue::new(
            HeaderName::new_from_ascii_str("Reply-To"),
            email.reply_to,
        )),
    };

    builder
        .subject(email.subject)
        .multipart(MultiPart::alternative_plain_html(email.text, email.html))
        .map_err(Into::into)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), TransportError> {
        let message = build_message(email)?;

        self.transport.send(message).await?;

        Ok(())
    }
}

/// Parses a configured address, naming the config field on failure.
pub fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, SetupError> {
    value.parse().map_err(|source| SetupError::Address {
        field,
        value: value.to_string(),
        source,
    })
}

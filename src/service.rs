use crate::{
    config::Config,
    dto::{Outcome, Submission},
    render::{self, ContactForm},
    transport::{self, Mailer, OutgoingEmail, SetupError, TransportError},
};

use lettre::message::Mailbox;

pub struct ContactService {
    mailer: Box<dyn Mailer>,
    sender: Mailbox,
    recipient: Mailbox,
    expose_transport_errors: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("Failed to send email: {0}")]
    Transport(#[from] TransportError),
}

impl ContactError {
    /// Outcome reported to the caller for this failure.
    pub fn outcome(&self, expose_transport_errors: bool) -> Outcome {
        match self {
            Self::Validation(_) => Outcome::failure(Outcome::MISSING_FIELDS, None),
            Self::Transport(e) => Outcome::failure(
                Outcome::SEND_FAILED,
                expose_transport_errors.then(|| e.to_string()),
            ),
        }
    }
}

fn take_required(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

/// Checks that `name`, `email`, `role` and `service` are present and non-empty.
pub fn validate(submission: Submission) -> Result<ContactForm, ContactError> {
    let mut missing = Vec::new();

    let form = ContactForm {
        name: take_required(submission.name, "name", &mut missing),
        email: take_required(submission.email, "email", &mut missing),
        role: take_required(submission.role, "role", &mut missing),
        service: take_required(submission.service, "service", &mut missing),
        message: submission.message,
    };

    if missing.is_empty() {
        Ok(form)
    } else {
        Err(ContactError::Validation(missing))
    }
}

impl ContactService {
    pub fn new(
        mailer: Box<dyn Mailer>,
        sender: Mailbox,
        recipient: Mailbox,
        expose_transport_errors: bool,
    ) -> Self {
        Self {
            mailer,
            sender,
            recipient,
            expose_transport_errors,
        }
    }

    pub fn from_config(mailer: Box<dyn Mailer>, config: &Config) -> Result<Self, SetupError> {
        let sender = Mailbox::new(
            Some(config.sender_name.clone()),
            transport::parse_mailbox("sender_address", &config.sender_address)?.email,
        );
        let recipient = transport::parse_mailbox("recipient", &config.recipient)?;

        Ok(Self::new(
            mailer,
            sender,
            recipient,
            config.expose_transport_errors,
        ))
    }

    pub const fn expose_transport_errors(&self) -> bool {
        self.expose_transport_errors
    }

    pub async fn handle(&self, submission: Submission) -> Result<Outcome, ContactError> {
        let form = validate(submission)?;
        let rendered = render::render(&form);

        tracing::info!(
            "Relaying contact form from '{}' for service '{}' to '{}'",
            form.email,
            form.service,
            self.recipient
        );

        self.mailer
            .send(OutgoingEmail {
                from: self.sender.clone(),
                reply_to: form.email.clone(),
                to: self.recipient.clone(),
                subject: rendered.subject,
                text: rendered.text,
                html: rendered.html,
            })
            .await?;

        tracing::info!("Contact form from '{}' sent successfully", form.email);

        Ok(Outcome::sent())
    }
}

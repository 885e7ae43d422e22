use crate::retry::{retry, RetryPolicy, Retryable};
use async_trait::async_trait;
use interfaces::DigestOutput;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Code;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info};

/// Port for SMTP submission over implicit TLS. Any other port negotiates STARTTLS.
pub const SMTPS_PORT: u16 = 465;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("Transient mail channel failure: {0}")]
    Transient(String),

    #[error("Mail rejected by server: {0}")]
    Permanent(String),

    #[error("Invalid message: {0}")]
    Message(String),
}

impl Retryable for DeliveryError {
    fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Transient(_))
    }
}

/// Sorts an SMTP failure by whether retrying can help.
///
/// 530/534/535 (authentication required, too weak, or rejected) never retry. Other
/// permanent replies and client-side errors are final; everything else is transient.
pub fn classify(code: Option<Code>, permanent: bool, client: bool, message: String) -> DeliveryError {
    if code.is_some_and(|c| c.to_string().starts_with("53")) {
        return DeliveryError::Authentication(message);
    }
    if permanent || client {
        DeliveryError::Permanent(message)
    } else {
        DeliveryError::Transient(message)
    }
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        classify(err.status(), err.is_permanent(), err.is_client(), err.to_string())
    }
}

impl From<lettre::address::AddressError> for DeliveryError {
    fn from(err: lettre::address::AddressError) -> Self {
        DeliveryError::Message(err.to_string())
    }
}

impl From<lettre::error::Error> for DeliveryError {
    fn from(err: lettre::error::Error) -> Self {
        DeliveryError::Message(err.to_string())
    }
}

#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender", &self.sender)
            .field("password", &"***")
            .field("recipients", &self.recipients)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn to_message(&self) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder()
            .from(self.from.parse::<Mailbox>()?)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        Ok(builder.body(self.body.clone())?)
    }
}

/// Secure-channel submission of one message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn submit(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, DeliveryError> {
        let builder = if config.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(config.sender.clone(), config.password.clone()))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn submit(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = mail.to_message()?;
        let response = self.transport.send(message).await?;
        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

/// Mails a finished digest through a transport, retrying transient channel failures.
pub struct EmailDelivery<T: MailTransport> {
    transport: T,
    sender: String,
    recipients: Vec<String>,
    policy: RetryPolicy,
}

impl EmailDelivery<SmtpMailer> {
    pub fn smtp(config: &MailConfig) -> Result<Self, DeliveryError> {
        let transport = SmtpMailer::new(config)?;
        Ok(Self::new(transport, &config.sender, config.recipients.clone()))
    }
}

impl<T: MailTransport> EmailDelivery<T> {
    pub fn new(transport: T, sender: &str, recipients: Vec<String>) -> Self {
        Self {
            transport,
            sender: sender.to_string(),
            recipients,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn deliver(&self, digest: &DigestOutput) -> Result<(), DeliveryError> {
        let mail = OutgoingMail {
            from: self.sender.clone(),
            to: self.recipients.clone(),
            subject: digest.subject.clone(),
            body: digest.text.clone(),
        };

        let transport = &self.transport;
        let mail_ref = &mail;
        let result = retry(&self.policy, move |attempt| async move {
            debug!(attempt, recipients = mail_ref.to.len(), "Submitting digest email");
            transport.submit(mail_ref).await
        })
        .await;

        match &result {
            Ok(()) => info!(recipients = ?self.recipients, subject = %mail.subject, "Digest email sent"),
            Err(DeliveryError::Authentication(e)) => {
                error!(error = %e, "SMTP authentication failed, not retrying")
            }
            Err(e) => error!(error = %e, "Failed to send digest email"),
        }
        result
    }
}

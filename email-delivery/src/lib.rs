pub mod mailer;
pub mod retry;

pub use mailer::{classify, DeliveryError, EmailDelivery, MailConfig, MailTransport, OutgoingMail, SmtpMailer};
pub use retry::{retry, RetryPolicy, Retryable};

//! Driven port for transactional email delivery.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by email delivery adapters.
    pub enum EmailSenderError {
        /// The provider did not answer in time.
        Timeout { message: String } => "email provider timed out: {message}",
        /// The provider throttled the request.
        RateLimited { message: String } => "email provider rate limited the request: {message}",
        /// The provider refused the message.
        Rejected { message: String } => "email provider rejected the message: {message}",
        /// Network or unexpected provider failure.
        Transport { message: String } => "email transport failed: {message}",
    }
}

/// Rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReceipt {
    pub id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailSenderError>;
}

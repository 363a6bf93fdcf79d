//! Email sender that only logs.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{EmailMessage, EmailReceipt, EmailSender, EmailSenderError};

/// Logs each message instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyEmailSender;

#[async_trait]
impl EmailSender for LogOnlyEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailSenderError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email delivery disabled; message logged only"
        );
        Ok(EmailReceipt {
            id: format!("log-only-{}", Uuid::new_v4()),
        })
    }
}

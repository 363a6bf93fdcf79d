//! Email sender double that records messages.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{EmailMessage, EmailReceipt, EmailSender, EmailSenderError};

/// Records every message; sends to addresses in the failure set fail.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `address` fail with a transport error.
    pub fn fail_for(&self, address: &str) {
        match self.failing.lock() {
            Ok(mut failing) => {
                failing.insert(address.to_owned());
            }
            Err(_) => panic!("email sender mutex"),
        }
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(_) => panic!("email sender mutex"),
        }
    }

    /// Messages delivered to `address`.
    pub fn sent_to(&self, address: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter(|message| message.to == address)
            .collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailSenderError> {
        let fails = match self.failing.lock() {
            Ok(failing) => failing.contains(&message.to),
            Err(_) => panic!("email sender mutex"),
        };
        if fails {
            return Err(EmailSenderError::transport(format!(
                "refused delivery to {}",
                message.to
            )));
        }
        let mut sent = match self.sent.lock() {
            Ok(sent) => sent,
            Err(_) => panic!("email sender mutex"),
        };
        sent.push(message.clone());
        Ok(EmailReceipt {
            id: format!("recorded-{}", sent.len()),
        })
    }
}

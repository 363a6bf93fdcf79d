//! Reqwest-backed Resend adapter.
//!
//! The adapter owns transport details only: request serialisation, timeout
//! and HTTP status mapping, and decoding the message id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{EmailMessage, EmailReceipt, EmailSender, EmailSenderError};

/// Production Resend endpoint.
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Sends email through the Resend HTTP API.
pub struct ResendEmailSender {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    from: String,
}

impl ResendEmailSender {
    /// Build a sender with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: Zeroizing::new(api_key.into()),
            from: from.into(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailSenderError> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
            reply_to: message.reply_to.as_deref(),
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_receipt(body.as_ref())
    }
}

fn parse_receipt(body: &[u8]) -> Result<EmailReceipt, EmailSenderError> {
    let decoded: SendEmailResponse = serde_json::from_slice(body).map_err(|error| {
        EmailSenderError::transport(format!("invalid Resend response: {error}"))
    })?;
    Ok(EmailReceipt { id: decoded.id })
}

fn map_transport_error(error: reqwest::Error) -> EmailSenderError {
    if error.is_timeout() {
        EmailSenderError::timeout(error.to_string())
    } else {
        EmailSenderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmailSenderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => EmailSenderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            EmailSenderError::timeout(message)
        }
        _ if status.is_client_error() => EmailSenderError::rejected(message),
        _ => EmailSenderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY, "Rejected")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_statuses_to_sender_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, br#"{"message":"nope"}"#);
        let matched = match expected {
            "RateLimited" => matches!(error, EmailSenderError::RateLimited { .. }),
            "Timeout" => matches!(error, EmailSenderError::Timeout { .. }),
            "Rejected" => matches!(error, EmailSenderError::Rejected { .. }),
            "Transport" => matches!(error, EmailSenderError::Transport { .. }),
            _ => panic!("unsupported expectation: {expected}"),
        };
        assert!(matched, "{status} mapped to {error:?}");
    }

    #[rstest]
    fn status_message_includes_compacted_body() {
        let error = map_status_error(StatusCode::BAD_REQUEST, b"invalid   `to`\n field");
        assert_eq!(
            error,
            EmailSenderError::rejected("status 400: invalid `to` field")
        );
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let preview = body_preview("x".repeat(200).as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    fn parses_message_id() {
        let receipt = parse_receipt(br#"{"id":"49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"}"#)
            .expect("receipt");
        assert_eq!(receipt.id, "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794");
    }

    #[rstest]
    fn malformed_response_is_a_transport_error() {
        let error = parse_receipt(b"<html>").expect_err("not json");
        assert!(matches!(error, EmailSenderError::Transport { .. }));
    }

    #[rstest]
    fn request_omits_absent_reply_to() {
        let request = SendEmailRequest {
            from: "EPTSS <noreply@example.com>",
            to: ["ada@example.com"],
            subject: "Hi",
            html: "<p>hi</p>",
            reply_to: None,
        };
        let json = serde_json::to_value(&request).expect("serialise");
        assert_eq!(json["to"][0], "ada@example.com");
        assert!(json.get("reply_to").is_none());
    }
}

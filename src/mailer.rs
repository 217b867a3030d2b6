//! Brevo transactional email client.
//!
//! One typed call against `POST /v3/smtp/email`, authenticated by the
//! `api-key` header. A non-2xx response surfaces as [`AppError::Api`]
//! with the body verbatim; there is no retry and no queue.

use crate::config::MailConfig;
use crate::error::{AppError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendEmailRequest<'a> {
    pub sender: Party<'a>,
    pub to: Vec<Address<'a>>,
    pub subject: &'a str,
    pub html_content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Party<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Address<'a> {
    pub email: &'a str,
}

/// Accepted-send response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// Provider-side message id.
    pub message_id: String,
}

/// Client for the Brevo transactional email API.
#[derive(Debug, Clone)]
pub struct BrevoClient {
    http: Client,
    config: MailConfig,
}

impl BrevoClient {
    /// Create a client from validated mail configuration.
    pub fn new(config: MailConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Submit one email to the configured recipient.
    pub async fn send_email(&self, subject: &str, html_content: &str) -> Result<SendEmailResponse> {
        let url = format!("{}/v3/smtp/email", self.config.base_url);
        let request = SendEmailRequest {
            sender: Party {
                name: &self.config.sender_name,
                email: &self.config.sender_email,
            },
            to: vec![Address {
                email: &self.config.recipient_email,
            }],
            subject,
            html_content,
        };

        tracing::debug!(to = %self.config.recipient_email, %subject, "Submitting email");

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.config.api_key)
            .header("accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Email API rejected the send");
            return Err(AppError::Api { status, body });
        }

        let accepted: SendEmailResponse = response.json().await?;
        tracing::info!(message_id = %accepted.message_id, "Email accepted");
        Ok(accepted)
    }
}

//! Email delivery over a JSON HTTP API (Resend-style). Black-box
//! collaborator: one POST, acknowledged or failed.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Request(String),

    #[error("email service returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Seam for the delivery service so the send-email handler is testable
/// without an outbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailError>;
}

pub struct HttpMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpMailer {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailError> {
        let payload = json!({
            "from": self.config.from_address,
            "to": to,
            "subject": subject,
            "text": text,
        });

        debug!("POST {} (to {})", self.config.api_url, to);

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

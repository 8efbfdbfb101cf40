//! LLM completion client (Ollama HTTP API) and the prompt builders that feed
//! it. The service is a black box: prompt in, free text out, with unbounded
//! latency — callers must never hold a cache lock across a completion.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;
use crate::models::{EventRecord, SendEmailRequest};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("LLM response missing 'response' field")]
    MalformedResponse,
}

/// Seam for the completion service so handlers can be tested with a stub.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

// ── Ollama client ─────────────────────────────────────────────────────────────

pub struct OllamaClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        debug!("POST {} (model {})", self.generate_url(), self.config.model);

        let resp = self
            .client
            .post(self.generate_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        body.get("response")
            .and_then(|r| r.as_str())
            .map(|s| s.trim().to_string())
            .ok_or(LlmError::MalformedResponse)
    }
}

// ── Prompts ───────────────────────────────────────────────────────────────────

/// Curator prompt over the cached events, one block per event. Descriptions
/// get a second, tighter cut so a handful of events stays within a small
/// prompt.
pub fn events_summary_prompt(events: &[EventRecord]) -> String {
    let blocks: Vec<String> = events
        .iter()
        .map(|e| {
            format!(
                "Event: {}\nWhen: {}\nWhere: {}\nDescription: {}...",
                e.event_title.as_deref().unwrap_or("Unknown"),
                e.event_date_time.as_deref().unwrap_or("Unknown"),
                e.location.as_deref().unwrap_or("Unknown"),
                crate::scraper::extract::truncate_chars(&e.description, 200),
            )
        })
        .collect();

    format!(
        "You are an AI event curator for San Francisco. Analyze these events and provide a brief overview:\n\n\
         Events:\n{}\n\n\
         Please provide:\n\
         1. A 2-3 sentence overview of what's happening in SF right now\n\
         2. Notable trends or patterns in these events\n\
         3. A quick recommendation for different types of interests (e.g., for art lovers, tech enthusiasts, etc.)\n\n\
         Keep your response concise and engaging. Format in markdown.",
        blocks.join("\n\n")
    )
}

/// Prompt for the personalized-email endpoint. The model writes the body;
/// the mailer just delivers it.
pub fn personal_email_prompt(req: &SendEmailRequest) -> String {
    format!(
        "Write a short, warm, personalized email to {name}. They enjoy {hobbies}, \
         their favorite musical artist is {artist}, and their favorite movie is {movie}. \
         Recommend how they might spend a weekend in San Francisco around those interests. \
         Keep it under 200 words, friendly in tone, and sign off as 'The EventPulse Team'. \
         Output only the email body, no subject line.",
        name = req.name,
        hobbies = req.hobbies,
        artist = req.artist,
        movie = req.movie,
    )
}

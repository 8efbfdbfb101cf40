//! Endpoint handlers.
//!
//! Contract carried over from the original service: every response is JSON
//! with HTTP 200, and failure is an `error` (or `success: false`) key in the
//! body rather than a status code. Handlers only read the cache; they never
//! trigger a scrape.

use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info};

use super::AppState;
use crate::llm::{events_summary_prompt, personal_email_prompt};
use crate::models::{EventsSummaryResponse, SendEmailRequest, SendEmailResponse};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Server is running" }))
}

pub async fn stock_data(State(state): State<AppState>) -> Json<Value> {
    match state.cache.stock().await {
        Some(snapshot) => {
            info!("Returning cached stock data");
            Json(json!(snapshot))
        }
        None => {
            error!("No stock data available in cache");
            Json(json!({ "error": "Failed to fetch stock data" }))
        }
    }
}

pub async fn events(State(state): State<AppState>) -> Json<Value> {
    match state.cache.events().await {
        Some(collection) => {
            info!("Returning cached events data");
            Json(json!(collection))
        }
        None => {
            error!("No events data available in cache");
            Json(json!({ "error": "Failed to fetch events data" }))
        }
    }
}

pub async fn events_summary(State(state): State<AppState>) -> Json<Value> {
    let events = match state.cache.events().await {
        Some(collection) if !collection.events.is_empty() => collection.events,
        _ => {
            error!("No event data available for summary");
            return Json(json!({ "error": "No event data available" }));
        }
    };

    info!("Generating summary over {} events", events.len());
    let prompt = events_summary_prompt(&events);

    match state.llm.complete(&prompt).await {
        Ok(summary) => Json(json!(EventsSummaryResponse {
            summary,
            last_updated: Utc::now(),
            event_count: events.len(),
        })),
        Err(e) => {
            error!("Summary generation failed: {}", e);
            Json(json!({ "error": format!("Failed to generate summary: {}", e) }))
        }
    }
}

pub async fn send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> Json<Value> {
    info!("Drafting personalized email for {}", req.email);

    let text = match state.llm.complete(&personal_email_prompt(&req)).await {
        Ok(text) => text,
        Err(e) => {
            error!("Email draft failed: {}", e);
            return Json(json!(SendEmailResponse {
                success: false,
                message: "Failed to generate email text".into(),
                generated_text: None,
            }));
        }
    };

    let subject = format!("A weekend in San Francisco for you, {}", req.name);
    match state.mailer.send(&req.email, &subject, &text).await {
        Ok(()) => Json(json!(SendEmailResponse {
            success: true,
            message: "Email sent successfully".into(),
            generated_text: Some(text),
        })),
        Err(e) => {
            error!("Email delivery failed: {}", e);
            Json(json!(SendEmailResponse {
                success: false,
                message: "Failed to send email".into(),
                generated_text: Some(text),
            }))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::cache::CacheStore;
    use crate::email::{MailError, Mailer};
    use crate::llm::{CompletionBackend, LlmError};
    use crate::models::{EventCollection, EventRecord, StockSnapshot};

    struct StubLlm {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl CompletionBackend for StubLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.reply
                .clone()
                .map_err(|_| LlmError::Request("model offline".into()))
        }
    }

    #[derive(Default)]
    struct StubMailer {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Mailer for StubMailer {
        async fn send(&self, to: &str, subject: &str, _text: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Request("smtp relay down".into()));
            }
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn state(cache: CacheStore, llm_ok: bool, mail_ok: bool) -> (AppState, Arc<StubMailer>) {
        let mailer = Arc::new(StubMailer {
            fail: !mail_ok,
            sent: Mutex::new(Vec::new()),
        });
        let state = AppState {
            cache,
            llm: Arc::new(StubLlm {
                reply: if llm_ok {
                    Ok("generated text".into())
                } else {
                    Err(())
                },
            }),
            mailer: mailer.clone(),
        };
        (state, mailer)
    }

    fn seeded_events(n: usize) -> EventCollection {
        EventCollection {
            events: (0..n)
                .map(|i| EventRecord {
                    event_title: Some(format!("Event {}", i)),
                    event_date_time: None,
                    location: None,
                    address: None,
                    description: "Description not found.".into(),
                })
                .collect(),
            last_updated: Utc::now(),
        }
    }

    fn email_request() -> SendEmailRequest {
        SendEmailRequest {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            hobbies: "hiking".into(),
            artist: "Caroline Polachek".into(),
            movie: "Arrival".into(),
        }
    }

    #[tokio::test]
    async fn root_reports_running() {
        let Json(body) = root().await;
        assert_eq!(body["message"], "Server is running");
    }

    #[tokio::test]
    async fn stock_before_first_refresh_is_an_error_envelope() {
        let (state, _) = state(CacheStore::new(), true, true);
        let Json(body) = stock_data(State(state)).await;
        assert_eq!(body["error"], "Failed to fetch stock data");
    }

    #[tokio::test]
    async fn stock_after_refresh_returns_the_snapshot() {
        let cache = CacheStore::new();
        cache
            .set_stock(StockSnapshot {
                previous_close: "601.04".into(),
                market_open: "599.50".into(),
                last_updated: Utc::now(),
            })
            .await;

        let (state, _) = state(cache, true, true);
        let Json(body) = stock_data(State(state)).await;
        assert_eq!(body["previousClose"], "601.04");
        assert_eq!(body["marketOpen"], "599.50");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn events_empty_cache_is_an_error_envelope() {
        let (state, _) = state(CacheStore::new(), true, true);
        let Json(body) = events(State(state)).await;
        assert_eq!(body["error"], "Failed to fetch events data");
    }

    #[tokio::test]
    async fn events_return_the_cached_collection() {
        let cache = CacheStore::new();
        cache.set_events(seeded_events(2)).await;

        let (state, _) = state(cache, true, true);
        let Json(body) = events(State(state)).await;
        assert_eq!(body["events"].as_array().unwrap().len(), 2);
        assert!(body["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn summary_without_events_says_no_data() {
        let (state, _) = state(CacheStore::new(), true, true);
        let Json(body) = events_summary(State(state)).await;
        assert_eq!(body["error"], "No event data available");
    }

    #[tokio::test]
    async fn summary_event_count_matches_cache() {
        let cache = CacheStore::new();
        cache.set_events(seeded_events(3)).await;

        let (state, _) = state(cache, true, true);
        let Json(body) = events_summary(State(state)).await;
        assert_eq!(body["eventCount"], 3);
        assert_eq!(body["summary"], "generated text");
    }

    #[tokio::test]
    async fn summary_llm_failure_is_reported_in_body() {
        let cache = CacheStore::new();
        cache.set_events(seeded_events(1)).await;

        let (state, _) = state(cache, false, true);
        let Json(body) = events_summary(State(state)).await;
        let msg = body["error"].as_str().unwrap();
        assert!(msg.starts_with("Failed to generate summary"));
    }

    #[tokio::test]
    async fn send_email_happy_path_delivers_and_echoes_text() {
        let (state, mailer) = state(CacheStore::new(), true, true);
        let Json(body) = send_email(State(state), Json(email_request())).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["generated_text"], "generated text");

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "sam@example.com");
        assert!(sent[0].1.contains("Sam"));
    }

    #[tokio::test]
    async fn send_email_llm_failure_sends_nothing() {
        let (state, mailer) = state(CacheStore::new(), false, true);
        let Json(body) = send_email(State(state), Json(email_request())).await;

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to generate email text");
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn send_email_delivery_failure_still_returns_the_draft() {
        let (state, _) = state(CacheStore::new(), true, false);
        let Json(body) = send_email(State(state), Json(email_request())).await;

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to send email");
        assert_eq!(body["generated_text"], "generated text");
    }
}

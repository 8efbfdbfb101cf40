use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Stock snapshot ────────────────────────────────────────────────────────────

/// Quote fields scraped from the stock page. Values stay as the page printed
/// them ("601.04", "1,234.56") rather than parsed numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub previous_close: String,
    pub market_open: String,
    pub last_updated: DateTime<Utc>,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// One event detail page, best-effort. Any field the page no longer carries
/// comes back as None rather than failing the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_title: Option<String>,
    pub event_date_time: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub description: String,
}

/// The events dataset as served: whatever detail fetches survived the last
/// cycle, in completion order, plus the cycle timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventCollection {
    pub events: Vec<EventRecord>,
    pub last_updated: DateTime<Utc>,
}

// ── API payloads ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub name: String,
    pub email: String,
    pub hobbies: String,
    pub artist: String,
    pub movie: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsSummaryResponse {
    pub summary: String,
    pub last_updated: DateTime<Utc>,
    pub event_count: usize,
}

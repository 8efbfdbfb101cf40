//! Best-effort structural extraction from source-site markup.
//!
//! Selector tables live here as data, so a layout change on a source site is
//! an edit to a table, not to extraction logic. Every field resolves
//! independently to Some(text) or None; a record never fails because one
//! field went missing.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

use crate::models::EventRecord;

pub const DESCRIPTION_MAX_CHARS: usize = 300;
pub const DESCRIPTION_PLACEHOLDER: &str = "Description not found.";

// ── Schemas ───────────────────────────────────────────────────────────────────

pub struct FieldRule {
    pub field: &'static str,
    pub selector: &'static str,
}

pub struct ExtractSchema {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

/// Yahoo Finance quote page, v1 layout.
pub const STOCK_SCHEMA: ExtractSchema = ExtractSchema {
    name: "yahoo-quote-v1",
    fields: &[
        FieldRule {
            field: "previous_close",
            selector: "fin-streamer[data-field=\"regularMarketPreviousClose\"]",
        },
        FieldRule {
            field: "market_open",
            selector: "fin-streamer[data-field=\"regularMarketOpen\"]",
        },
    ],
};

/// Eventbrite detail page, v1 layout. Address is composite and handled
/// separately in [`extract_event`].
pub const EVENT_SCHEMA: ExtractSchema = ExtractSchema {
    name: "eventbrite-detail-v1",
    fields: &[
        FieldRule {
            field: "event_title",
            selector: "h1.event-title",
        },
        FieldRule {
            field: "event_date_time",
            selector: "span.date-info__full-datetime",
        },
        FieldRule {
            field: "location",
            selector: "div.location-info__address p.location-info__address-text",
        },
        FieldRule {
            field: "description",
            selector: "div.event-description__content",
        },
    ],
};

const ADDRESS_CONTAINER_SELECTOR: &str = "div.location-info__address";
const EVENT_LINK_SELECTOR: &str = "a.event-card-link";

// ── Extraction ────────────────────────────────────────────────────────────────

/// Resolve every field of a schema against the document. Missing fields map
/// to None; nothing raises.
pub fn extract(html: &str, schema: &ExtractSchema) -> HashMap<&'static str, Option<String>> {
    extract_fields(&Html::parse_document(html), schema)
}

fn extract_fields(doc: &Html, schema: &ExtractSchema) -> HashMap<&'static str, Option<String>> {
    schema
        .fields
        .iter()
        .map(|rule| (rule.field, select_text(doc, rule.selector)))
        .collect()
}

fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return None;
    };
    doc.select(&sel).next().map(element_text)
}

/// Text content with each fragment trimmed, whitespace-joined.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a full event record from a detail page. The document is parsed once
/// and shared by the schema fields and the composite address lookup.
pub fn extract_event(html: &str) -> EventRecord {
    let doc = Html::parse_document(html);
    let mut fields = extract_fields(&doc, &EVENT_SCHEMA);

    let location = fields.remove("location").flatten();
    let address = extract_address(&doc, location.as_deref());

    let description = fields
        .remove("description")
        .flatten()
        .map(|d| truncate_chars(&d, DESCRIPTION_MAX_CHARS))
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());

    EventRecord {
        event_title: fields.remove("event_title").flatten(),
        event_date_time: fields.remove("event_date_time").flatten(),
        location,
        address,
        description,
    }
}

/// The street address has no dedicated element on the source page: it is the
/// address container's text minus the venue-name sub-element's text. The
/// subtraction is a literal string replace, so this is best-effort by design.
fn extract_address(doc: &Html, location: Option<&str>) -> Option<String> {
    let container = select_text(doc, ADDRESS_CONTAINER_SELECTOR)?;

    let address = match location {
        Some(name) => container.replace(name, ""),
        None => container,
    };
    let address = address.trim().to_string();

    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}

/// Hrefs of every event card on a listing page, document order, duplicates
/// included (the collector dedupes).
pub fn extract_event_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(sel) = Selector::parse(EVENT_LINK_SELECTOR) else {
        return Vec::new();
    };

    doc.select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .map(|h| h.to_string())
        .collect()
}

/// First `max` characters, whole string if shorter.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

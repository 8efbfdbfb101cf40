pub mod collector;
pub mod extract;
pub mod http_client;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::models::{EventCollection, StockSnapshot};

use self::collector::{collect, dedupe_and_cap};
use self::extract::{extract, extract_event, extract_event_links, STOCK_SCHEMA};
use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable dataset source abstraction.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_stock(&self) -> Result<StockSnapshot>;
    async fn fetch_events(&self) -> Result<EventCollection>;
}

// ── Web scraper ───────────────────────────────────────────────────────────────

pub struct WebSource {
    client: Arc<HttpClient>,
    config: ScraperConfig,
}

impl WebSource {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(HttpClient::new(config)?),
            config: config.clone(),
        })
    }
}

#[async_trait]
impl DataSource for WebSource {
    async fn fetch_stock(&self) -> Result<StockSnapshot> {
        info!("Fetching stock page {}", self.config.stock_url);

        let html = self
            .client
            .get_text(&self.config.stock_url)
            .await
            .context("Failed to fetch stock page")?;

        let mut fields = extract(&html, &STOCK_SCHEMA);

        // Both quote fields or nothing: a half-populated snapshot is worse
        // than keeping the previous one.
        let (Some(previous_close), Some(market_open)) = (
            fields.remove("previous_close").flatten(),
            fields.remove("market_open").flatten(),
        ) else {
            bail!("Stock page missing quote fields (layout change?)");
        };

        Ok(StockSnapshot {
            previous_close,
            market_open,
            last_updated: Utc::now(),
        })
    }

    async fn fetch_events(&self) -> Result<EventCollection> {
        info!("Fetching event listing {}", self.config.events_url);

        let html = self
            .client
            .get_text(&self.config.events_url)
            .await
            .context("Failed to fetch event listing page")?;

        let links = extract_event_links(&html);
        let urls = dedupe_and_cap(links, self.config.max_event_pages);
        debug!("{} event detail pages to fetch", urls.len());

        let client = Arc::clone(&self.client);
        let events = collect(urls, move |url| {
            let client = Arc::clone(&client);
            async move {
                let html = client
                    .get_text(&url)
                    .await
                    .context("Failed to fetch event detail page")?;
                Ok(extract_event(&html))
            }
        })
        .await;

        if events.is_empty() {
            bail!("No event detail pages survived the cycle");
        }

        info!("Collected {} events", events.len());
        Ok(EventCollection {
            events,
            last_updated: Utc::now(),
        })
    }
}

//! Concurrent fan-out over event detail URLs.
//!
//! One cycle dispatches at most `cap` fetches (after dedup) so a single
//! refresh never hammers the source site. A failed item drops out of the
//! result list; the collection as a whole never fails.

use std::collections::HashSet;
use std::future::Future;
use tracing::{error, warn};

/// Drop duplicate URLs (first occurrence wins) and truncate to `cap`.
pub fn dedupe_and_cap(urls: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| seen.insert(u.clone()))
        .take(cap)
        .collect()
}

/// Run `op` for every URL concurrently and keep only the successes.
pub async fn collect<T, F, Fut>(urls: Vec<String>, op: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(urls.len());
    for url in urls {
        let fut = op(url.clone());
        handles.push((url, tokio::spawn(fut)));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (url, handle) in handles {
        match handle.await {
            Ok(Ok(item)) => results.push(item),
            Ok(Err(e)) => warn!("{}: {:#}", url, e),
            Err(e) => error!("Task panic for {}: {}", url, e),
        }
    }

    results
}

//! Page fetches with caller-driven cancellation.

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, ScrapeError};

/// GET `url` and return the response body. Transport failures and non-2xx
/// statuses surface as errors; the caller decides whether that aborts one
/// tournament or the whole run. The in-flight request is abandoned as soon
/// as `cancel` fires.
pub async fn fetch_page(client: &Client, url: &str, cancel: &CancellationToken) -> Result<String> {
    debug!(url, "fetching page");
    let resp = tokio::select! {
        _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
        resp = client.get(url).send() => resp?,
    };
    if !resp.status().is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    Ok(resp.text().await?)
}

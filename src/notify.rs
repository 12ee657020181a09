//! Run-completion announcement to the bot relay.

use reqwest::Client;
use tracing::{info, warn};

use crate::types::RunSummary;

/// Fire and forget: report the finished run to the relay endpoint, if one is
/// configured. Failures are logged and swallowed; the scrape result stands
/// either way.
pub async fn announce_completion(client: &Client, relay_url: Option<&str>, summary: &RunSummary) {
    let Some(url) = relay_url else {
        return;
    };

    let body = serde_json::json!({
        "message": format!("Scheduled scrape complete, bot information is up to date. ({summary})"),
        "summary": summary,
    });

    match client.post(url).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => info!(url, "run summary relayed"),
        Ok(resp) => warn!(url, status = %resp.status(), "relay rejected the run summary"),
        Err(e) => warn!(url, error = %e, "failed to reach the relay"),
    }
}

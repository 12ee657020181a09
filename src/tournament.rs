//! Tournament enumeration: which tournament ids a run will walk.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;

use crate::config::REBUILD_TOURNAMENT_IDS;
use crate::error::{Result, ScrapeError};
use crate::fetch;

/// Ids of the `count` most recent tournaments, newest first, read off the
/// tournament index page. Zero rows means the stats pages are not visible to
/// this account, which invalidates the whole run rather than one tournament.
pub async fn recent_ids(
    client: &Client,
    base_url: &str,
    count: usize,
    cancel: &CancellationToken,
) -> Result<Vec<i64>> {
    let url = format!("{base_url}/stats?tournamentstats=1");
    let html = fetch::fetch_page(client, &url, cancel).await?;
    let ids = parse_tournament_index(&html, count);
    if ids.is_empty() {
        return Err(ScrapeError::EmptyResults {
            context: "tournament index".to_string(),
        });
    }
    Ok(ids)
}

/// First numeric run of the first anchor in each of the top `count` rows.
pub fn parse_tournament_index(html: &str, count: usize) -> Vec<i64> {
    let doc = Html::parse_document(html);
    let row = Selector::parse("table tbody tr").unwrap();
    let link = Selector::parse("td a[href]").unwrap();
    let number = Regex::new(r"[0-9]+").unwrap();

    doc.select(&row)
        .take(count)
        .filter_map(|r| {
            let href = r.select(&link).next()?.value().attr("href")?;
            number.find(href)?.as_str().parse().ok()
        })
        .collect()
}

/// The curated ascending id list for a full rebuild.
pub fn full_rebuild_ids() -> Vec<i64> {
    REBUILD_TOURNAMENT_IDS.to_vec()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

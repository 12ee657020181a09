//! Drives one scrape run: roster sync, tournament enumeration, page walking.

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::Store;
use crate::error::{Result, ScrapeError};
use crate::fetch;
use crate::ingest::IngestionWriter;
use crate::parse;
use crate::roster;
use crate::tournament;
use crate::types::RunSummary;

/// Which tournaments a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// The configured number of most recent tournaments.
    Recent,
    /// The curated full historical range.
    FullRebuild,
}

pub struct Pipeline<'a> {
    cfg: Config,
    client: Client,
    store: &'a Store,
}

impl<'a> Pipeline<'a> {
    pub fn new(cfg: Config, client: Client, store: &'a Store) -> Self {
        Self { cfg, client, store }
    }

    /// Run the full pipeline. Per-tournament failures are logged and the walk
    /// moves on; only enumeration failures end the run early. Cancellation
    /// stops cleanly between pages, still reporting the summary so far.
    pub async fn run(&self, mode: RunMode, cancel: &CancellationToken) -> Result<RunSummary> {
        roster::sync(
            &self.client,
            self.store,
            &self.cfg.base_url,
            self.cfg.rating_base,
            cancel,
        )
        .await?;

        let ids = match mode {
            RunMode::Recent => {
                tournament::recent_ids(
                    &self.client,
                    &self.cfg.base_url,
                    self.cfg.recent_tournaments,
                    cancel,
                )
                .await?
            }
            RunMode::FullRebuild => tournament::full_rebuild_ids(),
        };
        info!(tournaments = ids.len(), ?mode, "starting scrape");

        let writer = IngestionWriter::new(self.store, self.cfg.rating_base, self.cfg.rating_k);
        let mut summary = RunSummary::default();

        for id in ids {
            match self
                .walk_tournament(&writer, id, &mut summary, cancel)
                .await
            {
                Ok(()) => {}
                Err(ScrapeError::Cancelled) => {
                    warn!(tournament = id, "scrape cancelled");
                    break;
                }
                Err(e) => {
                    // This tournament is abandoned; the rest of the run goes on.
                    error!(tournament = id, error = %e, "tournament walk failed");
                }
            }
        }

        info!(%summary, "scrape finished");
        Ok(summary)
    }

    /// Walk one tournament's result pages until the pagination runs out.
    async fn walk_tournament(
        &self,
        writer: &IngestionWriter<'_>,
        tournament_id: i64,
        summary: &mut RunSummary,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}/stats?tournament_id={}&page={}",
                self.cfg.base_url, tournament_id, page
            );
            let html = fetch::fetch_page(&self.client, &url, cancel).await?;
            let parsed = parse::parse_results_page(&html, self.cfg.min_match_id);

            if parsed.rows.is_empty() {
                return Err(ScrapeError::EmptyResults {
                    context: format!("tournament {tournament_id} page {page}"),
                });
            }

            let before = *summary;
            for (index, row) in parsed.rows.iter().enumerate() {
                match row {
                    Ok(pm) => writer.ingest_row(pm, summary).await,
                    Err(e) => {
                        warn!(tournament = tournament_id, page, row = index, error = %e, "skipping row");
                    }
                }
            }
            info!(
                tournament = tournament_id,
                page,
                skipped = summary.skipped - before.skipped,
                new = summary.ingested - before.ingested,
                failed = summary.failed - before.failed,
                "page processed"
            );

            if !parsed.has_next {
                return Ok(());
            }
            page += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Durable, deduplicated recording of parsed matches.

use tracing::{debug, warn};

use crate::db::{store, Store};
use crate::error::Result;
use crate::rating;
use crate::types::{Fighter, ParsedMatch, RunSummary};

/// Writes validated match rows into storage, updating both fighters' ratings
/// and wager totals in the same transaction as the match insert.
pub struct IngestionWriter<'a> {
    store: &'a Store,
    rating_base: f64,
    rating_k: f64,
}

impl<'a> IngestionWriter<'a> {
    pub fn new(store: &'a Store, rating_base: f64, rating_k: f64) -> Self {
        Self {
            store,
            rating_base,
            rating_k,
        }
    }

    /// Record one match. An already-known id counts as skipped and a failed
    /// write counts as failed; neither stops the caller's loop.
    pub async fn ingest_row(&self, pm: &ParsedMatch, summary: &mut RunSummary) {
        match self.try_ingest(pm).await {
            Ok(true) => summary.ingested += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                summary.failed += 1;
                warn!(match_id = pm.match_id, error = %e, "failed to record match");
            }
        }
    }

    /// Ok(false) means the id was already recorded and nothing changed.
    async fn try_ingest(&self, pm: &ParsedMatch) -> Result<bool> {
        if self.store.match_exists(pm.match_id).await? {
            return Ok(false);
        }

        let mut red = self
            .store
            .load_or_create_fighter(&pm.red, self.rating_base)
            .await?;
        let mut blue = self
            .store
            .load_or_create_fighter(&pm.blue, self.rating_base)
            .await?;

        red.total_bets += pm.red_bets;
        blue.total_bets += pm.blue_bets;

        // Both deltas come from the pre-update snapshot; neither side's new
        // rating feeds the other's calculation.
        let (red_delta, blue_delta) =
            rating::deltas(red.rating, blue.rating, pm.winner, self.rating_k);
        red.rating += red_delta;
        blue.rating += blue_delta;

        self.persist(&red, &blue, pm).await?;
        debug!(match_id = pm.match_id, red = %red.name, blue = %blue.name, winner = %pm.winner, "match recorded");
        Ok(true)
    }

    /// The atomic unit: both fighter updates and the match insert commit
    /// together or not at all. A dropped transaction rolls back.
    async fn persist(&self, red: &Fighter, blue: &Fighter, pm: &ParsedMatch) -> Result<()> {
        let mut tx = self.store.pool().begin().await?;
        store::update_fighter_tx(&mut tx, red).await?;
        store::update_fighter_tx(&mut tx, blue).await?;
        store::insert_match_tx(&mut tx, pm, red.id, blue.id).await?;
        tx.commit().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! SQLite-backed fighter and match storage.

use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

use crate::db::models::{FighterRow, MatchRow};
use crate::error::Result;
use crate::types::{Fighter, ParsedMatch};

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database file and bring the schema
    /// current.
    pub async fn open(db_path: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{db_path}?mode=rwc"))
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection, because every new
    /// `:memory:` connection would otherwise see a fresh empty schema.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn fighter_by_name(&self, name: &str) -> Result<Option<Fighter>> {
        let row = sqlx::query_as::<_, FighterRow>(
            "SELECT id, character_id, name, tier, rating, total_bets \
             FROM fighters WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Fighter::from))
    }

    pub async fn fighter_by_character_id(&self, character_id: i64) -> Result<Option<Fighter>> {
        let row = sqlx::query_as::<_, FighterRow>(
            "SELECT id, character_id, name, tier, rating, total_bets \
             FROM fighters WHERE character_id = ?",
        )
        .bind(character_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Fighter::from))
    }

    /// Fetch the fighter named `name`, creating it with the baseline rating,
    /// zero wagers and no tier if it has never been seen before.
    pub async fn load_or_create_fighter(&self, name: &str, baseline: f64) -> Result<Fighter> {
        if let Some(f) = self.fighter_by_name(name).await? {
            return Ok(f);
        }
        let result = sqlx::query(
            "INSERT INTO fighters (character_id, name, tier, rating, total_bets) \
             VALUES (NULL, ?, 0, ?, 0)",
        )
        .bind(name)
        .bind(baseline)
        .execute(&self.pool)
        .await?;
        Ok(Fighter {
            id: result.last_insert_rowid(),
            character_id: None,
            name: name.to_string(),
            tier: 0,
            rating: baseline,
            total_bets: 0,
        })
    }

    /// Create (`id == 0`) or update a fighter row. Returns the row id.
    pub async fn save_fighter(&self, f: &Fighter) -> Result<i64> {
        if f.id == 0 {
            let result = sqlx::query(
                "INSERT INTO fighters (character_id, name, tier, rating, total_bets) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(f.character_id)
            .bind(&f.name)
            .bind(f.tier)
            .bind(f.rating)
            .bind(f.total_bets)
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        } else {
            sqlx::query(
                "UPDATE fighters SET character_id = ?, name = ?, tier = ?, rating = ?, \
                 total_bets = ? WHERE id = ?",
            )
            .bind(f.character_id)
            .bind(&f.name)
            .bind(f.tier)
            .bind(f.rating)
            .bind(f.total_bets)
            .bind(f.id)
            .execute(&self.pool)
            .await?;
            Ok(f.id)
        }
    }

    /// Reset every fighter's rating to `base`. Returns the row count.
    pub async fn reset_ratings(&self, base: f64) -> Result<u64> {
        let result = sqlx::query("UPDATE fighters SET rating = ?")
            .bind(base)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// The dedup check: has this match id already been recorded?
    pub async fn match_exists(&self, match_id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM matches WHERE match_id = ?")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn match_by_id(&self, match_id: i64) -> Result<Option<MatchRow>> {
        let row = sqlx::query_as::<_, MatchRow>(
            "SELECT match_id, red_id, blue_id, red_bets, blue_bets, bet_count, winner, \
             created_at, updated_at FROM matches WHERE match_id = ?",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

/// Persist a fighter's mutated fields inside an open transaction.
pub async fn update_fighter_tx(tx: &mut Transaction<'_, Sqlite>, f: &Fighter) -> Result<()> {
    sqlx::query(
        "UPDATE fighters SET character_id = ?, name = ?, tier = ?, rating = ?, \
         total_bets = ? WHERE id = ?",
    )
    .bind(f.character_id)
    .bind(&f.name)
    .bind(f.tier)
    .bind(f.rating)
    .bind(f.total_bets)
    .bind(f.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Insert a match row inside an open transaction. Fails on a duplicate id,
/// which is what keeps two concurrent runs from double-counting a match.
pub async fn insert_match_tx(
    tx: &mut Transaction<'_, Sqlite>,
    pm: &ParsedMatch,
    red_id: i64,
    blue_id: i64,
) -> Result<()> {
    let now = now_secs();
    sqlx::query(
        "INSERT INTO matches (match_id, red_id, blue_id, red_bets, blue_bets, bet_count, \
         winner, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(pm.match_id)
    .bind(red_id)
    .bind(blue_id)
    .bind(pm.red_bets)
    .bind(pm.blue_bets)
    .bind(pm.bettors)
    .bind(pm.winner.as_i64())
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Row types for the two persisted tables. Used by sqlx for typed queries.

use crate::types::Fighter;

/// `fighters` table row.
#[derive(Debug, sqlx::FromRow)]
pub struct FighterRow {
    pub id: i64,
    pub character_id: Option<i64>,
    pub name: String,
    pub tier: i64,
    pub rating: f64,
    pub total_bets: i64,
}

impl From<FighterRow> for Fighter {
    fn from(row: FighterRow) -> Self {
        Fighter {
            id: row.id,
            character_id: row.character_id,
            name: row.name,
            tier: row.tier,
            rating: row.rating,
            total_bets: row.total_bets,
        }
    }
}

/// `matches` table row.
#[derive(Debug, sqlx::FromRow)]
pub struct MatchRow {
    pub match_id: i64,
    pub red_id: i64,
    pub blue_id: i64,
    pub red_bets: i64,
    pub blue_bets: i64,
    pub bet_count: i64,
    /// 1 = red, 2 = blue.
    pub winner: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

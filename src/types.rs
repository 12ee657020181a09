use serde::Serialize;

// ---------------------------------------------------------------------------
// Fighter
// ---------------------------------------------------------------------------

/// A rostered (or match-discovered) fighter and its running rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Fighter {
    /// Local row id; 0 until the fighter has been saved.
    pub id: i64,
    /// Stable id assigned by the site. Unknown until a roster sync sees the
    /// fighter, which happens eventually for everyone who keeps fighting.
    pub character_id: Option<i64>,
    pub name: String,
    /// Tier ordinal from the compendium listing; 0 until rostered.
    pub tier: i64,
    pub rating: f64,
    /// Cumulative wager total across all recorded matches.
    pub total_bets: i64,
}

/// One compendium tier-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub character_id: i64,
    pub tier: i64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Red,
    Blue,
}

impl Winner {
    /// Storage encoding: 1 = red, 2 = blue.
    pub fn as_i64(self) -> i64 {
        match self {
            Winner::Red => 1,
            Winner::Blue => 2,
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Red => write!(f, "red"),
            Winner::Blue => write!(f, "blue"),
        }
    }
}

/// One fully validated result row, ready for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMatch {
    pub match_id: i64,
    pub red: String,
    pub blue: String,
    pub red_bets: i64,
    pub blue_bets: i64,
    /// Distinct wagering participants in this match.
    pub bettors: i64,
    pub winner: Winner,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Per-run ingestion counters. Transient; reported in the completion log
/// line and the relay announcement, never persisted.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RunSummary {
    pub skipped: u64,
    pub ingested: u64,
    pub failed: u64,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "skipped: {} | new: {} | failed: {}",
            self.skipped, self.ingested, self.failed
        )
    }
}

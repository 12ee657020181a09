use crate::error::{Result, ScrapeError};

pub const BASE_URL: &str = "https://www.saltybet.com";

/// First match id assigned under matchmaking. Everything below it belongs to
/// the site's early non-competitive era and is rejected at parse time.
pub const MATCHMAKING_CUTOFF_ID: i64 = 51_966;

/// Known-valid tournament ids for a full rebuild. The id space is not
/// contiguous and everything before 101 predates matchmaking, so the range
/// is curated rather than probed.
pub const REBUILD_TOURNAMENT_IDS: &[i64] = &[
    101, 102, 103, 104, 105, 106, 107, 108, 109, 110, 111, 112, 113, 114, 115, 116, 117,
];

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub log_level: String,
    pub db_path: String,
    /// How many tournaments back a normal run scrapes (RECENT_TOURNAMENTS).
    pub recent_tournaments: usize,
    /// Rating assigned to a fighter on first sight (RATING_BASE).
    pub rating_base: f64,
    /// K-factor for rating updates (RATING_K).
    pub rating_k: f64,
    /// Match ids below this are rejected as pre-matchmaking (MIN_MATCH_ID).
    pub min_match_id: i64,
    /// Endpoint for the run-completion announcement (BOT_RELAY_URL).
    /// Unset means no announcement is sent.
    pub bot_relay_url: Option<String>,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("SALTY_BASE_URL").unwrap_or_else(|_| BASE_URL.to_string()),
            email: std::env::var("SALTY_EMAIL")
                .map_err(|_| ScrapeError::Config("SALTY_EMAIL must be set".to_string()))?,
            password: std::env::var("SALTY_PASSWORD")
                .map_err(|_| ScrapeError::Config("SALTY_PASSWORD must be set".to_string()))?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "saltmine.db".to_string()),
            recent_tournaments: std::env::var("RECENT_TOURNAMENTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<usize>()
                .unwrap_or(5),
            rating_base: std::env::var("RATING_BASE")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<f64>()
                .unwrap_or(300.0),
            rating_k: std::env::var("RATING_K")
                .unwrap_or_else(|_| "32".to_string())
                .parse::<f64>()
                .unwrap_or(32.0),
            min_match_id: std::env::var("MIN_MATCH_ID")
                .unwrap_or_else(|_| MATCHMAKING_CUTOFF_ID.to_string())
                .parse::<i64>()
                .unwrap_or(MATCHMAKING_CUTOFF_ID),
            bot_relay_url: std::env::var("BOT_RELAY_URL").ok().filter(|s| !s.is_empty()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30),
        })
    }
}

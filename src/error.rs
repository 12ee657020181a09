use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("login rejected for {email}")]
    AuthFailed { email: String },

    #[error("no rows in {context}; has the illuminati subscription run out?")]
    EmptyResults { context: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("scrape cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Why a single result row was rejected. These skip the row only; they never
/// abort a page or a run. Checks run in declaration order and the first
/// failure is the one reported.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("unable to parse a match id")]
    MissingId,

    #[error("red or blue fighter name is empty")]
    EmptyName,

    #[error("declared winner {declared:?} matches neither side")]
    NoWinner { declared: String },

    #[error("match {id} predates matchmaking (cutoff {cutoff})")]
    PreMatchmaking { id: i64, cutoff: i64 },
}

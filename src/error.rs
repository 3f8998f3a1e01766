use thiserror::Error;

/// Everything that can go wrong while scraping one page or one game.
/// None of these abort a run; the pipeline logs them and skips the unit of work.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("no __NEXT_DATA__ block found in page")]
    MarkerNotFound,

    #[error("embedded JSON is malformed: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("expected field `{0}` is missing from page data")]
    MissingField(&'static str),

    #[error("no oddsViews array found at any known location")]
    ShapeMismatch,

    #[error("sportsbook `{0}` not present in line history")]
    BookmakerNotFound(String),

    #[error("game row could not be read: {0}")]
    InvalidRow(#[source] serde_json::Error),
}

impl ScrapeError {
    /// Transport-level failures (as opposed to page-content problems)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::Status { .. }
        )
    }
}

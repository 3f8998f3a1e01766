pub mod sbr_client;

pub use sbr_client::SbrClient;

use crate::error::ScrapeError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Where the pipeline gets its raw pages from.
///
/// `SbrClient` talks to the live site; tests plug in canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// HTML of the odds listings page for one date
    async fn fetch_listing(&self, date: NaiveDate) -> Result<String, ScrapeError>;

    /// HTML of the line-history page for one game
    async fn fetch_line_history(&self, game_id: &str) -> Result<String, ScrapeError>;
}

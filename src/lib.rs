pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use config::ScraperConfig;
pub use error::ScrapeError;
pub use models::*;
pub use pipeline::{fetch_odds_board, fetch_odds_board_for, target_dates, OddsBoard, OddsPipeline};
pub use scrapers::*;
pub use utils::*;

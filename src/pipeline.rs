use crate::api::{PageSource, SbrClient};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::models::{BookmakerQuoteSet, GameListing, OddsRecord};
use crate::scrapers::line_history::bookmaker_quotes;
use crate::scrapers::listings::game_rows;
use crate::scrapers::next_data::extract_next_data;
use crate::utils::normalize::normalize;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of one scraping run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsBoard {
    pub dates: Vec<NaiveDate>,
    pub fetched_at: DateTime<Utc>,
    /// Listing order within each date, dates in the order requested
    pub records: Vec<OddsRecord>,
}

impl OddsBoard {
    pub fn games_with_odds(&self) -> usize {
        self.records.iter().filter(|r| r.has_odds()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Today in `tz` followed by the next `days_ahead` days
pub fn target_dates(now: DateTime<Utc>, tz: Tz, days_ahead: u32) -> Vec<NaiveDate> {
    now.with_timezone(&tz)
        .date_naive()
        .iter_days()
        .take(days_ahead as usize + 1)
        .collect()
}

/// Walks dates, then games, one request at a time, turning every game into
/// an `OddsRecord`. A failing date is skipped; a failing game still yields a
/// record, just without odds.
pub struct OddsPipeline<S> {
    source: S,
    bookmaker: String,
}

impl<S: PageSource> OddsPipeline<S> {
    pub fn new(source: S, bookmaker: impl Into<String>) -> Self {
        Self {
            source,
            bookmaker: bookmaker.into(),
        }
    }

    pub async fn run(&self, dates: &[NaiveDate]) -> OddsBoard {
        let mut records = Vec::new();

        for &date in dates {
            let rows = match self.listings(date).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(%date, "Skipping date: {}", e);
                    continue;
                }
            };

            if rows.is_empty() {
                info!(%date, "No games listed");
                continue;
            }
            info!(%date, games = rows.len(), "Loaded listings");

            for row in rows {
                let listing = match row {
                    Ok(listing) => listing,
                    Err(e) => {
                        warn!(%date, "Skipping game row: {}", e);
                        continue;
                    }
                };

                let quotes = match self.quotes(&listing).await {
                    Ok(quotes) => Some(quotes),
                    Err(e) => {
                        warn!(
                            %date,
                            game_id = listing.game_id.as_deref().unwrap_or("?"),
                            transport = e.is_transport(),
                            "No {} odds: {}",
                            self.bookmaker,
                            e
                        );
                        None
                    }
                };

                records.push(normalize(date, &listing, quotes.as_ref()));
            }
        }

        let board = OddsBoard {
            dates: dates.to_vec(),
            fetched_at: Utc::now(),
            records,
        };
        info!(
            games = board.records.len(),
            with_odds = board.games_with_odds(),
            "Scrape finished"
        );
        board
    }

    /// Listing rows for one date, each parsed on its own so one bad row
    /// does not take the others with it
    async fn listings(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Result<GameListing, ScrapeError>>, ScrapeError> {
        let html = self.source.fetch_listing(date).await?;
        let next_data = extract_next_data(&html)?;
        Ok(game_rows(&next_data)?
            .iter()
            .map(GameListing::from_row)
            .collect())
    }

    async fn quotes(&self, listing: &GameListing) -> Result<BookmakerQuoteSet, ScrapeError> {
        let game_id = listing
            .game_id
            .as_deref()
            .ok_or(ScrapeError::MissingField("gameView.gameId"))?;
        let html = self.source.fetch_line_history(game_id).await?;
        let payload = extract_next_data(&html)?;
        bookmaker_quotes(&payload, &self.bookmaker)
    }
}

/// Scrape the configured dates from the live site
pub async fn fetch_odds_board(config: &ScraperConfig) -> Result<OddsBoard> {
    let dates = target_dates(Utc::now(), config.timezone, config.days_ahead);
    fetch_odds_board_for(config, &dates).await
}

/// Scrape specific dates from the live site
pub async fn fetch_odds_board_for(config: &ScraperConfig, dates: &[NaiveDate]) -> Result<OddsBoard> {
    let client = SbrClient::new(config)?;
    let pipeline = OddsPipeline::new(client, config.bookmaker.clone());
    Ok(pipeline.run(dates).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    fn page(data: &Value) -> String {
        format!(
            r#"<html><body><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
            data
        )
    }

    fn listing_page(game_ids: &[u64]) -> String {
        let rows: Vec<Value> = game_ids
            .iter()
            .map(|id| {
                json!({
                    "gameView": {
                        "gameId": id,
                        "startDate": "2024-05-01T23:05:00+00:00",
                        "venueName": format!("Park {}", id),
                        "city": "Springfield",
                        "state": "IL",
                        "awayTeam": { "fullName": format!("Away {}", id), "shortName": "AWY", "nickname": "Visitors", "name": "away" },
                        "homeTeam": { "fullName": format!("Home {}", id), "shortName": "HOM", "nickname": "Hosts", "name": "home" },
                        "gameStatusText": "7:05 PM ET",
                        "consensus": null
                    }
                })
            })
            .collect();

        page(&json!({
            "props": { "pageProps": { "oddsTables": [ { "oddsTableModel": { "gameRows": rows } } ] } }
        }))
    }

    fn line_history_page(away_ml: i32) -> String {
        page(&json!({
            "props": { "pageProps": { "lineHistoryModel": { "oddsViews": [
                {
                    "sportsbook": "draftkings",
                    "moneyLineHistory": [{ "awayOdds": 999, "homeOdds": -999, "oddsDate": "2024-05-01T09:00:00" }]
                },
                {
                    "sportsbook": "FanDuel",
                    "moneyLineHistory": [
                        { "awayOdds": away_ml + 10, "homeOdds": -130, "oddsDate": "2024-04-30T12:00:00" },
                        { "awayOdds": away_ml, "homeOdds": -120, "oddsDate": "2024-05-01T09:00:00" }
                    ],
                    "spreadHistory": [
                        { "awaySpread": 1.5, "awayOdds": -180, "homeSpread": -1.5, "homeOdds": 150, "oddsDate": "2024-05-01T08:00:00" }
                    ],
                    "totalHistory": [
                        { "total": 8.5, "overOdds": -110, "underOdds": -110, "oddsDate": "2024-05-01T11:00:00" }
                    ]
                }
            ] } } }
        }))
    }

    #[derive(Default)]
    struct FakeSource {
        listings: HashMap<NaiveDate, String>,
        histories: HashMap<String, String>,
        timeouts: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn fetch_listing(&self, date: NaiveDate) -> Result<String, ScrapeError> {
            self.calls.lock().unwrap().push(format!("listing:{}", date));
            self.listings
                .get(&date)
                .cloned()
                .ok_or_else(|| ScrapeError::Status {
                    url: format!("listing/{}", date),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
        }

        async fn fetch_line_history(&self, game_id: &str) -> Result<String, ScrapeError> {
            self.calls.lock().unwrap().push(format!("history:{}", game_id));
            if self.timeouts.contains(game_id) {
                return Err(ScrapeError::Timeout {
                    url: format!("line-history/{}", game_id),
                });
            }
            self.histories
                .get(game_id)
                .cloned()
                .ok_or(ScrapeError::MarkerNotFound)
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_target_dates_follow_time_zone() {
        // 02:30 UTC on May 2 is still May 1 in New York
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 2, 30, 0).unwrap();
        let dates = target_dates(now, chrono_tz::America::New_York, 1);
        assert_eq!(dates, vec![date(1), date(2)]);

        let dates = target_dates(now, chrono_tz::Etc::UTC, 0);
        assert_eq!(dates, vec![date(2)]);
    }

    #[tokio::test]
    async fn test_failed_game_keeps_neighbours() {
        let mut source = FakeSource::default();
        source.listings.insert(date(1), listing_page(&[1, 2, 3]));
        source.histories.insert("1".into(), line_history_page(110));
        source.histories.insert("3".into(), line_history_page(130));
        source.timeouts.insert("2".into());

        let board = OddsPipeline::new(source, "fanduel").run(&[date(1)]).await;

        assert_eq!(board.records.len(), 3);
        assert!(board.records[0].has_odds());
        assert!(!board.records[1].has_odds());
        assert!(board.records[2].has_odds());

        let failed = &board.records[1];
        assert_eq!(failed.game_id.as_deref(), Some("2"));
        assert_eq!(failed.venue, "Park 2");
        assert_eq!(failed.away_team_full, "Away 2");
        assert_eq!(failed.last_line_update, None);

        let ok = &board.records[2];
        assert_eq!(ok.ml_opening_away, Some(140));
        assert_eq!(ok.ml_current_away, Some(130));
        assert_eq!(ok.rl_current_home_spread, Some(-1.5));
        assert_eq!(ok.total_current_line, Some(8.5));
        assert_eq!(ok.last_line_update.as_deref(), Some("2024-05-01T11:00:00"));
    }

    #[tokio::test]
    async fn test_two_dates_one_timeout() {
        let mut source = FakeSource::default();
        source.listings.insert(date(1), listing_page(&[101, 102]));
        source.listings.insert(date(2), listing_page(&[201, 202]));
        for id in ["101", "102", "201", "202"] {
            source.histories.insert(id.into(), line_history_page(105));
        }
        source.timeouts.insert("201".into());

        let board = OddsPipeline::new(source, "fanduel")
            .run(&[date(1), date(2)])
            .await;

        assert_eq!(board.records.len(), 4);
        assert_eq!(board.games_with_odds(), 3);

        let ids: Vec<_> = board
            .records
            .iter()
            .map(|r| r.game_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["101", "102", "201", "202"]);
        assert_eq!(board.records[2].date, date(2));

        let timed_out = &board.records[2];
        assert!(!timed_out.has_odds());
        assert_eq!(timed_out.home_team_full, "Home 201");
        assert_eq!(timed_out.home_team_short, "HOM");
        assert_eq!(timed_out.start_date, "2024-05-01T23:05:00+00:00");
    }

    #[tokio::test]
    async fn test_failed_date_is_skipped() {
        let mut source = FakeSource::default();
        source.listings.insert(date(2), listing_page(&[7]));
        source.histories.insert("7".into(), line_history_page(100));

        let board = OddsPipeline::new(source, "fanduel")
            .run(&[date(1), date(2)])
            .await;

        assert_eq!(board.records.len(), 1);
        assert_eq!(board.records[0].date, date(2));
        assert_eq!(board.dates, vec![date(1), date(2)]);
    }

    #[tokio::test]
    async fn test_requests_are_sequential_and_ordered() {
        let mut source = FakeSource::default();
        source.listings.insert(date(1), listing_page(&[1, 2]));
        source.listings.insert(date(2), listing_page(&[3]));

        let pipeline = OddsPipeline::new(source, "fanduel");
        pipeline.run(&[date(1), date(2)]).await;

        let calls = pipeline.source.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "listing:2024-05-01",
                "history:1",
                "history:2",
                "listing:2024-05-02",
                "history:3",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_games_are_kept() {
        let mut source = FakeSource::default();
        source.listings.insert(date(1), listing_page(&[5]));
        source.listings.insert(date(2), listing_page(&[5]));
        source.histories.insert("5".into(), line_history_page(100));

        let board = OddsPipeline::new(source, "fanduel")
            .run(&[date(1), date(2)])
            .await;

        assert_eq!(board.records.len(), 2);
        assert_eq!(board.records[0].game_id, board.records[1].game_id);
    }

    #[tokio::test]
    async fn test_bad_rows_and_missing_ids() {
        let data = json!({
            "props": { "pageProps": { "oddsTables": [ { "oddsTableModel": { "gameRows": [
                "garbage",
                { "gameView": { "venueName": "No Id Park" } }
            ] } } ] } }
        });
        let mut source = FakeSource::default();
        source.listings.insert(date(1), page(&data));

        let pipeline = OddsPipeline::new(source, "fanduel");
        let board = pipeline.run(&[date(1)]).await;

        assert_eq!(board.records.len(), 1);
        assert_eq!(board.records[0].venue, "No Id Park");
        assert!(!board.records[0].has_odds());

        // No id, no line-history request
        let calls = pipeline.source.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["listing:2024-05-01"]);
    }

    #[tokio::test]
    async fn test_page_without_embedded_data() {
        let mut source = FakeSource::default();
        source
            .listings
            .insert(date(1), "<html><body>maintenance</body></html>".to_string());

        let board = OddsPipeline::new(source, "fanduel").run(&[date(1)]).await;
        assert!(board.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_odds_board_live() {
        let board = fetch_odds_board(&ScraperConfig::default()).await.unwrap();
        println!(
            "Fetched {} games ({} with odds)",
            board.records.len(),
            board.games_with_odds()
        );
    }
}

use super::PageSource;
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Client for the sportsbookreview.com odds pages.
///
/// Sends browser-like headers and keeps cookies between requests, the way a
/// single browser session would.
pub struct SbrClient {
    client: reqwest::Client,
    base_url: String,
    sport_path: String,
    listing_timeout: Duration,
    line_history_timeout: Duration,
    min_delay: Duration,
    max_delay: Duration,
}

impl SbrClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(browser_headers())
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            sport_path: config.sport_path.clone(),
            listing_timeout: config.listing_timeout,
            line_history_timeout: config.line_history_timeout,
            min_delay: config.min_delay,
            max_delay: config.max_delay,
        })
    }

    /// `<base>/betting-odds/<sport>/?date=YYYY-MM-DD`
    pub fn listing_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/betting-odds/{}/?date={}",
            self.base_url,
            self.sport_path,
            date.format("%Y-%m-%d")
        )
    }

    /// `<base>/betting-odds/<sport>/line-history/<game_id>/`
    pub fn line_history_url(&self, game_id: &str) -> String {
        format!(
            "{}/betting-odds/{}/line-history/{}/",
            self.base_url, self.sport_path, game_id
        )
    }

    fn politeness_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let secs =
            rand::thread_rng().gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| transport_error(url, source))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        response
            .text()
            .await
            .map_err(|source| transport_error(url, source))
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> ScrapeError {
    if source.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Transport {
            url: url.to_string(),
            source,
        }
    }
}

#[async_trait]
impl PageSource for SbrClient {
    async fn fetch_listing(&self, date: NaiveDate) -> Result<String, ScrapeError> {
        let url = self.listing_url(date);
        debug!(%url, "fetching listings");
        self.get_text(&url, self.listing_timeout).await
    }

    async fn fetch_line_history(&self, game_id: &str) -> Result<String, ScrapeError> {
        let delay = self.politeness_delay();
        tokio::time::sleep(delay).await;

        let url = self.line_history_url(game_id);
        debug!(%url, delay_ms = delay.as_millis() as u64, "fetching line history");
        self.get_text(&url, self.line_history_timeout).await
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.sportsbookreview.com";
pub const DEFAULT_SPORT_PATH: &str = "mlb-baseball";
pub const DEFAULT_BOOKMAKER: &str = "fanduel";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for one scraping run: where to fetch from, how politely, and
/// which sportsbook's lines to keep.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub sport_path: String,
    /// Compared case-insensitively against each odds view's `sportsbook`
    pub bookmaker: String,
    /// Time zone that decides what "today" means
    pub timezone: Tz,
    /// Number of days after today to include
    pub days_ahead: u32,
    pub user_agent: String,
    pub listing_timeout: Duration,
    pub line_history_timeout: Duration,
    /// Bounds of the random pause taken before each line-history request
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sport_path: DEFAULT_SPORT_PATH.to_string(),
            bookmaker: DEFAULT_BOOKMAKER.to_string(),
            timezone: chrono_tz::America::New_York,
            days_ahead: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            listing_timeout: Duration::from_secs(15),
            line_history_timeout: Duration::from_secs(10),
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by `SBR_*` variables from the environment or a `.env` file
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `get` returns for each `SBR_*` key.
    /// A value that does not parse is an error, never a silent fallback.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base_url) = get("SBR_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(sport) = get("SBR_SPORT") {
            config.sport_path = sport;
        }
        if let Some(bookmaker) = get("SBR_BOOKMAKER") {
            config.bookmaker = bookmaker;
        }
        if let Some(tz) = get("SBR_TIMEZONE") {
            config.timezone = parse_timezone(&tz)?;
        }
        if let Some(days) = get("SBR_DAYS_AHEAD") {
            config.days_ahead = days
                .trim()
                .parse()
                .with_context(|| format!("SBR_DAYS_AHEAD is not a number: {}", days))?;
        }

        config.validate()
    }

    /// Normalize and sanity-check the settings
    pub fn validate(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self.sport_path = self.sport_path.trim().trim_matches('/').to_string();
        self.bookmaker = self.bookmaker.trim().to_string();

        if self.base_url.is_empty() {
            bail!("base URL must not be empty");
        }
        if self.sport_path.is_empty() {
            bail!("sport path must not be empty");
        }
        if self.bookmaker.is_empty() {
            bail!("bookmaker must not be empty");
        }
        if self.min_delay > self.max_delay {
            bail!(
                "politeness delay bounds are inverted: {:?} > {:?}",
                self.min_delay,
                self.max_delay
            );
        }

        Ok(self)
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("unknown time zone `{}`: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScraperConfig::default().validate().unwrap();
        assert_eq!(config.bookmaker, "fanduel");
        assert_eq!(config.timezone, chrono_tz::America::New_York);
        assert_eq!(config.days_ahead, 1);
    }

    #[test]
    fn test_validate_trims_trailing_slashes() {
        let config = ScraperConfig {
            base_url: "https://example.com/".to_string(),
            sport_path: "/mlb-baseball/".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.sport_path, "mlb-baseball");
    }

    #[test]
    fn test_validate_rejects_inverted_delay() {
        let config = ScraperConfig {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_bookmaker() {
        let config = ScraperConfig {
            bookmaker: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(
            parse_timezone("America/Chicago").unwrap(),
            chrono_tz::America::Chicago
        );
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_applied() {
        let config = ScraperConfig::from_lookup(lookup(&[
            ("SBR_BASE_URL", "https://mirror.example.com/"),
            ("SBR_SPORT", "nba-basketball"),
            ("SBR_BOOKMAKER", "DraftKings"),
            ("SBR_TIMEZONE", "America/Los_Angeles"),
            ("SBR_DAYS_AHEAD", " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://mirror.example.com");
        assert_eq!(config.sport_path, "nba-basketball");
        assert_eq!(config.bookmaker, "DraftKings");
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.days_ahead, 3);
    }

    #[test]
    fn test_no_overrides_gives_defaults() {
        let config = ScraperConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.days_ahead, 1);
    }

    #[test]
    fn test_bad_days_ahead_is_error() {
        let result = ScraperConfig::from_lookup(lookup(&[("SBR_DAYS_AHEAD", "two")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_timezone_is_error() {
        let result = ScraperConfig::from_lookup(lookup(&[("SBR_TIMEZONE", "Mars/Olympus")]));
        assert!(result.is_err());
    }
}

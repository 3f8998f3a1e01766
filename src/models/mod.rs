use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Team descriptors as published on the listings page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamInfo {
    #[serde(deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub short_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub nickname: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
}

/// One game on the listings page for a given date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameListing {
    pub game_id: Option<String>,
    pub start_date: String,
    pub venue: String,
    pub venue_city: String,
    pub venue_state: String,
    pub away_team: TeamInfo,
    pub home_team: TeamInfo,
    pub game_status_text: String,
    pub score_away: Option<i64>,
    pub score_home: Option<i64>,
    /// Consensus betting percentages, passed through untouched
    pub consensus: Option<Value>,
}

/// Moneyline observation: one price per side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoneylineQuote {
    #[serde(deserialize_with = "lenient::odds")]
    pub away_odds: Option<i32>,
    #[serde(deserialize_with = "lenient::odds")]
    pub home_odds: Option<i32>,
    #[serde(deserialize_with = "lenient::text")]
    pub odds_date: Option<String>,
}

/// Spread (run line) observation: line and price per side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpreadQuote {
    #[serde(deserialize_with = "lenient::line")]
    pub away_spread: Option<f64>,
    #[serde(deserialize_with = "lenient::odds")]
    pub away_odds: Option<i32>,
    #[serde(deserialize_with = "lenient::line")]
    pub home_spread: Option<f64>,
    #[serde(deserialize_with = "lenient::odds")]
    pub home_odds: Option<i32>,
    #[serde(deserialize_with = "lenient::text")]
    pub odds_date: Option<String>,
}

/// Total observation: the posted number plus over/under prices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TotalQuote {
    #[serde(deserialize_with = "lenient::line")]
    pub total: Option<f64>,
    #[serde(deserialize_with = "lenient::odds")]
    pub over_odds: Option<i32>,
    #[serde(deserialize_with = "lenient::odds")]
    pub under_odds: Option<i32>,
    #[serde(deserialize_with = "lenient::text")]
    pub odds_date: Option<String>,
}

/// All quote histories published by one sportsbook for one game.
/// Histories are kept in the order the source delivered them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookmakerQuoteSet {
    #[serde(deserialize_with = "lenient::string")]
    pub sportsbook: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub money_line_history: Vec<MoneylineQuote>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub spread_history: Vec<SpreadQuote>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub total_history: Vec<TotalQuote>,
}

/// One output row: listing metadata plus opening/current snapshots per market
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub date: NaiveDate,
    pub game_id: Option<String>,
    pub start_date: String,
    pub venue: String,
    pub venue_city: String,
    pub venue_state: String,
    pub away_team_full: String,
    pub away_team_short: String,
    pub away_team_nickname: String,
    pub away_team_name: String,
    pub home_team_full: String,
    pub home_team_short: String,
    pub home_team_nickname: String,
    pub home_team_name: String,
    pub game_status_text: String,
    pub score_away: Option<i64>,
    pub score_home: Option<i64>,
    pub consensus: Option<Value>,
    pub last_line_update: Option<String>,
    // Moneyline
    pub ml_opening_away: Option<i32>,
    pub ml_opening_home: Option<i32>,
    pub ml_opening_time: Option<String>,
    pub ml_current_away: Option<i32>,
    pub ml_current_home: Option<i32>,
    pub ml_current_time: Option<String>,
    // Run line
    pub rl_opening_away_spread: Option<f64>,
    pub rl_opening_away_odds: Option<i32>,
    pub rl_opening_home_spread: Option<f64>,
    pub rl_opening_home_odds: Option<i32>,
    pub rl_opening_time: Option<String>,
    pub rl_current_away_spread: Option<f64>,
    pub rl_current_away_odds: Option<i32>,
    pub rl_current_home_spread: Option<f64>,
    pub rl_current_home_odds: Option<i32>,
    pub rl_current_time: Option<String>,
    // Total
    pub total_opening_line: Option<f64>,
    pub total_opening_over_odds: Option<i32>,
    pub total_opening_under_odds: Option<i32>,
    pub total_opening_time: Option<String>,
    pub total_current_line: Option<f64>,
    pub total_current_over_odds: Option<i32>,
    pub total_current_under_odds: Option<i32>,
    pub total_current_time: Option<String>,
}

impl OddsRecord {
    /// Column order of the tabular output
    pub const COLUMNS: [&'static str; 43] = [
        "date",
        "game_id",
        "start_date",
        "venue",
        "venue_city",
        "venue_state",
        "away_team_full",
        "away_team_short",
        "away_team_nickname",
        "away_team_name",
        "home_team_full",
        "home_team_short",
        "home_team_nickname",
        "home_team_name",
        "game_status_text",
        "score_away",
        "score_home",
        "consensus",
        "last_line_update",
        "ml_opening_away",
        "ml_opening_home",
        "ml_opening_time",
        "ml_current_away",
        "ml_current_home",
        "ml_current_time",
        "rl_opening_away_spread",
        "rl_opening_away_odds",
        "rl_opening_home_spread",
        "rl_opening_home_odds",
        "rl_opening_time",
        "rl_current_away_spread",
        "rl_current_away_odds",
        "rl_current_home_spread",
        "rl_current_home_odds",
        "rl_current_time",
        "total_opening_line",
        "total_opening_over_odds",
        "total_opening_under_odds",
        "total_opening_time",
        "total_current_line",
        "total_current_over_odds",
        "total_current_under_odds",
        "total_current_time",
    ];

    /// Render the record as one row of cells, in `COLUMNS` order.
    /// Absent values become empty cells.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            cell(&self.game_id),
            self.start_date.clone(),
            self.venue.clone(),
            self.venue_city.clone(),
            self.venue_state.clone(),
            self.away_team_full.clone(),
            self.away_team_short.clone(),
            self.away_team_nickname.clone(),
            self.away_team_name.clone(),
            self.home_team_full.clone(),
            self.home_team_short.clone(),
            self.home_team_nickname.clone(),
            self.home_team_name.clone(),
            self.game_status_text.clone(),
            cell(&self.score_away),
            cell(&self.score_home),
            self.consensus
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            cell(&self.last_line_update),
            cell(&self.ml_opening_away),
            cell(&self.ml_opening_home),
            cell(&self.ml_opening_time),
            cell(&self.ml_current_away),
            cell(&self.ml_current_home),
            cell(&self.ml_current_time),
            cell(&self.rl_opening_away_spread),
            cell(&self.rl_opening_away_odds),
            cell(&self.rl_opening_home_spread),
            cell(&self.rl_opening_home_odds),
            cell(&self.rl_opening_time),
            cell(&self.rl_current_away_spread),
            cell(&self.rl_current_away_odds),
            cell(&self.rl_current_home_spread),
            cell(&self.rl_current_home_odds),
            cell(&self.rl_current_time),
            cell(&self.total_opening_line),
            cell(&self.total_opening_over_odds),
            cell(&self.total_opening_under_odds),
            cell(&self.total_opening_time),
            cell(&self.total_current_line),
            cell(&self.total_current_over_odds),
            cell(&self.total_current_under_odds),
            cell(&self.total_current_time),
        ]
    }

    /// True if any opening/current odds field carries a value
    pub fn has_odds(&self) -> bool {
        let prices = [
            self.ml_opening_away,
            self.ml_opening_home,
            self.ml_current_away,
            self.ml_current_home,
            self.rl_opening_away_odds,
            self.rl_opening_home_odds,
            self.rl_current_away_odds,
            self.rl_current_home_odds,
            self.total_opening_over_odds,
            self.total_opening_under_odds,
            self.total_current_over_odds,
            self.total_current_under_odds,
        ];
        let lines = [
            self.rl_opening_away_spread,
            self.rl_opening_home_spread,
            self.rl_current_away_spread,
            self.rl_current_home_spread,
            self.total_opening_line,
            self.total_current_line,
        ];
        let times = [
            &self.ml_opening_time,
            &self.ml_current_time,
            &self.rl_opening_time,
            &self.rl_current_time,
            &self.total_opening_time,
            &self.total_current_time,
        ];

        prices.iter().any(Option::is_some)
            || lines.iter().any(Option::is_some)
            || times.iter().any(|t| t.is_some())
    }
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Field readers that never fail on odd upstream values: anything that is
/// not usable becomes absent instead of rejecting the whole object.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    pub fn odds<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(number(&value)
            .map(f64::round)
            .filter(|n| n.abs() <= i32::MAX as f64)
            .map(|n| n as i32))
    }

    pub fn line<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(number(&value))
    }

    pub fn score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match &value {
            Value::Number(n) => n.as_i64().or_else(|| {
                number(&value)
                    .filter(|f| f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        text(d).map(Option::unwrap_or_default)
    }

    /// Ids show up as numbers on some pages and strings on others
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(match value {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
    }

    /// `null` reads as the type's default (empty list, blank team, ...)
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }
}

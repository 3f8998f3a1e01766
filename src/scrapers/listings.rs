use crate::error::ScrapeError;
use crate::models::{lenient, GameListing, TeamInfo};
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

/// `gameView` object of a listings-page game row
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GameView {
    #[serde(deserialize_with = "lenient::id")]
    game_id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    start_date: String,
    #[serde(deserialize_with = "lenient::string")]
    venue_name: String,
    #[serde(deserialize_with = "lenient::string")]
    city: String,
    #[serde(deserialize_with = "lenient::string")]
    state: String,
    #[serde(deserialize_with = "lenient::or_default")]
    away_team: TeamInfo,
    #[serde(deserialize_with = "lenient::or_default")]
    home_team: TeamInfo,
    #[serde(deserialize_with = "lenient::string")]
    game_status_text: String,
    #[serde(deserialize_with = "lenient::score")]
    away_team_score: Option<i64>,
    #[serde(deserialize_with = "lenient::score")]
    home_team_score: Option<i64>,
    consensus: Option<Value>,
}

/// The game rows of a listings page:
/// `props.pageProps.oddsTables[0].oddsTableModel.gameRows`.
///
/// A page without odds tables or without rows simply has no games.
pub fn game_rows(next_data: &Value) -> Result<&[Value], ScrapeError> {
    let page_props = next_data
        .pointer("/props/pageProps")
        .ok_or(ScrapeError::MissingField("props.pageProps"))?;

    let Some(first_table) = page_props
        .get("oddsTables")
        .and_then(Value::as_array)
        .and_then(|tables| tables.first())
    else {
        return Ok(&[]);
    };

    let model = first_table
        .get("oddsTableModel")
        .ok_or(ScrapeError::MissingField("oddsTables[0].oddsTableModel"))?;

    Ok(model
        .get("gameRows")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]))
}

impl GameListing {
    /// Read one listings row. Missing fields fall back to empty values; a row
    /// that is not an object, or whose `gameView` is not one, is rejected.
    pub fn from_row(row: &Value) -> Result<Self, ScrapeError> {
        let Value::Object(fields) = row else {
            return Err(ScrapeError::InvalidRow(serde_json::Error::custom(
                "game row is not an object",
            )));
        };

        let view = match fields.get("gameView") {
            Some(view) => GameView::deserialize(view).map_err(ScrapeError::InvalidRow)?,
            None => GameView::default(),
        };

        Ok(GameListing {
            game_id: view.game_id,
            start_date: view.start_date,
            venue: view.venue_name,
            venue_city: view.city,
            venue_state: view.state,
            away_team: view.away_team,
            home_team: view.home_team,
            game_status_text: view.game_status_text,
            score_away: view.away_team_score,
            score_home: view.home_team_score,
            consensus: view.consensus.filter(has_content),
        })
    }
}

/// Empty consensus blobs carry nothing worth passing on
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

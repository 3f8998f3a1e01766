use crate::models::{BookmakerQuoteSet, GameListing, OddsRecord};
use crate::utils::snapshot::Snapshot;
use chrono::NaiveDate;

/// Latest of the given timestamps, skipping absent ones.
///
/// Timestamps are ISO-8601 strings from a single source, so the lexical
/// maximum is the chronological one.
pub fn last_line_update(times: &[Option<&str>]) -> Option<String> {
    times
        .iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .max()
        .map(|t| t.to_string())
}

/// Flatten a listing and its sportsbook quotes (if any) into one record.
/// Without quotes every odds field stays `None`.
pub fn normalize(
    date: NaiveDate,
    listing: &GameListing,
    quotes: Option<&BookmakerQuoteSet>,
) -> OddsRecord {
    let (ml, rl, total) = match quotes {
        Some(set) => (
            Snapshot::from_history(&set.money_line_history),
            Snapshot::from_history(&set.spread_history),
            Snapshot::from_history(&set.total_history),
        ),
        None => Default::default(),
    };

    let last_line_update = last_line_update(&[
        ml.current.as_ref().and_then(|q| q.odds_date.as_deref()),
        rl.current.as_ref().and_then(|q| q.odds_date.as_deref()),
        total.current.as_ref().and_then(|q| q.odds_date.as_deref()),
    ]);

    OddsRecord {
        date,
        game_id: listing.game_id.clone(),
        start_date: listing.start_date.clone(),
        venue: listing.venue.clone(),
        venue_city: listing.venue_city.clone(),
        venue_state: listing.venue_state.clone(),
        away_team_full: listing.away_team.full_name.clone(),
        away_team_short: listing.away_team.short_name.clone(),
        away_team_nickname: listing.away_team.nickname.clone(),
        away_team_name: listing.away_team.name.clone(),
        home_team_full: listing.home_team.full_name.clone(),
        home_team_short: listing.home_team.short_name.clone(),
        home_team_nickname: listing.home_team.nickname.clone(),
        home_team_name: listing.home_team.name.clone(),
        game_status_text: listing.game_status_text.clone(),
        score_away: listing.score_away,
        score_home: listing.score_home,
        consensus: listing.consensus.clone(),
        last_line_update,

        ml_opening_away: ml.read_opening(|q| q.away_odds),
        ml_opening_home: ml.read_opening(|q| q.home_odds),
        ml_opening_time: ml.read_opening(|q| q.odds_date.clone()),
        ml_current_away: ml.read_current(|q| q.away_odds),
        ml_current_home: ml.read_current(|q| q.home_odds),
        ml_current_time: ml.read_current(|q| q.odds_date.clone()),

        rl_opening_away_spread: rl.read_opening(|q| q.away_spread),
        rl_opening_away_odds: rl.read_opening(|q| q.away_odds),
        rl_opening_home_spread: rl.read_opening(|q| q.home_spread),
        rl_opening_home_odds: rl.read_opening(|q| q.home_odds),
        rl_opening_time: rl.read_opening(|q| q.odds_date.clone()),
        rl_current_away_spread: rl.read_current(|q| q.away_spread),
        rl_current_away_odds: rl.read_current(|q| q.away_odds),
        rl_current_home_spread: rl.read_current(|q| q.home_spread),
        rl_current_home_odds: rl.read_current(|q| q.home_odds),
        rl_current_time: rl.read_current(|q| q.odds_date.clone()),

        total_opening_line: total.read_opening(|q| q.total),
        total_opening_over_odds: total.read_opening(|q| q.over_odds),
        total_opening_under_odds: total.read_opening(|q| q.under_odds),
        total_opening_time: total.read_opening(|q| q.odds_date.clone()),
        total_current_line: total.read_current(|q| q.total),
        total_current_over_odds: total.read_current(|q| q.over_odds),
        total_current_under_odds: total.read_current(|q| q.under_odds),
        total_current_time: total.read_current(|q| q.odds_date.clone()),
    }
}

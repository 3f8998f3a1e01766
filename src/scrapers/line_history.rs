use crate::error::ScrapeError;
use crate::models::BookmakerQuoteSet;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const ODDS_VIEWS_KEY: &str = "oddsViews";

/// Where in the line-history payload the odds views were found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorTier {
    /// `props.pageProps.lineHistoryModel.oddsViews`
    TopLevel,
    /// `props.pageProps.lineHistoryModel.lineHistory.oddsViews`
    Nested,
    /// First non-empty `oddsViews` array anywhere in the document
    Scan,
}

/// Depth-first search for the first non-empty array stored under a key
/// accepted by `matches`. At each object the object's own keys are checked
/// before descending into its values; values and array items are visited in
/// document order.
pub fn find_array<'a, F>(value: &'a Value, matches: &F) -> Option<&'a [Value]>
where
    F: Fn(&str) -> bool,
{
    match value {
        Value::Object(map) => {
            let direct = map.iter().find_map(|(key, child)| match child {
                Value::Array(items) if matches(key.as_str()) && !items.is_empty() => {
                    Some(items.as_slice())
                }
                _ => None,
            });
            direct.or_else(|| map.values().find_map(|child| find_array(child, matches)))
        }
        Value::Array(items) => items.iter().find_map(|item| find_array(item, matches)),
        _ => None,
    }
}

fn non_empty_array(value: &Value) -> Option<&[Value]> {
    value
        .as_array()
        .filter(|items| !items.is_empty())
        .map(Vec::as_slice)
}

/// Find the raw per-sportsbook odds views. The two known layouts are tried
/// first, then the whole document is scanned.
pub fn find_odds_views(payload: &Value) -> Option<(LocatorTier, &[Value])> {
    let model = payload.pointer("/props/pageProps/lineHistoryModel");

    let top_level = model
        .and_then(|m| m.get(ODDS_VIEWS_KEY))
        .and_then(non_empty_array);
    if let Some(views) = top_level {
        return Some((LocatorTier::TopLevel, views));
    }

    let nested = model
        .and_then(|m| m.get("lineHistory"))
        .and_then(|h| h.get(ODDS_VIEWS_KEY))
        .and_then(non_empty_array);
    if let Some(views) = nested {
        return Some((LocatorTier::Nested, views));
    }

    find_array(payload, &|key: &str| key == ODDS_VIEWS_KEY).map(|views| (LocatorTier::Scan, views))
}

/// All sportsbook quote sets in a line-history payload.
/// Views that cannot be read are skipped.
pub fn locate_odds_views(payload: &Value) -> Result<Vec<BookmakerQuoteSet>, ScrapeError> {
    let (tier, views) = find_odds_views(payload).ok_or(ScrapeError::ShapeMismatch)?;
    debug!(?tier, count = views.len(), "located odds views");

    Ok(views
        .iter()
        .filter(|view| view.is_object())
        .filter_map(|view| match BookmakerQuoteSet::deserialize(view) {
            Ok(set) => Some(set),
            Err(e) => {
                warn!("Skipping unreadable odds view: {}", e);
                None
            }
        })
        .collect())
}

/// Pick the quote set of one sportsbook, ignoring case
pub fn select_bookmaker(
    sets: Vec<BookmakerQuoteSet>,
    bookmaker: &str,
) -> Option<BookmakerQuoteSet> {
    sets.into_iter()
        .find(|set| set.sportsbook.eq_ignore_ascii_case(bookmaker))
}

/// Locate the odds views and keep only `bookmaker`'s
pub fn bookmaker_quotes(
    payload: &Value,
    bookmaker: &str,
) -> Result<BookmakerQuoteSet, ScrapeError> {
    let sets = locate_odds_views(payload)?;
    select_bookmaker(sets, bookmaker)
        .ok_or_else(|| ScrapeError::BookmakerNotFound(bookmaker.to_string()))
}

use crate::models::OddsRecord;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

const MISSING: &str = "-";

/// Game state as far as the dashboard cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

impl GameStatus {
    /// Classify the free-form status text from the listings page
    pub fn classify(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        if lower.starts_with("final") {
            GameStatus::Final
        } else if lower.is_empty()
            || lower.starts_with("scheduled")
            || lower.starts_with("not started")
        {
            GameStatus::Scheduled
        } else {
            GameStatus::InProgress
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::InProgress => "live",
            GameStatus::Final => "final",
        }
    }
}

/// Nickname if present, otherwise the last word of the full name
pub fn format_team_nickname(nickname: &str, full_name: &str) -> String {
    let nickname = nickname.trim();
    if !nickname.is_empty() {
        return nickname.to_string();
    }
    full_name
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string()
}

/// American odds with an explicit sign (`+150`, `-110`)
pub fn format_american(odds: Option<i32>) -> String {
    match odds {
        Some(odds) => format!("{:+}", odds),
        None => MISSING.to_string(),
    }
}

pub fn format_line(line: Option<f64>, signed: bool) -> String {
    match line {
        Some(line) if signed => format!("{:+.1}", line),
        Some(line) => format!("{:.1}", line),
        None => MISSING.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // The source also emits offset-less timestamps; those are UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a source timestamp in `tz`, e.g. `May 1, 7:05 PM EDT`.
/// Text that is not a timestamp is shown as is.
pub fn format_time_local(raw: Option<&str>, tz: Tz) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return MISSING.to_string();
    };

    match parse_timestamp(raw) {
        Some(dt) => dt
            .with_timezone(&tz)
            .format("%b %-d, %-I:%M %p %Z")
            .to_string(),
        None => raw.to_string(),
    }
}

/// One line of a card's odds table
#[derive(Debug, Clone, PartialEq)]
pub struct OddsRow {
    pub label: String,
    pub opening: String,
    pub current: String,
}

fn spread_cell(spread: Option<f64>, odds: Option<i32>) -> String {
    match (spread, odds) {
        (None, None) => MISSING.to_string(),
        _ => format!("{} ({})", format_line(spread, true), format_american(odds)),
    }
}

fn total_cell(prefix: char, line: Option<f64>, odds: Option<i32>) -> String {
    match (line, odds) {
        (None, None) => MISSING.to_string(),
        _ => format!(
            "{}{} ({})",
            prefix,
            format_line(line, false),
            format_american(odds)
        ),
    }
}

/// Everything a dashboard card shows for one game, already formatted
#[derive(Debug, Clone)]
pub struct GameCard {
    pub matchup: String,
    pub start_time: String,
    pub venue_line: String,
    /// Empty unless the game has started and both scores are known
    pub score_line: String,
    pub status: String,
    pub status_class: &'static str,
    pub dimmed: bool,
    pub has_odds: bool,
    pub odds_rows: Vec<OddsRow>,
    pub opened_at: String,
    pub updated_at: String,
}

impl GameCard {
    pub fn from_record(record: &OddsRecord, tz: Tz) -> Self {
        let away = format_team_nickname(&record.away_team_nickname, &record.away_team_full);
        let home = format_team_nickname(&record.home_team_nickname, &record.home_team_full);
        let status = GameStatus::classify(&record.game_status_text);

        let score_line = match (status, record.score_away, record.score_home) {
            (GameStatus::Final | GameStatus::InProgress, Some(away_score), Some(home_score)) => {
                format!("{} {}, {} {}", away, away_score, home, home_score)
            }
            _ => String::new(),
        };

        let city_state = [record.venue_city.as_str(), record.venue_state.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let venue_line = [record.venue.as_str(), city_state.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");

        let odds_rows = vec![
            OddsRow {
                label: format!("{} ML", away),
                opening: format_american(record.ml_opening_away),
                current: format_american(record.ml_current_away),
            },
            OddsRow {
                label: format!("{} ML", home),
                opening: format_american(record.ml_opening_home),
                current: format_american(record.ml_current_home),
            },
            OddsRow {
                label: format!("{} RL", away),
                opening: spread_cell(record.rl_opening_away_spread, record.rl_opening_away_odds),
                current: spread_cell(record.rl_current_away_spread, record.rl_current_away_odds),
            },
            OddsRow {
                label: format!("{} RL", home),
                opening: spread_cell(record.rl_opening_home_spread, record.rl_opening_home_odds),
                current: spread_cell(record.rl_current_home_spread, record.rl_current_home_odds),
            },
            OddsRow {
                label: "Over".to_string(),
                opening: total_cell('o', record.total_opening_line, record.total_opening_over_odds),
                current: total_cell('o', record.total_current_line, record.total_current_over_odds),
            },
            OddsRow {
                label: "Under".to_string(),
                opening: total_cell('u', record.total_opening_line, record.total_opening_under_odds),
                current: total_cell('u', record.total_current_line, record.total_current_under_odds),
            },
        ];

        GameCard {
            matchup: format!("{} at {}", away, home),
            start_time: format_time_local(Some(record.start_date.as_str()), tz),
            venue_line,
            score_line,
            status: record.game_status_text.clone(),
            status_class: status.css_class(),
            dimmed: status == GameStatus::Final,
            has_odds: record.has_odds(),
            odds_rows,
            opened_at: format_time_local(record.ml_opening_time.as_deref(), tz),
            updated_at: format_time_local(record.last_line_update.as_deref(), tz),
        }
    }
}

/// Cards for one listing date
#[derive(Debug, Clone)]
pub struct DaySection {
    pub heading: String,
    pub cards: Vec<GameCard>,
}

/// Group records into per-date sections, keeping the order records arrived in
pub fn group_by_date(records: &[OddsRecord], tz: Tz) -> Vec<DaySection> {
    let mut sections: Vec<(chrono::NaiveDate, DaySection)> = Vec::new();

    for record in records {
        let card = GameCard::from_record(record, tz);
        match sections.iter_mut().find(|(date, _)| *date == record.date) {
            Some((_, section)) => section.cards.push(card),
            None => sections.push((
                record.date,
                DaySection {
                    heading: record.date.format("%A, %B %-d").to_string(),
                    cards: vec![card],
                },
            )),
        }
    }

    sections.into_iter().map(|(_, section)| section).collect()
}

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use mlb_line_history::config::parse_timezone;
use mlb_line_history::data::{load_board_from_cache, save_board_to_cache, save_records_to_csv};
use mlb_line_history::display::{format_american, format_line, format_team_nickname, GameStatus};
use mlb_line_history::{fetch_odds_board_for, target_dates, OddsRecord, ScraperConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scrape opening and current MLB lines for one sportsbook
#[derive(Debug, Parser)]
#[command(name = "cli", version)]
struct Args {
    /// Listing date (YYYY-MM-DD); repeat for several. Defaults to today and tomorrow.
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    dates: Vec<NaiveDate>,

    /// Sportsbook whose lines are kept
    #[arg(long)]
    bookmaker: Option<String>,

    /// Time zone that decides which day is "today"
    #[arg(long)]
    timezone: Option<String>,

    /// Write the records as CSV
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Write the whole board as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Read a board saved with --json instead of scraping
    #[arg(long, value_name = "PATH")]
    use_cache: Option<PathBuf>,
}

fn summary_line(record: &OddsRecord) -> String {
    let away = format_team_nickname(&record.away_team_nickname, &record.away_team_full);
    let home = format_team_nickname(&record.home_team_nickname, &record.home_team_full);
    let status = match GameStatus::classify(&record.game_status_text) {
        GameStatus::Scheduled => "scheduled".to_string(),
        _ => record.game_status_text.clone(),
    };

    if !record.has_odds() {
        return format!("{} at {} [{}] no odds", away, home, status);
    }

    format!(
        "{} at {} [{}] ML {}/{} | RL {} ({}) | O/U {} ({}/{})",
        away,
        home,
        status,
        format_american(record.ml_current_away),
        format_american(record.ml_current_home),
        format_line(record.rl_current_away_spread, true),
        format_american(record.rl_current_away_odds),
        format_line(record.total_current_line, false),
        format_american(record.total_current_over_odds),
        format_american(record.total_current_under_odds),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = ScraperConfig::from_env().context("Invalid configuration")?;
    if let Some(bookmaker) = args.bookmaker {
        config.bookmaker = bookmaker;
    }
    if let Some(tz) = args.timezone.as_deref() {
        config.timezone = parse_timezone(tz)?;
    }
    let config = config.validate()?;

    let board = match &args.use_cache {
        Some(path) => {
            println!("Loading odds from cache file: {}\n", path.display());
            load_board_from_cache(path)?
        }
        None => {
            let dates = if args.dates.is_empty() {
                target_dates(Utc::now(), config.timezone, config.days_ahead)
            } else {
                args.dates.clone()
            };
            println!(
                "Fetching {} lines for {} date(s)...\n",
                config.bookmaker,
                dates.len()
            );
            fetch_odds_board_for(&config, &dates).await?
        }
    };

    if board.is_empty() {
        println!("No games found.");
    }

    let mut current_date = None;
    for record in &board.records {
        if current_date != Some(record.date) {
            println!("\n{}\n", record.date.format("%A, %B %-d"));
            current_date = Some(record.date);
        }
        println!("  {}", summary_line(record));
    }

    println!(
        "\n{} games, {} with {} odds",
        board.records.len(),
        board.games_with_odds(),
        config.bookmaker
    );

    if let Some(path) = &args.json {
        save_board_to_cache(&board, path)?;
        println!("Saved board to {}", path.display());
    }

    if let Some(path) = &args.csv {
        save_records_to_csv(&board.records, path)?;
        println!("Saved records to {}", path.display());
    }

    Ok(())
}

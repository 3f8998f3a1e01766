use anyhow::{Context, Result};
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use clap::Parser;
use mlb_line_history::display::{format_time_local, group_by_date, DaySection};
use mlb_line_history::{fetch_odds_board, OddsBoard, ScraperConfig};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Odds dashboard: one card per game with opening and current lines
#[derive(Debug, Parser)]
#[command(name = "web", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Seconds a scraped board is served before it is fetched again
    #[arg(long, default_value_t = 300)]
    ttl_secs: u64,

    /// Sportsbook whose lines are shown
    #[arg(long)]
    bookmaker: Option<String>,
}

#[derive(Template)]
#[template(path = "odds.html")]
struct OddsTemplate {
    bookmaker: String,
    fetched_at: String,
    total_games: usize,
    with_odds: usize,
    sections: Vec<DaySection>,
    notice: String,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Last scraped board plus the guard that keeps scrapes from overlapping.
/// Readers never wait on a scrape while an older board is cached.
struct BoardCache {
    board: RwLock<Option<OddsBoard>>,
    scraping: Mutex<()>,
    ttl: Duration,
}

impl BoardCache {
    fn new(initial: Option<OddsBoard>, ttl: Duration) -> Self {
        Self {
            board: RwLock::new(initial),
            scraping: Mutex::new(()),
            ttl,
        }
    }

    fn is_stale(&self, board: &OddsBoard) -> bool {
        (Utc::now() - board.fetched_at)
            .to_std()
            .map(|age| age > self.ttl)
            .unwrap_or(false)
    }

    async fn fresh(&self) -> Option<OddsBoard> {
        self.board
            .read()
            .await
            .as_ref()
            .filter(|b| !self.is_stale(b))
            .cloned()
    }

    /// The cached board, scraped again when missing, stale, or `force`d.
    /// While another scrape is running the previous board is served as is.
    async fn get_or_refresh<F, Fut>(&self, force: bool, scrape: F) -> Option<OddsBoard>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OddsBoard>>,
    {
        if !force {
            if let Some(board) = self.fresh().await {
                return Some(board);
            }
        }

        let cached = self.board.read().await.clone();
        let _guard = match self.scraping.try_lock() {
            Ok(guard) => guard,
            Err(_) if cached.is_some() => return cached,
            Err(_) => {
                let guard = self.scraping.lock().await;
                let cached = self.board.read().await.clone();
                if cached.is_some() && !force {
                    return cached;
                }
                guard
            }
        };

        match scrape().await {
            Ok(fresh) => {
                info!(games = fresh.records.len(), "Board refreshed");
                *self.board.write().await = Some(fresh.clone());
                Some(fresh)
            }
            Err(e) => {
                error!("Scrape failed, keeping previous board: {:#}", e);
                self.board.read().await.clone()
            }
        }
    }
}

#[derive(Clone)]
struct AppState {
    cache: Arc<BoardCache>,
    config: Arc<ScraperConfig>,
}

async fn board(state: &AppState, force: bool) -> Option<OddsBoard> {
    state
        .cache
        .get_or_refresh(force, || fetch_odds_board(&state.config))
        .await
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let tz = state.config.timezone;

    let template = match board(&state, false).await {
        Some(board) => OddsTemplate {
            bookmaker: state.config.bookmaker.clone(),
            fetched_at: format_time_local(Some(board.fetched_at.to_rfc3339().as_str()), tz),
            total_games: board.records.len(),
            with_odds: board.games_with_odds(),
            sections: group_by_date(&board.records, tz),
            notice: if board.is_empty() {
                "No odds data available for the selected dates.".to_string()
            } else {
                String::new()
            },
        },
        None => OddsTemplate {
            bookmaker: state.config.bookmaker.clone(),
            fetched_at: "never".to_string(),
            total_games: 0,
            with_odds: 0,
            sections: Vec::new(),
            notice: "Odds data could not be loaded. Try refreshing in a minute.".to_string(),
        },
    };

    HtmlTemplate(template)
}

async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    board(&state, true).await;
    Redirect::to("/")
}

async fn api_odds(State(state): State<AppState>) -> Response {
    match board(&state, false).await {
        Some(board) => Json(board).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Data not loaded yet").into_response(),
    }
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
    let config = config.validate()?;

    println!("Fetching {} odds...", config.bookmaker);

    // Fetch data on startup
    let initial = match fetch_odds_board(&config).await {
        Ok(board) => {
            println!("Data loaded successfully");
            println!("  - {} games", board.records.len());
            println!("  - {} with odds", board.games_with_odds());
            Some(board)
        }
        Err(e) => {
            eprintln!("Error fetching data: {:#}", e);
            eprintln!("Server will start and retry on the first request");
            None
        }
    };

    let state = AppState {
        cache: Arc::new(BoardCache::new(initial, Duration::from_secs(args.ttl_secs))),
        config: Arc::new(config),
    };

    let app = Router::new()
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(index))
        .route("/refresh", get(refresh))
        .route("/api/odds", get(api_odds))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;

    println!("\nStarting web server at http://{}", args.addr);
    println!("Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;

    Ok(())
}

// Router wires both providers to the engine and serves the result over HTTP.
// Every request fetches fresh snapshots; nothing is cached between requests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::engine::reconcile::ScoringSettings;
use crate::engine::roster::RosterLayout;
use crate::engine::types::{Diagnostic, StandingsError};
use crate::engine::{compute_standings, StandingsReport};
use crate::feeds::adapters::csv_file::CsvRoster;
use crate::feeds::adapters::espn::EspnLeaderboard;
use crate::feeds::adapters::sheets::SheetsRoster;
use crate::feeds::adapters::{LeaderboardProvider, RosterProvider};
use crate::feeds::normaliser::LeaderboardSnapshot;

pub const UNKNOWN_TOURNAMENT: &str = "Unknown Tournament";

pub struct AppState {
    pub roster: Arc<dyn RosterProvider>,
    pub leaderboard: Arc<dyn LeaderboardProvider>,
    pub layout: RosterLayout,
    pub scoring: ScoringSettings,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        cfg.require_roster_source()?;
        let timeout = Duration::from_secs(cfg.sources.request_timeout_secs);

        let roster: Arc<dyn RosterProvider> = match &cfg.sources.roster_csv {
            Some(path) => Arc::new(CsvRoster::new(path.clone())),
            None => Arc::new(
                SheetsRoster::new(
                    &cfg.sources.sheet_id,
                    &cfg.sources.sheet_name,
                    &cfg.sources.sheets_api_key,
                    timeout,
                )
                .context("building Sheets client")?,
            ),
        };
        let leaderboard = Arc::new(
            EspnLeaderboard::new(&cfg.sources.leaderboard_url, timeout).context("building leaderboard client")?,
        );

        Ok(Self {
            roster,
            leaderboard,
            layout: cfg.roster.clone(),
            scoring: cfg.scoring.clone(),
        })
    }

    /// Fetch both feeds concurrently and run the engine once.
    ///
    /// A missing roster fails the request. A missing leaderboard only costs the live data and
    /// is reported as a diagnostic.
    #[instrument(skip(self))]
    pub async fn standings(&self) -> Result<StandingsReport, StandingsError> {
        let (grid, snapshot) = tokio::join!(self.roster.fetch_grid(), self.leaderboard.fetch_snapshot());
        let grid = grid?;

        let (snapshot, unavailable) = match snapshot {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                warn!(error = %e, "Continuing without live leaderboard");
                (LeaderboardSnapshot::default(), Some(e.to_string()))
            }
        };

        let mut report = compute_standings(&grid, &snapshot, &self.layout, &self.scoring)?;
        if let Some(reason) = unavailable {
            report.diagnostics.insert(0, Diagnostic::LeaderboardUnavailable { reason });
        }
        Ok(report)
    }
}

pub struct ApiError(StandingsError);

impl From<StandingsError> for ApiError {
    fn from(e: StandingsError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StandingsError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            StandingsError::MalformedRoster { .. } | StandingsError::MissingCurrentPeriod { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn standings_handler(State(state): State<Arc<AppState>>) -> Result<Json<StandingsReport>, ApiError> {
    metrics::counter!("pickem_standings_requests_total").increment(1);
    match state.standings().await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            metrics::counter!("pickem_standings_failures_total").increment(1);
            error!(error = %e, "Standings request failed");
            Err(e.into())
        }
    }
}

async fn tournament_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let name = match state.leaderboard.fetch_snapshot().await {
        Ok(snapshot) => snapshot.event_name,
        Err(e) => {
            warn!(error = %e, "Tournament name unavailable");
            None
        }
    };
    Json(json!({ "tournament": name.unwrap_or_else(|| UNKNOWN_TOURNAMENT.to_string()) }))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/standings", get(standings_handler))
        .route("/api/tournament", get(tournament_handler))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!(addr = %listener.local_addr()?, "Serving standings");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{grid, test_layout};
    use crate::engine::reconcile::PeriodSelector;
    use crate::engine::types::Grid;
    use crate::feeds::normaliser::RawCompetitor;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct StaticRoster(Grid);

    #[async_trait::async_trait]
    impl RosterProvider for StaticRoster {
        async fn fetch_grid(&self) -> Result<Grid, StandingsError> {
            Ok(self.0.clone())
        }
    }

    struct StaticLeaderboard(Option<LeaderboardSnapshot>);

    #[async_trait::async_trait]
    impl LeaderboardProvider for StaticLeaderboard {
        async fn fetch_snapshot(&self) -> Result<LeaderboardSnapshot, StandingsError> {
            self.0.clone().ok_or(StandingsError::Fetch { feed: "leaderboard", reason: "timed out".into() })
        }
    }

    fn roster_grid() -> Grid {
        grid(&[
            &["", "SONY", "", "", "VALERO", "", ""],
            &["NAME", "GOLFER", "CP", "TP", "GOLFER", "CP", "TP"],
            &["A", "Scheffler", "3", "3", "MATSUYAMA", "", ""],
            &["B", "Day", "2", "2", "Lowry", "", ""],
        ])
    }

    fn live() -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            event_name: Some("Valero Texas Open".into()),
            competitors: vec![
                RawCompetitor { display_name: "Hideki Matsuyama".into(), position: "1".into(), status: "in".into(), ..Default::default() },
                RawCompetitor { display_name: "Shane Lowry".into(), position: "T9".into(), status: "in".into(), ..Default::default() },
            ],
        }
    }

    fn app(roster: Grid, board: Option<LeaderboardSnapshot>, current: PeriodSelector) -> Router {
        let state = AppState {
            roster: Arc::new(StaticRoster(roster)),
            leaderboard: Arc::new(StaticLeaderboard(board)),
            layout: test_layout(),
            scoring: ScoringSettings { current_period: current, ..Default::default() },
        };
        build_router(Arc::new(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_standings_endpoint() {
        let (status, body) = get_json(app(roster_grid(), Some(live()), PeriodSelector::Auto), "/api/standings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tournament"], "Valero Texas Open");
        assert_eq!(body["currentPeriod"], 2);
        let standings = body["standings"].as_array().unwrap();
        assert_eq!(standings[0]["team"]["name"], "A");
        assert_eq!(standings[0]["totalPoints"], 4);
        assert_eq!(standings[0]["liveData"]["position"], "1");
        assert_eq!(standings[1]["team"]["name"], "B");
        assert_eq!(standings[1]["totalPoints"], 11);
        assert_eq!(standings[1]["rankChange"], -1);
    }

    #[tokio::test]
    async fn test_leaderboard_outage_degrades() {
        let (status, body) = get_json(app(roster_grid(), None, PeriodSelector::Auto), "/api/standings").await;
        assert_eq!(status, StatusCode::OK);
        let kinds: Vec<&str> = body["diagnostics"].as_array().unwrap().iter().map(|d| d["kind"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["leaderboardUnavailable", "emptyLeaderboard"]);
        assert_eq!(body["standings"][0]["pending"], true);
    }

    #[tokio::test]
    async fn test_fatal_error_is_single_failure() {
        let bad = grid(&[&[], &["NAME", "PLAYER"], &["A", "x"]]);
        let (status, body) = get_json(app(bad, Some(live()), PeriodSelector::Auto), "/api/standings").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("malformed roster"));
        assert!(body.get("standings").is_none());
    }

    #[tokio::test]
    async fn test_tournament_endpoint() {
        let (_, body) = get_json(app(roster_grid(), Some(live()), PeriodSelector::Closed), "/api/tournament").await;
        assert_eq!(body["tournament"], "Valero Texas Open");
        let (_, body) = get_json(app(roster_grid(), None, PeriodSelector::Closed), "/api/tournament").await;
        assert_eq!(body["tournament"], UNKNOWN_TOURNAMENT);
    }
}

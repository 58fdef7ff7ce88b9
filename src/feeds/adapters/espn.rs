// ESPN golf scoreboard adapter: one GET per snapshot, first event, first competition.

use std::time::Duration;

use tracing::{debug, info, instrument};

use super::espn_types::{Competitor, Scoreboard, ScoreField};
use super::LeaderboardProvider;
use crate::engine::types::StandingsError;
use crate::feeds::normaliser::{LeaderboardSnapshot, RawCompetitor};

pub const ESPN_GOLF_SCOREBOARD: &str = "https://site.api.espn.com/apis/site/v2/sports/golf/pga/scoreboard";

pub struct EspnLeaderboard {
    pub url: String,
    client: reqwest::Client,
}

impl EspnLeaderboard {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pickem-standings/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { url: url.to_string(), client })
    }
}

fn fetch_error(e: impl std::fmt::Display) -> StandingsError {
    StandingsError::Fetch { feed: "leaderboard", reason: e.to_string() }
}

/// Flatten the scoreboard into raw competitor strings. No event means an empty field.
pub fn snapshot_from_scoreboard(board: Scoreboard) -> LeaderboardSnapshot {
    let Some(event) = board.events.into_iter().next() else {
        debug!("Scoreboard has no events");
        return LeaderboardSnapshot::default();
    };
    let event_name = event.name.clone();
    let Some(competition) = event.competitions.into_iter().next() else {
        return LeaderboardSnapshot { event_name, competitors: Vec::new() };
    };

    let state = competition
        .status
        .and_then(|s| s.kind)
        .and_then(|k| k.state)
        .unwrap_or_default();

    let competitors = competition
        .competitors
        .into_iter()
        .map(|c| competitor_to_raw(c, &state))
        .collect();

    LeaderboardSnapshot { event_name, competitors }
}

fn competitor_to_raw(c: Competitor, state: &str) -> RawCompetitor {
    let display_name = c.athlete.and_then(|a| a.display_name).unwrap_or_default();

    let position = match c.order {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    };

    let mut score = match c.score {
        Some(ScoreField::Text(s)) => s,
        Some(ScoreField::Number(n)) if n > 0.0 => format!("+{}", n as i64),
        Some(ScoreField::Number(n)) if n == 0.0 => "E".to_string(),
        Some(ScoreField::Number(n)) => format!("{}", n as i64),
        Some(ScoreField::Detailed { display_value }) => display_value.unwrap_or_default(),
        None => String::new(),
    };

    let mut today = String::new();
    let mut thru = String::new();
    for stat in c.statistics {
        let value = stat.display_value.unwrap_or_default();
        match stat.name.as_deref() {
            Some("scoreToPar") if score.is_empty() => score = value,
            Some("currentRoundScore") => today = value,
            Some("thru") => thru = value,
            _ => {}
        }
    }
    if today.is_empty() {
        if let Some(last) = c.linescores.into_iter().last() {
            today = last.display_value.unwrap_or_default();
        }
    }

    RawCompetitor {
        display_name,
        position,
        score,
        today,
        thru,
        status: state.to_string(),
    }
}

#[async_trait::async_trait]
impl LeaderboardProvider for EspnLeaderboard {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_snapshot(&self) -> Result<LeaderboardSnapshot, StandingsError> {
        let board: Scoreboard = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?
            .json()
            .await
            .map_err(fetch_error)?;

        let snapshot = snapshot_from_scoreboard(board);
        info!(
            event = snapshot.event_name.as_deref().unwrap_or("none"),
            competitors = snapshot.competitors.len(),
            "Fetched leaderboard"
        );
        Ok(snapshot)
    }
}

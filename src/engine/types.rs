use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

// Raw roster cell as handed over by a roster provider
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

pub type Grid = Vec<Vec<Cell>>;

impl Cell {
    /// Build a cell from provider text; whitespace-only text is `Empty`.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    // Trimmed textual form; numbers print without a trailing ".0"
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
        }
    }

    /// Non-negative whole number stored in the cell, if any.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => Some(*n as u32),
            Cell::Number(_) => None,
            Cell::Text(s) => s.trim().parse::<u32>().ok(),
        }
    }
}

// Read a cell, treating anything past the end of a short row as empty
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub period: u32,
    pub tournament_label: String,
    pub player_name_raw: String,
    pub recorded_finish: Option<u32>,
    pub cumulative_points_through_period: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub missed_cut: bool,
    // Marker count on the roster name, one per missed cut
    pub missed_cuts: u32,
    pub picks: Vec<Pick>,
    // Recorded finishes after parsing; a ranked `Standing` carries the reconciled total here
    pub total_points: u32,
}

impl Team {
    pub fn pick_for(&self, period: u32) -> Option<&Pick> {
        self.picks.iter().find(|p| p.period == period)
    }

    /// Most recent recorded finish strictly before `period`.
    pub fn last_recorded_before(&self, period: u32) -> Option<u32> {
        self.picks
            .iter()
            .filter(|p| p.period < period)
            .filter_map(|p| p.recorded_finish.map(|f| (p.period, f)))
            .max_by_key(|(period, _)| *period)
            .map(|(_, finish)| finish)
    }
}

// Leaderboard place; `tied` renders as the "T" prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub place: u32,
    pub tied: bool,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tied {
            write!(f, "T{}", self.place)
        } else {
            write!(f, "{}", self.place)
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thru {
    NotStarted,
    Holes(u8),
    Finished,
}

impl fmt::Display for Thru {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thru::NotStarted => Ok(()),
            Thru::Holes(n) => write!(f, "{}", n),
            Thru::Finished => write!(f, "F"),
        }
    }
}

impl Serialize for Thru {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiveStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub position: Option<Position>,
    pub score_to_par: i32,
    pub today: Option<i32>,
    pub thru: Thru,
    pub status: LiveStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched(LeaderboardEntry),
    // Player not in the current field; an expected outcome
    Unmatched,
}

impl MatchResult {
    pub fn entry(&self) -> Option<&LeaderboardEntry> {
        match self {
            MatchResult::Matched(e) => Some(e),
            MatchResult::Unmatched => None,
        }
    }

    pub fn into_entry(self) -> Option<LeaderboardEntry> {
        match self {
            MatchResult::Matched(e) => Some(e),
            MatchResult::Unmatched => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: u32,
    pub team: Team,
    pub current_pick: Option<Pick>,
    pub live_data: Option<LeaderboardEntry>,
    pub total_points: u32,
    // Current pick had neither live nor recorded data
    pub pending: bool,
    pub base_points: u32,
    pub previous_rank: u32,
    pub rank_change: i32,
}

/// Non-fatal conditions collected alongside the standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    EmptyLeaderboard,
    #[serde(rename_all = "camelCase")]
    LeaderboardUnavailable { reason: String },
    #[serde(rename_all = "camelCase")]
    AmbiguousMatch { team: String, player: String, candidates: Vec<String> },
    #[serde(rename_all = "camelCase")]
    NotInField { team: String, player: String },
    #[serde(rename_all = "camelCase")]
    UnreadableCell { team: String, period: u32, value: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyLeaderboard => write!(f, "no live leaderboard entries available"),
            Diagnostic::LeaderboardUnavailable { reason } => write!(f, "live leaderboard unavailable: {}", reason),
            Diagnostic::AmbiguousMatch { team, player, candidates } => {
                write!(f, "{}: '{}' matches {} golfers ({})", team, player, candidates.len(), candidates.join(", "))
            }
            Diagnostic::NotInField { team, player } => write!(f, "{}: '{}' not in field", team, player),
            Diagnostic::UnreadableCell { team, period, value } => {
                write!(f, "{}: unreadable value '{}' in week {}", team, value, period)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StandingsError {
    #[error("malformed roster: {reason}")]
    MalformedRoster { reason: String },
    #[error("no current period: {detail}")]
    MissingCurrentPeriod { detail: String },
    #[error("{feed} fetch failed: {reason}")]
    Fetch { feed: &'static str, reason: String },
}

impl StandingsError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        StandingsError::MalformedRoster { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_counts() {
        assert_eq!(Cell::Text(" 24 ".into()).as_count(), Some(24));
        assert_eq!(Cell::Number(7.0).as_count(), Some(7));
        assert_eq!(Cell::Number(7.5).as_count(), None);
        assert_eq!(Cell::Text("CUT".into()).as_count(), None);
        assert_eq!(Cell::Empty.as_count(), None);
        assert_eq!(Cell::Number(12.0).text(), "12");
    }

    #[test]
    fn test_cell_at_pads_short_rows() {
        let row = vec![Cell::from_text("x")];
        assert_eq!(cell_at(&row, 0), &Cell::Text("x".into()));
        assert!(cell_at(&row, 9).is_blank());
        assert_eq!(Cell::from_text("   "), Cell::Empty);
    }

    #[test]
    fn test_position_and_thru_render() {
        let p = Position { place: 5, tied: true };
        assert_eq!(p.to_string(), "T5");
        assert_eq!(serde_json::to_value(Thru::Finished).unwrap(), "F");
        assert_eq!(serde_json::to_value(Thru::Holes(12)).unwrap(), "12");
        assert_eq!(serde_json::to_value(LiveStatus::InProgress).unwrap(), "in-progress");
    }

    #[test]
    fn test_last_recorded_before() {
        let pick = |period, finish| Pick {
            period,
            tournament_label: format!("Week {}", period),
            player_name_raw: "X".into(),
            recorded_finish: finish,
            cumulative_points_through_period: None,
        };
        let team = Team {
            id: 1,
            name: "A".into(),
            missed_cut: false,
            missed_cuts: 0,
            picks: vec![pick(1, Some(10)), pick(2, Some(4)), pick(3, None)],
            total_points: 14,
        };
        assert_eq!(team.last_recorded_before(3), Some(4));
        assert_eq!(team.last_recorded_before(1), None);
    }

    #[test]
    fn test_diagnostic_serializes_with_kind() {
        let d = Diagnostic::NotInField { team: "A".into(), player: "KIM".into() };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["kind"], "notInField");
        assert_eq!(v["player"], "KIM");
    }
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, instrument};

use crate::engine::roster::Roster;
use crate::engine::types::{LeaderboardEntry, MatchResult, Pick, StandingsError, Team};
use crate::feeds::normaliser::Leaderboard;

/// Which period is live. Configured as `"auto"`, `"none"` or a 1-based period number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodSelector {
    #[default]
    Auto,
    Closed,
    Period(u32),
}

impl fmt::Display for PeriodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSelector::Auto => write!(f, "auto"),
            PeriodSelector::Closed => write!(f, "none"),
            PeriodSelector::Period(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for PeriodSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PeriodSelector::Period(n) => serializer.serialize_u32(*n),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for PeriodSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u32),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(0) => Err(serde::de::Error::custom("periods are numbered from 1")),
            Wire::Number(n) => Ok(PeriodSelector::Period(n)),
            Wire::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "auto" => Ok(PeriodSelector::Auto),
                "none" | "closed" => Ok(PeriodSelector::Closed),
                other => match other.parse::<u32>() {
                    Ok(n) if n > 0 => Ok(PeriodSelector::Period(n)),
                    _ => Err(serde::de::Error::custom(format!("invalid current period '{}'", s))),
                },
            },
        }
    }
}

/// What an unresolved current pick contributes to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    // Rank on the data we have
    #[default]
    Omit,
    CarryPrevious,
    Penalty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub current_period: PeriodSelector,
    pub pending_policy: PendingPolicy,
    // Used for the missed-cut penalty while no live field is known
    pub default_field_size: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            current_period: PeriodSelector::Auto,
            pending_policy: PendingPolicy::Omit,
            default_field_size: 156,
        }
    }
}

/// Turn the configured selector into the period the reconciler treats as live.
///
/// `Auto` with every selection already scored means the season is between events: all
/// periods are closed. Only an explicit period missing from the roster is an error.
pub fn resolve_current_period(selector: PeriodSelector, roster: &Roster) -> Result<Option<u32>, StandingsError> {
    match selector {
        PeriodSelector::Closed => Ok(None),
        PeriodSelector::Period(n) => {
            if roster.periods().any(|p| p == n) {
                Ok(Some(n))
            } else {
                Err(StandingsError::MissingCurrentPeriod {
                    detail: format!("period {} not among the {} roster periods", n, roster.layout.blocks.len()),
                })
            }
        }
        PeriodSelector::Auto => {
            let open = roster
                .teams
                .iter()
                .flat_map(|t| t.picks.iter())
                .filter(|p| p.recorded_finish.is_none())
                .map(|p| p.period)
                .max();
            if open.is_none() {
                debug!("No open period, every period is closed");
            }
            Ok(open)
        }
    }
}

/// Missed-cut penalty: one worse than the whole field.
pub fn penalty_for(board: &Leaderboard, default_field_size: u32) -> u32 {
    let field = if board.is_empty() { default_field_size } else { board.len() as u32 };
    field.max(board.max_place().unwrap_or(0)) + 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub total_points: u32,
    pub current_pick: Option<Pick>,
    pub live_data: Option<LeaderboardEntry>,
    pub pending: bool,
}

pub struct Reconciler {
    current_period: Option<u32>,
    penalty: u32,
    pending_policy: PendingPolicy,
}

impl Reconciler {
    pub fn new(current_period: Option<u32>, penalty: u32, pending_policy: PendingPolicy) -> Self {
        Self { current_period, penalty, pending_policy }
    }

    pub fn current_period(&self) -> Option<u32> {
        self.current_period
    }

    /// `live` is the match for the team's pick in the current period.
    #[instrument(level = "debug", skip_all, fields(team = %team.name))]
    pub fn reconcile(&self, team: &Team, live: MatchResult) -> Reconciled {
        let closed: u32 = team
            .picks
            .iter()
            .filter(|p| Some(p.period) != self.current_period)
            .filter_map(|p| p.recorded_finish)
            .sum();

        let Some(period) = self.current_period else {
            return Reconciled { total_points: closed, current_pick: None, live_data: None, pending: false };
        };

        let current_pick = team.pick_for(period).cloned();
        let live_place = live.entry().and_then(|e| e.position).map(|p| p.place);

        // The penalty belongs to the current selection; no selection, nothing to penalise
        let (current, pending) = if team.missed_cut && current_pick.is_some() {
            (self.penalty, false)
        } else if let Some(place) = live_place {
            (place, false)
        } else if let Some(finish) = current_pick.as_ref().and_then(|p| p.recorded_finish) {
            (finish, false)
        } else if current_pick.is_none() {
            (0, false)
        } else {
            let value = match self.pending_policy {
                PendingPolicy::Omit => 0,
                PendingPolicy::CarryPrevious => team.last_recorded_before(period).unwrap_or(0),
                PendingPolicy::Penalty => self.penalty,
            };
            (value, true)
        };

        debug!(closed, current, pending, "Reconciled team");
        Reconciled {
            total_points: closed + current,
            current_pick,
            live_data: live.into_entry(),
            pending,
        }
    }
}

// One standings computation, start to finish. Pure: the caller hands in both raw payloads.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::engine::matcher::{IdentityMatcher, Lookup};
use crate::engine::ranker::rank_standings;
use crate::engine::reconcile::{penalty_for, resolve_current_period, Reconciler, ScoringSettings};
use crate::engine::roster::{parse_roster, RosterLayout};
use crate::engine::types::{Diagnostic, Grid, MatchResult, Standing, StandingsError};
use crate::feeds::normaliser::{Leaderboard, LeaderboardSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsReport {
    pub tournament: Option<String>,
    pub current_period: Option<u32>,
    pub standings: Vec<Standing>,
    pub diagnostics: Vec<Diagnostic>,
}

#[instrument(skip_all)]
pub fn compute_standings(
    grid: &Grid,
    snapshot: &LeaderboardSnapshot,
    layout: &RosterLayout,
    scoring: &ScoringSettings,
) -> Result<StandingsReport, StandingsError> {
    let started = Instant::now();

    let roster = parse_roster(grid, layout)?;
    let current_period = resolve_current_period(scoring.current_period, &roster)?;
    let board = Leaderboard::from_snapshot(snapshot);

    let mut diagnostics = roster.notices.clone();
    if board.is_empty() {
        warn!("Leaderboard has no entries, all picks unmatched");
        diagnostics.push(Diagnostic::EmptyLeaderboard);
    }

    let penalty = penalty_for(&board, scoring.default_field_size);
    let reconciler = Reconciler::new(current_period, penalty, scoring.pending_policy);
    let matcher = IdentityMatcher::new(&board);

    let mut scored = Vec::with_capacity(roster.teams.len());
    for team in roster.teams {
        let pick = current_period.and_then(|p| team.pick_for(p));
        let live = match pick {
            Some(pick) => {
                let lookup = matcher.lookup(&pick.player_name_raw);
                match &lookup {
                    Lookup::Ambiguous(_) => {
                        metrics::counter!("pickem_ambiguous_picks_total").increment(1);
                        diagnostics.push(Diagnostic::AmbiguousMatch {
                            team: team.name.clone(),
                            player: pick.player_name_raw.clone(),
                            candidates: lookup.candidates(),
                        });
                    }
                    // An empty board already says why nobody matched
                    Lookup::NotInField if !board.is_empty() => {
                        metrics::counter!("pickem_unmatched_picks_total").increment(1);
                        diagnostics.push(Diagnostic::NotInField {
                            team: team.name.clone(),
                            player: pick.player_name_raw.clone(),
                        });
                    }
                    _ => {}
                }
                lookup.to_result()
            }
            None => MatchResult::Unmatched,
        };
        let reconciled = reconciler.reconcile(&team, live);
        scored.push((team, reconciled));
    }

    let standings = rank_standings(scored);

    let elapsed = started.elapsed();
    metrics::histogram!("pickem_pipeline_seconds").record(elapsed.as_secs_f64());
    debug!(elapsed_us = elapsed.as_micros() as u64, "Pipeline finished");
    info!(
        teams = standings.len(),
        current_period = ?current_period,
        diagnostics = diagnostics.len(),
        "Computed standings"
    );

    Ok(StandingsReport {
        tournament: board.event_name.clone(),
        current_period,
        standings,
        diagnostics,
    })
}

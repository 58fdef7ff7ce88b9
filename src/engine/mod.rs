// Reconciliation and scoring engine: roster grid + live field -> ranked standings
pub mod types;
pub mod roster;     // grid -> teams/picks
pub mod matcher;    // roster names -> leaderboard entries
pub mod reconcile;  // recorded + live -> running totals
pub mod ranker;     // totals -> ordered standings
pub mod pipeline;   // runs the stages for one request

pub use pipeline::{compute_standings, StandingsReport};
pub use types::*;

// Provider traits for the two external feeds.
// Each call returns one complete snapshot; retries and timeouts are the adapter's business.

use crate::engine::types::{Grid, StandingsError};
use crate::feeds::normaliser::LeaderboardSnapshot;

#[async_trait::async_trait]
pub trait RosterProvider: Send + Sync {
    async fn fetch_grid(&self) -> Result<Grid, StandingsError>;
}

#[async_trait::async_trait]
pub trait LeaderboardProvider: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<LeaderboardSnapshot, StandingsError>;
}

pub mod csv_file;
pub mod espn;
pub mod espn_types;
pub mod sheets;

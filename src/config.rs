// Layered configuration: defaults -> optional TOML file -> PICKEM__* environment.
// Example: PICKEM__SOURCES__SHEET_ID=abc PICKEM__SCORING__CURRENT_PERIOD=7

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::engine::reconcile::ScoringSettings;
use crate::engine::roster::RosterLayout;
use crate::feeds::adapters::espn::ESPN_GOLF_SCOREBOARD;

pub const DEFAULT_CONFIG_FILE: &str = "pickem.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub sheet_id: String,
    pub sheet_name: String,
    pub sheets_api_key: String,
    // Local CSV export used instead of the Sheets API when set
    pub roster_csv: Option<PathBuf>,
    pub leaderboard_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            sheet_name: "2026 Standings".into(),
            sheets_api_key: String::new(),
            roster_csv: None,
            leaderboard_url: ESPN_GOLF_SCOREBOARD.into(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:5001".into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub roster: RosterLayout,
    pub scoring: ScoringSettings,
    pub sources: SourcesConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// `path` must exist when given; the default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let cfg: AppConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PICKEM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let layout = &self.roster;
        if layout.block_width < 3 {
            bail!("roster.block_width must be at least 3 (player, finish, points)");
        }
        if layout.selection_token.trim().is_empty() {
            bail!("roster.selection_token must not be empty");
        }
        if layout.missed_cut_marker.is_empty() {
            bail!("roster.missed_cut_marker must not be empty");
        }
        if layout.data_start_row <= layout.header_row {
            bail!("roster.data_start_row must come after roster.header_row");
        }
        if self.scoring.default_field_size == 0 {
            bail!("scoring.default_field_size must be positive");
        }
        Ok(())
    }

    /// Sheets credentials are only needed when no CSV roster is configured.
    pub fn require_roster_source(&self) -> anyhow::Result<()> {
        if self.sources.roster_csv.is_none() && self.sources.sheet_id.trim().is_empty() {
            bail!("set sources.sheet_id (PICKEM__SOURCES__SHEET_ID) or sources.roster_csv");
        }
        Ok(())
    }
}

// Google Sheets v4 values API. Reads one whole tab as unformatted values so finishes arrive
// as numbers; access uses an API key on a link-shared sheet.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::RosterProvider;
use crate::engine::types::{Cell, Grid, StandingsError};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

// Response body of GET /v4/spreadsheets/{id}/values/{range}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValueRange {
    pub range: Option<String>,
    pub values: Vec<Vec<Value>>,
}

pub struct SheetsRoster {
    pub sheet_id: String,
    pub sheet_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl SheetsRoster {
    pub fn new(sheet_id: &str, sheet_name: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            sheet_id: sheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            api_key: api_key.to_string(),
            base_url: SHEETS_API_BASE.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self) -> Result<reqwest::Url, StandingsError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(fetch_error)?;
        url.path_segments_mut()
            .map_err(|_| fetch_error(format!("base url '{}' cannot carry a path", self.base_url)))?
            .extend(["v4", "spreadsheets", self.sheet_id.as_str(), "values", self.sheet_name.as_str()]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

fn fetch_error(e: impl std::fmt::Display) -> StandingsError {
    StandingsError::Fetch { feed: "roster", reason: e.to_string() }
}

pub fn cell_from_value(v: &Value) -> Cell {
    match v {
        Value::Null => Cell::Empty,
        Value::String(s) => Cell::from_text(s),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::from_text(&other.to_string()),
    }
}

pub fn grid_from_values(range: ValueRange) -> Grid {
    range
        .values
        .iter()
        .map(|row| row.iter().map(cell_from_value).collect())
        .collect()
}

#[async_trait::async_trait]
impl RosterProvider for SheetsRoster {
    #[instrument(skip(self), fields(sheet = %self.sheet_name))]
    async fn fetch_grid(&self) -> Result<Grid, StandingsError> {
        let range: ValueRange = self
            .client
            .get(self.values_url()?)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?
            .json()
            .await
            .map_err(fetch_error)?;

        let grid = grid_from_values(range);
        info!(rows = grid.len(), "Fetched roster sheet");
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_to_grid() {
        let body = r#"{
            "range": "'2026 Standings'!A1:Z100",
            "majorDimension": "ROWS",
            "values": [["", "SONY OPEN"], ["NAME", "GOLFER", "CP"], ["STEVE*", "CONNORS", 24, true]]
        }"#;
        let range: ValueRange = serde_json::from_str(body).unwrap();
        let grid = grid_from_values(range);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0][0], Cell::Empty);
        assert_eq!(grid[2][2], Cell::Number(24.0));
        assert_eq!(grid[2][3], Cell::Text("true".into()));
    }

    #[test]
    fn test_values_url_escapes_sheet_name() {
        let roster = SheetsRoster::new("abc123", "2026 Standings", "k", Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://localhost:9999/");
        let url = roster.values_url().unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/abc123/values/2026%20Standings");
        assert!(url.query().unwrap().contains("key=k"));
    }
}

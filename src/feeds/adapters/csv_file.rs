// Roster from a CSV export of the sheet (File > Download > CSV). Headerless and ragged.

use std::io::Read;
use std::path::PathBuf;

use tracing::{info, instrument};

use super::RosterProvider;
use crate::engine::types::{Cell, Grid, StandingsError};

pub struct CsvRoster {
    pub path: PathBuf,
}

impl CsvRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn fetch_error(e: impl std::fmt::Display) -> StandingsError {
    StandingsError::Fetch { feed: "roster", reason: e.to_string() }
}

/// Rows keep their sheet index: an empty line becomes an empty row rather than vanishing,
/// which the csv reader would otherwise do. Trailing empty rows are dropped.
pub fn grid_from_reader<R: Read>(mut reader: R) -> Result<Grid, StandingsError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(fetch_error)?;

    let mut grid: Grid = Vec::new();
    for line in split_rows(&data) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            grid.push(Vec::new());
        } else {
            grid.push(parse_row(line)?);
        }
    }
    while grid.last().is_some_and(|row| row.is_empty()) {
        grid.pop();
    }
    Ok(grid)
}

// Row boundaries are newlines outside quoted fields; "" escapes toggle twice
fn split_rows(data: &[u8]) -> Vec<&[u8]> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, &b) in data.iter().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b'\n' if !quoted => {
                rows.push(&data[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < data.len() {
        rows.push(&data[start..]);
    }
    rows
}

fn parse_row(line: &[u8]) -> Result<Vec<Cell>, StandingsError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    let mut record = csv::StringRecord::new();
    rdr.read_record(&mut record).map_err(fetch_error)?;
    Ok(record.iter().map(Cell::from_text).collect())
}

#[async_trait::async_trait]
impl RosterProvider for CsvRoster {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_grid(&self) -> Result<Grid, StandingsError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| fetch_error(format!("{}: {}", self.path.display(), e)))?;
        let grid = grid_from_reader(bytes.as_slice())?;
        info!(rows = grid.len(), "Loaded roster CSV");
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_rows() {
        let data = "\"\",SONY OPEN\nNAME,GOLFER,CP,TP\n\"SMITH, J\",CONNORS,24,24\n\n";
        let grid = grid_from_reader(data.as_bytes()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0].len(), 2);
        assert_eq!(grid[0][0], Cell::Empty);
        assert_eq!(grid[2][0], Cell::Text("SMITH, J".into()));
        assert_eq!(grid[2][2].as_count(), Some(24));
    }

    #[test]
    fn test_empty_lines_keep_their_row() {
        let data = "\nSONY OPEN\r\n\r\nNAME,GOLFER,CP,TP\n\"A\nB\",Day,1,1\n\"C \"\"K\"\"\",Kim,2,2\n\n";
        let grid = grid_from_reader(data.as_bytes()).unwrap();
        assert_eq!(grid.len(), 6);
        assert!(grid[0].is_empty());
        assert_eq!(grid[1][0], Cell::Text("SONY OPEN".into()));
        assert!(grid[2].is_empty());
        assert_eq!(grid[3][1], Cell::Text("GOLFER".into()));
        // a quoted cell spanning two lines is still one row
        assert_eq!(grid[4][0], Cell::Text("A\nB".into()));
        assert_eq!(grid[5][0], Cell::Text("C \"K\"".into()));
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let roster = CsvRoster::new("/definitely/not/here.csv");
        let err = roster.fetch_grid().await.unwrap_err();
        assert!(matches!(err, StandingsError::Fetch { feed: "roster", .. }));
    }
}

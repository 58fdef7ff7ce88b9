// Turns the raw roster grid into typed teams and picks.
//
// Column discovery runs once per parse and yields a `ColumnLayout`; team rows are then read
// against that layout only.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::engine::types::{cell_at, Cell, Diagnostic, Grid, Pick, StandingsError, Team};

/// Where things live in the roster grid. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterLayout {
    pub header_row: usize,
    pub label_row: usize,
    pub data_start_row: usize,
    pub name_col: usize,
    pub selection_token: String,
    // Columns per period: player, current finish, cumulative points
    pub block_width: usize,
    pub missed_cut_marker: String,
}

impl Default for RosterLayout {
    fn default() -> Self {
        Self {
            header_row: 4,
            label_row: 3,
            data_start_row: 6,
            name_col: 13,
            selection_token: "GOLFER".into(),
            block_width: 3,
            missed_cut_marker: "*".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDef {
    pub period: u32,
    pub label: String,
    pub player_col: usize,
    pub finish_col: usize,
    pub points_col: usize,
}

/// Declarative description of the period blocks found in one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub blocks: Vec<BlockDef>,
}

impl ColumnLayout {
    #[instrument(level = "debug", skip(grid))]
    pub fn discover(grid: &Grid, layout: &RosterLayout) -> Result<Self, StandingsError> {
        let header = grid.get(layout.header_row).ok_or_else(|| {
            StandingsError::malformed(format!(
                "grid has {} rows, header row {} is missing",
                grid.len(),
                layout.header_row
            ))
        })?;

        let starts: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, c)| c.text().eq_ignore_ascii_case(&layout.selection_token))
            .map(|(col, _)| col)
            .collect();

        if starts.is_empty() {
            return Err(StandingsError::malformed(format!(
                "no '{}' columns in header row {}",
                layout.selection_token, layout.header_row
            )));
        }

        for pair in starts.windows(2) {
            if pair[1] - pair[0] < layout.block_width {
                return Err(StandingsError::malformed(format!(
                    "period blocks at columns {} and {} overlap (block width {})",
                    pair[0], pair[1], layout.block_width
                )));
            }
        }

        if let Some(start) = starts
            .iter()
            .find(|&&s| (s..s + layout.block_width).contains(&layout.name_col))
        {
            return Err(StandingsError::malformed(format!(
                "team name column {} falls inside the period block at column {}",
                layout.name_col, start
            )));
        }

        let label_row: &[Cell] = grid.get(layout.label_row).map(Vec::as_slice).unwrap_or(&[]);
        let mut blocks = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let period = i as u32 + 1;
            // A merged label sits in its leftmost cell; never read past the previous block
            let floor = if i == 0 { 0 } else { starts[i - 1] + 1 };
            let label = (floor..=start)
                .rev()
                .map(|col| cell_at(label_row, col))
                .find(|c| !c.is_blank())
                .map(|c| c.text())
                .unwrap_or_else(|| format!("Week {}", period));

            blocks.push(BlockDef {
                period,
                label,
                player_col: start,
                finish_col: start + 1,
                points_col: start + 2,
            });
        }

        debug!(blocks = blocks.len(), "Discovered period blocks");
        Ok(Self { blocks })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub layout: ColumnLayout,
    pub teams: Vec<Team>,
    pub notices: Vec<Diagnostic>,
}

impl Roster {
    pub fn periods(&self) -> impl Iterator<Item = u32> + '_ {
        self.layout.blocks.iter().map(|b| b.period)
    }
}

#[instrument(skip_all, fields(rows = grid.len()))]
pub fn parse_roster(grid: &Grid, layout: &RosterLayout) -> Result<Roster, StandingsError> {
    let columns = ColumnLayout::discover(grid, layout)?;

    if grid.len() <= layout.data_start_row {
        return Err(StandingsError::malformed(format!(
            "grid has {} rows, no team rows from row {}",
            grid.len(),
            layout.data_start_row
        )));
    }

    let mut teams = Vec::new();
    let mut notices = Vec::new();

    for (row_idx, row) in grid.iter().enumerate().skip(layout.data_start_row) {
        let raw_name = cell_at(row, layout.name_col).text();
        let (name, missed_cuts) = strip_missed_cuts(&raw_name, &layout.missed_cut_marker);
        if name.is_empty() {
            debug!(row = row_idx, "Skipping blank team row");
            continue;
        }

        let mut picks = Vec::with_capacity(columns.blocks.len());
        for block in &columns.blocks {
            let player = cell_at(row, block.player_col).text();
            if player.is_empty() {
                continue;
            }
            let recorded_finish = read_count(row, block.finish_col, &name, block.period, &mut notices);
            let cumulative = read_count(row, block.points_col, &name, block.period, &mut notices);
            picks.push(Pick {
                period: block.period,
                tournament_label: block.label.clone(),
                player_name_raw: player,
                recorded_finish,
                cumulative_points_through_period: cumulative,
            });
        }

        // An open period followed by closed ones was skipped by the team
        let last_closed = picks
            .iter()
            .filter(|p| p.recorded_finish.is_some())
            .map(|p| p.period)
            .max();
        if let Some(last_closed) = last_closed {
            picks.retain(|p| {
                let skipped = p.recorded_finish.is_none() && p.period < last_closed;
                if skipped {
                    debug!(team = %name, period = p.period, "Team skipped period");
                }
                !skipped
            });
        }

        let total_points = picks.iter().filter_map(|p| p.recorded_finish).sum();
        teams.push(Team {
            id: teams.len() as u32 + 1,
            name,
            missed_cut: missed_cuts > 0,
            missed_cuts,
            picks,
            total_points,
        });
    }

    debug!(teams = teams.len(), "Parsed roster");
    Ok(Roster { layout: columns, teams, notices })
}

// Trailing markers, one per missed cut ("SMITH **" -> ("SMITH", 2))
fn strip_missed_cuts(raw_name: &str, marker: &str) -> (String, u32) {
    let mut name = raw_name.trim();
    let mut count = 0;
    if !marker.is_empty() {
        while let Some(rest) = name.strip_suffix(marker) {
            name = rest.trim_end();
            count += 1;
        }
    }
    (name.to_string(), count)
}

fn read_count(row: &[Cell], col: usize, team: &str, period: u32, notices: &mut Vec<Diagnostic>) -> Option<u32> {
    let cell = cell_at(row, col);
    if cell.is_blank() {
        return None;
    }
    let value = cell.as_count();
    if value.is_none() {
        warn!(team, period, value = %cell.text(), "Unreadable roster value");
        notices.push(Diagnostic::UnreadableCell {
            team: team.to_string(),
            period,
            value: cell.text(),
        });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{grid, test_layout};

    #[test]
    fn test_discovers_blocks_and_labels() {
        let g = grid(&[
            &["", "SONY OPEN", "", "", "", "", "", "", "", ""],
            &["NAME", "golfer", "CP", "TP", "GOLFER", "CP", "TP", "GOLFER", "CP", "TP"],
            &["", "", "", "", "", "", "", "", "", ""],
        ]);
        let cols = ColumnLayout::discover(&g, &test_layout()).unwrap();
        assert_eq!(cols.blocks.len(), 3);
        assert_eq!(cols.blocks[0].label, "SONY OPEN");
        // Second block has no label of its own and must not borrow the first one
        assert_eq!(cols.blocks[1].label, "Week 2");
        assert_eq!(cols.blocks[2].player_col, 7);
        assert_eq!(cols.blocks[2].finish_col, 8);
    }

    #[test]
    fn test_merged_label_found_to_the_left() {
        let g = grid(&[
            &["", "", "", "", "AMEX", "", "", ""],
            &["NAME", "GOLFER", "CP", "TP", "", "GOLFER", "CP", "TP"],
            &[],
        ]);
        let cols = ColumnLayout::discover(&g, &test_layout()).unwrap();
        assert_eq!(cols.blocks[0].label, "Week 1");
        assert_eq!(cols.blocks[1].label, "AMEX");
    }

    #[test]
    fn test_no_selection_columns_is_malformed() {
        let g = grid(&[&["", "X"], &["NAME", "PLAYER", "CP"], &["A", "B", "1"]]);
        let err = parse_roster(&g, &test_layout()).unwrap_err();
        assert!(matches!(err, StandingsError::MalformedRoster { .. }));
    }

    #[test]
    fn test_overlapping_blocks_are_malformed() {
        let g = grid(&[&[], &["NAME", "GOLFER", "GOLFER", "TP"], &["A", "x", "y", "1"]]);
        let err = parse_roster(&g, &test_layout()).unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_missing_header_row_is_malformed() {
        let g = grid(&[&["only one row"]]);
        assert!(parse_roster(&g, &test_layout()).is_err());
    }

    #[test]
    fn test_parses_teams_and_missed_cut() {
        let g = grid(&[
            &["", "SONY", "", "", "AMEX", "", ""],
            &["NAME", "GOLFER", "CP", "TP", "GOLFER", "CP", "TP"],
            &["A", "Scheffler", "3", "3", "McIlroy", "5", "8"],
            &["", "", "", "", "", "", ""],
            &["C *", "Kim", "10", "10", "Lowry", "", ""],
        ]);
        let roster = parse_roster(&g, &test_layout()).unwrap();
        assert_eq!(roster.teams.len(), 2);

        let a = &roster.teams[0];
        assert_eq!(a.id, 1);
        assert_eq!(a.name, "A");
        assert!(!a.missed_cut);
        assert_eq!(a.total_points, 8);
        assert_eq!(a.picks[1].tournament_label, "AMEX");
        assert_eq!(a.picks[1].cumulative_points_through_period, Some(8));

        let c = &roster.teams[1];
        assert_eq!(c.id, 2);
        assert_eq!(c.name, "C");
        assert!(c.missed_cut);
        assert_eq!(c.missed_cuts, 1);
        assert_eq!(c.picks.len(), 2);
        assert_eq!(c.picks[1].recorded_finish, None);
    }

    #[test]
    fn test_missed_cut_count() {
        let g = grid(&[
            &[],
            &["NAME", "GOLFER", "CP", "TP"],
            &["C**", "Kim", "10", "10"],
            &["D * *", "Day", "4", "4"],
            &["E", "Lowry", "6", "6"],
        ]);
        let roster = parse_roster(&g, &test_layout()).unwrap();
        let counts: Vec<(&str, bool, u32)> = roster
            .teams
            .iter()
            .map(|t| (t.name.as_str(), t.missed_cut, t.missed_cuts))
            .collect();
        assert_eq!(counts, vec![("C", true, 2), ("D", true, 2), ("E", false, 0)]);
        assert_eq!(strip_missed_cuts("STEVE*", ""), ("STEVE*".to_string(), 0));
    }

    #[test]
    fn test_gap_period_is_excluded() {
        let g = grid(&[
            &[],
            &["NAME", "GOLFER", "CP", "TP", "GOLFER", "CP", "TP", "GOLFER", "CP", "TP"],
            // picked in week 2 but never scored, while week 3 is closed
            &["A", "Scheffler", "3", "3", "Rahm", "", "", "Lowry", "7", "10"],
            // no selection at all in week 2
            &["B", "Kim", "4", "4", "", "", "", "Day", "2", "6"],
        ]);
        let roster = parse_roster(&g, &test_layout()).unwrap();
        let periods: Vec<u32> = roster.teams[0].picks.iter().map(|p| p.period).collect();
        assert_eq!(periods, vec![1, 3]);
        assert_eq!(roster.teams[1].picks.len(), 2);
    }

    #[test]
    fn test_short_rows_are_padded_and_bad_values_reported() {
        let g = grid(&[
            &[],
            &["NAME", "GOLFER", "CP", "TP", "GOLFER", "CP", "TP"],
            &["A", "Scheffler", "WD"],
        ]);
        let roster = parse_roster(&g, &test_layout()).unwrap();
        let team = &roster.teams[0];
        assert_eq!(team.picks.len(), 1);
        assert_eq!(team.picks[0].recorded_finish, None);
        assert_eq!(roster.notices.len(), 1);
        assert!(matches!(roster.notices[0], Diagnostic::UnreadableCell { period: 1, .. }));
    }

    #[test]
    fn test_numeric_cells() {
        let mut g = grid(&[&[], &["NAME", "GOLFER", "CP", "TP"]]);
        g.push(vec![Cell::from_text("A"), Cell::from_text("Day"), Cell::Number(12.0), Cell::Number(40.0)]);
        let roster = parse_roster(&g, &test_layout()).unwrap();
        assert_eq!(roster.teams[0].picks[0].recorded_finish, Some(12));
        assert_eq!(roster.teams[0].total_points, 12);
    }
}

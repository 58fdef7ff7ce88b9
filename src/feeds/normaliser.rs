// Convert leaderboard wire strings into typed entries and build the name lookups.
// Unparseable values degrade to "absent"; nothing in here fails.

use ahash::AHashMap;
use serde::Deserialize;
use smallvec::SmallVec;
use tracing::{debug, instrument, warn};

use crate::engine::types::{LeaderboardEntry, LiveStatus, Position, Thru};

/// One competitor exactly as the feed reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawCompetitor {
    pub display_name: String,
    pub position: String, // "1", "T5", "-" or blank
    pub score: String,    // "-12", "E", "+2"
    pub today: String,
    pub thru: String, // "F", "12", blank
    pub status: String, // feed state: "pre" | "in" | "post"
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardSnapshot {
    pub event_name: Option<String>,
    pub competitors: Vec<RawCompetitor>,
}

/// Lower-case, trim, collapse internal whitespace.
pub fn normalise_name(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Final whitespace-delimited token of an already-normalised name.
pub fn last_token(normalised: &str) -> Option<&str> {
    normalised.split_whitespace().next_back()
}

pub fn parse_position(s: &str) -> Option<Position> {
    let s = s.trim();
    let (digits, tied) = match s.strip_prefix(['T', 't']) {
        Some(rest) => (rest, true),
        None => (s, false),
    };
    match digits.parse::<u32>() {
        Ok(place) if place > 0 => Some(Position { place, tied }),
        _ => None,
    }
}

pub fn parse_to_par(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("E") {
        return Some(0);
    }
    s.strip_prefix('+').unwrap_or(s).parse::<i32>().ok()
}

pub fn parse_thru(s: &str) -> Thru {
    let s = s.trim();
    if s.eq_ignore_ascii_case("F") {
        return Thru::Finished;
    }
    match s.parse::<u8>() {
        Ok(18..) => Thru::Finished,
        Ok(0) | Err(_) => Thru::NotStarted,
        Ok(n) => Thru::Holes(n),
    }
}

pub fn parse_status(s: &str) -> LiveStatus {
    match s.trim().to_ascii_lowercase().as_str() {
        "in" | "in-progress" | "in_progress" | "active" => LiveStatus::InProgress,
        "post" | "final" | "completed" => LiveStatus::Completed,
        _ => LiveStatus::NotStarted,
    }
}

/// `None` for placeholder rows without a name.
pub fn normalise_entry(raw: &RawCompetitor) -> Option<LeaderboardEntry> {
    let display_name = raw.display_name.split_whitespace().collect::<Vec<_>>().join(" ");
    if display_name.is_empty() {
        return None;
    }
    Some(LeaderboardEntry {
        display_name,
        position: parse_position(&raw.position),
        score_to_par: parse_to_par(&raw.score).unwrap_or(0),
        today: parse_to_par(&raw.today),
        thru: parse_thru(&raw.thru),
        status: parse_status(&raw.status),
    })
}

/// Normalised live field with full-name and last-name lookups.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub event_name: Option<String>,
    entries: Vec<LeaderboardEntry>,
    by_name: AHashMap<String, usize>,
    // A last name can belong to several golfers
    by_last_name: AHashMap<String, SmallVec<[usize; 2]>>,
}

impl Leaderboard {
    #[instrument(skip_all, fields(competitors = snapshot.competitors.len()))]
    pub fn from_snapshot(snapshot: &LeaderboardSnapshot) -> Self {
        let mut board = Leaderboard {
            event_name: snapshot.event_name.clone(),
            ..Default::default()
        };

        for raw in &snapshot.competitors {
            let Some(entry) = normalise_entry(raw) else {
                debug!("Dropping leaderboard row without a name");
                continue;
            };
            let key = normalise_name(&entry.display_name);
            if board.by_name.contains_key(&key) {
                warn!(name = %entry.display_name, "Duplicate leaderboard name, keeping first");
                continue;
            }

            let idx = board.entries.len();
            if let Some(last) = last_token(&key) {
                board.by_last_name.entry(last.to_string()).or_default().push(idx);
            }
            board.by_name.insert(key, idx);
            board.entries.push(entry);
        }

        debug!(entries = board.entries.len(), "Built leaderboard lookups");
        board
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_full_name(&self, normalised: &str) -> Option<&LeaderboardEntry> {
        self.by_name.get(normalised).map(|&i| &self.entries[i])
    }

    pub fn by_last_name(&self, last: &str) -> Vec<&LeaderboardEntry> {
        self.by_last_name
            .get(last)
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Worst live place currently shown, if anyone has one.
    pub fn max_place(&self) -> Option<u32> {
        self.entries.iter().filter_map(|e| e.position).map(|p| p.place).max()
    }
}

// Resolve roster player names against the live field.
//
// The roster writes golfers as it likes ("MATSUYAMA", "S W KIM") while the feed uses full
// display names, and there is no shared player id. Exact full-name hits win; otherwise the
// surname decides, and only when it is unique.

use tracing::{debug, trace};

use crate::engine::types::{LeaderboardEntry, MatchResult};
use crate::feeds::normaliser::{last_token, normalise_name, Leaderboard};

#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    Exact(&'a LeaderboardEntry),
    Surname(&'a LeaderboardEntry),
    Ambiguous(Vec<&'a LeaderboardEntry>),
    NotInField,
}

impl Lookup<'_> {
    pub fn to_result(&self) -> MatchResult {
        match self {
            Lookup::Exact(e) | Lookup::Surname(e) => MatchResult::Matched((*e).clone()),
            Lookup::Ambiguous(_) | Lookup::NotInField => MatchResult::Unmatched,
        }
    }

    pub fn candidates(&self) -> Vec<String> {
        match self {
            Lookup::Ambiguous(entries) => entries.iter().map(|e| e.display_name.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

pub struct IdentityMatcher<'a> {
    board: &'a Leaderboard,
}

impl<'a> IdentityMatcher<'a> {
    pub fn new(board: &'a Leaderboard) -> Self {
        Self { board }
    }

    pub fn lookup(&self, player_name_raw: &str) -> Lookup<'a> {
        let key = normalise_name(player_name_raw);
        if let Some(entry) = self.board.by_full_name(&key) {
            trace!(player = player_name_raw, "Exact name match");
            return Lookup::Exact(entry);
        }

        let Some(last) = last_token(&key) else {
            return Lookup::NotInField;
        };
        let mut found = self.board.by_last_name(last);
        match found.len() {
            0 => Lookup::NotInField,
            1 => {
                trace!(player = player_name_raw, surname = last, "Surname match");
                Lookup::Surname(found.remove(0))
            }
            n => {
                debug!(player = player_name_raw, surname = last, candidates = n, "Ambiguous surname");
                Lookup::Ambiguous(found)
            }
        }
    }

    pub fn resolve(&self, player_name_raw: &str) -> MatchResult {
        self.lookup(player_name_raw).to_result()
    }
}

// External feeds: roster sheet and live leaderboard
pub mod adapters;       // provider traits + concrete fetchers (ESPN, Sheets, CSV)
pub mod normaliser;     // converts leaderboard strings -> typed entries + lookups
pub mod router;         // HTTP surface: fetch both feeds, run the engine

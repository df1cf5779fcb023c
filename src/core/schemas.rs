//! Database schema definitions for the stats database.
//!
//! One SQLite file (`stats.db` by default) holds both tables:
//! 1. stats: per (batsman, bowler) delivery counters.
//! 2. players: optional roster of known names and their role.

pub const SCHEMA_VERSION: i64 = 1;

pub const STATS_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS stats (
        batsman TEXT NOT NULL,
        bowler TEXT NOT NULL,
        beaten INTEGER NOT NULL DEFAULT 0,
        wicket INTEGER NOT NULL DEFAULT 0,
        pace_wide INTEGER NOT NULL DEFAULT 0,
        spin_wide INTEGER NOT NULL DEFAULT 0,
        no_ball INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (batsman, bowler)
    )
";
pub const STATS_DB_INDEX_BOWLER: &str =
    "CREATE INDEX IF NOT EXISTS idx_stats_bowler ON stats(bowler)";

pub const PLAYERS_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS players (
        name TEXT PRIMARY KEY,
        type TEXT NOT NULL CHECK(type IN ('batsman', 'bowler'))
    )
";

use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use crate::core::store::Store;
use rusqlite::Connection;
use std::fs;
use std::time::Duration;

pub fn db_connect(db_path: &str, busy_timeout: Duration) -> Result<Connection, error::MatchupError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(busy_timeout)
        .map_err(error::MatchupError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::MatchupError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::MatchupError::RusqliteError)?;
    Ok(conn)
}

/// Create the data directory and every table the store owns.
pub fn initialize_store(store: &Store) -> Result<(), error::MatchupError> {
    fs::create_dir_all(&store.root).map_err(error::MatchupError::IoError)?;

    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "store.init", |conn| {
        conn.execute(schemas::STATS_DB_SCHEMA, [])?;
        conn.execute(schemas::PLAYERS_DB_SCHEMA, [])?;
        conn.execute(schemas::STATS_DB_INDEX_BOWLER, [])?;
        conn.pragma_update(None, "user_version", schemas::SCHEMA_VERSION)?;
        Ok(())
    })
}

/// Schema version recorded in the stats database (`PRAGMA user_version`).
pub fn schema_version(store: &Store) -> Result<i64, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "store.schema_version", |conn| {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    })
}

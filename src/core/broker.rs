use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub const AUDIT_LOG_NAME: &str = "broker.events.jsonl";

/// The DB Broker is the single path to the store's databases.
/// Every call is serialized behind one in-process lock and recorded in the audit log.
pub struct DbBroker {
    audit_log_path: PathBuf,
    audit_enabled: bool,
    actor: String,
    busy_timeout: Duration,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub intent_ref: Option<String>,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl DbBroker {
    pub fn new(store: &Store) -> Self {
        Self {
            audit_log_path: audit_log_path(&store.root),
            audit_enabled: store.config.audit.enabled,
            actor: store.config.audit.actor.clone(),
            busy_timeout: Duration::from_millis(store.config.store.busy_timeout_ms),
        }
    }

    /// Execute a closure with a serialized connection to the specified DB.
    /// The lock is held for the whole closure, so read-modify-write spans are atomic
    /// with respect to every other brokered call in this process.
    pub fn with_conn<F, R>(
        &self,
        db_path: &Path,
        intent_ref: Option<&str>,
        op_name: &str,
        f: F,
    ) -> Result<R, error::MatchupError>
    where
        F: FnOnce(&Connection) -> Result<R, error::MatchupError>,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let result = db::db_connect(&db_path.to_string_lossy(), self.busy_timeout)
            .and_then(|conn| f(&conn));

        let status = if result.is_ok() { "success" } else { "error" };
        // The call's own result is returned even when the audit append fails.
        if let Err(e) = self.log_event(intent_ref, op_name, &db_id, status) {
            eprintln!("warning: audit log not written for {}: {}", op_name, e);
        }

        result
    }

    fn log_event(
        &self,
        intent_ref: Option<&str>,
        op: &str,
        db_id: &str,
        status: &str,
    ) -> Result<(), error::MatchupError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        if !self.audit_enabled {
            return Ok(());
        }

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: self.actor.clone(),
            intent_ref: intent_ref.map(|s| s.to_string()),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
        };
        let line = serde_json::to_string(&ev).map_err(|e| {
            error::MatchupError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::MatchupError::IoError)?;

        writeln!(f, "{}", line).map_err(error::MatchupError::IoError)?;
        Ok(())
    }
}

pub fn audit_log_path(root: &Path) -> PathBuf {
    root.join(AUDIT_LOG_NAME)
}

/// Parse the audit log; a missing log is an empty history.
pub fn read_audit_log(store: &Store) -> Result<Vec<BrokerEvent>, error::MatchupError> {
    let path = audit_log_path(&store.root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path).map_err(error::MatchupError::IoError)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str::<BrokerEvent>(line).map_err(|e| {
                error::MatchupError::ValidationError(format!("Malformed audit line: {}", e))
            })
        })
        .collect()
}

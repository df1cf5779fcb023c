//! Roster of known players.
//!
//! The roster is optional. When it is used it is the source of truth for which
//! names exist, and the stat store's keys are expected to be a subset of it.

use crate::core::broker::DbBroker;
use crate::core::delivery::normalize_name;
use crate::core::error;
use crate::core::store::Store;
use crate::plugins::stats;
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batsman,
    Bowler,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Batsman => "batsman",
            Role::Bowler => "bowler",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = error::MatchupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batsman" => Ok(Role::Batsman),
            "bowler" => Ok(Role::Bowler),
            other => Err(error::MatchupError::ValidationError(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub role: Role,
}

/// Stat-store names missing from the roster, per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterReport {
    pub unregistered_batsmen: Vec<String>,
    pub unregistered_bowlers: Vec<String>,
}

impl RosterReport {
    pub fn is_clean(&self) -> bool {
        self.unregistered_batsmen.is_empty() && self.unregistered_bowlers.is_empty()
    }
}

#[derive(Parser, Debug)]
#[clap(name = "roster", about = "Manage the roster of known batsmen and bowlers.")]
pub struct RosterCli {
    #[clap(subcommand)]
    pub command: RosterCommand,
}

#[derive(Subcommand, Debug)]
pub enum RosterCommand {
    /// Register a player under a role.
    Add {
        #[clap(long)]
        name: String,
        #[clap(long, value_enum)]
        role: Role,
    },
    /// List registered players.
    List {
        #[clap(long, value_enum)]
        role: Option<Role>,
    },
    /// Report stat-store names that are not registered.
    Check,
    /// Remove every roster entry. Recorded stats are kept.
    Reset,
}

pub(crate) fn role_of(conn: &Connection, name: &str) -> Result<Option<Role>, error::MatchupError> {
    let role: Option<String> = conn
        .query_row(
            "SELECT type FROM players WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    role.map(|r| r.parse::<Role>()).transpose()
}

pub(crate) fn is_registered(
    conn: &Connection,
    name: &str,
    role: Role,
) -> Result<bool, error::MatchupError> {
    Ok(role_of(conn, name)? == Some(role))
}

pub fn add(store: &Store, name: &str, role: Role) -> Result<(), error::MatchupError> {
    let name = normalize_name(role.as_str(), name)?;
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "roster.add", |conn| {
        match role_of(conn, &name)? {
            Some(existing) if existing == role => Ok(()),
            Some(existing) => Err(error::MatchupError::ValidationError(format!(
                "'{}' is already registered as {}",
                name, existing
            ))),
            None => {
                conn.execute(
                    "INSERT INTO players(name, type) VALUES(?1, ?2)",
                    params![name, role.as_str()],
                )?;
                Ok(())
            }
        }
    })
}

pub fn list(store: &Store, role: Option<Role>) -> Result<Vec<Player>, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "roster.list", |conn| {
        let mut stmt = conn.prepare("SELECT name, type FROM players ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for r in rows {
            let (name, kind) = r?;
            let player = Player {
                name,
                role: kind.parse()?,
            };
            if role.is_none_or(|wanted| wanted == player.role) {
                out.push(player);
            }
        }
        Ok(out)
    })
}

pub fn contains(store: &Store, name: &str, role: Role) -> Result<bool, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "roster.contains", |conn| {
        is_registered(conn, name.trim(), role)
    })
}

pub fn check(store: &Store) -> Result<RosterReport, error::MatchupError> {
    let players = list(store, None)?;
    let registered = |role: Role| -> BTreeSet<String> {
        players
            .iter()
            .filter(|p| p.role == role)
            .map(|p| p.name.clone())
            .collect()
    };
    let known_batsmen = registered(Role::Batsman);
    let known_bowlers = registered(Role::Bowler);

    Ok(RosterReport {
        unregistered_batsmen: stats::batsmen(store)?
            .into_iter()
            .filter(|n| !known_batsmen.contains(n))
            .collect(),
        unregistered_bowlers: stats::bowlers(store)?
            .into_iter()
            .filter(|n| !known_bowlers.contains(n))
            .collect(),
    })
}

/// Returns the number of entries removed.
pub fn reset(store: &Store) -> Result<usize, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "roster.reset", |conn| {
        Ok(conn.execute("DELETE FROM players", [])?)
    })
}

pub fn run_roster_cli(store: &Store, cli: RosterCli) -> Result<(), error::MatchupError> {
    stats::initialize_stats_db(store)?;
    match cli.command {
        RosterCommand::Add { name, role } => {
            add(store, &name, role)?;
            println!("Registered {}: {}", role, name.trim());
        }
        RosterCommand::List { role } => {
            for player in list(store, role)? {
                println!("{}\t{}", player.name, player.role);
            }
        }
        RosterCommand::Check => {
            let report = check(store)?;
            if report.is_clean() {
                println!("All recorded names are registered.");
            } else {
                for name in &report.unregistered_batsmen {
                    println!("unregistered batsman: {}", name);
                }
                for name in &report.unregistered_bowlers {
                    println!("unregistered bowler: {}", name);
                }
            }
        }
        RosterCommand::Reset => {
            let removed = reset(store)?;
            println!("Roster cleared ({} entries removed).", removed);
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "roster",
        "version": "0.1.0",
        "description": "Registered batsmen and bowlers",
        "commands": [
            { "name": "add", "parameters": ["name", "role"] },
            { "name": "list", "parameters": ["role"] },
            { "name": "check" },
            { "name": "reset" }
        ],
        "storage": ["stats.db"]
    })
}

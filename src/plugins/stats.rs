use crate::core::broker::DbBroker;
use crate::core::delivery::{normalize_name, Category, Counts};
use crate::core::error;
use crate::core::output;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::roster::{self, Role};
use crate::plugins::tally::{self, Alphabet};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(name = "stat", about = "Record and query batsman-vs-bowler delivery counts.")]
pub struct StatCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub command: StatCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatCommand {
    /// Replace every counter for a pair (creates the pair if unseen).
    Set {
        #[clap(long)]
        batsman: String,
        #[clap(long)]
        bowler: String,
        #[clap(long, default_value = "0", allow_negative_numbers = true)]
        beaten: i64,
        #[clap(long, default_value = "0", allow_negative_numbers = true)]
        wicket: i64,
        #[clap(long, default_value = "0", allow_negative_numbers = true)]
        pace_wide: i64,
        #[clap(long, default_value = "0", allow_negative_numbers = true)]
        spin_wide: i64,
        #[clap(long, default_value = "0", allow_negative_numbers = true)]
        no_ball: i64,
    },
    /// Add one to a single counter.
    Bump {
        #[clap(long)]
        batsman: String,
        #[clap(long)]
        bowler: String,
        #[clap(long, value_enum)]
        category: Category,
    },
    /// Tally a bowling sequence (b w 1 2 3) and store it for the pair.
    Record {
        #[clap(long)]
        batsman: String,
        #[clap(long)]
        bowler: String,
        #[clap(long)]
        sequence: String,
    },
    /// Show the counters for one pair (all zero when never recorded).
    Get {
        #[clap(long)]
        batsman: String,
        #[clap(long)]
        bowler: String,
    },
    /// Show every bowler recorded against a batsman.
    List {
        #[clap(long)]
        batsman: String,
    },
    /// Per-batsman sums across all bowlers.
    Summary,
    /// Distinct names seen in the store for one role.
    Names {
        #[clap(long, value_enum)]
        role: Role,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub batsman: String,
    pub bowler: String,
    #[serde(flatten)]
    pub counts: Counts,
}

pub const COUNT_HEADERS: [&str; 5] = ["beaten", "wicket", "pace_wide", "spin_wide", "no_ball"];

pub fn initialize_stats_db(store: &Store) -> Result<(), error::MatchupError> {
    crate::core::db::initialize_store(store)
}

/// Validate both keys and, when the roster is enforced, their registration.
pub(crate) fn checked_keys(
    conn: &Connection,
    store: &Store,
    batsman: &str,
    bowler: &str,
) -> Result<(String, String), error::MatchupError> {
    let batsman = normalize_name("batsman", batsman)?;
    let bowler = normalize_name("bowler", bowler)?;
    if store.config.roster.enforce {
        for (name, role) in [(&batsman, Role::Batsman), (&bowler, Role::Bowler)] {
            if !roster::is_registered(conn, name, role)? {
                return Err(error::MatchupError::InvalidKey(format!(
                    "{} '{}' is not in the roster",
                    role.as_str(),
                    name
                )));
            }
        }
    }
    Ok((batsman, bowler))
}

fn counts_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Counts> {
    Ok(Counts {
        beaten: row.get(offset)?,
        wicket: row.get(offset + 1)?,
        pace_wide: row.get(offset + 2)?,
        spin_wide: row.get(offset + 3)?,
        no_ball: row.get(offset + 4)?,
    })
}

/// Write a full counter set on an open connection. Shared with CSV import.
pub(crate) fn upsert_on(
    conn: &Connection,
    batsman: &str,
    bowler: &str,
    counts: &Counts,
) -> Result<(), error::MatchupError> {
    conn.execute(
        "INSERT INTO stats(batsman, bowler, beaten, wicket, pace_wide, spin_wide, no_ball)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(batsman, bowler) DO UPDATE SET
            beaten = excluded.beaten,
            wicket = excluded.wicket,
            pace_wide = excluded.pace_wide,
            spin_wide = excluded.spin_wide,
            no_ball = excluded.no_ball",
        params![
            batsman,
            bowler,
            counts.beaten,
            counts.wicket,
            counts.pace_wide,
            counts.spin_wide,
            counts.no_ball
        ],
    )?;
    Ok(())
}

fn get_on(
    conn: &Connection,
    batsman: &str,
    bowler: &str,
) -> Result<Option<Counts>, error::MatchupError> {
    let counts = conn
        .query_row(
            "SELECT beaten, wicket, pace_wide, spin_wide, no_ball FROM stats
             WHERE batsman = ?1 AND bowler = ?2",
            params![batsman, bowler],
            |row| counts_from_row(row, 0),
        )
        .optional()?;
    Ok(counts)
}

/// Replace the whole counter set for a pair. Repeating the call changes nothing.
pub fn upsert(
    store: &Store,
    batsman: &str,
    bowler: &str,
    counts: &Counts,
) -> Result<(), error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "stats.upsert", |conn| {
        let (batsman, bowler) = checked_keys(conn, store, batsman, bowler)?;
        counts.validate()?;
        upsert_on(conn, &batsman, &bowler, counts)
    })
}

/// Add one to `category` for the pair and return the counters after the write.
pub fn increment(
    store: &Store,
    batsman: &str,
    bowler: &str,
    category: Category,
) -> Result<Counts, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "stats.increment", |conn| {
        let (batsman, bowler) = checked_keys(conn, store, batsman, bowler)?;
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let column = category.column();
        tx.execute(
            &format!(
                "INSERT INTO stats(batsman, bowler, {col}) VALUES(?1, ?2, 1)
                 ON CONFLICT(batsman, bowler) DO UPDATE SET {col} = {col} + 1",
                col = column
            ),
            params![batsman, bowler],
        )?;
        let counts = get_on(&tx, &batsman, &bowler)?.unwrap_or_default();
        tx.commit()?;
        Ok(counts)
    })
}

/// Counters for a pair, `None` when the pair was never recorded.
pub fn get(
    store: &Store,
    batsman: &str,
    bowler: &str,
) -> Result<Option<Counts>, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "stats.get", |conn| {
        get_on(conn, batsman.trim(), bowler.trim())
    })
}

pub fn get_or_zero(
    store: &Store,
    batsman: &str,
    bowler: &str,
) -> Result<Counts, error::MatchupError> {
    Ok(get(store, batsman, bowler)?.unwrap_or_default())
}

pub fn list_for_batsman(
    store: &Store,
    batsman: &str,
) -> Result<Vec<(String, Counts)>, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "stats.list_for_batsman", |conn| {
        let mut stmt = conn.prepare(
            "SELECT bowler, beaten, wicket, pace_wide, spin_wide, no_ball FROM stats
             WHERE batsman = ?1 ORDER BY bowler",
        )?;
        let rows = stmt.query_map(params![batsman.trim()], |row| {
            Ok((row.get::<_, String>(0)?, counts_from_row(row, 1)?))
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}

pub fn list_all(store: &Store) -> Result<Vec<StatRecord>, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "stats.list_all", |conn| {
        let mut stmt = conn.prepare(
            "SELECT batsman, bowler, beaten, wicket, pace_wide, spin_wide, no_ball FROM stats
             ORDER BY batsman, bowler",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StatRecord {
                batsman: row.get(0)?,
                bowler: row.get(1)?,
                counts: counts_from_row(row, 2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(error::MatchupError::RusqliteError)
    })
}

pub fn aggregate_by_batsman(
    store: &Store,
) -> Result<BTreeMap<String, Counts>, error::MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "stats.aggregate", |conn| {
        let mut stmt = conn.prepare(
            "SELECT batsman, SUM(beaten), SUM(wicket), SUM(pace_wide), SUM(spin_wide), SUM(no_ball)
             FROM stats GROUP BY batsman",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, counts_from_row(row, 1)?))
        })?;
        let mut out = BTreeMap::new();
        for r in rows {
            let (batsman, counts) = r?;
            out.insert(batsman, counts);
        }
        Ok(out)
    })
}

fn distinct_names(store: &Store, column: &'static str) -> Result<Vec<String>, error::MatchupError> {
    let broker = DbBroker::new(store);
    let op = format!("stats.distinct_{}", column);
    broker.with_conn(&store.stats_db_path(), None, &op, |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {col} FROM stats ORDER BY {col}",
            col = column
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(error::MatchupError::RusqliteError)
    })
}

pub fn batsmen(store: &Store) -> Result<Vec<String>, error::MatchupError> {
    distinct_names(store, "batsman")
}

pub fn bowlers(store: &Store) -> Result<Vec<String>, error::MatchupError> {
    distinct_names(store, "bowler")
}

/// Sum of a rendered set of rows; the chart annotation reads beaten and wicket.
/// A sum past `i64` range is `InvalidValue`.
pub fn totals<'a>(
    rows: impl IntoIterator<Item = &'a (String, Counts)>,
) -> Result<Counts, error::MatchupError> {
    Counts::sum(rows.into_iter().map(|(_, c)| c))
}

pub fn totals_line(totals: &Counts) -> String {
    format!(
        "Total Beaten: {}   Total Wickets: {}",
        totals.beaten, totals.wicket
    )
}

pub fn count_cells(counts: &Counts) -> Vec<String> {
    Category::ALL
        .iter()
        .map(|c| counts.get(*c).to_string())
        .collect()
}

fn keyed_table(key: &str, rows: &[(String, Counts)]) -> String {
    let mut header = vec![key];
    header.extend(COUNT_HEADERS);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|(name, counts)| {
            let mut row = vec![name.clone()];
            row.extend(count_cells(counts));
            row
        })
        .collect();
    output::render_table(&header, &cells)
}

fn print_json(cmd: &str, payload: serde_json::Value) -> Result<(), error::MatchupError> {
    let envelope = time::command_envelope(cmd, "ok", payload);
    let text = serde_json::to_string_pretty(&envelope)
        .map_err(|e| error::MatchupError::ValidationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, error::MatchupError> {
    serde_json::to_value(value).map_err(|e| error::MatchupError::ValidationError(e.to_string()))
}

pub fn run_stat_cli(store: &Store, cli: StatCli) -> Result<(), error::MatchupError> {
    initialize_stats_db(store)?;
    let json = cli.format == OutputFormat::Json;
    match cli.command {
        StatCommand::Set {
            batsman,
            bowler,
            beaten,
            wicket,
            pace_wide,
            spin_wide,
            no_ball,
        } => {
            let counts = Counts {
                beaten,
                wicket,
                pace_wide,
                spin_wide,
                no_ball,
            };
            upsert(store, &batsman, &bowler, &counts)?;
            if json {
                print_json("stat.set", to_json(&counts)?)?;
            } else {
                println!("Saved: {} vs {}", batsman.trim(), bowler.trim());
            }
        }
        StatCommand::Bump {
            batsman,
            bowler,
            category,
        } => {
            let counts = increment(store, &batsman, &bowler, category)?;
            if json {
                print_json("stat.bump", to_json(&counts)?)?;
            } else {
                println!(
                    "{} vs {}: {} = {}",
                    batsman.trim(),
                    bowler.trim(),
                    category.column(),
                    counts.get(category)
                );
            }
        }
        StatCommand::Record {
            batsman,
            bowler,
            sequence,
        } => {
            let dropped = tally::unmapped(&sequence, Alphabet::Bowling);
            if !dropped.is_empty() {
                eprintln!(
                    "Ignored tokens: {} (bowling alphabet: {})",
                    dropped.join(" "),
                    Alphabet::Bowling.legend()
                );
            }
            let counts = tally::tally(&sequence, Alphabet::Bowling);
            upsert(store, &batsman, &bowler, &counts)?;
            if json {
                print_json("stat.record", to_json(&counts)?)?;
            } else {
                print!(
                    "{}",
                    keyed_table("bowler", &[(bowler.trim().to_string(), counts)])
                );
            }
        }
        StatCommand::Get { batsman, bowler } => {
            let counts = get_or_zero(store, &batsman, &bowler)?;
            if json {
                print_json("stat.get", to_json(&counts)?)?;
            } else {
                print!(
                    "{}",
                    keyed_table("bowler", &[(bowler.trim().to_string(), counts)])
                );
            }
        }
        StatCommand::List { batsman } => {
            let rows = list_for_batsman(store, &batsman)?;
            let sums = totals(&rows)?;
            if json {
                let records: Vec<StatRecord> = rows
                    .iter()
                    .map(|(bowler, counts)| StatRecord {
                        batsman: batsman.trim().to_string(),
                        bowler: bowler.clone(),
                        counts: *counts,
                    })
                    .collect();
                print_json(
                    "stat.list",
                    serde_json::json!({ "rows": to_json(&records)?, "totals": to_json(&sums)? }),
                )?;
            } else if rows.is_empty() {
                eprintln!("No deliveries recorded for {}.", batsman.trim());
            } else {
                print!("{}", keyed_table("bowler", &rows));
                println!("{}", totals_line(&sums).bold());
            }
        }
        StatCommand::Summary => {
            let summary = aggregate_by_batsman(store)?;
            if json {
                print_json("stat.summary", to_json(&summary)?)?;
            } else {
                let rows: Vec<(String, Counts)> = summary.into_iter().collect();
                print!("{}", keyed_table("batsman", &rows));
            }
        }
        StatCommand::Names { role } => {
            let names = match role {
                Role::Batsman => batsmen(store)?,
                Role::Bowler => bowlers(store)?,
            };
            if json {
                print_json("stat.names", to_json(&names)?)?;
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "stat",
        "version": "0.1.0",
        "description": "Per (batsman, bowler) delivery counters",
        "commands": [
            { "name": "set", "parameters": ["batsman", "bowler", "beaten", "wicket", "pace_wide", "spin_wide", "no_ball"] },
            { "name": "bump", "parameters": ["batsman", "bowler", "category"] },
            { "name": "record", "parameters": ["batsman", "bowler", "sequence"] },
            { "name": "get", "parameters": ["batsman", "bowler"] },
            { "name": "list", "parameters": ["batsman"] },
            { "name": "summary" },
            { "name": "names", "parameters": ["role"] }
        ],
        "storage": ["stats.db"]
    })
}

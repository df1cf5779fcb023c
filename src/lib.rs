//! matchup: batsman-vs-bowler delivery tracking.
//!
//! Records delivery outcomes (beaten, wicket, pace wide, spin wide, no ball) for
//! each batsman/bowler pairing and keeps them in a local SQLite store.
//!
//! # Architecture
//!
//! - **Event tally** (`plugins::tally`): whitespace-separated tokens -> counts, with
//!   separate batting and bowling alphabets.
//! - **Pairwise stat store** (`plugins::stats`): one row per `(batsman, bowler)` with
//!   upsert, atomic increment, point reads and per-batsman aggregates.
//! - **Roster** (`plugins::roster`): optional registry of names and roles.
//! - **Scoresheet** (`plugins::sheet`) and **CSV exchange** (`plugins::exchange`).
//!
//! All database access routes through `DbBroker`, which serializes calls behind an
//! in-process lock and appends an audit line to `broker.events.jsonl`.
//!
//! # Examples
//!
//! ```bash
//! matchup init
//! matchup stat record --batsman Vince --bowler Hari --sequence "2 b b w"
//! matchup stat bump --batsman Vince --bowler Hari --category wicket
//! matchup stat list --batsman Vince
//! matchup export --summary
//! ```

pub mod cli;
pub mod core;
pub mod plugins;

use cli::{Cli, Command};
use crate::core::{broker, config, db, error, store::Store};
use plugins::{exchange, roster, sheet, stats, tally};

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

fn find_project_root(start_dir: &Path) -> Result<PathBuf, error::MatchupError> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        if current_dir.join(config::PROJECT_DIR_NAME).is_dir() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(error::MatchupError::NotFound(
                "'.matchup' directory not found in current or parent directories. Run `matchup init` first.".to_string(),
            ));
        }
    }
}

fn open_project_store(start_dir: &Path) -> Result<Store, error::MatchupError> {
    let project_root = find_project_root(start_dir)?;
    let cfg = config::load_config(&project_root)?;
    Ok(Store::for_project(&project_root, cfg))
}

/// Like `open_project_store`, but a missing project root is `None`. Any other
/// failure, such as a malformed config, is still an error.
fn open_optional_store(start_dir: &Path) -> Result<Option<Store>, error::MatchupError> {
    match open_project_store(start_dir) {
        Ok(project_store) => Ok(Some(project_store)),
        Err(error::MatchupError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn init_project(dir: Option<PathBuf>, force: bool) -> Result<(), error::MatchupError> {
    let target = match dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    fs::create_dir_all(&target).map_err(error::MatchupError::IoError)?;
    let project_root = fs::canonicalize(&target).map_err(error::MatchupError::IoError)?;

    let config_path = config::config_path(&project_root);
    let cfg = if config_path.exists() && !force {
        println!("Keeping existing {}", config_path.display());
        config::load_config(&project_root)?
    } else {
        let cfg = config::MatchupConfig::default();
        let written = config::write_config(&project_root, &cfg)?;
        println!("Wrote {}", written.display());
        cfg
    };

    let project_store = Store::for_project(&project_root, cfg);
    db::initialize_store(&project_store)?;
    println!(
        "Stat store initialized at {}",
        project_store.stats_db_path().display()
    );
    Ok(())
}

fn run_tally(cli: cli::TallyCli) -> Result<(), error::MatchupError> {
    let counts = tally::tally(&cli.sequence, cli.alphabet);
    let dropped = tally::unmapped(&cli.sequence, cli.alphabet);
    match cli.format {
        stats::OutputFormat::Json => {
            let envelope = crate::core::time::command_envelope(
                "tally",
                "ok",
                serde_json::json!({ "counts": counts, "ignored": dropped }),
            );
            let text = serde_json::to_string_pretty(&envelope)
                .map_err(|e| error::MatchupError::ValidationError(e.to_string()))?;
            println!("{}", text);
        }
        stats::OutputFormat::Text => {
            for (token, category) in cli.alphabet.token_map() {
                println!("{} ({}): {}", category.label(), token, counts.get(*category));
            }
            if !dropped.is_empty() {
                eprintln!("Ignored tokens: {}", dropped.join(" "));
            }
        }
    }
    Ok(())
}

fn print_schemas(subsystem: Option<&str>) -> Result<(), error::MatchupError> {
    let all = vec![stats::schema(), roster::schema(), exchange::schema()];
    let selected: Vec<serde_json::Value> = match subsystem {
        Some(name) => all.into_iter().filter(|s| s["name"] == name).collect(),
        None => all,
    };
    if selected.is_empty() {
        return Err(error::MatchupError::NotFound(format!(
            "Unknown subsystem: {}",
            subsystem.unwrap_or_default()
        )));
    }
    let text = serde_json::to_string_pretty(&selected)
        .map_err(|e| error::MatchupError::ValidationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_audit(project_store: &Store) -> Result<(), error::MatchupError> {
    let events = broker::read_audit_log(project_store)?;
    if events.is_empty() {
        println!("No audit log found.");
        return Ok(());
    }
    for ev in events {
        println!(
            "{}  {}  {:<24} {:<8} {}",
            ev.ts, ev.actor, ev.op, ev.status, ev.db_id
        );
    }
    Ok(())
}

pub fn run() -> Result<(), error::MatchupError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
        }
        Command::Init(init) => init_project(init.dir, init.force)?,
        Command::Tally(tally_cli) => run_tally(tally_cli)?,
        Command::Schema(schema_cli) => print_schemas(schema_cli.subsystem.as_deref())?,
        Command::Sheet(sheet_cli) => {
            // A sheet can be tallied outside a project; only --save needs the store.
            let project_store = open_optional_store(&current_dir)?;
            sheet::run_sheet_cli(project_store.as_ref(), sheet_cli)?;
        }
        Command::Stat(stat_cli) => {
            let project_store = open_project_store(&current_dir)?;
            stats::run_stat_cli(&project_store, stat_cli)?;
        }
        Command::Roster(roster_cli) => {
            let project_store = open_project_store(&current_dir)?;
            roster::run_roster_cli(&project_store, roster_cli)?;
        }
        Command::Export(export_cli) => {
            let project_store = open_project_store(&current_dir)?;
            exchange::run_export_cli(&project_store, export_cli)?;
        }
        Command::Import(import_cli) => {
            let project_store = open_project_store(&current_dir)?;
            exchange::run_import_cli(&project_store, import_cli)?;
        }
        Command::Audit => {
            let project_store = open_project_store(&current_dir)?;
            print_audit(&project_store)?;
        }
    }
    Ok(())
}

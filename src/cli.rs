//! CLI struct definitions for the matchup command-line interface.
//!
//! Top-level clap types live here; each subsystem owns its own command group.
//! Dispatch lives in `lib.rs`.

use crate::plugins::exchange::{ExportCli, ImportCli};
use crate::plugins::roster::RosterCli;
use crate::plugins::sheet::SheetCli;
use crate::plugins::stats::{OutputFormat, StatCli};
use crate::plugins::tally::Alphabet;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "matchup",
    version = env!("CARGO_PKG_VERSION"),
    about = "Batsman-vs-bowler delivery tracker backed by a local SQLite store"
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub(crate) struct InitCli {
    /// Directory to initialize (defaults to current working directory).
    #[clap(short, long)]
    pub dir: Option<PathBuf>,
    /// Rewrite `.matchup/config.toml` with defaults even if it exists.
    #[clap(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct TallyCli {
    /// Which token alphabet to read the sequence with.
    #[clap(long, value_enum, default_value = "bowling")]
    pub alphabet: Alphabet,
    /// Whitespace-separated tokens, e.g. "2 b b w".
    #[clap(value_name = "SEQUENCE", default_value = "")]
    pub sequence: String,
    #[clap(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub(crate) struct SchemaCli {
    /// Optional: filter by subsystem name
    #[clap(long)]
    pub subsystem: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create `.matchup/` with config and an empty stat store
    #[clap(name = "init")]
    Init(InitCli),

    /// Tally a delivery sequence without storing it
    #[clap(name = "tally")]
    Tally(TallyCli),

    /// Per-pair counters: set, bump, record, get, list, summary
    #[clap(name = "stat", visible_alias = "s")]
    Stat(StatCli),

    /// Tally a batsman's sheet against several bowlers
    #[clap(name = "sheet")]
    Sheet(SheetCli),

    /// Registered batsmen and bowlers
    #[clap(name = "roster", visible_alias = "r")]
    Roster(RosterCli),

    /// Write the stat table as CSV
    #[clap(name = "export")]
    Export(ExportCli),

    /// Load a CSV written by `export`
    #[clap(name = "import")]
    Import(ImportCli),

    /// Show the audit log of brokered database calls
    #[clap(name = "audit")]
    Audit,

    /// Subsystem schemas and discovery
    #[clap(name = "schema")]
    Schema(SchemaCli),

    /// Print version information
    #[clap(name = "version")]
    Version,
}

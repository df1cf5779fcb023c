//! Scoresheet: one batsman's batting sequence plus a delivery sequence per bowler.
//!
//! The batting sequence drives the totals annotation; each bowler sequence becomes
//! one row that can be saved into the stat store.

use crate::core::broker::DbBroker;
use crate::core::delivery::{normalize_name, Counts};
use crate::core::error;
use crate::core::output;
use crate::core::store::Store;
use crate::plugins::stats;
use crate::plugins::tally::{self, Alphabet};
use clap::Parser;
use colored::Colorize;
use rusqlite::{Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoresheet {
    pub batsman: String,
    /// Tally of the batting sequence (`2` beaten, `5` wicket).
    pub batting: Counts,
    /// One row per bowler, in the order given.
    pub rows: Vec<(String, Counts)>,
}

#[derive(Parser, Debug)]
#[clap(name = "sheet", about = "Tally a batsman's sheet against several bowlers.")]
pub struct SheetCli {
    #[clap(long)]
    pub batsman: String,
    /// Batting sequence, e.g. "2 2 5".
    #[clap(long, default_value = "")]
    pub batting: String,
    /// Bowler line as NAME=SEQUENCE, e.g. "Hari=b b w". Repeatable.
    #[clap(long = "bowler", value_name = "NAME=SEQUENCE")]
    pub bowlers: Vec<String>,
    /// Store every bowler row in the stat store.
    #[clap(long)]
    pub save: bool,
}

/// Split `NAME=SEQUENCE`; a line without `=` is a bowler with no deliveries.
pub fn parse_bowler_line(line: &str) -> (String, String) {
    match line.split_once('=') {
        Some((name, seq)) => (name.trim().to_string(), seq.trim().to_string()),
        None => (line.trim().to_string(), String::new()),
    }
}

pub fn build(
    batsman: &str,
    batting_seq: &str,
    bowlers: &[(String, String)],
) -> Result<Scoresheet, error::MatchupError> {
    let batsman = normalize_name("batsman", batsman)?;
    let mut rows = Vec::with_capacity(bowlers.len());
    for (name, seq) in bowlers {
        let name = normalize_name("bowler", name)?;
        rows.push((name, tally::tally(seq, Alphabet::Bowling)));
    }
    Ok(Scoresheet {
        batsman,
        batting: tally::tally(batting_seq, Alphabet::Batting),
        rows,
    })
}

impl Scoresheet {
    pub fn annotation(&self) -> String {
        stats::totals_line(&self.batting)
    }

    /// Upsert every row for this batsman in one transaction; either all rows are
    /// written or none. Returns the number of rows written.
    pub fn save(&self, store: &Store) -> Result<usize, error::MatchupError> {
        let broker = DbBroker::new(store);
        broker.with_conn(&store.stats_db_path(), None, "sheet.save", |conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            for (bowler, counts) in &self.rows {
                let (batsman, bowler) = stats::checked_keys(&tx, store, &self.batsman, bowler)?;
                counts.validate()?;
                stats::upsert_on(&tx, &batsman, &bowler, counts)?;
            }
            tx.commit()?;
            Ok(self.rows.len())
        })
    }

    pub fn render(&self) -> String {
        let mut header = vec!["bowler"];
        header.extend(stats::COUNT_HEADERS);
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|(name, counts)| {
                let mut row = vec![name.clone()];
                row.extend(stats::count_cells(counts));
                row
            })
            .collect();
        output::render_table(&header, &cells)
    }
}

/// `store` is only needed with `--save`.
pub fn run_sheet_cli(store: Option<&Store>, cli: SheetCli) -> Result<(), error::MatchupError> {
    let lines: Vec<(String, String)> = cli.bowlers.iter().map(|l| parse_bowler_line(l)).collect();
    let sheet = build(&cli.batsman, &cli.batting, &lines)?;

    if sheet.rows.is_empty() {
        eprintln!("{}", "Enter at least one bowler's data to build the sheet.".yellow());
        return Ok(());
    }

    println!("{}'s batting: beaten, wickets & extras", sheet.batsman);
    print!("{}", sheet.render());
    println!("{}", sheet.annotation().bold());

    if cli.save {
        let store = store.ok_or_else(|| {
            error::MatchupError::NotFound(
                "'.matchup' directory not found; run `matchup init` before --save".to_string(),
            )
        })?;
        stats::initialize_stats_db(store)?;
        let written = sheet.save(store)?;
        println!("Saved {} rows for {}.", written, sheet.batsman);
    }
    Ok(())
}

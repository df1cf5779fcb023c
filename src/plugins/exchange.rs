//! CSV export and import of the stat table.
//!
//! Two shapes are written: the full pair table (`STATS_HEADER`) and the
//! per-batsman summary (`SUMMARY_HEADER`). Only the pair table can be imported.

use crate::core::broker::DbBroker;
use crate::core::delivery::Counts;
use crate::core::error::MatchupError;
use crate::core::store::Store;
use crate::plugins::stats::{self, StatRecord};
use clap::Parser;
use rusqlite::{Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

pub const STATS_HEADER: [&str; 7] = [
    "batsman",
    "bowler",
    "beaten",
    "wicket",
    "pace_wide",
    "spin_wide",
    "no_ball",
];

pub const SUMMARY_HEADER: [&str; 6] = [
    "batsman",
    "beaten",
    "wicket",
    "pace_wide",
    "spin_wide",
    "no_ball",
];

#[derive(Debug, Serialize, Deserialize)]
struct PairRow {
    batsman: String,
    bowler: String,
    beaten: i64,
    wicket: i64,
    pace_wide: i64,
    spin_wide: i64,
    no_ball: i64,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    batsman: &'a str,
    beaten: i64,
    wicket: i64,
    pace_wide: i64,
    spin_wide: i64,
    no_ball: i64,
}

impl From<&StatRecord> for PairRow {
    fn from(r: &StatRecord) -> Self {
        PairRow {
            batsman: r.batsman.clone(),
            bowler: r.bowler.clone(),
            beaten: r.counts.beaten,
            wicket: r.counts.wicket,
            pace_wide: r.counts.pace_wide,
            spin_wide: r.counts.spin_wide,
            no_ball: r.counts.no_ball,
        }
    }
}

impl From<PairRow> for StatRecord {
    fn from(r: PairRow) -> Self {
        StatRecord {
            batsman: r.batsman,
            bowler: r.bowler,
            counts: Counts {
                beaten: r.beaten,
                wicket: r.wicket,
                pace_wide: r.pace_wide,
                spin_wide: r.spin_wide,
                no_ball: r.no_ball,
            },
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "export", about = "Write the stat table as CSV.")]
pub struct ExportCli {
    /// Only rows for this batsman.
    #[clap(long, conflicts_with = "summary")]
    pub batsman: Option<String>,
    /// Per-batsman sums instead of per-pair rows.
    #[clap(long)]
    pub summary: bool,
    /// Output file (stdout when omitted).
    #[clap(long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[clap(name = "import", about = "Load a CSV written by `export` into the stat table.")]
pub struct ImportCli {
    pub file: PathBuf,
}

/// The header row is written even when `records` is empty.
pub fn write_records<W: Write>(writer: W, records: &[StatRecord]) -> Result<(), MatchupError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(STATS_HEADER)?;
    for record in records {
        wtr.serialize(PairRow::from(record))?;
    }
    wtr.flush().map_err(MatchupError::IoError)?;
    Ok(())
}

pub fn write_summary<W: Write>(
    writer: W,
    summary: &BTreeMap<String, Counts>,
) -> Result<(), MatchupError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(SUMMARY_HEADER)?;
    for (batsman, c) in summary {
        wtr.serialize(SummaryRow {
            batsman,
            beaten: c.beaten,
            wicket: c.wicket,
            pace_wide: c.pace_wide,
            spin_wide: c.spin_wide,
            no_ball: c.no_ball,
        })?;
    }
    wtr.flush().map_err(MatchupError::IoError)?;
    Ok(())
}

fn into_utf8(buf: Vec<u8>) -> Result<String, MatchupError> {
    String::from_utf8(buf).map_err(|e| MatchupError::ValidationError(e.to_string()))
}

pub fn export_stats(store: &Store, batsman: Option<&str>) -> Result<String, MatchupError> {
    let records = match batsman {
        Some(name) => stats::list_for_batsman(store, name)?
            .into_iter()
            .map(|(bowler, counts)| StatRecord {
                batsman: name.trim().to_string(),
                bowler,
                counts,
            })
            .collect(),
        None => stats::list_all(store)?,
    };
    let mut buf = Vec::new();
    write_records(&mut buf, &records)?;
    into_utf8(buf)
}

pub fn export_summary(store: &Store) -> Result<String, MatchupError> {
    let summary = stats::aggregate_by_batsman(store)?;
    let mut buf = Vec::new();
    write_summary(&mut buf, &summary)?;
    into_utf8(buf)
}

/// Parse a pair table. The header must match `STATS_HEADER` exactly and every
/// row must carry non-empty names and non-negative counts.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<StatRecord>, MatchupError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if !headers.iter().eq(STATS_HEADER.iter().copied()) {
        return Err(MatchupError::ValidationError(format!(
            "Unexpected CSV header: {} (expected {})",
            headers.iter().collect::<Vec<_>>().join(","),
            STATS_HEADER.join(",")
        )));
    }

    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<PairRow>().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        let row =
            row.map_err(|e| MatchupError::ValidationError(format!("line {}: {}", line, e)))?;
        let record = StatRecord::from(row);
        if record.batsman.is_empty() || record.bowler.is_empty() {
            return Err(MatchupError::InvalidKey(format!(
                "line {}: batsman and bowler must not be empty",
                line
            )));
        }
        record.counts.validate()?;
        out.push(record);
    }
    Ok(out)
}

/// Upsert every record in one transaction; nothing is written if any row fails.
pub fn import_records(store: &Store, records: &[StatRecord]) -> Result<usize, MatchupError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&store.stats_db_path(), None, "exchange.import", |conn| {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        for record in records {
            let (batsman, bowler) =
                stats::checked_keys(&tx, store, &record.batsman, &record.bowler)?;
            record.counts.validate()?;
            stats::upsert_on(&tx, &batsman, &bowler, &record.counts)?;
        }
        tx.commit()?;
        Ok(records.len())
    })
}

pub fn run_export_cli(store: &Store, cli: ExportCli) -> Result<(), MatchupError> {
    stats::initialize_stats_db(store)?;
    let body = if cli.summary {
        export_summary(store)?
    } else {
        export_stats(store, cli.batsman.as_deref())?
    };
    match cli.out {
        Some(path) => {
            fs::write(&path, body).map_err(MatchupError::IoError)?;
            println!("Exported to {}", path.display());
        }
        None => print!("{}", body),
    }
    Ok(())
}

pub fn run_import_cli(store: &Store, cli: ImportCli) -> Result<(), MatchupError> {
    stats::initialize_stats_db(store)?;
    let file = fs::File::open(&cli.file).map_err(MatchupError::IoError)?;
    let records = read_records(file)?;
    let written = import_records(store, &records)?;
    println!("Imported {} rows from {}", written, cli.file.display());
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "exchange",
        "version": "0.1.0",
        "description": "CSV export and import of the stat table",
        "commands": [
            { "name": "export", "parameters": ["batsman", "summary", "out"] },
            { "name": "import", "parameters": ["file"] }
        ],
        "formats": {
            "stats": STATS_HEADER.join(","),
            "summary": SUMMARY_HEADER.join(",")
        }
    })
}

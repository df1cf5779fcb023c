//! Subsystems built on the core store: tallying, the stat store, the roster,
//! scoresheets and CSV exchange.

pub mod exchange;
pub mod roster;
pub mod sheet;
pub mod stats;
pub mod tally;

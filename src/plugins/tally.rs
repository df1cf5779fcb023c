//! Event tally: turn a whitespace-separated outcome sequence into counts.
//!
//! Two alphabets exist and are kept apart on purpose. The batting sheet uses
//! `2` for beaten and `5` for wicket; the bowling sheet uses `2` for a spin wide.

use crate::core::delivery::{Category, Counts};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Token -> category table for one alphabet.
pub type TokenMap = &'static [(&'static str, Category)];

const BATTING_TOKENS: TokenMap = &[("2", Category::Beaten), ("5", Category::Wicket)];

const BOWLING_TOKENS: TokenMap = &[
    ("b", Category::Beaten),
    ("w", Category::Wicket),
    ("1", Category::PaceWide),
    ("2", Category::SpinWide),
    ("3", Category::NoBall),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    Batting,
    Bowling,
}

impl Alphabet {
    pub fn token_map(self) -> TokenMap {
        match self {
            Alphabet::Batting => BATTING_TOKENS,
            Alphabet::Bowling => BOWLING_TOKENS,
        }
    }

    pub fn lookup(self, token: &str) -> Option<Category> {
        self.token_map()
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, c)| *c)
    }

    /// One-line legend, e.g. `2=beaten 5=wicket`.
    pub fn legend(self) -> String {
        self.token_map()
            .iter()
            .map(|(t, c)| format!("{}={}", t, c.column()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn tally(sequence: &str, alphabet: Alphabet) -> Counts {
    let mut counts = Counts::default();
    for category in sequence.split_whitespace().filter_map(|t| alphabet.lookup(t)) {
        // One per token, so the count is bounded by the input length.
        *counts.slot_mut(category) += 1;
    }
    counts
}

/// Tokens `tally` drops for this alphabet, in input order.
pub fn unmapped(sequence: &str, alphabet: Alphabet) -> Vec<String> {
    sequence
        .split_whitespace()
        .filter(|t| alphabet.lookup(t).is_none())
        .map(|t| t.to_string())
        .collect()
}

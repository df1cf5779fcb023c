//! Delivery outcome categories and the per-category counter set.
//!
//! `Category` is the closed set of outcomes recorded for a batsman/bowler pair.
//! `Counts` carries one counter per category and is the value type of every
//! stat record, tally result and aggregate.

use crate::core::error::MatchupError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Beaten,
    Wicket,
    PaceWide,
    SpinWide,
    NoBall,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Beaten,
        Category::Wicket,
        Category::PaceWide,
        Category::SpinWide,
        Category::NoBall,
    ];

    /// Column in the `stats` table. The only source of column names used in SQL.
    pub fn column(self) -> &'static str {
        match self {
            Category::Beaten => "beaten",
            Category::Wicket => "wicket",
            Category::PaceWide => "pace_wide",
            Category::SpinWide => "spin_wide",
            Category::NoBall => "no_ball",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Beaten => "Beaten",
            Category::Wicket => "Wickets",
            Category::PaceWide => "Pace Wides",
            Category::SpinWide => "Spin Wides",
            Category::NoBall => "No Balls",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Category {
    type Err = MatchupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.column() == normalized)
            .ok_or_else(|| MatchupError::ValidationError(format!("Unknown category: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub beaten: i64,
    pub wicket: i64,
    pub pace_wide: i64,
    pub spin_wide: i64,
    pub no_ball: i64,
}

impl Counts {
    pub fn get(&self, category: Category) -> i64 {
        match category {
            Category::Beaten => self.beaten,
            Category::Wicket => self.wicket,
            Category::PaceWide => self.pace_wide,
            Category::SpinWide => self.spin_wide,
            Category::NoBall => self.no_ball,
        }
    }

    pub fn slot_mut(&mut self, category: Category) -> &mut i64 {
        match category {
            Category::Beaten => &mut self.beaten,
            Category::Wicket => &mut self.wicket,
            Category::PaceWide => &mut self.pace_wide,
            Category::SpinWide => &mut self.spin_wide,
            Category::NoBall => &mut self.no_ball,
        }
    }

    pub fn set(&mut self, category: Category, value: i64) {
        *self.slot_mut(category) = value;
    }

    /// Add `delta` to one counter; a result past `i64` range is `InvalidValue`.
    pub fn add(&mut self, category: Category, delta: i64) -> Result<(), MatchupError> {
        let slot = self.slot_mut(category);
        *slot = slot.checked_add(delta).ok_or_else(|| {
            MatchupError::InvalidValue(format!("{} overflows adding {}", category.column(), delta))
        })?;
        Ok(())
    }

    /// Category-wise `self + rhs`.
    pub fn checked_add(mut self, rhs: &Counts) -> Result<Counts, MatchupError> {
        for c in Category::ALL {
            self.add(c, rhs.get(c))?;
        }
        Ok(self)
    }

    /// Builder form of `set`.
    pub fn with(mut self, category: Category, value: i64) -> Self {
        self.set(category, value);
        self
    }

    /// Sum of all counters, saturating at `i64::MAX`.
    pub fn total(&self) -> i64 {
        Category::ALL
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(self.get(*c)))
    }

    pub fn is_zero(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c) == 0)
    }

    /// Counters are non-negative; the first negative one is reported.
    pub fn validate(&self) -> Result<(), MatchupError> {
        match Category::ALL.iter().find(|c| self.get(**c) < 0) {
            Some(c) => Err(MatchupError::InvalidValue(format!(
                "{} must be non-negative, got {}",
                c.column(),
                self.get(*c)
            ))),
            None => Ok(()),
        }
    }

    /// Category-wise sum over any set of counts.
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a Counts>) -> Result<Counts, MatchupError> {
        items
            .into_iter()
            .try_fold(Counts::default(), |acc, c| acc.checked_add(c))
    }
}

/// Trimmed player name; empty or whitespace-only names are `InvalidKey`.
pub fn normalize_name(role: &str, name: &str) -> Result<String, MatchupError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MatchupError::InvalidKey(format!(
            "{} name must not be empty",
            role
        )));
    }
    Ok(trimmed.to_string())
}

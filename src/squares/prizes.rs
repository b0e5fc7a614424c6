//! Prize schedule
//!
//! Base amounts paid per rule landing. Loadable from TOML so a pool can tweak
//! payouts without a rebuild; every field falls back to the standard amount.
//! Unknown keys are rejected so a misspelled field can't silently pay the
//! standard amount.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::squares::types::RuleType;

/// Base dollar amounts for each prize rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrizeSchedule {
    /// Main winning square
    #[serde(default = "default_winner")]
    pub winner: u64,

    /// Each of the four orthogonal neighbours
    #[serde(default = "default_adjacent")]
    pub adjacent: u64,

    /// Each of the four diagonal neighbours
    #[serde(default = "default_diagonal")]
    pub diagonal: u64,

    /// Reverse + 5 bonus (quarters 2 and 4)
    #[serde(default = "default_reverse")]
    pub reverse: u64,
}

fn default_winner() -> u64 {
    2400
}
fn default_adjacent() -> u64 {
    150
}
fn default_diagonal() -> u64 {
    100
}
fn default_reverse() -> u64 {
    200
}

impl Default for PrizeSchedule {
    fn default() -> Self {
        Self {
            winner: default_winner(),
            adjacent: default_adjacent(),
            diagonal: default_diagonal(),
            reverse: default_reverse(),
        }
    }
}

impl PrizeSchedule {
    pub fn amount(&self, rule: RuleType) -> u64 {
        match rule {
            RuleType::Winner => self.winner,
            RuleType::Adjacent => self.adjacent,
            RuleType::Diagonal => self.diagonal,
            RuleType::Reverse => self.reverse,
        }
    }

    /// Total paid out for one quarter, independent of how offsets collide
    pub fn quarter_total(&self, with_bonus: bool) -> u64 {
        let base = self
            .winner
            .saturating_add(self.adjacent.saturating_mul(4))
            .saturating_add(self.diagonal.saturating_mul(4));
        if with_bonus {
            base.saturating_add(self.reverse)
        } else {
            base
        }
    }

    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prize schedule: {}", path.display()))?;
        let schedule: Self = toml::from_str(&contents)
            .with_context(|| format!("Invalid prize schedule: {}", path.display()))?;
        Ok(schedule)
    }

    /// Load from an explicitly configured path, or use the standard amounts
    /// when none is set. A configured file that can't be read or parsed is an
    /// error, never a silent fallback.
    pub fn load_optional(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let schedule = Self::load(path)?;
        tracing::info!(
            path,
            winner = schedule.winner,
            adjacent = schedule.adjacent,
            diagonal = schedule.diagonal,
            reverse = schedule.reverse,
            "💰 Loaded prize schedule"
        );
        Ok(schedule)
    }
}

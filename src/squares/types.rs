//! Core data model for the squares board: digit assignments, score events,
//! winning cells, claims and per-participant prize summaries.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::squares::error::SquaresError;

/// Board is always 10x10, one row/column per last digit.
pub const GRID_SIZE: usize = 10;

/// Quarters that pay the reverse bonus (halftime and final)
pub const BONUS_QUARTERS: [u8; 2] = [2, 4];

/// Digits assigned to the rows (home) or columns (away) of the board.
///
/// Position `i` holds the digit for row/column `i`. The array is expected to be
/// a permutation of 0-9, but lookups never assume so: a missing digit is
/// reported as `None` and the resolver turns that into `InvalidConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigitPermutation(Vec<u8>);

impl DigitPermutation {
    pub fn new(digits: Vec<u8>) -> Self {
        Self(digits)
    }

    /// 0, 1, 2, ... 9 in order
    pub fn identity() -> Self {
        Self((0..GRID_SIZE as u8).collect())
    }

    /// Draw a fresh random assignment of digits to rows/columns
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut digits: Vec<u8> = (0..GRID_SIZE as u8).collect();
        digits.shuffle(rng);
        Self(digits)
    }

    pub fn digits(&self) -> &[u8] {
        &self.0
    }

    /// Row/column index holding `digit`, if any
    pub fn position(&self, digit: u8) -> Option<usize> {
        self.position_within(digit, GRID_SIZE)
    }

    /// Lookup restricted to the first `limit` slots so an overlong array can
    /// never yield an index outside the grid.
    pub(crate) fn position_within(&self, digit: u8, limit: usize) -> Option<usize> {
        self.0.iter().take(limit).position(|&d| d == digit)
    }

    pub fn digit_at(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// True when the array holds each of 0-9 exactly once
    pub fn is_permutation(&self) -> bool {
        if self.0.len() != GRID_SIZE {
            return false;
        }
        let mut seen = [false; GRID_SIZE];
        for &d in &self.0 {
            let idx = d as usize;
            if idx >= GRID_SIZE || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }
}

impl From<Vec<u8>> for DigitPermutation {
    fn from(digits: Vec<u8>) -> Self {
        Self(digits)
    }
}

impl From<[u8; GRID_SIZE]> for DigitPermutation {
    fn from(digits: [u8; GRID_SIZE]) -> Self {
        Self(digits.to_vec())
    }
}

/// Final score of one quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub quarter: u8,
    pub home_score: u32,
    pub away_score: u32,
}

impl ScoreEvent {
    pub fn new(quarter: u8, home_score: u32, away_score: u32) -> Result<Self, SquaresError> {
        if !(1..=4).contains(&quarter) {
            return Err(SquaresError::InvalidQuarter(quarter));
        }
        Ok(Self {
            quarter,
            home_score,
            away_score,
        })
    }

    pub fn home_digit(&self) -> u8 {
        (self.home_score % 10) as u8
    }

    pub fn away_digit(&self) -> u8 {
        (self.away_score % 10) as u8
    }

    pub fn is_bonus_quarter(&self) -> bool {
        BONUS_QUARTERS.contains(&self.quarter)
    }

    /// Reverse bonus digits: swap home/away, add 5, keep the last digit.
    ///
    /// Returns `(row_digit, col_digit)`; the row digit comes from the away score.
    pub fn bonus_digits(&self) -> (u8, u8) {
        let row_digit = (self.away_digit() + 5) % 10;
        let col_digit = (self.home_digit() + 5) % 10;
        (row_digit, col_digit)
    }
}

/// Prize rule that can land on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Winner,
    Adjacent,
    Diagonal,
    Reverse,
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            RuleType::Winner => "winner",
            RuleType::Adjacent => "adjacent",
            RuleType::Diagonal => "diagonal",
            RuleType::Reverse => "reverse",
        }
    }
}

/// A cell that pays out for the resolved quarter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningCell {
    pub row: usize,
    pub col: usize,
    pub contributing_rules: BTreeSet<RuleType>,
    /// Sum of every rule amount that landed here
    pub prize: u64,
}

impl WinningCell {
    pub(crate) fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            contributing_rules: BTreeSet::new(),
            prize: 0,
        }
    }

    pub(crate) fn add(&mut self, rule: RuleType, amount: u64) {
        self.contributing_rules.insert(rule);
        self.prize = self.prize.saturating_add(amount);
    }

    pub fn has(&self, rule: RuleType) -> bool {
        self.contributing_rules.contains(&rule)
    }
}

/// A participant's ownership of one square for one quarter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub quarter: u8,
    pub row: usize,
    pub col: usize,
    pub participant_id: String,
    #[serde(default)]
    pub participant_name: String,
    #[serde(default = "default_entry_number")]
    pub entry_number: u32,
}

fn default_entry_number() -> u32 {
    1
}

impl Claim {
    pub fn new(
        quarter: u8,
        row: usize,
        col: usize,
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
    ) -> Self {
        Self {
            quarter,
            row,
            col,
            participant_id: participant_id.into(),
            participant_name: participant_name.into(),
            entry_number: default_entry_number(),
        }
    }

    pub fn with_entry_number(mut self, entry_number: u32) -> Self {
        self.entry_number = entry_number;
        self
    }
}

/// One claimed winning cell inside a participant summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub row: usize,
    pub col: usize,
    pub label: String,
    pub prize: u64,
    pub entry_number: u32,
}

/// Everything one participant won in a quarter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPrizeSummary {
    pub participant_id: String,
    pub participant_name: String,
    pub total_prize: u64,
    pub entries: Vec<PrizeEntry>,
}

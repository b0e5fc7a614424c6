//! Claim Aggregator
//!
//! Joins resolved winning cells against the quarter's claims and rolls the
//! matches up per participant. Unclaimed cells are simply dropped.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::squares::types::{Claim, ParticipantPrizeSummary, PrizeEntry, RuleType, WinningCell};

/// Key-value view of one quarter's claims
pub trait ClaimLookup {
    fn claim_at(&self, row: usize, col: usize) -> Option<&Claim>;
}

impl ClaimLookup for HashMap<(usize, usize), Claim> {
    fn claim_at(&self, row: usize, col: usize) -> Option<&Claim> {
        self.get(&(row, col))
    }
}

/// In-memory (row, col) -> claim index for a single quarter
#[derive(Debug, Clone, Default)]
pub struct ClaimBook {
    claims: HashMap<(usize, usize), Claim>,
}

impl ClaimBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `claims`, keeping only those belonging to `quarter`
    pub fn for_quarter(quarter: u8, claims: impl IntoIterator<Item = Claim>) -> Self {
        let mut book = Self::new();
        for claim in claims {
            if claim.quarter != quarter {
                debug!(
                    quarter,
                    claim_quarter = claim.quarter,
                    row = claim.row,
                    col = claim.col,
                    "skipping claim from another quarter"
                );
                continue;
            }
            book.insert(claim);
        }
        book
    }

    /// Insert a claim. A square is expected to carry one claim per quarter;
    /// if it already has one the later claim wins and the earlier is returned.
    pub fn insert(&mut self, claim: Claim) -> Option<Claim> {
        let key = (claim.row, claim.col);
        let replaced = self.claims.insert(key, claim);
        if let Some(previous) = &replaced {
            warn!(
                row = key.0,
                col = key.1,
                previous = %previous.participant_id,
                "⚠️  square claimed twice, keeping the later claim"
            );
        }
        replaced
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.values()
    }
}

impl ClaimLookup for ClaimBook {
    fn claim_at(&self, row: usize, col: usize) -> Option<&Claim> {
        self.claims.get(&(row, col))
    }
}

impl FromIterator<Claim> for ClaimBook {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        let mut book = Self::new();
        for claim in iter {
            book.insert(claim);
        }
        book
    }
}

/// Human-readable label for a cell's rule set.
///
/// Priority is winner > adjacent > diagonal, with " & Bonus" appended when the
/// reverse bonus also landed; a bonus-only cell is just "Bonus".
pub fn label_for(rules: &BTreeSet<RuleType>) -> String {
    let bonus = rules.contains(&RuleType::Reverse);
    let primary = if rules.contains(&RuleType::Winner) {
        Some("Winner")
    } else if rules.contains(&RuleType::Adjacent) {
        Some("Adjacent")
    } else if rules.contains(&RuleType::Diagonal) {
        Some("Diagonal")
    } else {
        None
    };

    match (primary, bonus) {
        (Some(primary), true) => format!("{} & Bonus", primary),
        (Some(primary), false) => primary.to_string(),
        (None, _) => "Bonus".to_string(),
    }
}

/// Match winning cells to claims and total them per participant.
///
/// Summaries come back in order of each participant's first matched cell, and
/// entries keep the order of `cells`. Participants with nothing matched are
/// absent.
pub fn aggregate<L>(cells: &[WinningCell], claims: &L) -> Vec<ParticipantPrizeSummary>
where
    L: ClaimLookup + ?Sized,
{
    let mut summaries: Vec<ParticipantPrizeSummary> = Vec::new();
    let mut index_by_participant: HashMap<String, usize> = HashMap::new();

    for cell in cells {
        let Some(claim) = claims.claim_at(cell.row, cell.col) else {
            continue;
        };

        let entry = PrizeEntry {
            row: cell.row,
            col: cell.col,
            label: label_for(&cell.contributing_rules),
            prize: cell.prize,
            entry_number: claim.entry_number,
        };

        let idx = *index_by_participant
            .entry(claim.participant_id.clone())
            .or_insert_with(|| {
                summaries.push(ParticipantPrizeSummary {
                    participant_id: claim.participant_id.clone(),
                    participant_name: claim.participant_name.clone(),
                    total_prize: 0,
                    entries: Vec::new(),
                });
                summaries.len() - 1
            });

        let summary = &mut summaries[idx];
        summary.total_prize = summary.total_prize.saturating_add(entry.prize);
        summary.entries.push(entry);
    }

    debug!(
        cells = cells.len(),
        winners = summaries.len(),
        "aggregated claimed winning cells"
    );

    summaries
}

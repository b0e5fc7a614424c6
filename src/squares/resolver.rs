//! Grid Resolver
//! Mission: Turn one quarter's score into the full set of paying squares
//!
//! The winning square sits at the row holding the home score's last digit and
//! the column holding the away score's last digit. Its four orthogonal and four
//! diagonal neighbours pay too, wrapping around the board edges. In quarters 2
//! and 4 a reverse + 5 bonus square is added. Landings on the same square are
//! merged into one cell whose prize is the sum of every landing.

use tracing::{debug, warn};

use crate::squares::error::{Axis, SquaresError};
use crate::squares::prizes::PrizeSchedule;
use crate::squares::types::{DigitPermutation, RuleType, ScoreEvent, WinningCell, GRID_SIZE};

/// (row, col) offsets paying the adjacent prize, in output order
const ADJACENT_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// (row, col) offsets paying the diagonal prize, in output order
const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Resolves winning cells for a board. Holds no per-call state, so one
/// instance can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Resolver {
    schedule: PrizeSchedule,
    grid_size: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(PrizeSchedule::default())
    }
}

impl Resolver {
    pub fn new(schedule: PrizeSchedule) -> Self {
        Self {
            schedule,
            grid_size: GRID_SIZE,
        }
    }

    pub fn schedule(&self) -> &PrizeSchedule {
        &self.schedule
    }

    /// Shrunk board, used to force neighbour offsets onto shared cells
    #[cfg(test)]
    fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Compute every winning cell for `score`.
    ///
    /// Cells come back in landing order: winner, the four adjacent offsets, the
    /// four diagonal offsets, then the reverse bonus. A landing on a cell that
    /// is already present merges into it in place.
    ///
    /// # Errors
    /// `InvalidConfig` when a score digit is missing from `rows` or `cols`.
    /// Nothing is returned in that case.
    pub fn resolve(
        &self,
        score: &ScoreEvent,
        rows: &DigitPermutation,
        cols: &DigitPermutation,
    ) -> Result<Vec<WinningCell>, SquaresError> {
        let home_digit = score.home_digit();
        let away_digit = score.away_digit();

        let win_row = self.locate(rows, home_digit, Axis::Row)?;
        let win_col = self.locate(cols, away_digit, Axis::Col)?;

        let mut cells = CellAccumulator::with_capacity(10);
        cells.land(win_row, win_col, RuleType::Winner, self.schedule.winner);

        for (dr, dc) in ADJACENT_OFFSETS {
            let (row, col) = self.offset(win_row, win_col, dr, dc);
            cells.land(row, col, RuleType::Adjacent, self.schedule.adjacent);
        }

        for (dr, dc) in DIAGONAL_OFFSETS {
            let (row, col) = self.offset(win_row, win_col, dr, dc);
            cells.land(row, col, RuleType::Diagonal, self.schedule.diagonal);
        }

        if score.is_bonus_quarter() {
            let (bonus_row_digit, bonus_col_digit) = score.bonus_digits();
            match (
                rows.position_within(bonus_row_digit, self.grid_size),
                cols.position_within(bonus_col_digit, self.grid_size),
            ) {
                (Some(row), Some(col)) => {
                    cells.land(row, col, RuleType::Reverse, self.schedule.reverse);
                }
                _ => {
                    debug!(
                        quarter = score.quarter,
                        bonus_row_digit,
                        bonus_col_digit,
                        "reverse bonus digits not on board, skipping bonus"
                    );
                }
            }
        }

        let cells = cells.into_cells();
        debug!(
            quarter = score.quarter,
            home_score = score.home_score,
            away_score = score.away_score,
            win_row,
            win_col,
            cells = cells.len(),
            "resolved winning cells"
        );
        Ok(cells)
    }

    fn locate(
        &self,
        digits: &DigitPermutation,
        digit: u8,
        axis: Axis,
    ) -> Result<usize, SquaresError> {
        digits.position_within(digit, self.grid_size).ok_or_else(|| {
            warn!(
                axis = axis.as_str(),
                digit,
                digits = ?digits.digits(),
                "🛑 could not find winning position in board numbers"
            );
            SquaresError::InvalidConfig { axis, digit }
        })
    }

    fn offset(&self, row: usize, col: usize, dr: i32, dc: i32) -> (usize, usize) {
        (
            wrap(row, dr, self.grid_size),
            wrap(col, dc, self.grid_size),
        )
    }
}

/// Resolve with the standard prize schedule
pub fn resolve(
    score: &ScoreEvent,
    rows: &DigitPermutation,
    cols: &DigitPermutation,
) -> Result<Vec<WinningCell>, SquaresError> {
    Resolver::default().resolve(score, rows, cols)
}

#[inline]
fn wrap(index: usize, delta: i32, size: usize) -> usize {
    (index as i64 + delta as i64).rem_euclid(size as i64) as usize
}

/// Ordered cell list keyed by (row, col). Never more than ten entries, so a
/// linear scan beats hashing.
struct CellAccumulator {
    cells: Vec<WinningCell>,
}

impl CellAccumulator {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    fn land(&mut self, row: usize, col: usize, rule: RuleType, amount: u64) {
        match self
            .cells
            .iter_mut()
            .find(|cell| cell.row == row && cell.col == col)
        {
            Some(cell) => cell.add(rule, amount),
            None => {
                let mut cell = WinningCell::new(row, col);
                cell.add(rule, amount);
                self.cells.push(cell);
            }
        }
    }

    fn into_cells(self) -> Vec<WinningCell> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn positions(cells: &[WinningCell]) -> Vec<(usize, usize)> {
        cells.iter().map(|c| (c.row, c.col)).collect()
    }

    fn total(cells: &[WinningCell]) -> u64 {
        cells.iter().map(|c| c.prize).sum()
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(0, -1, 10), 9);
        assert_eq!(wrap(9, 1, 10), 0);
        assert_eq!(wrap(4, 1, 10), 5);
        assert_eq!(wrap(0, -1, 1), 0);
    }

    #[test]
    fn test_first_quarter_layout() {
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(1, 10, 3).unwrap();

        let cells = resolve(&score, &digits, &digits).unwrap();

        assert_eq!(
            positions(&cells),
            vec![
                (0, 3),
                (1, 3),
                (9, 3),
                (0, 4),
                (0, 2),
                (1, 4),
                (1, 2),
                (9, 4),
                (9, 2),
            ]
        );
        assert_eq!(cells[0].prize, 2400);
        assert!(cells[0].has(RuleType::Winner));
        assert!(cells[1..5].iter().all(|c| c.prize == 150 && c.has(RuleType::Adjacent)));
        assert!(cells[5..].iter().all(|c| c.prize == 100 && c.has(RuleType::Diagonal)));
        assert_eq!(total(&cells), 3400);
    }

    #[test]
    fn test_second_quarter_adds_reverse_bonus() {
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(2, 10, 3).unwrap();

        let cells = resolve(&score, &digits, &digits).unwrap();

        assert_eq!(cells.len(), 10);
        let bonus = cells.last().unwrap();
        assert_eq!((bonus.row, bonus.col), (8, 5));
        assert_eq!(bonus.contributing_rules, BTreeSet::from([RuleType::Reverse]));
        assert_eq!(bonus.prize, 200);
        assert_eq!(total(&cells), 3600);
    }

    #[test]
    fn test_reverse_bonus_merges_into_winner() {
        // 5-0: bonus row digit (0+5)%10 = 5, bonus col digit (5+5)%10 = 0
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(4, 5, 0).unwrap();

        let cells = resolve(&score, &digits, &digits).unwrap();

        assert_eq!(cells.len(), 9);
        assert_eq!((cells[0].row, cells[0].col), (5, 0));
        assert!(cells[0].has(RuleType::Winner));
        assert!(cells[0].has(RuleType::Reverse));
        assert_eq!(cells[0].prize, 2600);
        assert_eq!(total(&cells), 3600);
    }

    #[test]
    fn test_reverse_bonus_merges_into_neighbour() {
        // 4-0: winner (4,0), bonus (5,9) which is also the (+1,-1) diagonal
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(2, 4, 0).unwrap();

        let cells = resolve(&score, &digits, &digits).unwrap();

        assert_eq!(cells.len(), 9);
        let merged = cells.iter().find(|c| (c.row, c.col) == (5, 9)).unwrap();
        assert_eq!(
            merged.contributing_rules,
            BTreeSet::from([RuleType::Diagonal, RuleType::Reverse])
        );
        assert_eq!(merged.prize, 300);
        // merged in place, not moved to the end
        assert_eq!(positions(&cells)[6], (5, 9));
        assert_eq!(total(&cells), 3600);
    }

    #[test]
    fn test_odd_quarters_never_pay_bonus() {
        let digits = DigitPermutation::identity();
        for quarter in [1, 3] {
            let score = ScoreEvent::new(quarter, 10, 3).unwrap();
            let cells = resolve(&score, &digits, &digits).unwrap();
            assert!(cells.iter().all(|c| !c.has(RuleType::Reverse)));
            assert_eq!(total(&cells), 3400);
        }
    }

    #[test]
    fn test_missing_digit_is_invalid_config() {
        let rows = DigitPermutation::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let cols = DigitPermutation::identity();
        let score = ScoreEvent::new(1, 20, 3).unwrap();

        let err = resolve(&score, &rows, &cols).unwrap_err();
        assert_eq!(
            err,
            SquaresError::InvalidConfig {
                axis: Axis::Row,
                digit: 0
            }
        );

        let err = resolve(&score, &cols, &DigitPermutation::new(vec![])).unwrap_err();
        assert_eq!(
            err,
            SquaresError::InvalidConfig {
                axis: Axis::Col,
                digit: 3
            }
        );
    }

    #[test]
    fn test_missing_bonus_digit_skips_bonus_only() {
        // Row 8 is missing a digit the bonus needs; the main winner is unaffected.
        let rows = DigitPermutation::new(vec![0, 1, 2, 3, 4, 5, 6, 7, 9, 9]);
        let cols = DigitPermutation::identity();
        let score = ScoreEvent::new(2, 10, 3).unwrap();

        let cells = resolve(&score, &rows, &cols).unwrap();
        assert_eq!(cells.len(), 9);
        assert!(cells.iter().all(|c| !c.has(RuleType::Reverse)));
        assert_eq!(total(&cells), 3400);
    }

    #[test]
    fn test_custom_schedule() {
        let resolver = Resolver::new(PrizeSchedule {
            winner: 1000,
            adjacent: 10,
            diagonal: 5,
            reverse: 1,
        });
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(2, 10, 3).unwrap();

        let cells = resolver.resolve(&score, &digits, &digits).unwrap();
        assert_eq!(total(&cells), 1000 + 40 + 20 + 1);
        assert_eq!(total(&cells), resolver.schedule().quarter_total(true));
    }

    #[test]
    fn test_colliding_offsets_stack_on_small_grid() {
        // On a 2-wide board +1 and -1 land on the same row/column.
        let resolver = Resolver::default().with_grid_size(2);
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(1, 10, 0).unwrap();

        let cells = resolver.resolve(&score, &digits, &digits).unwrap();

        assert_eq!(positions(&cells), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(cells[0].prize, 2400);
        assert_eq!(cells[1].prize, 300);
        assert_eq!(cells[2].prize, 300);
        assert_eq!(cells[3].prize, 400);
        assert_eq!(
            cells[3].contributing_rules,
            BTreeSet::from([RuleType::Diagonal])
        );
        assert_eq!(total(&cells), 3400);
    }

    #[test]
    fn test_single_cell_grid_collapses_everything() {
        let resolver = Resolver::default().with_grid_size(1);
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(3, 20, 10).unwrap();

        let cells = resolver.resolve(&score, &digits, &digits).unwrap();

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].prize, 3400);
        assert_eq!(
            cells[0].contributing_rules,
            BTreeSet::from([RuleType::Winner, RuleType::Adjacent, RuleType::Diagonal])
        );
    }

    #[test]
    fn test_huge_schedule_saturates_instead_of_overflowing() {
        let resolver = Resolver::new(PrizeSchedule {
            winner: u64::MAX,
            adjacent: u64::MAX,
            diagonal: u64::MAX,
            reverse: u64::MAX,
        })
        .with_grid_size(1);
        let digits = DigitPermutation::identity();
        let score = ScoreEvent::new(1, 0, 0).unwrap();

        let cells = resolver.resolve(&score, &digits, &digits).unwrap();

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].prize, u64::MAX);
    }
}

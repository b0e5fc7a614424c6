//! Pool Storage
//! Mission: Keep board numbers, team names and square claims in SQLite
//!
//! Everything the engine consumes comes out of here; nothing the engine
//! produces goes back in.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::squares::{Claim, ClaimBook, DigitPermutation, GRID_SIZE};

/// Digits currently assigned to the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardNumbers {
    /// Home team digits, one per row
    pub home_numbers: DigitPermutation,
    /// Away team digits, one per column
    pub away_numbers: DigitPermutation,
    pub created_at: String,
}

/// Display names for the two teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamNames {
    pub home: String,
    pub away: String,
}

impl Default for TeamNames {
    fn default() -> Self {
        Self {
            home: "Home".to_string(),
            away: "Away".to_string(),
        }
    }
}

/// Pool storage with SQLite backend
pub struct PoolStore {
    db_path: String,
}

impl PoolStore {
    /// Create a new pool store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open pool database: {}", self.db_path))
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS board_numbers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                home_numbers TEXT NOT NULL,
                away_numbers TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS game_config (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                home_team_name TEXT,
                away_team_name TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // One claim per square per quarter
        conn.execute(
            "CREATE TABLE IF NOT EXISTS square_selections (
                quarter INTEGER NOT NULL,
                grid_row INTEGER NOT NULL,
                grid_col INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                user_name TEXT,
                entry_number INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                UNIQUE (quarter, grid_row, grid_col)
            )",
            [],
        )?;

        Ok(())
    }

    /// Replace the active board numbers.
    ///
    /// Both arrays must be permutations of 0-9; the engine itself never checks.
    pub fn set_active_board(
        &self,
        home_numbers: &DigitPermutation,
        away_numbers: &DigitPermutation,
    ) -> Result<BoardNumbers> {
        if !home_numbers.is_permutation() {
            bail!(
                "home numbers must contain each digit 0-9 exactly once: {:?}",
                home_numbers.digits()
            );
        }
        if !away_numbers.is_permutation() {
            bail!(
                "away numbers must contain each digit 0-9 exactly once: {:?}",
                away_numbers.digits()
            );
        }

        let board = BoardNumbers {
            home_numbers: home_numbers.clone(),
            away_numbers: away_numbers.clone(),
            created_at: Utc::now().to_rfc3339(),
        };

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE board_numbers SET is_active = 0 WHERE is_active = 1",
            [],
        )?;
        tx.execute(
            "INSERT INTO board_numbers (home_numbers, away_numbers, is_active, created_at)
             VALUES (?1, ?2, 1, ?3)",
            params![
                serde_json::to_string(board.home_numbers.digits())?,
                serde_json::to_string(board.away_numbers.digits())?,
                board.created_at,
            ],
        )
        .context("Failed to insert board numbers")?;
        tx.commit()?;

        info!(
            home = ?board.home_numbers.digits(),
            away = ?board.away_numbers.digits(),
            "🎲 Board numbers set"
        );

        Ok(board)
    }

    /// Currently active board numbers, if any have been set
    pub fn active_board(&self) -> Result<Option<BoardNumbers>> {
        let conn = self.connect()?;

        let row = conn
            .query_row(
                "SELECT home_numbers, away_numbers, created_at FROM board_numbers
                 WHERE is_active = 1 ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((home_json, away_json, created_at)) = row else {
            return Ok(None);
        };

        let home: Vec<u8> =
            serde_json::from_str(&home_json).context("Malformed home_numbers column")?;
        let away: Vec<u8> =
            serde_json::from_str(&away_json).context("Malformed away_numbers column")?;

        Ok(Some(BoardNumbers {
            home_numbers: DigitPermutation::new(home),
            away_numbers: DigitPermutation::new(away),
            created_at,
        }))
    }

    /// Set the team names shown in winner notices
    pub fn set_team_names(&self, home: &str, away: &str) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("UPDATE game_config SET is_active = 0 WHERE is_active = 1", [])?;
        tx.execute(
            "INSERT INTO game_config (home_team_name, away_team_name, is_active, created_at)
             VALUES (?1, ?2, 1, ?3)",
            params![home, away, Utc::now().to_rfc3339()],
        )
        .context("Failed to insert game config")?;
        tx.commit()?;

        info!("🏈 Teams set: {} vs {}", home, away);
        Ok(())
    }

    /// Active team names; blank or missing names fall back to "Home"/"Away"
    pub fn team_names(&self) -> Result<TeamNames> {
        let conn = self.connect()?;

        let row = conn
            .query_row(
                "SELECT home_team_name, away_team_name FROM game_config
                 WHERE is_active = 1 ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                    ))
                },
            )
            .optional()?;

        let defaults = TeamNames::default();
        let Some((home, away)) = row else {
            return Ok(defaults);
        };

        Ok(TeamNames {
            home: home.filter(|s| !s.is_empty()).unwrap_or(defaults.home),
            away: away.filter(|s| !s.is_empty()).unwrap_or(defaults.away),
        })
    }

    /// Record a participant's claim on a square
    pub fn add_claim(&self, claim: &Claim) -> Result<()> {
        if !(1..=4).contains(&claim.quarter) {
            bail!("invalid quarter: {} (expected 1-4)", claim.quarter);
        }
        if claim.row >= GRID_SIZE || claim.col >= GRID_SIZE {
            bail!(
                "square ({}, {}) is outside the {}x{} board",
                claim.row,
                claim.col,
                GRID_SIZE,
                GRID_SIZE
            );
        }

        let conn = self.connect()?;
        let result = conn.execute(
            "INSERT INTO square_selections
                (quarter, grid_row, grid_col, user_id, user_name, entry_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                claim.quarter,
                claim.row as i64,
                claim.col as i64,
                claim.participant_id,
                claim.participant_name,
                claim.entry_number,
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {
                info!(
                    quarter = claim.quarter,
                    row = claim.row,
                    col = claim.col,
                    user = %claim.participant_id,
                    "✅ Square claimed"
                );
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                bail!(
                    "square ({}, {}) is already claimed for quarter {}",
                    claim.row,
                    claim.col,
                    claim.quarter
                )
            }
            Err(e) => Err(e).context("Failed to insert claim"),
        }
    }

    /// All claims for one quarter, indexed by square
    pub fn claims_for_quarter(&self, quarter: u8) -> Result<ClaimBook> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare(
            "SELECT quarter, grid_row, grid_col, user_id, user_name, entry_number
             FROM square_selections WHERE quarter = ?1 ORDER BY rowid",
        )?;

        let claims = stmt
            .query_map(params![quarter], |row| {
                Ok(Claim {
                    quarter: row.get(0)?,
                    row: row.get::<_, i64>(1)? as usize,
                    col: row.get::<_, i64>(2)? as usize,
                    participant_id: row.get(3)?,
                    participant_name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    entry_number: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClaimBook::for_quarter(quarter, claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::ClaimLookup;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (PoolStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = PoolStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_no_board_initially() {
        let (store, _temp) = create_test_store();
        assert!(store.active_board().unwrap().is_none());
    }

    #[test]
    fn test_set_and_read_board() {
        let (store, _temp) = create_test_store();

        let home = DigitPermutation::from([3, 1, 4, 0, 5, 9, 2, 6, 8, 7]);
        let away = DigitPermutation::identity();
        store.set_active_board(&home, &away).unwrap();

        let board = store.active_board().unwrap().unwrap();
        assert_eq!(board.home_numbers, home);
        assert_eq!(board.away_numbers, away);
    }

    #[test]
    fn test_latest_board_is_active() {
        let (store, _temp) = create_test_store();

        store
            .set_active_board(&DigitPermutation::identity(), &DigitPermutation::identity())
            .unwrap();
        let reversed = DigitPermutation::from([9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        store.set_active_board(&reversed, &reversed).unwrap();

        let board = store.active_board().unwrap().unwrap();
        assert_eq!(board.home_numbers, reversed);
    }

    #[test]
    fn test_rejects_non_permutation_board() {
        let (store, _temp) = create_test_store();

        let bad = DigitPermutation::new(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 8]);
        assert!(store
            .set_active_board(&bad, &DigitPermutation::identity())
            .is_err());
        assert!(store
            .set_active_board(&DigitPermutation::identity(), &bad)
            .is_err());
        assert!(store.active_board().unwrap().is_none());
    }

    #[test]
    fn test_team_names_default_and_update() {
        let (store, _temp) = create_test_store();
        assert_eq!(store.team_names().unwrap(), TeamNames::default());

        store.set_team_names("Chiefs", "").unwrap();
        let names = store.team_names().unwrap();
        assert_eq!(names.home, "Chiefs");
        assert_eq!(names.away, "Away");
    }

    #[test]
    fn test_claims_scoped_to_quarter() {
        let (store, _temp) = create_test_store();

        store
            .add_claim(&Claim::new(1, 0, 3, "alice", "Alice"))
            .unwrap();
        store
            .add_claim(&Claim::new(2, 0, 3, "bob", "Bob").with_entry_number(2))
            .unwrap();

        let q1 = store.claims_for_quarter(1).unwrap();
        assert_eq!(q1.len(), 1);
        assert_eq!(q1.claim_at(0, 3).unwrap().participant_id, "alice");

        let q2 = store.claims_for_quarter(2).unwrap();
        let claim = q2.claim_at(0, 3).unwrap();
        assert_eq!(claim.participant_id, "bob");
        assert_eq!(claim.entry_number, 2);

        assert!(store.claims_for_quarter(3).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_claim_rejected() {
        let (store, _temp) = create_test_store();

        store.add_claim(&Claim::new(1, 4, 4, "a", "A")).unwrap();
        let err = store.add_claim(&Claim::new(1, 4, 4, "b", "B")).unwrap_err();
        assert!(err.to_string().contains("already claimed"));

        let book = store.claims_for_quarter(1).unwrap();
        assert_eq!(book.claim_at(4, 4).unwrap().participant_id, "a");
    }

    #[test]
    fn test_claim_validation() {
        let (store, _temp) = create_test_store();

        assert!(store.add_claim(&Claim::new(5, 0, 0, "a", "A")).is_err());
        assert!(store.add_claim(&Claim::new(1, 10, 0, "a", "A")).is_err());
        assert!(store.add_claim(&Claim::new(1, 0, 10, "a", "A")).is_err());
    }

    #[test]
    fn test_empty_name_round_trips_as_empty() {
        let (store, _temp) = create_test_store();

        store.add_claim(&Claim::new(4, 9, 9, "anon", "")).unwrap();
        let book = store.claims_for_quarter(4).unwrap();
        assert_eq!(book.claim_at(9, 9).unwrap().participant_name, "");
    }
}

//! SQLite-backed ladder store.
//!
//! Owns the single shared connection for players, challenges, and the
//! config row. The store is injected into the engine at construction;
//! there is no process-wide handle.
//!
//! Multi-row mutations (create-and-link, complete-and-clear, delete
//! player) run inside explicit transactions so readers never observe a
//! challenger with an active-challenge reference but no matching
//! challenge row, or vice versa.

use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::error::{LadderError, Result};
use crate::model::{Challenge, ChallengeStatus, LadderConfig, Player, DEFAULT_MAX_RANK_DIFFERENCE};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    rank INTEGER NOT NULL,
    active_challenge_id TEXT,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_players_rank ON players(rank);

CREATE TABLE IF NOT EXISTS challenges (
    id TEXT PRIMARY KEY,
    challenger_id TEXT NOT NULL,
    challenged_id TEXT NOT NULL,
    status TEXT NOT NULL,
    match_date TEXT,
    created_at TEXT NOT NULL,
    challenger_score INTEGER,
    challenged_score INTEGER
);

CREATE INDEX IF NOT EXISTS idx_challenges_status ON challenges(status);
CREATE INDEX IF NOT EXISTS idx_challenges_challenger ON challenges(challenger_id);
CREATE INDEX IF NOT EXISTS idx_challenges_challenged ON challenges(challenged_id);

CREATE TABLE IF NOT EXISTS ladder_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    max_rank_difference INTEGER NOT NULL
);
"#;

impl ToSql for ChallengeStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ChallengeStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Shared handle to the ladder database. Cheap to clone.
#[derive(Clone)]
pub struct LadderStore {
    conn: Arc<Mutex<Connection>>,
}

impl LadderStore {
    /// Open (or create) the store at the specified path.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        info!("Ladder store initialized at {:?}", path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create in-memory storage (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ========================================================================
    // PLAYERS
    // ========================================================================

    pub fn insert_player(&self, player: &Player) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO players (id, name, email, rank, active_challenge_id, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                player.id,
                player.name,
                player.email,
                player.rank,
                player.active_challenge_id,
                player.is_admin as i32,
                player.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_player(&self, id: &str) -> Result<Option<Player>> {
        let conn = self.conn.lock();
        let player = conn
            .query_row(
                "SELECT id, name, email, rank, active_challenge_id, is_admin, created_at
                 FROM players WHERE id = ?1",
                params![id],
                row_to_player,
            )
            .optional()?;
        Ok(player)
    }

    pub fn player_count(&self) -> Result<u32> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All players, best rank first; ties break on id for a stable order.
    pub fn list_players_by_rank(&self) -> Result<Vec<Player>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, email, rank, active_challenge_id, is_admin, created_at
             FROM players ORDER BY rank ASC, id ASC",
        )?;
        let players = stmt
            .query_map([], row_to_player)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(players)
    }

    /// Returns false when the player does not exist.
    pub fn set_rank(&self, id: &str, rank: u32) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE players SET rank = ?1 WHERE id = ?2",
            params![rank, id],
        )?;
        Ok(changed > 0)
    }

    /// Remove a player, severing the active-challenge link in the same
    /// transaction. Challenge rows referencing the player are retained.
    pub fn delete_player(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE players SET active_challenge_id = NULL WHERE id = ?1",
            params![id],
        )?;
        let deleted = tx.execute("DELETE FROM players WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // CHALLENGES
    // ========================================================================

    /// Insert a challenge and set the challenger's active-challenge link
    /// as one transaction.
    ///
    /// The free-slot check runs inside the transaction: of two concurrent
    /// creates for the same challenger, the second observes the link left
    /// by the first and fails with `Conflict`.
    pub fn create_challenge_linked(&self, challenge: &Challenge) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let active: Option<Option<String>> = tx
            .query_row(
                "SELECT active_challenge_id FROM players WHERE id = ?1",
                params![challenge.challenger_id],
                |row| row.get(0),
            )
            .optional()?;
        match active {
            None => {
                return Err(LadderError::not_found("player", &challenge.challenger_id));
            }
            Some(Some(_)) => {
                return Err(LadderError::Conflict(
                    "challenger already has an active challenge".to_string(),
                ));
            }
            Some(None) => {}
        }

        tx.execute(
            "INSERT INTO challenges
                 (id, challenger_id, challenged_id, status, match_date, created_at,
                  challenger_score, challenged_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                challenge.id,
                challenge.challenger_id,
                challenge.challenged_id,
                challenge.status,
                challenge.match_date,
                challenge.created_at,
                challenge.challenger_score,
                challenge.challenged_score,
            ],
        )?;
        tx.execute(
            "UPDATE players SET active_challenge_id = ?1 WHERE id = ?2",
            params![challenge.id, challenge.challenger_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_challenge(&self, id: &str) -> Result<Option<Challenge>> {
        let conn = self.conn.lock();
        let challenge = conn
            .query_row(
                "SELECT id, challenger_id, challenged_id, status, match_date, created_at,
                        challenger_score, challenged_score
                 FROM challenges WHERE id = ?1",
                params![id],
                row_to_challenge,
            )
            .optional()?;
        Ok(challenge)
    }

    /// Pending challenges where the player is either party, oldest first.
    pub fn pending_challenges_for(&self, player_id: &str) -> Result<Vec<Challenge>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, challenger_id, challenged_id, status, match_date, created_at,
                    challenger_score, challenged_score
             FROM challenges
             WHERE (challenger_id = ?1 OR challenged_id = ?1) AND status = ?2
             ORDER BY created_at ASC, id ASC",
        )?;
        let challenges = stmt
            .query_map(params![player_id, ChallengeStatus::Pending], row_to_challenge)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(challenges)
    }

    /// Write the new status; when the challenge completes, clear the
    /// challenger's active-challenge link in the same transaction.
    pub fn set_status(&self, id: &str, status: ChallengeStatus) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE challenges SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        if status.is_terminal() {
            tx.execute(
                "UPDATE players SET active_challenge_id = NULL
                 WHERE id = (SELECT challenger_id FROM challenges WHERE id = ?1)",
                params![id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn set_scores(&self, id: &str, challenger_score: u32, challenged_score: u32) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE challenges SET challenger_score = ?1, challenged_score = ?2 WHERE id = ?3",
            params![challenger_score, challenged_score, id],
        )?;
        Ok(())
    }

    pub fn set_match_date(
        &self,
        id: &str,
        match_date: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE challenges SET match_date = ?1 WHERE id = ?2",
            params![match_date, id],
        )?;
        Ok(())
    }

    // ========================================================================
    // CONFIG
    // ========================================================================

    /// Read the policy window, falling back to the default when no config
    /// row has been created yet.
    pub fn get_config(&self) -> Result<LadderConfig> {
        let conn = self.conn.lock();
        let max: Option<u32> = conn
            .query_row(
                "SELECT max_rank_difference FROM ladder_config WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(LadderConfig {
            max_rank_difference: max.unwrap_or(DEFAULT_MAX_RANK_DIFFERENCE),
        })
    }

    /// Upsert the singleton config row.
    pub fn set_max_rank_difference(&self, max_rank_difference: u32) -> Result<LadderConfig> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO ladder_config (id, max_rank_difference) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET max_rank_difference = excluded.max_rank_difference",
            params![max_rank_difference],
        )?;
        Ok(LadderConfig {
            max_rank_difference,
        })
    }
}

fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        rank: row.get(3)?,
        active_challenge_id: row.get(4)?,
        is_admin: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
    })
}

fn row_to_challenge(row: &Row<'_>) -> rusqlite::Result<Challenge> {
    Ok(Challenge {
        id: row.get(0)?,
        challenger_id: row.get(1)?,
        challenged_id: row.get(2)?,
        status: row.get(3)?,
        match_date: row.get(4)?,
        created_at: row.get(5)?,
        challenger_score: row.get(6)?,
        challenged_score: row.get(7)?,
    })
}

//! Challenge lifecycle engine.
//!
//! The single writer of challenge status, recorded scores, and the
//! challenger's active-challenge link. External callers (admin tools,
//! player actions) invoke these operations; authorization happens in the
//! caller, but the engine re-validates every business precondition
//! regardless of who is calling.
//!
//! State machine: `Pending -> Accepted -> Completed`, forward-adjacent
//! moves only. Completing a challenge frees the challenger's slot so
//! they may create a new challenge.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::eligibility::can_challenge;
use crate::error::{LadderError, Result};
use crate::identity::{IdentityProvider, NullIdentityProvider};
use crate::model::{Challenge, ChallengeStatus, Player};
use crate::store::LadderStore;

/// Ladder operation contract. Cheap to clone; safe to share across
/// threads (each operation is a short synchronous unit of work).
#[derive(Clone)]
pub struct LadderEngine {
    store: LadderStore,
    identity: Arc<dyn IdentityProvider>,
}

impl LadderEngine {
    /// Engine without an external identity directory.
    pub fn new(store: LadderStore) -> Self {
        Self::with_identity_provider(store, Arc::new(NullIdentityProvider))
    }

    pub fn with_identity_provider(store: LadderStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &LadderStore {
        &self.store
    }

    // ========================================================================
    // PLAYERS
    // ========================================================================

    /// Register a player at the bottom of the ladder
    /// (rank = current player count + 1).
    pub fn add_player(&self, name: &str, email: Option<&str>) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LadderError::InvalidInput("player name is required".to_string()));
        }
        let player = Player {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.map(|e| e.to_string()),
            rank: self.store.player_count()? + 1,
            active_challenge_id: None,
            is_admin: false,
            created_at: Utc::now(),
        };
        self.store.insert_player(&player)?;
        info!(player_id = %player.id, rank = player.rank, "Player added to ladder");
        Ok(player)
    }

    pub fn get_player(&self, player_id: &str) -> Result<Player> {
        self.store
            .get_player(player_id)?
            .ok_or_else(|| LadderError::not_found("player", player_id))
    }

    /// Admin rank override. Ranks are never recomputed from match
    /// results; this is the only rank write path.
    pub fn set_rank(&self, player_id: &str, rank: u32) -> Result<Player> {
        if rank == 0 {
            return Err(LadderError::InvalidInput("rank must be positive".to_string()));
        }
        if !self.store.set_rank(player_id, rank)? {
            return Err(LadderError::not_found("player", player_id));
        }
        info!(player_id = %player_id, rank, "Player rank updated");
        self.get_player(player_id)
    }

    /// Two-phase deletion: the external identity directory must confirm
    /// removal before any local mutation. A provider failure surfaces as
    /// `DependencyFailure` and leaves the local record untouched.
    pub fn delete_player(&self, player_id: &str) -> Result<()> {
        let player = self.get_player(player_id)?;
        self.identity.remove_account(&player.id)?;
        if !self.store.delete_player(&player.id)? {
            return Err(LadderError::not_found("player", player_id));
        }
        info!(player_id = %player.id, "Player removed from ladder");
        Ok(())
    }

    // ========================================================================
    // CHALLENGES
    // ========================================================================

    /// Create a Pending challenge and occupy the challenger's slot.
    ///
    /// Preconditions: both players exist and are distinct, the challenger
    /// holds no active challenge, and the rank gap is within the
    /// configured window. The free-slot check is re-run inside the
    /// store's transaction, so concurrent creates for the same challenger
    /// cannot both succeed.
    pub fn create_challenge(&self, challenger_id: &str, challenged_id: &str) -> Result<Challenge> {
        if challenger_id == challenged_id {
            return Err(LadderError::InvalidInput(
                "a player cannot challenge themselves".to_string(),
            ));
        }
        let challenger = self.get_player(challenger_id)?;
        let challenged = self.get_player(challenged_id)?;

        if challenger.active_challenge_id.is_some() {
            return Err(LadderError::Conflict(
                "challenger already has an active challenge".to_string(),
            ));
        }

        let max_allowed = self.store.get_config()?.max_rank_difference;
        if !can_challenge(challenger.rank, challenged.rank, max_allowed) {
            debug!(
                challenger_rank = challenger.rank,
                challenged_rank = challenged.rank,
                max_allowed,
                "Challenge rejected by rank window"
            );
            return Err(LadderError::PolicyViolation {
                rank_gap: challenger.rank.abs_diff(challenged.rank),
                max_allowed,
            });
        }

        let challenge = Challenge {
            id: Uuid::new_v4().to_string(),
            challenger_id: challenger.id.clone(),
            challenged_id: challenged.id.clone(),
            status: ChallengeStatus::Pending,
            match_date: None,
            created_at: Utc::now(),
            challenger_score: None,
            challenged_score: None,
        };
        self.store.create_challenge_linked(&challenge)?;
        info!(
            challenge_id = %challenge.id,
            challenger_id = %challenger.id,
            challenged_id = %challenged.id,
            "Challenge created"
        );
        Ok(challenge)
    }

    pub fn get_challenge(&self, challenge_id: &str) -> Result<Challenge> {
        self.store
            .get_challenge(challenge_id)?
            .ok_or_else(|| LadderError::not_found("challenge", challenge_id))
    }

    /// Pending challenges where the player is either party.
    pub fn challenges_for_player(&self, player_id: &str) -> Result<Vec<Challenge>> {
        self.get_player(player_id)?;
        self.store.pending_challenges_for(player_id)
    }

    /// Advance the state machine by one step. Completing the challenge
    /// clears the challenger's active-challenge link in the same
    /// transaction as the status write.
    pub fn update_status(&self, challenge_id: &str, new_status: ChallengeStatus) -> Result<Challenge> {
        let challenge = self.get_challenge(challenge_id)?;
        if !challenge.status.can_transition_to(new_status) {
            return Err(LadderError::InvalidTransition {
                from: challenge.status.to_string(),
                to: new_status.to_string(),
            });
        }
        self.store.set_status(challenge_id, new_status)?;
        info!(
            challenge_id = %challenge_id,
            from = %challenge.status,
            to = %new_status,
            "Challenge status updated"
        );
        self.get_challenge(challenge_id)
    }

    /// Record both scores on an Accepted challenge. Scores must name a
    /// winner (one strictly greater); recording does not complete the
    /// challenge or touch ranks - both remain explicit admin actions.
    pub fn submit_score(
        &self,
        challenge_id: &str,
        challenger_score: u32,
        challenged_score: u32,
    ) -> Result<Challenge> {
        let challenge = self.get_challenge(challenge_id)?;
        if challenge.status != ChallengeStatus::Accepted {
            return Err(LadderError::InvalidState(format!(
                "scores can only be recorded on an accepted challenge (status is {})",
                challenge.status
            )));
        }
        if challenger_score == challenged_score {
            return Err(LadderError::InvalidInput(
                "winner's score must be strictly greater than loser's".to_string(),
            ));
        }
        self.store
            .set_scores(challenge_id, challenger_score, challenged_score)?;
        info!(
            challenge_id = %challenge_id,
            challenger_score,
            challenged_score,
            "Match score recorded"
        );
        self.get_challenge(challenge_id)
    }

    /// Set or clear the scheduled match time. No state-machine
    /// constraint: rescheduling stays possible in any status.
    pub fn update_match_date(
        &self,
        challenge_id: &str,
        match_date: Option<DateTime<Utc>>,
    ) -> Result<Challenge> {
        self.get_challenge(challenge_id)?;
        self.store.set_match_date(challenge_id, match_date)?;
        self.get_challenge(challenge_id)
    }

    // ========================================================================
    // CONFIG
    // ========================================================================

    /// Current policy window; 5 when no config row exists yet.
    pub fn max_rank_difference(&self) -> Result<u32> {
        Ok(self.store.get_config()?.max_rank_difference)
    }

    pub fn set_max_rank_difference(&self, max_rank_difference: u32) -> Result<u32> {
        if max_rank_difference == 0 {
            return Err(LadderError::InvalidInput(
                "max rank difference must be positive".to_string(),
            ));
        }
        let config = self.store.set_max_rank_difference(max_rank_difference)?;
        info!(max_rank_difference, "Ladder policy updated");
        Ok(config.max_rank_difference)
    }
}

//! Club Ladder - challenge lifecycle and ladder eligibility engine
//!
//! Manages a competitive billiards ladder: players hold unique numeric
//! ranks (1 = top), challenge nearby-ranked opponents within a bounded
//! rank window, and challenge outcomes feed the standings.
//!
//! ## Module Structure
//!
//! - `model`: Player, Challenge, ChallengeStatus, LadderConfig
//! - `error`: typed failure taxonomy returned by every operation
//! - `eligibility`: pure rank-window check
//! - `store`: SQLite-backed ladder store (players, challenges, config)
//! - `identity`: external identity-provider seam used by player deletion
//! - `engine`: the lifecycle engine - the only writer of challenge state
//! - `standings`: read-only ordered leaderboard projection
//!
//! The engine is consumed through [`LadderEngine`]; callers perform their
//! own authorization (admin checks) before invoking mutating operations,
//! but the engine re-validates every business precondition regardless.

/// Typed error taxonomy
pub mod error;

/// Core data records
pub mod model;

/// Rank-window eligibility check
pub mod eligibility;

/// SQLite persistence
pub mod store;

/// External identity-provider seam
pub mod identity;

/// Challenge lifecycle engine
pub mod engine;

/// Leaderboard projection
pub mod standings;

pub use engine::LadderEngine;
pub use error::LadderError;
pub use model::{Challenge, ChallengeStatus, LadderConfig, Player};
pub use store::LadderStore;

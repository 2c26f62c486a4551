//! Failure taxonomy for ladder operations.
//!
//! Every engine operation returns `Result<_, LadderError>`. Business-rule
//! failures are typed variants so the presentation layer can map them to
//! user-visible messages; storage faults wrap the underlying SQLite error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LadderError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rank difference {rank_gap} exceeds the allowed limit of {max_allowed}")]
    PolicyViolation { rank_gap: u32, max_allowed: u32 },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External dependency failed: {0}")]
    DependencyFailure(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LadderError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LadderError>;

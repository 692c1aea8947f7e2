//! Error types for klimax-core.

use uuid::Uuid;

use crate::model::RankId;
use crate::platform::EconomyError;

/// Core error type.
///
/// `CannotAfford` and `AlreadyHighest` are *not* errors — they are expected
/// terminal outcomes carried by [`crate::RankUpOutcome`]. Errors here are
/// faults: prerequisites the caller (or an earlier admin operation) violated,
/// or infrastructure problems.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No ladder registered under the given name
    #[error("ladder '{name}' not found")]
    LadderNotFound {
        /// Requested ladder name
        name: String,
    },

    /// No rank registered under the given id
    #[error("rank {id} not found")]
    RankNotFound {
        /// Requested rank id
        id: RankId,
    },

    /// A player's recorded rank is no longer part of the ladder
    #[error("rank {id} is not on ladder '{ladder}'")]
    RankNotOnLadder {
        /// The detached rank id
        id: RankId,
        /// Ladder that no longer carries it
        ladder: String,
    },

    /// The platform has no live session for the player
    #[error("player {uid} has no platform session")]
    PlayerOffline {
        /// Player uid
        uid: Uuid,
    },

    /// Ladder creation conflict; nothing was mutated
    #[error("ladder '{name}' already exists")]
    LadderExists {
        /// Conflicting ladder name
        name: String,
    },

    /// Rank creation conflict; nothing was mutated
    #[error("a rank named '{name}' already exists")]
    RankExists {
        /// Conflicting rank name
        name: String,
    },

    /// Rank cost must be finite and non-negative
    #[error("invalid rank cost: {0}")]
    InvalidCost(f64),

    /// The economy collaborator failed a debit
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// Record store failure
    #[error("storage error: {0}")]
    Storage(#[from] klimax_store::Error),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (task join, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;

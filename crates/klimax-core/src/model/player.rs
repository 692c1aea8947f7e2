//! Per-player rank associations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RankId;

/// A player's current-rank associations, one per ladder.
///
/// Created lazily on a player's first interaction; mutated only by the
/// transaction engine; persisted after every mutation. Ladder keys are
/// lowercased (see [`crate::model::RankLadder::key`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPlayer {
    /// Stable player identity
    pub uid: Uuid,
    #[serde(default)]
    ranks: BTreeMap<String, RankId>,
    /// When this record last changed
    pub updated_at: DateTime<Utc>,
}

impl RankPlayer {
    /// Create an empty record for a player.
    #[must_use]
    pub fn new(uid: Uuid) -> Self {
        Self {
            uid,
            ranks: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Current rank on a ladder, if the player has engaged with it.
    #[must_use]
    pub fn rank_on(&self, ladder: &str) -> Option<RankId> {
        self.ranks.get(&ladder.to_lowercase()).copied()
    }

    /// Set the current rank on a ladder, replacing any existing association
    /// (idempotent overwrite, not additive).
    pub fn set_rank(&mut self, ladder: &str, rank: RankId) {
        self.ranks.insert(ladder.to_lowercase(), rank);
        self.updated_at = Utc::now();
    }

    /// All current associations, keyed by ladder.
    #[must_use]
    pub fn ranks(&self) -> &BTreeMap<String, RankId> {
        &self.ranks
    }
}

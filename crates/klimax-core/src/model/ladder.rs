//! Ladder ordering model.

use serde::{Deserialize, Serialize};

use super::RankId;

/// A named, strictly ordered sequence of ranks defining a progression path.
///
/// The backing vector *is* the ordering invariant: positions are exactly
/// `0..len`, contiguous, and a rank appears at most once per ladder (insertion
/// rejects duplicates). Ladder names compare case-insensitively; [`Self::key`]
/// is the canonical registry/storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLadder {
    /// Display name, original casing preserved
    pub name: String,
    #[serde(default)]
    ranks: Vec<RankId>,
}

impl RankLadder {
    /// Create an empty ladder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ranks: Vec::new(),
        }
    }

    /// Canonical lowercase key for registry and storage lookups.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Position of a rank on this ladder, if present.
    #[must_use]
    pub fn position_of(&self, rank: RankId) -> Option<usize> {
        self.ranks.iter().position(|r| *r == rank)
    }

    /// Rank at a position.
    #[must_use]
    pub fn rank_at(&self, position: usize) -> Option<RankId> {
        self.ranks.get(position).copied()
    }

    /// Rank following the given position.
    ///
    /// `None` past the last position — the terminal case for progression, not
    /// a fault.
    #[must_use]
    pub fn next_after(&self, position: usize) -> Option<RankId> {
        self.rank_at(position + 1)
    }

    /// First (entry) rank of the ladder.
    #[must_use]
    pub fn first(&self) -> Option<RankId> {
        self.ranks.first().copied()
    }

    /// Insert a rank at a position, shifting subsequent ranks up.
    ///
    /// The position is clamped to the current length. Returns `false` without
    /// mutating if the rank is already on the ladder.
    pub fn insert_at(&mut self, position: usize, rank: RankId) -> bool {
        if self.position_of(rank).is_some() {
            return false;
        }
        let position = position.min(self.ranks.len());
        self.ranks.insert(position, rank);
        true
    }

    /// Append a rank at the end of the ladder.
    ///
    /// Returns `false` without mutating if the rank is already on the ladder.
    pub fn push(&mut self, rank: RankId) -> bool {
        self.insert_at(self.ranks.len(), rank)
    }

    /// Remove a rank, closing the gap. Returns `false` if it was not present.
    pub fn remove(&mut self, rank: RankId) -> bool {
        match self.position_of(rank) {
            Some(position) => {
                self.ranks.remove(position);
                true
            }
            None => false,
        }
    }

    /// Whether the rank is on this ladder.
    #[must_use]
    pub fn contains(&self, rank: RankId) -> bool {
        self.position_of(rank).is_some()
    }

    /// Ordered rank ids.
    #[must_use]
    pub fn ranks(&self) -> &[RankId] {
        &self.ranks
    }

    /// Number of ranks on the ladder.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the ladder has no ranks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

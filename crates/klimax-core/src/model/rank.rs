//! Rank value entity.

use serde::{Deserialize, Serialize};

/// Identifier of a rank within the registry.
///
/// Assigned by the rank manager on creation; ladders reference ranks by id
/// (non-owning), since a rank may appear on multiple ladders.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RankId(pub u32);

impl std::fmt::Display for RankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named tier with an associated advancement cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    /// Unique id, assigned by the rank manager
    pub id: RankId,
    /// Display name
    pub name: String,
    /// Arbitrary display tag (e.g. a chat prefix)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Cost to advance *into* this rank; non-negative
    pub cost: f64,
}

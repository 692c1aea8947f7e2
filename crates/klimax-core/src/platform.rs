//! Collaborator boundaries: platform player lookup and the economy.
//!
//! The host platform resolves stable player identities to live sessions; the
//! economy holds and mutates balances. Both are consumed as trait objects so
//! tests can substitute mocks or fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Live handle to a platform player session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPlayer {
    /// Stable player identity
    pub uid: Uuid,
    /// Display name
    pub name: String,
}

/// Failure reported by the economy collaborator on a debit.
///
/// The economy is authoritative and atomic on its side; a failure here means
/// no money moved.
#[derive(Debug, Clone, thiserror::Error)]
#[error("economy error: {0}")]
pub struct EconomyError(pub String);

/// Host platform player lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Platform: Send + Sync {
    /// Resolve a player uid to a live session, if one exists.
    async fn player(&self, uid: Uuid) -> Option<PlatformPlayer>;
}

/// External component holding and mutating player balances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Economy: Send + Sync {
    /// Whether the player's balance covers `amount`.
    async fn can_afford(&self, player: &PlatformPlayer, amount: f64) -> bool;

    /// Remove `amount` from the player's balance.
    ///
    /// Fails loudly; on `Err` no money has moved.
    async fn remove_balance(
        &self,
        player: &PlatformPlayer,
        amount: f64,
    ) -> Result<(), EconomyError>;
}

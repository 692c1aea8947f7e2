//! Rank-up transaction engine.
//!
//! The one operation that coordinates a financial debit with a rank mutation
//! and its persistence. Transactions are serialized per player uid — at most
//! one in-flight rank-up per player, so two concurrent calls can never both
//! observe the pre-mutation rank and double-debit. Different players proceed
//! in parallel.

mod journal;

pub use journal::{PendingTransaction, TransactionJournal};

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::Rank;
use crate::platform::{Economy, Platform, PlatformPlayer};
use crate::registry::{LadderManager, PlayerManager, RankManager};

/// Terminal outcome of a rank-up transaction.
///
/// Every outcome is terminal; there is no retry loop inside the engine — a
/// caller may re-invoke [`RankUpEngine::rank_up`] to retry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankUpOutcome {
    /// The player advanced; carries the newly held rank
    Success {
        /// The rank the player now holds
        rank: Rank,
    },
    /// No further rank on the ladder; nothing was mutated
    AlreadyHighest {
        /// The rank the player holds (`None` only for an empty ladder)
        rank: Option<Rank>,
    },
    /// The player's balance does not cover the next rank; nothing was mutated
    CannotAfford {
        /// The unaffordable target rank
        rank: Rank,
    },
    /// The transaction failed mid-flight
    ///
    /// If the failure happened after the debit, the journal retains the
    /// pending record for reconciliation.
    Failure {
        /// The attempted target rank, when known
        rank: Option<Rank>,
    },
}

impl RankUpOutcome {
    /// Whether the player advanced.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RankUpOutcome::Success { .. })
    }

    /// The rank carried by this outcome, when meaningful.
    #[must_use]
    pub fn rank(&self) -> Option<&Rank> {
        match self {
            RankUpOutcome::Success { rank } | RankUpOutcome::CannotAfford { rank } => Some(rank),
            RankUpOutcome::AlreadyHighest { rank } | RankUpOutcome::Failure { rank } => {
                rank.as_ref()
            }
        }
    }
}

/// The rank-up transaction engine.
///
/// Reads from the ladder and rank registries, settles payment through the
/// economy collaborator, mutates the player's rank association, and persists
/// it. Constructed once by [`crate::RanksModule`] and shared.
pub struct RankUpEngine {
    ranks: Arc<RankManager>,
    ladders: Arc<LadderManager>,
    players: Arc<PlayerManager>,
    platform: Arc<dyn Platform>,
    economy: Arc<dyn Economy>,
    journal: Arc<TransactionJournal>,
    in_flight: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RankUpEngine {
    /// Wire an engine to its registries and collaborators.
    pub fn new(
        ranks: Arc<RankManager>,
        ladders: Arc<LadderManager>,
        players: Arc<PlayerManager>,
        platform: Arc<dyn Platform>,
        economy: Arc<dyn Economy>,
        journal: Arc<TransactionJournal>,
    ) -> Self {
        Self {
            ranks,
            ladders,
            players,
            platform,
            economy,
            journal,
            in_flight: DashMap::new(),
        }
    }

    fn player_lock(&self, uid: Uuid) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(uid)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Advance a player one position on a ladder, paying the next rank's
    /// cost.
    ///
    /// A player with no recorded rank on the ladder is treated as holding its
    /// first rank (the implicit entry rank), so their first paid advancement
    /// targets position 1.
    ///
    /// Everything before the debit is free of side effects and safe to
    /// cancel. The debit-through-persist section runs on its own task, so
    /// dropping the returned future cannot abandon a debited transaction.
    pub async fn rank_up(&self, uid: Uuid, ladder_name: &str) -> Result<RankUpOutcome> {
        let guard = self.player_lock(uid).lock_owned().await;

        let platform_player = self
            .platform
            .player(uid)
            .await
            .ok_or(Error::PlayerOffline { uid })?;

        let ladder = self
            .ladders
            .ladder(ladder_name)
            .await
            .ok_or_else(|| Error::LadderNotFound {
                name: ladder_name.to_string(),
            })?;

        let player = self.players.get_or_create(uid).await;
        let current_id = match player.rank_on(&ladder.key()) {
            Some(id) => Some(id),
            None => ladder.first(),
        };
        let Some(current_id) = current_id else {
            // Ladder without ranks: nowhere to go, nothing to grant.
            return Ok(RankUpOutcome::AlreadyHighest { rank: None });
        };

        let position = ladder
            .position_of(current_id)
            .ok_or_else(|| Error::RankNotOnLadder {
                id: current_id,
                ladder: ladder.name.clone(),
            })?;
        let current = self
            .ranks
            .rank(current_id)
            .await
            .ok_or(Error::RankNotFound { id: current_id })?;

        let Some(next_id) = ladder.next_after(position) else {
            return Ok(RankUpOutcome::AlreadyHighest {
                rank: Some(current),
            });
        };
        let next = self
            .ranks
            .rank(next_id)
            .await
            .ok_or(Error::RankNotFound { id: next_id })?;

        if !self.economy.can_afford(&platform_player, next.cost).await {
            return Ok(RankUpOutcome::CannotAfford { rank: next });
        }

        let commit = commit_rank_up(
            self.players.clone(),
            self.economy.clone(),
            self.journal.clone(),
            platform_player,
            ladder.key(),
            next,
            guard,
        );
        match tokio::spawn(commit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(player = %uid, error = %e, "Rank-up commit task failed");
                Err(Error::Internal(format!("rank-up commit task failed: {e}")))
            }
        }
    }
}

/// Debit-through-persist section of a rank-up.
///
/// Runs to completion on its own task; the player lock guard travels with it
/// so the serialization window covers the whole transaction.
async fn commit_rank_up(
    players: Arc<PlayerManager>,
    economy: Arc<dyn Economy>,
    journal: Arc<TransactionJournal>,
    platform_player: PlatformPlayer,
    ladder_key: String,
    next: Rank,
    _guard: OwnedMutexGuard<()>,
) -> Result<RankUpOutcome> {
    let uid = platform_player.uid;
    let txn = PendingTransaction::new(uid, &ladder_key, next.id, next.cost);

    // Intent must be durable before any side effect.
    if let Err(e) = journal.begin(&txn).await {
        error!(player = %uid, error = %e, "Could not journal rank-up intent, aborting");
        return Ok(RankUpOutcome::Failure { rank: Some(next) });
    }

    if let Err(e) = economy.remove_balance(&platform_player, next.cost).await {
        // Loud debit failure: no money moved, so the intent can be cleared.
        error!(player = %uid, cost = next.cost, error = %e, "Economy debit failed");
        if let Err(e) = journal.finish(txn.id).await {
            warn!(txn = %txn.id, error = %e, "Could not clear aborted transaction");
        }
        return Ok(RankUpOutcome::Failure { rank: Some(next) });
    }

    let updated = players.assign_rank(uid, &ladder_key, next.id).await;

    match players.save_player(&updated).await {
        Ok(()) => {
            if let Err(e) = journal.finish(txn.id).await {
                // Money moved and the record saved; a stale journal entry only
                // costs a spurious reconciliation warning later.
                warn!(txn = %txn.id, error = %e, "Could not clear completed transaction");
            }
            info!(player = %uid, rank = %next.name, ladder = %ladder_key, "Rank up complete");
            Ok(RankUpOutcome::Success { rank: next })
        }
        Err(e) => {
            // The balance is already debited and the in-memory rank advanced.
            // The journal entry stays as the durable record of that
            // inconsistency until reconciliation.
            warn!(
                player = %uid,
                txn = %txn.id,
                error = %e,
                "Player save failed after debit; journal entry retained for reconciliation"
            );
            Ok(RankUpOutcome::Failure { rank: Some(next) })
        }
    }
}

#[cfg(test)]
mod tests;

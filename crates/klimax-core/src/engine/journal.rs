//! Durable pending-transaction journal.
//!
//! A rank-up writes its intent here before the economy debit and clears it
//! after the player record persists. Entries left behind mark transactions
//! where money moved but the persisted rank may not reflect it — the input
//! for reconciliation after a crash or storage fault.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use klimax_store::{Collection, RecordStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::RankId;

/// Intent record for an in-flight rank-up transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Transaction id
    pub id: Uuid,
    /// Player being advanced
    pub player: Uuid,
    /// Ladder key the advancement happens on
    pub ladder: String,
    /// Target rank
    pub rank: RankId,
    /// Cost being debited
    pub cost: f64,
    /// When the transaction started
    pub started_at: DateTime<Utc>,
}

impl PendingTransaction {
    /// Create an intent record for a rank-up about to debit.
    #[must_use]
    pub fn new(player: Uuid, ladder: &str, rank: RankId, cost: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            ladder: ladder.to_string(),
            rank,
            cost,
            started_at: Utc::now(),
        }
    }
}

/// Journal of pending rank-up transactions over the store's journal
/// collection.
pub struct TransactionJournal {
    store: Arc<dyn RecordStore>,
}

impl TransactionJournal {
    /// Create a journal over the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Durably record a transaction's intent. Must succeed before any side
    /// effect of the transaction.
    pub async fn begin(&self, txn: &PendingTransaction) -> Result<()> {
        let value = serde_json::to_value(txn)
            .map_err(|e| Error::Internal(format!("failed to encode transaction {}: {e}", txn.id)))?;
        self.store
            .save(Collection::Journal, &txn.id.to_string(), &value)
            .await?;
        debug!(txn = %txn.id, player = %txn.player, cost = txn.cost, "Transaction journaled");
        Ok(())
    }

    /// Clear a completed (or safely aborted) transaction.
    pub async fn finish(&self, id: Uuid) -> Result<bool> {
        let removed = self.store.delete(Collection::Journal, &id.to_string()).await?;
        debug!(txn = %id, removed, "Transaction cleared from journal");
        Ok(removed)
    }

    /// Transactions whose completion was never recorded, oldest first.
    ///
    /// Undecodable entries are skipped with a warning.
    pub async fn unreconciled(&self) -> Result<Vec<PendingTransaction>> {
        let report = self.store.load_all(Collection::Journal).await?;
        let mut pending = Vec::new();
        for record in report.records {
            match serde_json::from_value::<PendingTransaction>(record.value) {
                Ok(txn) => pending.push(txn),
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Skipping undecodable journal entry");
                }
            }
        }
        pending.sort_by_key(|txn| txn.started_at);
        Ok(pending)
    }
}

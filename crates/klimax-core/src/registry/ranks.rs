//! Rank registry.

use std::collections::HashMap;
use std::sync::Arc;

use klimax_store::{Collection, RecordStore};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::BulkOutcome;
use crate::error::{Error, Result};
use crate::model::{Rank, RankId};

/// Owner of the rank registry: load/save, lookup, create, delete.
pub struct RankManager {
    store: Arc<dyn RecordStore>,
    ranks: RwLock<HashMap<RankId, Rank>>,
}

impl RankManager {
    /// Create a manager over the given store. The registry starts empty;
    /// call [`Self::load_ranks`] to populate it.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            ranks: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the registry with the store's contents.
    ///
    /// Corrupt records are skipped and reported in the outcome; only a
    /// failure touching the whole collection is an error.
    pub async fn load_ranks(&self) -> Result<BulkOutcome> {
        let report = self.store.load_all(Collection::Ranks).await?;
        let mut outcome = BulkOutcome {
            failed: report.failures.len(),
            ..BulkOutcome::default()
        };

        let mut loaded = HashMap::new();
        for record in report.records {
            match serde_json::from_value::<Rank>(record.value) {
                Ok(rank) => {
                    if loaded.insert(rank.id, rank).is_some() {
                        warn!(key = %record.key, "Duplicate rank id in storage, keeping the later record");
                    }
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Skipping undecodable rank record");
                    outcome.failed += 1;
                }
            }
        }

        let mut ranks = self.ranks.write().await;
        *ranks = loaded;
        debug!(loaded = outcome.succeeded, skipped = outcome.failed, "Rank registry loaded");
        Ok(outcome)
    }

    /// Persist every rank in the registry, one record per rank.
    ///
    /// A failing record is logged and skipped; the rest still save.
    pub async fn save_ranks(&self) -> BulkOutcome {
        let ranks: Vec<Rank> = {
            let ranks = self.ranks.read().await;
            ranks.values().cloned().collect()
        };

        let mut outcome = BulkOutcome::default();
        for rank in ranks {
            let key = record_key(rank.id);
            let value = match serde_json::to_value(&rank) {
                Ok(value) => value,
                Err(e) => {
                    error!(rank = %rank.id, error = %e, "Failed to encode rank");
                    outcome.failed += 1;
                    continue;
                }
            };
            match self.store.save(Collection::Ranks, &key, &value).await {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    error!(rank = %rank.id, error = %e, "Failed to save rank");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    /// Create a rank with the next free id.
    ///
    /// Rejects a non-finite or negative cost and a name already in use
    /// (case-insensitively), mutating nothing on conflict. The new rank lives
    /// in the registry only until the next [`Self::save_ranks`].
    pub async fn create_rank(
        &self,
        name: impl Into<String>,
        tag: Option<String>,
        cost: f64,
    ) -> Result<Rank> {
        let name = name.into();
        if !cost.is_finite() || cost < 0.0 {
            return Err(Error::InvalidCost(cost));
        }

        let mut ranks = self.ranks.write().await;
        if ranks
            .values()
            .any(|r| r.name.eq_ignore_ascii_case(&name))
        {
            return Err(Error::RankExists { name });
        }

        let id = RankId(ranks.keys().map(|id| id.0 + 1).max().unwrap_or(0));
        let rank = Rank {
            id,
            name,
            tag,
            cost,
        };
        ranks.insert(id, rank.clone());
        debug!(rank = %rank.id, name = %rank.name, cost = rank.cost, "Rank created");
        Ok(rank)
    }

    /// Look up a rank by id.
    pub async fn rank(&self, id: RankId) -> Option<Rank> {
        let ranks = self.ranks.read().await;
        ranks.get(&id).cloned()
    }

    /// Look up a rank by name, case-insensitively.
    pub async fn rank_by_name(&self, name: &str) -> Option<Rank> {
        let ranks = self.ranks.read().await;
        ranks
            .values()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// All ranks, sorted by id.
    pub async fn all(&self) -> Vec<Rank> {
        let ranks = self.ranks.read().await;
        let mut all: Vec<Rank> = ranks.values().cloned().collect();
        all.sort_by_key(|r| r.id);
        all
    }

    /// Remove a rank from the registry and from storage.
    ///
    /// Ladder cleanup is coordinated by the module context; see
    /// [`crate::RanksModule::delete_rank`]. Returns `false` if no such rank
    /// existed.
    pub async fn delete_rank(&self, id: RankId) -> Result<bool> {
        let existed = {
            let mut ranks = self.ranks.write().await;
            ranks.remove(&id).is_some()
        };
        if existed {
            self.store.delete(Collection::Ranks, &record_key(id)).await?;
            debug!(rank = %id, "Rank deleted");
        }
        Ok(existed)
    }
}

fn record_key(id: RankId) -> String {
    format!("rank_{id}")
}

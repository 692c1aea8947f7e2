//! Ladder registry.

use std::collections::HashMap;
use std::sync::Arc;

use klimax_store::{Collection, RecordStore};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::BulkOutcome;
use crate::error::{Error, Result};
use crate::model::{RankId, RankLadder};

/// Owner of the ladder registry, keyed by lowercased ladder name.
pub struct LadderManager {
    store: Arc<dyn RecordStore>,
    ladders: RwLock<HashMap<String, RankLadder>>,
}

impl LadderManager {
    /// Create a manager over the given store. The registry starts empty;
    /// call [`Self::load_ladders`] to populate it.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            ladders: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the registry with the store's contents.
    ///
    /// Corrupt records are skipped and reported in the outcome; only a
    /// failure touching the whole collection is an error.
    pub async fn load_ladders(&self) -> Result<BulkOutcome> {
        let report = self.store.load_all(Collection::Ladders).await?;
        let mut outcome = BulkOutcome {
            failed: report.failures.len(),
            ..BulkOutcome::default()
        };

        let mut loaded = HashMap::new();
        for record in report.records {
            match serde_json::from_value::<RankLadder>(record.value) {
                Ok(ladder) => {
                    if loaded.insert(ladder.key(), ladder).is_some() {
                        warn!(key = %record.key, "Duplicate ladder name in storage, keeping the later record");
                    }
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Skipping undecodable ladder record");
                    outcome.failed += 1;
                }
            }
        }

        let mut ladders = self.ladders.write().await;
        *ladders = loaded;
        debug!(loaded = outcome.succeeded, skipped = outcome.failed, "Ladder registry loaded");
        Ok(outcome)
    }

    /// Create an empty ladder.
    ///
    /// Fails with [`Error::LadderExists`] without mutation if a ladder with
    /// that name (case-insensitively) already exists. The new ladder is not
    /// persisted until [`Self::save_ladder`].
    pub async fn create_ladder(&self, name: impl Into<String>) -> Result<RankLadder> {
        let ladder = RankLadder::new(name);
        let key = ladder.key();
        if key.is_empty() {
            return Err(Error::Config("ladder name must not be empty".to_string()));
        }

        let mut ladders = self.ladders.write().await;
        if ladders.contains_key(&key) {
            return Err(Error::LadderExists { name: ladder.name });
        }
        ladders.insert(key, ladder.clone());
        debug!(ladder = %ladder.name, "Ladder created");
        Ok(ladder)
    }

    /// Look up a ladder by name, case-insensitively.
    pub async fn ladder(&self, name: &str) -> Option<RankLadder> {
        let ladders = self.ladders.read().await;
        ladders.get(&name.to_lowercase()).cloned()
    }

    /// Persist one ladder, updating the registry copy.
    ///
    /// Administrative edits flow through here: fetch a clone, mutate it, save
    /// it back.
    pub async fn save_ladder(&self, ladder: &RankLadder) -> Result<()> {
        let value = serde_json::to_value(ladder).map_err(|e| {
            Error::Internal(format!("failed to encode ladder '{}': {e}", ladder.name))
        })?;
        self.store
            .save(Collection::Ladders, &ladder.key(), &value)
            .await?;

        let mut ladders = self.ladders.write().await;
        ladders.insert(ladder.key(), ladder.clone());
        debug!(ladder = %ladder.name, ranks = ladder.len(), "Ladder saved");
        Ok(())
    }

    /// All ladders, sorted by name.
    pub async fn all(&self) -> Vec<RankLadder> {
        let ladders = self.ladders.read().await;
        let mut all: Vec<RankLadder> = ladders.values().cloned().collect();
        all.sort_by(|a, b| a.key().cmp(&b.key()));
        all
    }

    /// Drop a rank id from every ladder carrying it, saving each touched
    /// ladder. Returns the number of ladders touched; save failures are
    /// logged and do not stop the sweep.
    pub async fn remove_rank_everywhere(&self, rank: RankId) -> usize {
        let touched: Vec<RankLadder> = {
            let mut ladders = self.ladders.write().await;
            ladders
                .values_mut()
                .filter_map(|ladder| ladder.remove(rank).then(|| ladder.clone()))
                .collect()
        };

        for ladder in &touched {
            let value = match serde_json::to_value(ladder) {
                Ok(value) => value,
                Err(e) => {
                    error!(ladder = %ladder.name, error = %e, "Failed to encode ladder after rank removal");
                    continue;
                }
            };
            if let Err(e) = self
                .store
                .save(Collection::Ladders, &ladder.key(), &value)
                .await
            {
                error!(ladder = %ladder.name, error = %e, "Failed to save ladder after rank removal");
            }
        }
        touched.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klimax_store::MemoryStore;
    use serde_json::json;

    fn manager() -> (Arc<MemoryStore>, LadderManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = LadderManager::new(store.clone());
        (store, manager)
    }

    #[tokio::test]
    async fn create_conflict_leaves_registry_unchanged() {
        let (_store, manager) = manager();

        manager.create_ladder("Default").await.unwrap();
        let result = manager.create_ladder("DEFAULT").await;

        assert!(matches!(result, Err(Error::LadderExists { .. })));
        assert_eq!(manager.all().await.len(), 1);
        // Original casing survives the failed create.
        assert_eq!(manager.ladder("default").await.unwrap().name, "Default");
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let (_store, manager) = manager();

        manager.create_ladder("Prestige").await.unwrap();
        assert!(manager.ladder("prestige").await.is_some());
        assert!(manager.ladder("PRESTIGE").await.is_some());
        assert!(manager.ladder("other").await.is_none());
    }

    #[tokio::test]
    async fn save_and_reload_round_trip() {
        let (store, manager) = manager();

        let mut ladder = manager.create_ladder("default").await.unwrap();
        ladder.push(RankId(0));
        ladder.push(RankId(1));
        manager.save_ladder(&ladder).await.unwrap();

        let reloaded = LadderManager::new(store);
        let outcome = reloaded.load_ladders().await.unwrap();
        assert_eq!(outcome.succeeded, 1);

        let back = reloaded.ladder("default").await.unwrap();
        assert_eq!(back.ranks(), &[RankId(0), RankId(1)]);
    }

    #[tokio::test]
    async fn undecodable_record_is_skipped_on_load() {
        let (store, manager) = manager();

        store
            .save(Collection::Ladders, "good", &json!({"name": "good", "ranks": [0]}))
            .await
            .unwrap();
        store
            .save(Collection::Ladders, "bad", &json!(42))
            .await
            .unwrap();

        let outcome = manager.load_ladders().await.unwrap();
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert!(manager.ladder("good").await.is_some());
    }

    #[tokio::test]
    async fn remove_rank_everywhere_touches_only_carriers() {
        let (store, manager) = manager();

        let mut default = manager.create_ladder("default").await.unwrap();
        default.push(RankId(0));
        default.push(RankId(1));
        manager.save_ladder(&default).await.unwrap();

        let mut prestige = manager.create_ladder("prestige").await.unwrap();
        prestige.push(RankId(2));
        manager.save_ladder(&prestige).await.unwrap();

        let touched = manager.remove_rank_everywhere(RankId(1)).await;
        assert_eq!(touched, 1);
        assert_eq!(
            manager.ladder("default").await.unwrap().ranks(),
            &[RankId(0)]
        );
        assert_eq!(manager.ladder("prestige").await.unwrap().len(), 1);

        // The persisted copy reflects the removal.
        let reloaded = LadderManager::new(store);
        reloaded.load_ladders().await.unwrap();
        assert!(!reloaded.ladder("default").await.unwrap().contains(RankId(1)));
    }
}

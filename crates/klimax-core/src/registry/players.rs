//! Player record registry.

use std::collections::HashMap;
use std::sync::Arc;

use klimax_store::{Collection, RecordStore};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::BulkOutcome;
use crate::error::{Error, Result};
use crate::model::{RankId, RankPlayer};

/// Owner of persisted player rank records.
///
/// Records are created lazily on first interaction and only mutated by the
/// transaction engine, which holds the per-player lock while it reads,
/// assigns, and saves.
pub struct PlayerManager {
    store: Arc<dyn RecordStore>,
    players: RwLock<HashMap<Uuid, RankPlayer>>,
}

impl PlayerManager {
    /// Create a manager over the given store. The registry starts empty;
    /// call [`Self::load_players`] to populate it.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the registry with the store's contents.
    ///
    /// Corrupt records are skipped and reported in the outcome; only a
    /// failure touching the whole collection is an error.
    pub async fn load_players(&self) -> Result<BulkOutcome> {
        let report = self.store.load_all(Collection::Players).await?;
        let mut outcome = BulkOutcome {
            failed: report.failures.len(),
            ..BulkOutcome::default()
        };

        let mut loaded = HashMap::new();
        for record in report.records {
            match serde_json::from_value::<RankPlayer>(record.value) {
                Ok(player) => {
                    loaded.insert(player.uid, player);
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    warn!(key = %record.key, error = %e, "Skipping undecodable player record");
                    outcome.failed += 1;
                }
            }
        }

        let mut players = self.players.write().await;
        *players = loaded;
        debug!(loaded = outcome.succeeded, skipped = outcome.failed, "Player records loaded");
        Ok(outcome)
    }

    /// Current record for a player, if one exists.
    pub async fn player(&self, uid: Uuid) -> Option<RankPlayer> {
        let players = self.players.read().await;
        players.get(&uid).cloned()
    }

    /// Record for a player, creating an empty in-memory one on first
    /// interaction. Nothing is persisted until the record is saved.
    pub async fn get_or_create(&self, uid: Uuid) -> RankPlayer {
        let mut players = self.players.write().await;
        players
            .entry(uid)
            .or_insert_with(|| RankPlayer::new(uid))
            .clone()
    }

    /// Set a player's current rank on a ladder, replacing any existing
    /// association, and return the updated record.
    pub async fn assign_rank(&self, uid: Uuid, ladder: &str, rank: RankId) -> RankPlayer {
        let mut players = self.players.write().await;
        let player = players.entry(uid).or_insert_with(|| RankPlayer::new(uid));
        player.set_rank(ladder, rank);
        player.clone()
    }

    /// Persist one player record.
    pub async fn save_player(&self, player: &RankPlayer) -> Result<()> {
        let value = serde_json::to_value(player).map_err(|e| {
            Error::Internal(format!("failed to encode player {}: {e}", player.uid))
        })?;
        self.store
            .save(Collection::Players, &player.uid.to_string(), &value)
            .await?;
        debug!(player = %player.uid, "Player record saved");
        Ok(())
    }

    /// Number of records currently in memory.
    pub async fn count(&self) -> usize {
        let players = self.players.read().await;
        players.len()
    }
}

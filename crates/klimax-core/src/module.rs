//! Module context: bootstrap, wiring, and lifecycle.
//!
//! One `RanksModule` is constructed at startup and passed by reference to
//! whatever needs the managers or the engine — dependency injection instead
//! of global lookup.

use std::sync::Arc;

use klimax_store::RecordStore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::RanksConfig;
use crate::engine::{RankUpEngine, RankUpOutcome, TransactionJournal};
use crate::error::Result;
use crate::model::RankId;
use crate::platform::{Economy, Platform};
use crate::registry::{LadderManager, PlayerManager, RankManager};
use crate::status::ModuleStatus;

/// The ranks module: registries, engine, collaborators, and status, wired
/// once at startup.
pub struct RanksModule {
    config: RanksConfig,
    ranks: Arc<RankManager>,
    ladders: Arc<LadderManager>,
    players: Arc<PlayerManager>,
    journal: Arc<TransactionJournal>,
    engine: Arc<RankUpEngine>,
    status: Arc<ModuleStatus>,
}

impl RanksModule {
    /// Load the registries from storage and wire the engine.
    ///
    /// Bootstrap never aborts: load failures and a missing/unsavable default
    /// ladder degrade the module status instead of crashing the process. A
    /// single corrupt record never prevents the rest of a registry from
    /// loading (that tolerance lives in the managers).
    pub async fn bootstrap(
        config: RanksConfig,
        store: Arc<dyn RecordStore>,
        platform: Arc<dyn Platform>,
        economy: Arc<dyn Economy>,
    ) -> Self {
        let status = Arc::new(ModuleStatus::new());
        let ranks = Arc::new(RankManager::new(store.clone()));
        let ladders = Arc::new(LadderManager::new(store.clone()));
        let players = Arc::new(PlayerManager::new(store.clone()));
        let journal = Arc::new(TransactionJournal::new(store));

        match ranks.load_ranks().await {
            Ok(outcome) if !outcome.clean() => {
                warn!(skipped = outcome.failed, "Some rank records failed to load");
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Rank registry failed to load");
                status.set_degraded("rank registry unavailable");
            }
        }

        match ladders.load_ladders().await {
            Ok(outcome) if !outcome.clean() => {
                warn!(skipped = outcome.failed, "Some ladder records failed to load");
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Ladder registry failed to load");
                status.set_degraded("ladder registry unavailable");
            }
        }

        ensure_default_ladder(&ladders, &config.default_ladder, &status).await;

        match players.load_players().await {
            Ok(outcome) if !outcome.clean() => {
                warn!(skipped = outcome.failed, "Some player records failed to load");
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Player records failed to load");
                status.set_degraded("player records unavailable");
            }
        }

        match journal.unreconciled().await {
            Ok(pending) if !pending.is_empty() => {
                warn!(
                    count = pending.len(),
                    "Unreconciled rank-up transactions found; money may have moved without a persisted rank"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Could not inspect the transaction journal"),
        }

        let engine = Arc::new(RankUpEngine::new(
            ranks.clone(),
            ladders.clone(),
            players.clone(),
            platform,
            economy,
            journal.clone(),
        ));

        info!(
            data_dir = %config.data_dir.display(),
            default_ladder = %config.default_ladder,
            degraded = status.is_degraded(),
            "Ranks module ready"
        );

        Self {
            config,
            ranks,
            ladders,
            players,
            journal,
            engine,
            status,
        }
    }

    /// Persist the rank registry before the process stops.
    pub async fn shutdown(&self) {
        let outcome = self.ranks.save_ranks().await;
        if !outcome.clean() {
            error!(failed = outcome.failed, "Some ranks failed to save on shutdown");
        }
    }

    /// Advance a player one position on a ladder. See
    /// [`RankUpEngine::rank_up`].
    pub async fn rank_up(&self, uid: Uuid, ladder_name: &str) -> Result<RankUpOutcome> {
        self.engine.rank_up(uid, ladder_name).await
    }

    /// Delete a rank, dropping it from every ladder that carries it.
    ///
    /// Returns `false` if no such rank existed.
    pub async fn delete_rank(&self, id: RankId) -> Result<bool> {
        let existed = self.ranks.delete_rank(id).await?;
        if existed {
            let touched = self.ladders.remove_rank_everywhere(id).await;
            info!(rank = %id, ladders = touched, "Rank deleted");
        }
        Ok(existed)
    }

    /// Module configuration.
    #[must_use]
    pub fn config(&self) -> &RanksConfig {
        &self.config
    }

    /// Rank registry.
    #[must_use]
    pub fn ranks(&self) -> &Arc<RankManager> {
        &self.ranks
    }

    /// Ladder registry.
    #[must_use]
    pub fn ladders(&self) -> &Arc<LadderManager> {
        &self.ladders
    }

    /// Player records.
    #[must_use]
    pub fn players(&self) -> &Arc<PlayerManager> {
        &self.players
    }

    /// Pending-transaction journal.
    #[must_use]
    pub fn journal(&self) -> &Arc<TransactionJournal> {
        &self.journal
    }

    /// Transaction engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<RankUpEngine> {
        &self.engine
    }

    /// Module status hook.
    #[must_use]
    pub fn status(&self) -> &Arc<ModuleStatus> {
        &self.status
    }
}

/// The module cannot run without its default ladder; create it if absent.
///
/// Failure to create or save it degrades the status visibly but never aborts
/// startup.
async fn ensure_default_ladder(
    ladders: &LadderManager,
    name: &str,
    status: &ModuleStatus,
) {
    if ladders.ladder(name).await.is_some() {
        return;
    }

    match ladders.create_ladder(name).await {
        Ok(ladder) => {
            if let Err(e) = ladders.save_ladder(&ladder).await {
                error!(ladder = %name, error = %e, "Could not save the default ladder");
                status.set_degraded(format!("no '{name}' ladder available"));
            } else {
                info!(ladder = %name, "Default ladder created");
            }
        }
        Err(e) => {
            error!(ladder = %name, error = %e, "Could not create the default ladder");
            status.set_degraded(format!("no '{name}' ladder available"));
        }
    }
}

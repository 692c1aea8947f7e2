//! Klimax Core — Rank Progression Engine
//!
//! Players advance through ordered sequences of ranks ("ladders"), paying a
//! cost drawn from an externally held balance to move to the next rank. This
//! crate provides:
//! - Model: ranks, ladders (ordering), and per-player rank associations
//! - Registry: managers owning the rank, ladder, and player registries over a
//!   swappable record store
//! - Engine: the rank-up transaction, serialized per player, with a durable
//!   pending-transaction journal
//! - Module: the bootstrap context wiring managers, collaborators, and the
//!   status hook together (dependency injection, no global state)
//!
//! The economy (balance holder) and platform (player session lookup) are
//! external collaborators, consumed through the traits in [`platform`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod module;
pub mod platform;
pub mod registry;
pub mod status;

pub use config::RanksConfig;
pub use engine::{PendingTransaction, RankUpEngine, RankUpOutcome, TransactionJournal};
pub use error::{Error, Result};
pub use model::{Rank, RankId, RankLadder, RankPlayer};
pub use module::RanksModule;
pub use platform::{Economy, EconomyError, Platform, PlatformPlayer};
pub use registry::{BulkOutcome, LadderManager, PlayerManager, RankManager};
pub use status::{HealthState, ModuleStatus, StatusSnapshot};

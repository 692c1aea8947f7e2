//! Registries owning the rank, ladder, and player collections.
//!
//! Each manager exclusively owns its registry behind a coarse `RwLock`
//! (structural mutation is rare; lookups dominate) and persists through the
//! record store it was constructed with. Bulk loads and saves are tolerant:
//! a corrupt record is skipped and reported, never aborting the rest.

mod ladders;
mod players;
mod ranks;

pub use ladders::LadderManager;
pub use players::PlayerManager;
pub use ranks::RankManager;

/// Counts from a tolerant bulk load or save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Records processed successfully
    pub succeeded: usize,
    /// Records skipped because they could not be read, decoded, or written
    pub failed: usize,
}

impl BulkOutcome {
    /// Whether every record went through.
    #[must_use]
    pub fn clean(&self) -> bool {
        self.failed == 0
    }
}

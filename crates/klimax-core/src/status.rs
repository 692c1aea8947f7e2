//! Module status hook.
//!
//! Non-fatal startup degradation (a missing default ladder, an unreadable
//! registry) is surfaced here as a settable human-readable status instead of
//! aborting the process.

use std::sync::RwLock;

use serde::Serialize;
use tracing::warn;

/// Coarse health of the ranks module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Fully operational
    Ready,
    /// Running with reduced functionality
    Degraded,
}

/// Point-in-time status view.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Health state
    pub state: HealthState,
    /// Human-readable status line
    pub message: String,
}

/// Settable module status, shared across the module's components.
#[derive(Debug)]
pub struct ModuleStatus {
    inner: RwLock<StatusSnapshot>,
}

impl ModuleStatus {
    /// Create a status handle in the `Ready` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StatusSnapshot {
                state: HealthState::Ready,
                message: "ready".to_string(),
            }),
        }
    }

    /// Mark the module degraded with a human-readable reason.
    pub fn set_degraded(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(status = %message, "Ranks module degraded");
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.state = HealthState::Degraded;
        inner.message = message;
    }

    /// Mark the module fully operational again.
    pub fn set_ready(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.state = HealthState::Ready;
        inner.message = "ready".to_string();
    }

    /// Current status.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether the module is currently degraded.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.snapshot().state == HealthState::Degraded
    }
}

impl Default for ModuleStatus {
    fn default() -> Self {
        Self::new()
    }
}

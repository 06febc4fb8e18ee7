//! Game master and registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timers and channel sizes of one game master.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// How long a disconnected player keeps their seat (milliseconds).
    pub gc_grace_ms: u64,

    /// Interval between heartbeat events (milliseconds).
    pub heartbeat_interval_ms: u64,

    /// Capacity of each viewer's event channel.
    pub event_buffer: usize,

    /// Capacity of the control channel.
    pub control_buffer: usize,

    /// Number of game ids announced in heartbeats.
    pub recent_games_limit: usize,

    /// Search budget for suggestions that do not name one (milliseconds).
    pub suggest_budget_ms: u64,

    /// Upper bound on any requested search budget (milliseconds).
    pub max_suggest_budget_ms: u64,

    /// How long a game may go without a seated player before it is closed
    /// (milliseconds).
    pub idle_timeout_ms: u64,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            gc_grace_ms: 30_000,
            heartbeat_interval_ms: 5_000,
            event_buffer: 16,
            control_buffer: 32,
            recent_games_limit: 5,
            suggest_budget_ms: 1_000,
            max_suggest_budget_ms: 10_000,
            idle_timeout_ms: 300_000,
        }
    }
}

impl MasterConfig {
    #[must_use]
    pub fn gc_grace(&self) -> Duration {
        Duration::from_millis(self.gc_grace_ms)
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        // A zero period would make the heartbeat spin.
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    #[must_use]
    pub fn suggest_budget(&self) -> Duration {
        Duration::from_millis(self.suggest_budget_ms)
    }

    /// Budget for a suggestion: the requested one, or the default, capped
    /// at the configured maximum.
    #[must_use]
    pub fn suggest_budget_for(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or_else(|| self.suggest_budget())
            .min(Duration::from_millis(self.max_suggest_budget_ms))
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    #[must_use]
    pub fn with_gc_grace(mut self, grace: Duration) -> Self {
        self.gc_grace_ms = grace.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval_ms = interval.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_event_buffer(mut self, n: usize) -> Self {
        self.event_buffer = n;
        self
    }

    #[must_use]
    pub fn with_suggest_budget(mut self, budget: Duration) -> Self {
        self.suggest_budget_ms = budget.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_max_suggest_budget(mut self, budget: Duration) -> Self {
        self.max_suggest_budget_ms = budget.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

/// Game id generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Characters per game id.
    pub id_len: usize,

    /// Random ids tried before giving up.
    pub id_attempts: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            id_len: 6,
            id_attempts: 10,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn with_id_len(mut self, len: usize) -> Self {
        self.id_len = len;
        self
    }

    #[must_use]
    pub fn with_id_attempts(mut self, attempts: usize) -> Self {
        self.id_attempts = attempts;
        self
    }
}

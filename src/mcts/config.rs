//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MCTSConfig {
    /// UCT exploration constant (default: 1.0).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Maximum number of randomly chosen cells offered as flag moves per node.
    pub max_flag_positions: usize,

    /// Offer only flag moves while the mover still holds a flag.
    pub flags_first: bool,

    /// Iterations between two checks of the time budget.
    pub budget_check_interval: u32,

    /// Random seed for tree policy and rollouts.
    /// `None` seeds from entropy; the same seed reproduces a search given
    /// the same iteration count.
    pub seed: Option<u64>,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 1.0,
            max_flag_positions: 5,
            flags_first: false,
            budget_check_interval: 64,
            seed: None,
        }
    }
}

impl MCTSConfig {
    /// Create a new config with custom exploration constant.
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    #[must_use]
    pub fn with_max_flag_positions(mut self, n: usize) -> Self {
        self.max_flag_positions = n;
        self
    }

    #[must_use]
    pub fn with_flags_first(mut self, flags_first: bool) -> Self {
        self.flags_first = flags_first;
        self
    }

    /// Check the budget every `n` iterations. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_budget_check_interval(mut self, n: u32) -> Self {
        self.budget_check_interval = n.max(1);
        self
    }

    /// Create a new config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MCTSConfig::default();
        assert_eq!(config.exploration_constant, 1.0);
        assert_eq!(config.max_flag_positions, 5);
        assert!(!config.flags_first);
        assert_eq!(config.budget_check_interval, 64);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MCTSConfig::default()
            .with_exploration(2.0)
            .with_seed(123)
            .with_flags_first(true)
            .with_max_flag_positions(3)
            .with_budget_check_interval(0);

        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.seed, Some(123));
        assert!(config.flags_first);
        assert_eq!(config.max_flag_positions, 3);
        assert_eq!(config.budget_check_interval, 1);
    }

    #[test]
    fn test_serialization() {
        let config = MCTSConfig::default().with_seed(9);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MCTSConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}

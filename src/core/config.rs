//! Top-level configuration.
//!
//! `HexzConfig` gathers the per-layer configs:
//! - `MasterConfig`: game master timers and channel sizes
//! - `RegistryConfig`: game id generation
//! - `MCTSConfig`: move search parameters
//!
//! Every section is optional in TOML; missing fields take their defaults.
//!
//! ```
//! use hexz::core::HexzConfig;
//!
//! let config = HexzConfig::from_toml_str(r#"
//!     [master]
//!     gc_grace_ms = 5000
//!
//!     [search]
//!     flags_first = true
//! "#).unwrap();
//!
//! assert_eq!(config.master.gc_grace_ms, 5000);
//! assert!(config.search.flags_first);
//! assert_eq!(config.registry.id_len, 6);
//! ```

use serde::{Deserialize, Serialize};

use super::error::Result;
use crate::master::{MasterConfig, RegistryConfig};
use crate::mcts::MCTSConfig;

/// Complete server-core configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HexzConfig {
    /// Game master settings.
    pub master: MasterConfig,

    /// Game registry settings.
    pub registry: RegistryConfig,

    /// Move search settings used for suggestions.
    pub search: MCTSConfig,
}

impl HexzConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Replace the master section.
    #[must_use]
    pub fn with_master(mut self, master: MasterConfig) -> Self {
        self.master = master;
        self
    }

    /// Replace the registry section.
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the search section.
    #[must_use]
    pub fn with_search(mut self, search: MCTSConfig) -> Self {
        self.search = search;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = HexzConfig::from_toml_str("").unwrap();
        let default = HexzConfig::default();

        assert_eq!(config.master.gc_grace_ms, default.master.gc_grace_ms);
        assert_eq!(config.registry.id_attempts, default.registry.id_attempts);
        assert_eq!(config.search.max_flag_positions, default.search.max_flag_positions);
    }

    #[test]
    fn test_partial_sections() {
        let config = HexzConfig::from_toml_str(
            r#"
            [registry]
            id_len = 4

            [search]
            exploration_constant = 2.0
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.registry.id_len, 4);
        assert_eq!(config.search.exploration_constant, 2.0);
        assert_eq!(config.search.seed, Some(7));
    }

    #[test]
    fn test_invalid_document() {
        assert!(HexzConfig::from_toml_str("[master]\ngc_grace_ms = \"soon\"").is_err());
    }
}

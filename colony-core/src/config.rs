//! Configuration for the colony core library.
//!
//! Maps directly to the `[general]`, `[inventory]` and `[transfer]` tables
//! of `colony.toml`. Every field has a default, so an empty file is valid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColonyConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Slot inventory rules.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Transfer executor behavior.
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl ColonyConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ColonyError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::ColonyError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Stack-size rules used by slot inventories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Cap applied to any item without an override.
    #[serde(default = "default_64")]
    pub default_max_stack_size: i32,
    /// Per-item-id caps, e.g. `{ "colony:egg" = 16 }`.
    #[serde(default)]
    pub stack_size_overrides: BTreeMap<String, i32>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_max_stack_size: 64,
            stack_size_overrides: BTreeMap::new(),
        }
    }
}

/// Transfer executor settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Size the deposited stack by what the sender can pay for instead of by
    /// the requested quantity.
    #[serde(default)]
    pub cap_deposit_to_available: bool,
    /// Upper bound on source-removal iterations. `None` uses the source
    /// inventory's slot count.
    #[serde(default)]
    pub removal_iteration_cap: Option<usize>,
}

// ---------------------------------------------------------------------------
// Default value helpers (for serde)
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".to_string()
}

fn default_64() -> i32 {
    64
}

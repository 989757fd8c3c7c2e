//! Server configuration.
//!
//! Layers the host's own tables (`[network]`, `[world]`) on top of the core
//! `ColonyConfig`, whose `[general]`, `[inventory]` and `[transfer]` tables
//! sit at the top level of the same `colony.toml`.

use colony_core::ColonyConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Full server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Core tables, flattened into the top level.
    #[serde(flatten)]
    pub colony: ColonyConfig,
    /// Packet intake limits.
    #[serde(default)]
    pub network: NetworkConfig,
    /// World defaults.
    #[serde(default)]
    pub world: WorldConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ServerError::Core` wrapping `ColonyError::Config` if the TOML
    /// is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self, ServerError> {
        toml::from_str(toml_str)
            .map_err(|e| ServerError::Core(colony_core::ColonyError::Config(e.to_string())))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path).map_err(colony_core::ColonyError::from)?;
        Self::from_toml(&content)
    }
}

/// Packet intake limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Packets held before new ones are dropped.
    #[serde(default = "default_inbox_capacity")]
    pub inbox_capacity: usize,
    /// Packets processed per server tick.
    #[serde(default = "default_max_packets_per_tick")]
    pub max_packets_per_tick: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: default_inbox_capacity(),
            max_packets_per_tick: default_max_packets_per_tick(),
        }
    }
}

/// Inventory sizes for newly created players and citizens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Slots in a player's main inventory.
    #[serde(default = "default_player_slots")]
    pub player_inventory_slots: usize,
    /// Slots in a citizen entity's inventory.
    #[serde(default = "default_citizen_slots")]
    pub citizen_inventory_slots: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            player_inventory_slots: default_player_slots(),
            citizen_inventory_slots: default_citizen_slots(),
        }
    }
}

fn default_inbox_capacity() -> usize {
    1024
}

fn default_max_packets_per_tick() -> usize {
    256
}

fn default_player_slots() -> usize {
    36
}

fn default_citizen_slots() -> usize {
    27
}

//! In-memory world: colonies, citizens and connected players.
//!
//! These types own the state the transfer executor borrows through the
//! `colony_core::world` traits. Colonies are keyed by (dimension, id), so the
//! same id in two dimensions names two different colonies.

use std::collections::{BTreeMap, HashMap};

use colony_core::inventory::{InventoryContainer, InventoryRules, SlotInventory};
use colony_core::types::{CitizenId, ColonyId, DimensionId, PlayerId};
use colony_core::world::{
    CitizenData, CitizenEntity, CitizenManager, Colony, ColonyRegistry, RequestingActor,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A player's game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Items cost what they cost.
    #[default]
    Survival,
    /// Unlimited items; nothing is taken from the inventory.
    Creative,
}

/// A connected player.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    mode: GameMode,
    inventory: SlotInventory,
}

impl Player {
    /// New player with an empty inventory.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: GameMode, inventory: SlotInventory) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            mode,
            inventory,
        }
    }

    /// Connection identity.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current game mode.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Switch game mode.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    /// The player's inventory.
    #[must_use]
    pub fn inventory(&self) -> &SlotInventory {
        &self.inventory
    }

    /// Mutable access to the player's inventory.
    pub fn inventory_slots_mut(&mut self) -> &mut SlotInventory {
        &mut self.inventory
    }
}

impl RequestingActor for Player {
    fn actor_id(&self) -> PlayerId {
        self.id
    }

    fn is_unlimited_source(&self) -> bool {
        self.mode == GameMode::Creative
    }

    fn inventory_mut(&mut self) -> &mut dyn InventoryContainer {
        &mut self.inventory
    }
}

// ---------------------------------------------------------------------------
// Citizens
// ---------------------------------------------------------------------------

/// A spawned citizen entity.
#[derive(Debug)]
pub struct CitizenEntityState {
    inventory: SlotInventory,
}

impl CitizenEntityState {
    /// The entity's inventory.
    #[must_use]
    pub fn inventory(&self) -> &SlotInventory {
        &self.inventory
    }
}

impl CitizenEntity for CitizenEntityState {
    fn inventory_mut(&mut self) -> &mut dyn InventoryContainer {
        &mut self.inventory
    }
}

/// Persistent citizen data, with the entity when it is spawned.
#[derive(Debug)]
pub struct CitizenRecord {
    id: CitizenId,
    name: String,
    entity: Option<CitizenEntityState>,
}

impl CitizenRecord {
    /// Citizen id within its colony.
    #[must_use]
    pub fn id(&self) -> CitizenId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The spawned entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&CitizenEntityState> {
        self.entity.as_ref()
    }

    /// Spawn the entity with a fresh inventory. No-op if already spawned.
    pub fn spawn(&mut self, inventory: SlotInventory) {
        if self.entity.is_none() {
            self.entity = Some(CitizenEntityState { inventory });
        }
    }

    /// Remove the entity, returning it.
    pub fn despawn(&mut self) -> Option<CitizenEntityState> {
        self.entity.take()
    }
}

impl CitizenData for CitizenRecord {
    fn id(&self) -> CitizenId {
        self.id
    }

    fn live_entity_mut(&mut self) -> Option<&mut dyn CitizenEntity> {
        self.entity
            .as_mut()
            .map(|entity| entity as &mut dyn CitizenEntity)
    }
}

/// The citizens of one colony, by id.
#[derive(Debug, Default)]
pub struct CitizenRoster {
    citizens: BTreeMap<CitizenId, CitizenRecord>,
    next_id: i32,
}

impl CitizenRoster {
    /// Add a spawned citizen and return its id. Ids start at 1.
    pub fn add(&mut self, name: impl Into<String>, inventory: SlotInventory) -> CitizenId {
        self.next_id += 1;
        let id = CitizenId(self.next_id);
        self.citizens.insert(
            id,
            CitizenRecord {
                id,
                name: name.into(),
                entity: Some(CitizenEntityState { inventory }),
            },
        );
        id
    }

    /// Look up a citizen.
    #[must_use]
    pub fn get(&self, id: CitizenId) -> Option<&CitizenRecord> {
        self.citizens.get(&id)
    }

    /// Look up a citizen for modification.
    pub fn get_mut(&mut self, id: CitizenId) -> Option<&mut CitizenRecord> {
        self.citizens.get_mut(&id)
    }

    /// Number of citizens, spawned or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    /// Whether the roster has no citizens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }
}

impl CitizenManager for CitizenRoster {
    fn citizen_mut(&mut self, citizen: CitizenId) -> Option<&mut dyn CitizenData> {
        self.citizens
            .get_mut(&citizen)
            .map(|record| record as &mut dyn CitizenData)
    }
}

// ---------------------------------------------------------------------------
// Colonies
// ---------------------------------------------------------------------------

/// One colony.
#[derive(Debug)]
pub struct ColonyState {
    id: ColonyId,
    dimension: DimensionId,
    name: String,
    citizens: CitizenRoster,
    rules: InventoryRules,
    citizen_slots: usize,
}

impl ColonyState {
    /// Colony id.
    #[must_use]
    pub fn id(&self) -> ColonyId {
        self.id
    }

    /// Dimension the colony lives in.
    #[must_use]
    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recruit a citizen with an empty, spawned inventory.
    pub fn recruit(&mut self, name: impl Into<String>) -> CitizenId {
        let inventory = self.fresh_inventory();
        self.citizens.add(name, inventory)
    }

    /// Spawn a despawned citizen again. Returns `false` for unknown ids.
    pub fn respawn(&mut self, citizen: CitizenId) -> bool {
        let inventory = self.fresh_inventory();
        match self.citizens.get_mut(citizen) {
            Some(record) => {
                record.spawn(inventory);
                true
            }
            None => false,
        }
    }

    /// The colony's citizens.
    #[must_use]
    pub fn citizens(&self) -> &CitizenRoster {
        &self.citizens
    }

    /// Mutable access to the colony's citizens.
    pub fn citizens_mut(&mut self) -> &mut CitizenRoster {
        &mut self.citizens
    }

    fn fresh_inventory(&self) -> SlotInventory {
        SlotInventory::new(self.citizen_slots, self.rules.clone())
    }
}

impl Colony for ColonyState {
    fn id(&self) -> ColonyId {
        self.id
    }

    fn citizen_manager_mut(&mut self) -> &mut dyn CitizenManager {
        &mut self.citizens
    }
}

/// Every colony on the server.
#[derive(Debug)]
pub struct ColonyManager {
    colonies: HashMap<(DimensionId, ColonyId), ColonyState>,
    rules: InventoryRules,
    citizen_slots: usize,
    next_id: i32,
}

impl ColonyManager {
    /// Empty manager. New citizens get `citizen_slots` slots under `rules`.
    #[must_use]
    pub fn new(rules: InventoryRules, citizen_slots: usize) -> Self {
        Self {
            colonies: HashMap::new(),
            rules,
            citizen_slots,
            next_id: 0,
        }
    }

    /// Found a colony in `dimension`. Ids are server-wide and start at 1.
    pub fn create_colony(&mut self, dimension: DimensionId, name: impl Into<String>) -> ColonyId {
        self.next_id += 1;
        let id = ColonyId(self.next_id);
        self.colonies.insert(
            (dimension, id),
            ColonyState {
                id,
                dimension,
                name: name.into(),
                citizens: CitizenRoster::default(),
                rules: self.rules.clone(),
                citizen_slots: self.citizen_slots,
            },
        );
        id
    }

    /// Look up a colony.
    #[must_use]
    pub fn get(&self, id: ColonyId, dimension: DimensionId) -> Option<&ColonyState> {
        self.colonies.get(&(dimension, id))
    }

    /// Look up a colony for modification.
    pub fn get_mut(&mut self, id: ColonyId, dimension: DimensionId) -> Option<&mut ColonyState> {
        self.colonies.get_mut(&(dimension, id))
    }

    /// Number of colonies across all dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colonies.len()
    }

    /// Whether there are no colonies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colonies.is_empty()
    }
}

impl ColonyRegistry for ColonyManager {
    fn colony_mut(&mut self, colony: ColonyId, dimension: DimensionId) -> Option<&mut dyn Colony> {
        self.colonies
            .get_mut(&(dimension, colony))
            .map(|state| state as &mut dyn Colony)
    }
}

//! Contracts the executor consumes from the host game.
//!
//! The host owns colonies, citizens, entities and players; the executor
//! only borrows them for the length of one call. Lookups return `None`
//! when the thing is not there and the executor turns that into the
//! matching [`TransferError`](crate::TransferError).

use crate::inventory::InventoryContainer;
use crate::types::{CitizenId, ColonyId, DimensionId, PlayerId};

/// Maps (colony id, dimension) to a colony.
pub trait ColonyRegistry {
    /// The colony registered under `colony` in `dimension`.
    fn colony_mut(&mut self, colony: ColonyId, dimension: DimensionId) -> Option<&mut dyn Colony>;
}

/// A colony.
pub trait Colony {
    /// The colony's id.
    fn id(&self) -> ColonyId;

    /// The colony's citizen manager.
    fn citizen_manager_mut(&mut self) -> &mut dyn CitizenManager;
}

/// Citizen lookup inside one colony.
pub trait CitizenManager {
    /// Citizen data for `citizen`.
    fn citizen_mut(&mut self, citizen: CitizenId) -> Option<&mut dyn CitizenData>;
}

/// Persistent citizen state, which may or may not have a spawned entity.
pub trait CitizenData {
    /// The citizen's id.
    fn id(&self) -> CitizenId;

    /// The live entity, absent while the citizen is despawned or in transit.
    fn live_entity_mut(&mut self) -> Option<&mut dyn CitizenEntity>;
}

/// A spawned citizen entity.
pub trait CitizenEntity {
    /// The entity's inventory.
    fn inventory_mut(&mut self) -> &mut dyn InventoryContainer;
}

/// The authenticated sender of a request.
pub trait RequestingActor {
    /// Connection identity.
    fn actor_id(&self) -> PlayerId;

    /// Whether the actor may give items without paying for them.
    fn is_unlimited_source(&self) -> bool;

    /// The actor's own inventory.
    fn inventory_mut(&mut self) -> &mut dyn InventoryContainer;
}

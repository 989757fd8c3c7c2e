//! The transfer request carried from client to server.
//!
//! Wire layout, in order: colony id (i32), citizen id (i32), item stack,
//! quantity (i32), dimension id (i32). The stack's count is carried but
//! never read by the executor; only its kind matters.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::item::{ItemKind, ItemStack};
use crate::types::{CitizenId, ColonyId, DimensionId};
use crate::wire;

/// The client's currently loaded world.
pub trait ClientWorld {
    /// Dimension the client is in right now.
    fn dimension(&self) -> DimensionId;
}

/// Client-side view of a citizen, as shown in the citizen window.
pub trait CitizenView {
    /// Id of the citizen being viewed.
    fn citizen_id(&self) -> CitizenId;
}

/// Request to move `quantity` items of one kind from the sender to a citizen.
///
/// Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Colony the citizen belongs to.
    pub colony_id: ColonyId,
    /// Receiving citizen.
    pub citizen_id: CitizenId,
    /// Item kind to move, as a stack (its count is ignored).
    pub item: ItemStack,
    /// How many to move.
    pub quantity: i32,
    /// Dimension the colony lives in.
    pub dimension: DimensionId,
}

impl TransferRequest {
    /// Build a request from explicit parts.
    #[must_use]
    pub fn new(
        colony_id: ColonyId,
        citizen_id: CitizenId,
        item: ItemStack,
        quantity: i32,
        dimension: DimensionId,
    ) -> Self {
        Self {
            colony_id,
            citizen_id,
            item,
            quantity,
            dimension,
        }
    }

    /// Build a request on the client, snapshotting the dimension of the
    /// world the client currently has loaded.
    #[must_use]
    pub fn from_client(
        citizen: &dyn CitizenView,
        item: ItemStack,
        quantity: i32,
        colony_id: ColonyId,
        world: &dyn ClientWorld,
    ) -> Self {
        Self::new(
            colony_id,
            citizen.citizen_id(),
            item,
            quantity,
            world.dimension(),
        )
    }

    /// The kind being transferred.
    #[must_use]
    pub fn item_kind(&self) -> &ItemKind {
        &self.item.kind
    }

    /// Encode into the five-field wire layout.
    ///
    /// # Errors
    /// Returns `ColonyError::Codec` if the item id exceeds the payload limit.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        wire::encode(self)
    }

    /// Decode from the five-field wire layout.
    ///
    /// # Errors
    /// Returns `ColonyError::Codec` on malformed input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nether;

    impl ClientWorld for Nether {
        fn dimension(&self) -> DimensionId {
            DimensionId(-1)
        }
    }

    struct Baker;

    impl CitizenView for Baker {
        fn citizen_id(&self) -> CitizenId {
            CitizenId(12)
        }
    }

    fn bread(count: i32) -> ItemStack {
        ItemStack::new(ItemKind::plain("colony:bread"), count)
    }

    #[test]
    fn client_construction_snapshots_dimension() {
        let req = TransferRequest::from_client(&Baker, bread(1), 8, ColonyId(3), &Nether);
        assert_eq!(req.citizen_id, CitizenId(12));
        assert_eq!(req.dimension, DimensionId(-1));
        assert_eq!(req.colony_id, ColonyId(3));
        assert_eq!(req.quantity, 8);
    }

    #[test]
    fn wire_order_is_colony_citizen_item_quantity_dimension() {
        let req = TransferRequest::new(
            ColonyId(1),
            CitizenId(2),
            ItemStack::new(ItemKind::new("i", 4), 5),
            6,
            DimensionId(7),
        );
        let bytes = req.to_bytes().expect("encode");

        let mut expected = Vec::new();
        expected.extend_from_slice(&1_i32.to_be_bytes());
        expected.extend_from_slice(&2_i32.to_be_bytes());
        expected.extend_from_slice(&1_u64.to_be_bytes());
        expected.push(b'i');
        expected.extend_from_slice(&4_i32.to_be_bytes());
        expected.extend_from_slice(&5_i32.to_be_bytes());
        expected.extend_from_slice(&6_i32.to_be_bytes());
        expected.extend_from_slice(&7_i32.to_be_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let req = TransferRequest::new(
            ColonyId(-9),
            CitizenId(i32::MAX),
            bread(64),
            -3,
            DimensionId(1),
        );
        let decoded = TransferRequest::from_bytes(&req.to_bytes().expect("encode"))
            .expect("decode");
        assert_eq!(decoded, req);
    }

    #[test]
    fn truncated_payload_fails_to_decode() {
        let bytes = TransferRequest::new(ColonyId(1), CitizenId(1), bread(1), 1, DimensionId(0))
            .to_bytes()
            .expect("encode");
        assert!(TransferRequest::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}

//! Client-side request building.
//!
//! The client reads the dimension of whatever world it has loaded at the
//! moment the request is built. The frame does not change if the client
//! moves afterwards.

use colony_core::item::ItemStack;
use colony_core::request::{CitizenView, ClientWorld, TransferRequest};
use colony_core::types::{CitizenId, ColonyId, DimensionId};

use crate::error::ServerError;
use crate::messages::TransferItemsToCitizenMessage;
use crate::network::Channel;

/// The world a client currently has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedWorld {
    /// Dimension of the loaded world.
    pub dimension: DimensionId,
}

impl ClientWorld for LoadedWorld {
    fn dimension(&self) -> DimensionId {
        self.dimension
    }
}

/// An open citizen window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenWindow {
    /// Citizen shown in the window.
    pub citizen: CitizenId,
    /// Name shown in the title bar.
    pub name: String,
}

impl CitizenView for CitizenWindow {
    fn citizen_id(&self) -> CitizenId {
        self.citizen
    }
}

/// One client's connection state.
#[derive(Debug, Clone)]
pub struct ClientSession {
    world: LoadedWorld,
}

impl ClientSession {
    /// Session with `dimension` loaded.
    #[must_use]
    pub fn new(dimension: DimensionId) -> Self {
        Self {
            world: LoadedWorld { dimension },
        }
    }

    /// The loaded world.
    #[must_use]
    pub fn world(&self) -> LoadedWorld {
        self.world
    }

    /// Load a different dimension.
    pub fn change_dimension(&mut self, dimension: DimensionId) {
        self.world = LoadedWorld { dimension };
    }

    /// Build the frame asking the server to give `quantity` of `item` to the
    /// citizen in `window`.
    ///
    /// # Errors
    /// Returns a codec error if the request cannot be encoded.
    pub fn transfer_to_citizen(
        &self,
        window: &CitizenWindow,
        item: ItemStack,
        quantity: i32,
        colony: ColonyId,
    ) -> Result<Vec<u8>, ServerError> {
        let request = TransferRequest::from_client(window, item, quantity, colony, &self.world);
        Channel::frame(&TransferItemsToCitizenMessage::new(request))
    }
}

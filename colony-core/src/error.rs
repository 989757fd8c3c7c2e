//! Error types for the colony core library.

use thiserror::Error;

use crate::types::{CitizenId, ColonyId, DimensionId, PlayerId};

/// Top-level error type for library operations outside the transfer path.
#[derive(Error, Debug)]
pub enum ColonyError {
    /// Wire encoding or decoding failure.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for ColonyError {
    fn from(err: bincode::Error) -> Self {
        ColonyError::Codec(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ColonyError>;

/// Reasons a transfer request is abandoned by the executor.
///
/// None of these leave the executor: each one is logged where it is
/// detected and the current request stops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// No colony is registered under this id in this dimension.
    #[error("Colony {colony} not found in dimension {dimension}")]
    ColonyNotFound {
        /// Requested colony.
        colony: ColonyId,
        /// Requested dimension.
        dimension: DimensionId,
    },

    /// The colony has no citizen with this id.
    #[error("Citizen {citizen} not found in colony {colony}")]
    CitizenNotFound {
        /// Colony that was searched.
        colony: ColonyId,
        /// Requested citizen.
        citizen: CitizenId,
    },

    /// The citizen exists but has no spawned entity right now.
    #[error("Citizen {citizen} of colony {colony} has no live entity")]
    EntityNotPresent {
        /// Colony of the citizen.
        colony: ColonyId,
        /// The citizen without an entity.
        citizen: CitizenId,
    },

    /// A non-privileged sender asked to move a non-positive amount.
    #[error("Invalid quantity {quantity} requested by {actor}")]
    InvalidQuantity {
        /// Sender of the request.
        actor: PlayerId,
        /// Quantity carried by the request.
        quantity: i32,
    },

    /// The source ran out of matching items while paying for a deposit
    /// that already happened.
    #[error("Inventory of {actor} is inconsistent: needed {needed}, {missing} could not be removed")]
    InventoryInconsistency {
        /// Sender whose inventory was being debited.
        actor: PlayerId,
        /// Amount the removal loop set out to take.
        needed: i32,
        /// Amount left unpaid when the loop stopped.
        missing: i32,
    },
}

impl TransferError {
    /// Whether this is an expected rejection (logged as a warning) rather
    /// than an internal inconsistency.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::InventoryInconsistency { .. })
    }

    /// Short stable label, used for metrics and structured log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ColonyNotFound { .. } => "colony_not_found",
            Self::CitizenNotFound { .. } => "citizen_not_found",
            Self::EntityNotPresent { .. } => "entity_not_present",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::InventoryInconsistency { .. } => "inventory_inconsistency",
        }
    }
}

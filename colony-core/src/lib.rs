//! # Colony Core Library
//!
//! Game-agnostic, server-authoritative item transfer between a player and a
//! colony citizen.
//!
//! A transfer has two halves:
//!
//! - **Request**: an immutable [`TransferRequest`] built on the client and
//!   carried over the wire in a fixed five-field binary layout.
//! - **Executor**: the [`TransferExecutor`] that runs on the server's
//!   simulation thread, resolves colony → citizen → live entity, and moves
//!   items between two slot inventories.
//!
//! The executor never trusts the client for anything but ids, item kind and
//! quantity: the sender and its unlimited-source privilege come from the
//! authenticated connection, and the amount debited from the player is
//! derived from what the citizen's inventory actually absorbed.
//!
//! Hosts plug in through the traits in [`world`] and [`inventory`]; no global
//! registries are consulted.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod inventory;
pub mod item;
pub mod metrics;
pub mod request;
pub mod transfer;
pub mod types;
pub mod wire;
pub mod world;

pub use config::ColonyConfig;
pub use error::{ColonyError, TransferError};
pub use inventory::{InventoryContainer, InventoryRules, SlotInventory};
pub use item::{ItemKind, ItemStack};
pub use request::TransferRequest;
pub use transfer::{TransferExecutor, TransferOutcome, TransferReport};
pub use types::*;

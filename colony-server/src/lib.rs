//! # Colony Server
//!
//! This crate hosts the game-agnostic `colony-core` transfer protocol inside a
//! server process: it frames messages on a channel, holds an in-memory world
//! of colonies, citizens and players, and runs transfers on the simulation
//! thread once per tick.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   frame    ┌──────────────┐  drain/tick  ┌──────────────────┐
//! │ ClientSession│ ─────────▶ │ PacketInbox  │ ───────────▶ │   ColonyServer   │
//! └──────────────┘            └──────────────┘              │  ┌────────────┐  │
//!                                                           │  │  Channel   │  │
//!                                                           │  └─────┬──────┘  │
//!                                                           │        ▼         │
//!                                                           │ TransferExecutor │
//!                                                           │ (colony-core)    │
//!                                                           └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `client`: client-side request builder (dimension snapshot, framing)
//! - `config`: server configuration loaded from `colony.toml`
//! - `error`: server error type
//! - `inbox`: bounded packet queue between network threads and the tick
//! - `logging`: `tracing-subscriber` setup
//! - `messages`: concrete wire messages
//! - `network`: logical sides, the `Message` trait and channel dispatch
//! - `server`: the tick loop
//! - `world`: in-memory colonies, citizens and players

#![deny(clippy::unwrap_used)]

pub mod client;
pub mod config;
pub mod error;
pub mod inbox;
pub mod logging;
pub mod messages;
pub mod network;
pub mod server;
pub mod world;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::ColonyServer;

//! Server error types.

use colony_core::{ColonyError, PlayerId};
use thiserror::Error;

/// Errors raised while framing, routing or dispatching packets, or while
/// setting the server up.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Codec, config or I/O failure from the core library.
    #[error(transparent)]
    Core(#[from] ColonyError),

    /// A frame with no message id byte.
    #[error("Received an empty frame")]
    EmptyFrame,

    /// No message is registered under this id.
    #[error("Unknown message id {0:#04x}")]
    UnknownMessage(u8),

    /// Two message types claimed the same id.
    #[error("Message id {0:#04x} registered twice")]
    DuplicateMessage(u8),

    /// The connection that delivered the packet has no player.
    #[error("Packet from unknown sender {0}")]
    UnknownSender(PlayerId),

    /// The global tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

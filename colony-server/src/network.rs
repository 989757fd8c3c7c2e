//! Logical sides, the `Message` trait and the channel that routes frames.
//!
//! A frame is one message-id byte followed by the message's payload. The
//! channel looks the id up, decodes the payload, and runs the message only
//! when it arrived on the side it is meant to execute on.

use std::collections::HashMap;

use colony_core::TransferExecutor;
use tracing::debug;

use crate::error::ServerError;
use crate::world::{ColonyManager, Player};

/// Which half of the game is handling a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalSide {
    /// Rendering client.
    Client,
    /// Authoritative server.
    Server,
}

/// Server state a message may touch while it executes.
pub struct ServerContext<'a> {
    /// The authenticated sender of the frame.
    pub sender: &'a mut Player,
    /// All colonies.
    pub colonies: &'a mut ColonyManager,
    /// Shared transfer executor.
    pub executor: &'a TransferExecutor,
}

/// A message that can be framed, routed and executed.
pub trait Message: Sized {
    /// Id byte at the head of the frame.
    const ID: u8;
    /// Name used in logs.
    const NAME: &'static str;

    /// Encode the payload (without the id byte).
    ///
    /// # Errors
    /// Returns a codec error if the message cannot be written.
    fn encode(&self) -> Result<Vec<u8>, ServerError>;

    /// Decode the payload (without the id byte).
    ///
    /// # Errors
    /// Returns a codec error on malformed input.
    fn decode(payload: &[u8]) -> Result<Self, ServerError>;

    /// Side this message executes on, or `None` for either.
    fn execution_side(&self) -> Option<LogicalSide>;

    /// Run the message.
    fn on_execute(self, ctx: &mut ServerContext<'_>, is_logical_server: bool);
}

/// Result of routing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The message ran.
    Executed,
    /// The message arrived on the wrong side and was ignored.
    WrongSide,
}

type Handler = fn(&[u8], LogicalSide, &mut ServerContext<'_>) -> Result<Dispatched, ServerError>;

/// Registry of message types by id.
pub struct Channel {
    handlers: HashMap<u8, (&'static str, Handler)>,
}

impl Channel {
    /// Empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `M` under its id.
    ///
    /// # Errors
    /// Returns `ServerError::DuplicateMessage` if the id is taken.
    pub fn register<M: Message>(&mut self) -> Result<(), ServerError> {
        if self.handlers.contains_key(&M::ID) {
            return Err(ServerError::DuplicateMessage(M::ID));
        }
        let handler: Handler = handle::<M>;
        self.handlers.insert(M::ID, (M::NAME, handler));
        Ok(())
    }

    /// Whether a message is registered under `id`.
    #[must_use]
    pub fn is_registered(&self, id: u8) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Build a frame for `message`.
    ///
    /// # Errors
    /// Returns a codec error if the message cannot be encoded.
    pub fn frame<M: Message>(message: &M) -> Result<Vec<u8>, ServerError> {
        let payload = message.encode()?;
        let mut frame = Vec::with_capacity(payload.len() + 1);
        frame.push(M::ID);
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Route one frame received on `side`.
    ///
    /// # Errors
    /// Returns an error for empty frames, unknown ids and undecodable
    /// payloads.
    pub fn dispatch(
        &self,
        frame: &[u8],
        side: LogicalSide,
        ctx: &mut ServerContext<'_>,
    ) -> Result<Dispatched, ServerError> {
        let (&id, payload) = frame.split_first().ok_or(ServerError::EmptyFrame)?;
        let &(name, handler) = self
            .handlers
            .get(&id)
            .ok_or(ServerError::UnknownMessage(id))?;
        debug!(message = name, bytes = payload.len(), ?side, "Dispatching frame");
        handler(payload, side, ctx)
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

fn handle<M: Message>(
    payload: &[u8],
    side: LogicalSide,
    ctx: &mut ServerContext<'_>,
) -> Result<Dispatched, ServerError> {
    let message = M::decode(payload)?;
    if let Some(required) = message.execution_side() {
        if required != side {
            debug!(message = M::NAME, ?required, ?side, "Ignoring message on the wrong side");
            return Ok(Dispatched::WrongSide);
        }
    }
    message.on_execute(ctx, side == LogicalSide::Server);
    Ok(Dispatched::Executed)
}

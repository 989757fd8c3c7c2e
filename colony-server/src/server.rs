//! The server tick loop.
//!
//! Packets are queued by connection threads into the [`PacketInbox`] and
//! executed here, one bounded batch per tick, on the thread that owns the
//! world. Every transfer therefore sees a consistent world and no two
//! transfers interleave.

use std::collections::HashMap;
use std::time::Duration;

use colony_core::inventory::{InventoryRules, SlotInventory};
use colony_core::{PlayerId, TransferExecutor};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::inbox::{InboundPacket, PacketInbox};
use crate::messages::TransferItemsToCitizenMessage;
use crate::network::{Channel, Dispatched, LogicalSide, ServerContext};
use crate::world::{ColonyManager, GameMode, Player};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Packets taken from the inbox.
    pub processed: usize,
    /// Messages that ran.
    pub executed: usize,
    /// Messages ignored for arriving on the wrong side.
    pub ignored: usize,
    /// Packets dropped as undecodable or from unknown senders.
    pub dropped: usize,
    /// Longest time a packet in this batch sat in the inbox.
    pub longest_wait: Duration,
}

/// An authoritative colony server.
pub struct ColonyServer {
    config: ServerConfig,
    rules: InventoryRules,
    colonies: ColonyManager,
    players: HashMap<PlayerId, Player>,
    executor: TransferExecutor,
    channel: Channel,
    inbox: PacketInbox,
    ticks: u64,
}

impl ColonyServer {
    /// Build a server and register its messages.
    ///
    /// # Errors
    /// Returns `ServerError::DuplicateMessage` if two messages share an id.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let rules = InventoryRules::from_config(&config.colony.inventory);
        let colonies = ColonyManager::new(rules.clone(), config.world.citizen_inventory_slots);
        let executor = TransferExecutor::new(config.colony.transfer.clone());
        let inbox = PacketInbox::new(config.network.inbox_capacity);

        let mut channel = Channel::new();
        channel.register::<TransferItemsToCitizenMessage>()?;

        info!(
            inbox_capacity = config.network.inbox_capacity,
            max_packets_per_tick = config.network.max_packets_per_tick,
            cap_deposit_to_available = config.colony.transfer.cap_deposit_to_available,
            "Colony server ready"
        );

        Ok(Self {
            config,
            rules,
            colonies,
            players: HashMap::new(),
            executor,
            channel,
            inbox,
            ticks: 0,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle for connection threads to push frames into.
    #[must_use]
    pub fn inbox(&self) -> PacketInbox {
        self.inbox.clone()
    }

    /// The transfer executor, for its counters.
    #[must_use]
    pub fn executor(&self) -> &TransferExecutor {
        &self.executor
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Connect a player with an empty inventory.
    pub fn connect(&mut self, name: impl Into<String>, mode: GameMode) -> PlayerId {
        let inventory = SlotInventory::new(self.config.world.player_inventory_slots, self.rules.clone());
        let player = Player::new(name, mode, inventory);
        let id = player.id();
        info!(player = %id, name = player.name(), ?mode, "Player connected");
        self.players.insert(id, player);
        id
    }

    /// Disconnect a player. Frames already queued for them are dropped at
    /// dispatch.
    pub fn disconnect(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id);
        if player.is_some() {
            info!(player = %id, "Player disconnected");
        }
        player
    }

    /// Look up a connected player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Look up a connected player for modification.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// All colonies.
    #[must_use]
    pub fn colonies(&self) -> &ColonyManager {
        &self.colonies
    }

    /// All colonies, for modification.
    pub fn colonies_mut(&mut self) -> &mut ColonyManager {
        &mut self.colonies
    }

    /// Run one tick: drain a batch from the inbox and dispatch it in order.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let packets = self.inbox.drain(self.config.network.max_packets_per_tick);
        let mut report = TickReport {
            processed: packets.len(),
            longest_wait: packets
                .iter()
                .map(InboundPacket::waited)
                .max()
                .unwrap_or_default(),
            ..TickReport::default()
        };

        for packet in &packets {
            match self.handle_packet(packet) {
                Ok(Dispatched::Executed) => report.executed += 1,
                Ok(Dispatched::WrongSide) => report.ignored += 1,
                Err(err) => {
                    warn!(sender = %packet.sender, "Dropping packet: {err}");
                    report.dropped += 1;
                }
            }
        }

        if report.processed > 0 {
            debug!(
                tick = self.ticks,
                processed = report.processed,
                executed = report.executed,
                dropped = report.dropped,
                longest_wait_us = report.longest_wait.as_micros(),
                "Tick processed packets"
            );
        }
        report
    }

    fn handle_packet(&mut self, packet: &InboundPacket) -> Result<Dispatched, ServerError> {
        let Self {
            players,
            colonies,
            executor,
            channel,
            ..
        } = self;
        let sender = players
            .get_mut(&packet.sender)
            .ok_or(ServerError::UnknownSender(packet.sender))?;
        let mut ctx = ServerContext {
            sender,
            colonies,
            executor,
        };
        channel.dispatch(&packet.frame, LogicalSide::Server, &mut ctx)
    }
}

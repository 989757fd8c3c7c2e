//! Server-side transfer executor.
//!
//! One call to [`TransferExecutor::execute`] resolves colony → citizen →
//! live entity, checks the quantity against the sender's privilege, deposits
//! into the citizen's inventory and then debits the sender for exactly what
//! the citizen absorbed (capped by what the sender held).
//!
//! Nothing is mutated until every lookup and the quantity check pass.
//! Failures never leave this module: they are logged, counted and returned
//! as a [`TransferOutcome`] for the in-process caller.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, debug_span, error, warn};

use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::inventory::InventoryContainer;
use crate::item::{ItemKind, ItemStack};
use crate::metrics::TransferCounters;
use crate::request::TransferRequest;
use crate::types::{CitizenId, ColonyId, PlayerId};
use crate::world::{ColonyRegistry, RequestingActor};

/// What a transfer did, step by step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Sender of the request.
    pub actor: PlayerId,
    /// Colony of the receiving citizen.
    pub colony: ColonyId,
    /// Receiving citizen.
    pub citizen: CitizenId,
    /// Whether the sender paid nothing.
    pub unlimited_source: bool,
    /// Quantity carried by the request.
    pub requested: i32,
    /// Matching items the sender held (or `requested` when unlimited).
    pub available: i32,
    /// `min(requested, available)`.
    pub amount_to_take: i32,
    /// Size of the stack offered to the citizen.
    pub deposit_size: i32,
    /// Part of the offered stack that did not fit.
    pub remainder: i32,
    /// Items actually taken from the sender.
    pub removed_from_source: i32,
}

impl TransferReport {
    /// Items the citizen's inventory absorbed.
    #[must_use]
    pub fn deposited(&self) -> i32 {
        self.deposit_size - self.remainder
    }
}

/// Result of one executor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The deposit ran and the sender was debited as required.
    Completed(TransferReport),
    /// A privileged sender asked for a non-positive amount; nothing moved.
    Skipped {
        /// Sender of the request.
        actor: PlayerId,
        /// Quantity carried by the request.
        quantity: i32,
    },
    /// The request was dropped before anything was mutated.
    Rejected(TransferError),
    /// The citizen received items but the sender could not be fully debited.
    Inconsistent {
        /// What happened up to the point of failure.
        report: TransferReport,
        /// The inconsistency.
        error: TransferError,
    },
}

impl TransferOutcome {
    /// The report, for outcomes that reached the deposit step.
    #[must_use]
    pub fn report(&self) -> Option<&TransferReport> {
        match self {
            Self::Completed(report) | Self::Inconsistent { report, .. } => Some(report),
            Self::Skipped { .. } | Self::Rejected(_) => None,
        }
    }

    /// The error, for outcomes that failed.
    #[must_use]
    pub fn error(&self) -> Option<&TransferError> {
        match self {
            Self::Rejected(error) | Self::Inconsistent { error, .. } => Some(error),
            Self::Completed(_) | Self::Skipped { .. } => None,
        }
    }
}

/// Executes transfer requests against host-provided colonies and actors.
pub struct TransferExecutor {
    config: TransferConfig,
    counters: Arc<TransferCounters>,
}

impl std::fmt::Debug for TransferExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferExecutor")
            .field("config", &self.config)
            .field("counters", &self.counters)
            .finish()
    }
}

impl TransferExecutor {
    /// Executor with fresh counters. Item kinds are matched by each
    /// inventory's own stacking rules.
    #[must_use]
    pub fn new(config: TransferConfig) -> Self {
        Self {
            config,
            counters: Arc::new(TransferCounters::new()),
        }
    }

    /// Shared handle to this executor's counters.
    #[must_use]
    pub fn counters(&self) -> &Arc<TransferCounters> {
        &self.counters
    }

    /// Run one request to completion.
    ///
    /// `actor` is the authenticated sender supplied by the transport; the
    /// request is consumed and not retained.
    pub fn execute(
        &self,
        request: TransferRequest,
        registry: &mut dyn ColonyRegistry,
        actor: &mut dyn RequestingActor,
    ) -> TransferOutcome {
        let _span = debug_span!(
            "transfer",
            actor = %actor.actor_id(),
            colony = %request.colony_id,
            citizen = %request.citizen_id,
        )
        .entered();

        self.run(&request, registry, actor)
    }

    fn run(
        &self,
        request: &TransferRequest,
        registry: &mut dyn ColonyRegistry,
        actor: &mut dyn RequestingActor,
    ) -> TransferOutcome {
        let Some(colony) = registry.colony_mut(request.colony_id, request.dimension) else {
            return self.reject(TransferError::ColonyNotFound {
                colony: request.colony_id,
                dimension: request.dimension,
            });
        };
        let colony_id = colony.id();

        let Some(citizen) = colony
            .citizen_manager_mut()
            .citizen_mut(request.citizen_id)
        else {
            return self.reject(TransferError::CitizenNotFound {
                colony: colony_id,
                citizen: request.citizen_id,
            });
        };
        let citizen_id = citizen.id();

        let Some(entity) = citizen.live_entity_mut() else {
            return self.reject(TransferError::EntityNotPresent {
                colony: colony_id,
                citizen: citizen_id,
            });
        };

        let unlimited_source = actor.is_unlimited_source();
        if request.quantity <= 0 {
            if !unlimited_source {
                return self.reject(TransferError::InvalidQuantity {
                    actor: actor.actor_id(),
                    quantity: request.quantity,
                });
            }
            debug!(
                quantity = request.quantity,
                "Privileged transfer with non-positive quantity, nothing to move"
            );
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            return TransferOutcome::Skipped {
                actor: actor.actor_id(),
                quantity: request.quantity,
            };
        }

        let kind = request.item_kind();
        let requested = request.quantity;
        let available = if unlimited_source {
            requested
        } else {
            let source = actor.inventory_mut();
            source.count_matching(&|stack: &ItemStack| source.same_kind(&stack.kind, kind))
        };
        let amount_to_take = requested.min(available);
        let offered = request.item.with_count(if self.config.cap_deposit_to_available {
            amount_to_take
        } else {
            requested
        });
        // An air stack offers nothing.
        let deposit_size = offered.size();

        let remainder = entity
            .inventory_mut()
            .deposit_with_remainder(offered)
            .size();

        let mut report = TransferReport {
            actor: actor.actor_id(),
            colony: colony_id,
            citizen: citizen_id,
            unlimited_source,
            requested,
            available,
            amount_to_take,
            deposit_size,
            remainder,
            removed_from_source: 0,
        };

        if !unlimited_source {
            let to_remove = amount_to_take - remainder;
            if to_remove > 0 {
                let missing = self.remove_from_source(actor.inventory_mut(), kind, to_remove);
                report.removed_from_source = to_remove - missing;
                if missing > 0 {
                    return self.inconsistent(report, to_remove, missing);
                }
            }
        }

        self.counters.completed.fetch_add(1, Ordering::Relaxed);
        self.counters
            .record_items(report.deposited(), report.removed_from_source);
        debug!(
            item = %kind.item,
            requested,
            deposited = report.deposited(),
            removed = report.removed_from_source,
            unlimited_source,
            "Transferred items to citizen"
        );
        TransferOutcome::Completed(report)
    }

    /// Take `needed` items of `kind` out of `source`, first matching slot
    /// first. Returns how many could not be taken.
    fn remove_from_source(
        &self,
        source: &mut dyn InventoryContainer,
        kind: &ItemKind,
        needed: i32,
    ) -> i32 {
        let cap = self
            .config
            .removal_iteration_cap
            .unwrap_or_else(|| source.slot_count());

        let mut remaining = needed;
        for _ in 0..cap {
            if remaining <= 0 {
                break;
            }
            let Some(slot) = source
                .find_first_slot_matching(&|stack: &ItemStack| source.same_kind(&stack.kind, kind))
            else {
                break;
            };
            let removed = source.remove_up_to(slot, remaining);
            if removed <= 0 {
                break;
            }
            remaining -= removed;
        }
        remaining.max(0)
    }

    fn reject(&self, err: TransferError) -> TransferOutcome {
        warn!(reason = err.kind(), "Transfer request dropped: {err}");
        self.counters.record_error(&err);
        TransferOutcome::Rejected(err)
    }

    fn inconsistent(&self, report: TransferReport, needed: i32, missing: i32) -> TransferOutcome {
        let err = TransferError::InventoryInconsistency {
            actor: report.actor,
            needed,
            missing,
        };
        error!(
            deposited = report.deposited(),
            removed = report.removed_from_source,
            "{err}"
        );
        self.counters.record_error(&err);
        self.counters
            .record_items(report.deposited(), report.removed_from_source);
        TransferOutcome::Inconsistent { report, error: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{InventoryRules, SlotInventory, SlotPredicate};
    use crate::item::{ConfiguredStackLimits, ItemEquality, ItemKind};
    use crate::types::DimensionId;
    use crate::world::{CitizenData, CitizenEntity, CitizenManager, Colony};

    // -----------------------------------------------------------------------
    // Test doubles: one colony with one citizen
    // -----------------------------------------------------------------------

    struct Entity {
        inventory: SlotInventory,
    }

    impl CitizenEntity for Entity {
        fn inventory_mut(&mut self) -> &mut dyn InventoryContainer {
            &mut self.inventory
        }
    }

    struct Citizen {
        id: CitizenId,
        entity: Option<Entity>,
    }

    impl CitizenData for Citizen {
        fn id(&self) -> CitizenId {
            self.id
        }

        fn live_entity_mut(&mut self) -> Option<&mut dyn CitizenEntity> {
            self.entity.as_mut().map(|e| e as &mut dyn CitizenEntity)
        }
    }

    struct World {
        colony: ColonyId,
        dimension: DimensionId,
        citizen: Citizen,
    }

    impl ColonyRegistry for World {
        fn colony_mut(&mut self, colony: ColonyId, dimension: DimensionId) -> Option<&mut dyn Colony> {
            if colony == self.colony && dimension == self.dimension {
                Some(self)
            } else {
                None
            }
        }
    }

    impl Colony for World {
        fn id(&self) -> ColonyId {
            self.colony
        }

        fn citizen_manager_mut(&mut self) -> &mut dyn CitizenManager {
            self
        }
    }

    impl CitizenManager for World {
        fn citizen_mut(&mut self, citizen: CitizenId) -> Option<&mut dyn CitizenData> {
            if citizen == self.citizen.id {
                Some(&mut self.citizen)
            } else {
                None
            }
        }
    }

    struct Actor {
        id: PlayerId,
        creative: bool,
        inventory: SlotInventory,
    }

    impl RequestingActor for Actor {
        fn actor_id(&self) -> PlayerId {
            self.id
        }

        fn is_unlimited_source(&self) -> bool {
            self.creative
        }

        fn inventory_mut(&mut self) -> &mut dyn InventoryContainer {
            &mut self.inventory
        }
    }

    fn log() -> ItemKind {
        ItemKind::plain("colony:oak_log")
    }

    fn stone() -> ItemKind {
        ItemKind::plain("colony:stone")
    }

    fn world(citizen_slots: usize) -> World {
        World {
            colony: ColonyId(1),
            dimension: DimensionId(0),
            citizen: Citizen {
                id: CitizenId(7),
                entity: Some(Entity {
                    inventory: SlotInventory::new(citizen_slots, InventoryRules::uniform(64)),
                }),
            },
        }
    }

    fn actor(creative: bool, slots: &[Option<ItemStack>]) -> Actor {
        let mut inventory = SlotInventory::new(slots.len().max(1), InventoryRules::uniform(64));
        for (i, stack) in slots.iter().enumerate() {
            if let Some(stack) = stack {
                inventory.set_slot(i, stack.clone());
            }
        }
        Actor {
            id: PlayerId::new(),
            creative,
            inventory,
        }
    }

    fn request(quantity: i32) -> TransferRequest {
        TransferRequest::new(
            ColonyId(1),
            CitizenId(7),
            ItemStack::new(log(), 1),
            quantity,
            DimensionId(0),
        )
    }

    fn citizen_inventory(world: &World) -> &SlotInventory {
        &world
            .citizen
            .entity
            .as_ref()
            .expect("citizen entity present")
            .inventory
    }

    // -----------------------------------------------------------------------
    // Resolution chain
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_colony_is_rejected_without_mutation() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let mut req = request(5);
        req.colony_id = ColonyId(5);
        let outcome = executor.execute(req, &mut world, &mut player);

        assert_eq!(
            outcome,
            TransferOutcome::Rejected(TransferError::ColonyNotFound {
                colony: ColonyId(5),
                dimension: DimensionId(0),
            })
        );
        assert_eq!(player.inventory.total_items(), 10);
        assert_eq!(citizen_inventory(&world).total_items(), 0);
        assert_eq!(executor.counters().snapshot().rejected, [1, 0, 0, 0]);
    }

    /// Collects formatted log lines written by a scoped subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            let bytes = self.0.lock().expect("log buffer").clone();
            String::from_utf8(bytes).expect("utf-8 logs")
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn unknown_colony_logs_exactly_one_warning() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);
        let mut req = request(5);
        req.colony_id = ColonyId(5);

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let outcome = tracing::subscriber::with_default(subscriber, || {
            executor.execute(req, &mut world, &mut player)
        });

        assert!(matches!(
            outcome,
            TransferOutcome::Rejected(TransferError::ColonyNotFound { .. })
        ));
        let text = logs.contents();
        assert_eq!(text.matches("WARN").count(), 1, "{text}");
        assert_eq!(text.matches("ERROR").count(), 0, "{text}");
        assert!(text.contains("colony_not_found"), "{text}");
    }

    #[test]
    fn colony_in_another_dimension_is_not_found() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let mut req = request(5);
        req.dimension = DimensionId(1);
        let outcome = executor.execute(req, &mut world, &mut player);
        assert!(matches!(
            outcome,
            TransferOutcome::Rejected(TransferError::ColonyNotFound { .. })
        ));
    }

    #[test]
    fn unknown_citizen_is_rejected() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let mut req = request(5);
        req.citizen_id = CitizenId(99);
        let outcome = executor.execute(req, &mut world, &mut player);
        assert_eq!(
            outcome.error(),
            Some(&TransferError::CitizenNotFound {
                colony: ColonyId(1),
                citizen: CitizenId(99),
            })
        );
        assert_eq!(player.inventory.total_items(), 10);
    }

    #[test]
    fn despawned_citizen_is_rejected() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        world.citizen.entity = None;
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let outcome = executor.execute(request(5), &mut world, &mut player);
        assert!(matches!(
            outcome,
            TransferOutcome::Rejected(TransferError::EntityNotPresent { .. })
        ));
        assert_eq!(player.inventory.total_items(), 10);
    }

    #[test]
    fn zero_quantity_from_regular_player_is_rejected() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let outcome = executor.execute(request(0), &mut world, &mut player);
        assert!(matches!(
            outcome,
            TransferOutcome::Rejected(TransferError::InvalidQuantity { quantity: 0, .. })
        ));
        assert_eq!(player.inventory.total_items(), 10);
        assert_eq!(citizen_inventory(&world).total_items(), 0);
    }

    #[test]
    fn non_positive_quantity_from_privileged_player_is_a_no_op() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(true, &[Some(ItemStack::new(log(), 10))]);

        for quantity in [0, -5, i32::MIN] {
            let outcome = executor.execute(request(quantity), &mut world, &mut player);
            assert!(matches!(outcome, TransferOutcome::Skipped { .. }));
        }
        assert_eq!(player.inventory.total_items(), 10);
        assert_eq!(citizen_inventory(&world).total_items(), 0);
        assert_eq!(executor.counters().snapshot().skipped, 3);
    }

    // -----------------------------------------------------------------------
    // Transfer algorithm
    // -----------------------------------------------------------------------

    #[test]
    fn privileged_transfer_fills_available_room_and_leaves_source_alone() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(1);
        world
            .citizen
            .entity
            .as_mut()
            .expect("entity")
            .inventory
            .set_slot(0, ItemStack::new(log(), 24));
        let mut player = actor(true, &[Some(ItemStack::new(log(), 3))]);

        let outcome = executor.execute(request(64), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.deposited(), 40);
        assert_eq!(report.remainder, 24);
        assert_eq!(report.removed_from_source, 0);
        assert_eq!(citizen_inventory(&world).total_items(), 64);
        assert_eq!(player.inventory.slot(0), Some(&ItemStack::new(log(), 3)));
    }

    #[test]
    fn debit_is_drawn_from_first_matching_slot_first() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(
            false,
            &[
                Some(ItemStack::new(log(), 60)),
                Some(ItemStack::new(stone(), 5)),
                Some(ItemStack::new(log(), 40)),
            ],
        );

        let outcome = executor.execute(request(70), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.available, 100);
        assert_eq!(report.removed_from_source, 70);
        assert!(player.inventory.slot(0).is_none());
        assert_eq!(player.inventory.slot(1), Some(&ItemStack::new(stone(), 5)));
        assert_eq!(player.inventory.slot(2), Some(&ItemStack::new(log(), 30)));
        assert_eq!(citizen_inventory(&world).total_items(), 70);
    }

    #[test]
    fn full_destination_absorbs_nothing_and_debits_nothing() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(1);
        world
            .citizen
            .entity
            .as_mut()
            .expect("entity")
            .inventory
            .set_slot(0, ItemStack::new(stone(), 64));
        let mut player = actor(false, &[Some(ItemStack::new(log(), 20))]);

        let outcome = executor.execute(request(20), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.remainder, 20);
        assert_eq!(report.deposited(), 0);
        assert_eq!(report.removed_from_source, 0);
        assert_eq!(player.inventory.total_items(), 20);
    }

    #[test]
    fn air_offers_nothing_and_counts_nothing() {
        for creative in [true, false] {
            let executor = TransferExecutor::new(TransferConfig::default());
            let mut world = world(4);
            let mut player = actor(creative, &[Some(ItemStack::new(log(), 20))]);
            let mut req = request(64);
            req.item = ItemStack::new(ItemKind::plain(crate::item::AIR), 1);

            let outcome = executor.execute(req, &mut world, &mut player);
            let report = outcome.report().expect("completed");

            assert_eq!(report.deposit_size, 0, "creative={creative}");
            assert_eq!(report.deposited(), 0, "creative={creative}");
            assert_eq!(report.removed_from_source, 0, "creative={creative}");
            assert_eq!(citizen_inventory(&world).total_items(), 0);
            assert_eq!(player.inventory.total_items(), 20);
            assert_eq!(executor.counters().snapshot().items_deposited, 0);
        }
    }

    /// Matches items by id alone.
    struct IgnoreMetadata;

    impl ItemEquality for IgnoreMetadata {
        fn same_kind(&self, a: &ItemKind, b: &ItemKind) -> bool {
            a.item == b.item
        }
    }

    #[test]
    fn source_is_matched_by_its_own_stacking_rules() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let rules = InventoryRules {
            limits: Arc::new(ConfiguredStackLimits::uniform(64)),
            equality: Arc::new(IgnoreMetadata),
        };
        let mut inventory = SlotInventory::new(3, rules);
        inventory.set_slot(0, ItemStack::new(ItemKind::new("colony:oak_log", 3), 10));
        inventory.set_slot(2, ItemStack::new(log(), 10));
        let mut player = Actor {
            id: PlayerId::new(),
            creative: false,
            inventory,
        };

        let outcome = executor.execute(request(20), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.available, 20);
        assert_eq!(report.removed_from_source, 20);
        assert_eq!(player.inventory.total_items(), 0);
        assert_eq!(citizen_inventory(&world).total_items(), 20);
    }

    #[test]
    fn partial_acceptance_debits_only_what_was_absorbed() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(1);
        world
            .citizen
            .entity
            .as_mut()
            .expect("entity")
            .inventory
            .set_slot(0, ItemStack::new(log(), 14));
        let mut player = actor(
            false,
            &[Some(ItemStack::new(log(), 64)), Some(ItemStack::new(log(), 36))],
        );

        let outcome = executor.execute(request(70), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.deposited(), 50);
        assert_eq!(report.removed_from_source, 50);
        assert_eq!(player.inventory.total_items(), 50);
        assert_eq!(player.inventory.slot(0), Some(&ItemStack::new(log(), 14)));
    }

    #[test]
    fn debit_is_capped_by_what_the_sender_held() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let outcome = executor.execute(request(30), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.amount_to_take, 10);
        assert_eq!(report.deposit_size, 30);
        assert_eq!(report.removed_from_source, 10);
        assert_eq!(player.inventory.total_items(), 0);
        assert_eq!(citizen_inventory(&world).total_items(), 30);
    }

    #[test]
    fn capped_deposit_only_offers_what_the_sender_can_pay() {
        let executor = TransferExecutor::new(TransferConfig {
            cap_deposit_to_available: true,
            ..TransferConfig::default()
        });
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 10))]);

        let outcome = executor.execute(request(30), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.deposit_size, 10);
        assert_eq!(report.removed_from_source, 10);
        assert_eq!(citizen_inventory(&world).total_items(), 10);
    }

    #[test]
    fn metadata_mismatch_is_not_counted_as_available() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(ItemKind::new("colony:oak_log", 2), 50))]);

        let outcome = executor.execute(request(20), &mut world, &mut player);
        let report = outcome.report().expect("completed");

        assert_eq!(report.available, 0);
        assert_eq!(report.removed_from_source, 0);
        assert_eq!(player.inventory.total_items(), 50);
    }

    // -----------------------------------------------------------------------
    // Bounded removal
    // -----------------------------------------------------------------------

    /// Inventory that over-reports its contents.
    struct LyingInventory {
        inner: SlotInventory,
        claimed: i32,
    }

    impl InventoryContainer for LyingInventory {
        fn slot_count(&self) -> usize {
            self.inner.slot_count()
        }

        fn count_matching(&self, _predicate: SlotPredicate<'_>) -> i32 {
            self.claimed
        }

        fn deposit_with_remainder(&mut self, stack: ItemStack) -> ItemStack {
            self.inner.deposit_with_remainder(stack)
        }

        fn find_first_slot_matching(&self, predicate: SlotPredicate<'_>) -> Option<usize> {
            self.inner.find_first_slot_matching(predicate)
        }

        fn remove_up_to(&mut self, slot: usize, amount: i32) -> i32 {
            self.inner.remove_up_to(slot, amount)
        }
    }

    struct LyingActor {
        id: PlayerId,
        inventory: LyingInventory,
    }

    impl RequestingActor for LyingActor {
        fn actor_id(&self) -> PlayerId {
            self.id
        }

        fn is_unlimited_source(&self) -> bool {
            false
        }

        fn inventory_mut(&mut self) -> &mut dyn InventoryContainer {
            &mut self.inventory
        }
    }

    #[test]
    fn short_source_reports_inconsistency_instead_of_looping() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut inner = SlotInventory::new(3, InventoryRules::uniform(64));
        inner.set_slot(1, ItemStack::new(log(), 8));
        let mut player = LyingActor {
            id: PlayerId::new(),
            inventory: LyingInventory { inner, claimed: 50 },
        };

        let outcome = executor.execute(request(20), &mut world, &mut player);

        let (report, error) = match outcome {
            TransferOutcome::Inconsistent { report, error } => (report, error),
            other => panic!("expected inconsistency, got {other:?}"),
        };
        assert_eq!(report.deposited(), 20);
        assert_eq!(report.removed_from_source, 8);
        assert!(matches!(
            error,
            TransferError::InventoryInconsistency {
                needed: 20,
                missing: 12,
                ..
            }
        ));
        assert_eq!(executor.counters().snapshot().inconsistencies, 1);
    }

    #[test]
    fn iteration_cap_limits_slots_visited() {
        let executor = TransferExecutor::new(TransferConfig {
            removal_iteration_cap: Some(1),
            ..TransferConfig::default()
        });
        let mut world = world(4);
        let mut player = actor(
            false,
            &[Some(ItemStack::new(log(), 5)), Some(ItemStack::new(log(), 5))],
        );

        let outcome = executor.execute(request(8), &mut world, &mut player);
        assert!(matches!(
            outcome.error(),
            Some(TransferError::InventoryInconsistency { missing: 3, .. })
        ));
        assert_eq!(player.inventory.total_items(), 5);
    }

    #[test]
    fn replaying_a_request_transfers_twice() {
        let executor = TransferExecutor::new(TransferConfig::default());
        let mut world = world(4);
        let mut player = actor(false, &[Some(ItemStack::new(log(), 30))]);

        let bytes = request(10).to_bytes().expect("encode");
        for _ in 0..2 {
            let req = TransferRequest::from_bytes(&bytes).expect("decode");
            executor.execute(req, &mut world, &mut player);
        }
        assert_eq!(player.inventory.total_items(), 10);
        assert_eq!(citizen_inventory(&world).total_items(), 20);
        assert_eq!(executor.counters().snapshot().completed, 2);
    }
}

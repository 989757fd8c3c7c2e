//! Slot-based inventories.
//!
//! [`InventoryContainer`] is the capability set the transfer executor needs
//! from any inventory: count, deposit with remainder, find the first
//! matching slot, and take up to N items out of one slot. [`SlotInventory`]
//! is the in-memory implementation used for players and citizens.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::InventoryConfig;
use crate::item::{
    ConfiguredStackLimits, ItemEquality, ItemKind, ItemStack, KindEquality, StackLimits,
};

/// Predicate over a non-empty slot's stack.
pub type SlotPredicate<'a> = &'a dyn Fn(&ItemStack) -> bool;

/// Operations the transfer executor performs on an inventory.
pub trait InventoryContainer {
    /// Number of slots, occupied or not.
    fn slot_count(&self) -> usize;

    /// Total items across every non-empty slot accepted by `predicate`.
    fn count_matching(&self, predicate: SlotPredicate<'_>) -> i32;

    /// Place as much of `stack` as fits and return what did not fit.
    ///
    /// Matching-kind slots are topped up first, then empty slots are used,
    /// never exceeding the kind's max stack size. The returned stack is empty
    /// when everything fit.
    fn deposit_with_remainder(&mut self, stack: ItemStack) -> ItemStack;

    /// Index of the first non-empty slot accepted by `predicate`.
    fn find_first_slot_matching(&self, predicate: SlotPredicate<'_>) -> Option<usize>;

    /// Remove up to `amount` items from `slot` and return how many were
    /// actually removed (0 for empty or out-of-range slots).
    fn remove_up_to(&mut self, slot: usize, amount: i32) -> i32;

    /// Whether `a` and `b` stack together in this inventory. Defaults to
    /// id and metadata equality.
    fn same_kind(&self, a: &ItemKind, b: &ItemKind) -> bool {
        KindEquality.same_kind(a, b)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Stacking rules supplied by the inventory subsystem.
#[derive(Clone)]
pub struct InventoryRules {
    /// Per-kind slot capacity.
    pub limits: Arc<dyn StackLimits>,
    /// Kind equality used for stacking.
    pub equality: Arc<dyn ItemEquality>,
}

impl InventoryRules {
    /// Rules built from config with the default kind equality.
    #[must_use]
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self {
            limits: Arc::new(ConfiguredStackLimits::from_config(config)),
            equality: Arc::new(KindEquality),
        }
    }

    /// Rules with one cap for every kind and the default kind equality.
    #[must_use]
    pub fn uniform(max_stack_size: i32) -> Self {
        Self {
            limits: Arc::new(ConfiguredStackLimits::uniform(max_stack_size)),
            equality: Arc::new(KindEquality),
        }
    }
}

impl Default for InventoryRules {
    fn default() -> Self {
        Self::from_config(&InventoryConfig::default())
    }
}

impl fmt::Debug for InventoryRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryRules").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// SlotInventory
// ---------------------------------------------------------------------------

/// Fixed-size ordered slot container. Empty slots are stored as `None`.
#[derive(Debug, Clone)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
    rules: InventoryRules,
}

/// Serializable view of a [`SlotInventory`], for logs and debugging tools.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    /// Slot contents in order.
    pub slots: Vec<Option<ItemStack>>,
    /// Sum of all stack sizes.
    pub total_items: i64,
}

impl SlotInventory {
    /// Create an empty inventory with `slot_count` slots.
    #[must_use]
    pub fn new(slot_count: usize, rules: InventoryRules) -> Self {
        Self {
            slots: vec![None; slot_count],
            rules,
        }
    }

    /// Create an empty inventory with default rules.
    #[must_use]
    pub fn with_default_rules(slot_count: usize) -> Self {
        Self::new(slot_count, InventoryRules::default())
    }

    /// Overwrite a slot. Empty stacks clear it.
    ///
    /// Returns `false` when `slot` is out of range.
    pub fn set_slot(&mut self, slot: usize, stack: ItemStack) -> bool {
        let Some(cell) = self.slots.get_mut(slot) else {
            return false;
        };
        *cell = if stack.is_empty() { None } else { Some(stack) };
        true
    }

    /// Contents of one slot.
    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Sum of all stack sizes.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.slots
            .iter()
            .flatten()
            .map(|s| i64::from(s.size()))
            .sum()
    }

    /// The rules this inventory stacks by.
    #[must_use]
    pub fn rules(&self) -> &InventoryRules {
        &self.rules
    }

    /// Serializable copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            slots: self.slots.clone(),
            total_items: self.total_items(),
        }
    }

    /// Current contents as a JSON string.
    ///
    /// # Errors
    /// Returns `ColonyError::Codec` if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(&self.snapshot())
            .map_err(|e| crate::ColonyError::Codec(e.to_string()))
    }
}

impl InventoryContainer for SlotInventory {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn count_matching(&self, predicate: SlotPredicate<'_>) -> i32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| !s.is_empty() && predicate(s))
            .fold(0_i32, |acc, s| acc.saturating_add(s.size()))
    }

    fn deposit_with_remainder(&mut self, stack: ItemStack) -> ItemStack {
        if stack.is_empty() {
            return ItemStack::empty();
        }

        let max = self.rules.limits.max_stack_size(&stack.kind).max(1);
        let equality = &self.rules.equality;
        let mut remaining = stack.count;

        // Top up partially filled slots of the same kind.
        for held in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if !equality.same_kind(&held.kind, &stack.kind) {
                continue;
            }
            let moved = (max - held.count).max(0).min(remaining);
            held.count += moved;
            remaining -= moved;
        }

        for cell in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if cell.is_none() {
                let moved = max.min(remaining);
                *cell = Some(stack.with_count(moved));
                remaining -= moved;
            }
        }

        if remaining == 0 {
            ItemStack::empty()
        } else {
            stack.with_count(remaining)
        }
    }

    fn find_first_slot_matching(&self, predicate: SlotPredicate<'_>) -> Option<usize> {
        self.slots.iter().position(|cell| {
            cell.as_ref()
                .is_some_and(|s| !s.is_empty() && predicate(s))
        })
    }

    fn remove_up_to(&mut self, slot: usize, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let Some(cell) = self.slots.get_mut(slot) else {
            return 0;
        };
        let Some(held) = cell.as_mut() else {
            return 0;
        };

        let removed = amount.min(held.size());
        held.count -= removed;
        if held.is_empty() {
            *cell = None;
        }
        removed
    }

    fn same_kind(&self, a: &ItemKind, b: &ItemKind) -> bool {
        self.rules.equality.same_kind(a, b)
    }
}

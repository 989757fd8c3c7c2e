//! Items, stacks and the pluggable rules that decide how they combine.
//!
//! An [`ItemKind`] is the identity of an item without its count. Whether two
//! kinds are "the same" and how many of a kind fit in one slot are both
//! decided by the inventory subsystem through [`ItemEquality`] and
//! [`StackLimits`], not by the item types themselves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::InventoryConfig;

/// Item id used for the empty stack.
pub const AIR: &str = "air";

// ---------------------------------------------------------------------------
// Item kind & stack
// ---------------------------------------------------------------------------

/// Identity of an item: type id plus metadata, excluding the count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKind {
    /// Namespaced type id, e.g. `"colony:oak_log"`.
    pub item: String,
    /// Variant / damage metadata.
    pub metadata: i32,
}

impl ItemKind {
    /// Create an item kind with the given metadata.
    #[must_use]
    pub fn new(item: impl Into<String>, metadata: i32) -> Self {
        Self {
            item: item.into(),
            metadata,
        }
    }

    /// Create an item kind with zero metadata.
    #[must_use]
    pub fn plain(item: impl Into<String>) -> Self {
        Self::new(item, 0)
    }

    /// Whether this is the empty (air) kind.
    #[must_use]
    pub fn is_air(&self) -> bool {
        self.item == AIR
    }
}

/// A kind together with a count.
///
/// A stack is empty when its count is not positive or its kind is air;
/// [`ItemStack::size`] reports 0 for every empty stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// What the stack holds.
    pub kind: ItemKind,
    /// How many it holds.
    pub count: i32,
}

impl ItemStack {
    /// Create a stack of `count` items of `kind`.
    #[must_use]
    pub fn new(kind: ItemKind, count: i32) -> Self {
        Self { kind, count }
    }

    /// The canonical empty stack.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(ItemKind::plain(AIR), 0)
    }

    /// Whether the stack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count <= 0 || self.kind.is_air()
    }

    /// Number of items, 0 for empty stacks.
    #[must_use]
    pub fn size(&self) -> i32 {
        if self.is_empty() { 0 } else { self.count }
    }

    /// Copy of this stack with a different count.
    #[must_use]
    pub fn with_count(&self, count: i32) -> Self {
        Self::new(self.kind.clone(), count)
    }
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Equality predicate
// ---------------------------------------------------------------------------

/// Decides whether two item kinds stack together and match in searches.
pub trait ItemEquality: Send + Sync {
    /// `true` when `a` and `b` denote the same item kind.
    fn same_kind(&self, a: &ItemKind, b: &ItemKind) -> bool;
}

/// Default equality: item id and metadata must both match.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindEquality;

impl ItemEquality for KindEquality {
    fn same_kind(&self, a: &ItemKind, b: &ItemKind) -> bool {
        a.item == b.item && a.metadata == b.metadata
    }
}

// ---------------------------------------------------------------------------
// Stack size cap
// ---------------------------------------------------------------------------

/// Maximum number of items of a kind that fit in a single slot.
pub trait StackLimits: Send + Sync {
    /// Cap for `kind`. Implementations should return at least 1.
    fn max_stack_size(&self, kind: &ItemKind) -> i32;
}

/// Stack limits read from [`InventoryConfig`]: one default cap plus
/// per-item overrides. Caps below 1 are raised to 1.
#[derive(Debug, Clone)]
pub struct ConfiguredStackLimits {
    default_max: i32,
    overrides: BTreeMap<String, i32>,
}

impl ConfiguredStackLimits {
    /// Build limits from the inventory section of the config.
    #[must_use]
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self {
            default_max: config.default_max_stack_size.max(1),
            overrides: config
                .stack_size_overrides
                .iter()
                .map(|(item, cap)| (item.clone(), (*cap).max(1)))
                .collect(),
        }
    }

    /// A single cap for every item kind.
    #[must_use]
    pub fn uniform(max: i32) -> Self {
        Self {
            default_max: max.max(1),
            overrides: BTreeMap::new(),
        }
    }

    /// Add or replace the cap for one item id.
    #[must_use]
    pub fn with_override(mut self, item: impl Into<String>, max: i32) -> Self {
        self.overrides.insert(item.into(), max.max(1));
        self
    }
}

impl Default for ConfiguredStackLimits {
    fn default() -> Self {
        Self::from_config(&InventoryConfig::default())
    }
}

impl StackLimits for ConfiguredStackLimits {
    fn max_stack_size(&self, kind: &ItemKind) -> i32 {
        self.overrides
            .get(&kind.item)
            .copied()
            .unwrap_or(self.default_max)
    }
}

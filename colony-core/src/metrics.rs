//! Transfer counters.
//!
//! Lock-free `AtomicU64` counters bumped by the executor on the simulation
//! thread and readable from anywhere (admin commands, dashboards).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::TransferError;

/// Counters for executor outcomes.
#[derive(Debug)]
pub struct TransferCounters {
    /// Transfers that ran the deposit step to completion.
    pub completed: AtomicU64,
    /// Privileged requests with a non-positive quantity, skipped as no-ops.
    pub skipped: AtomicU64,
    /// Rejections: colony not found.
    pub colony_not_found: AtomicU64,
    /// Rejections: citizen not found.
    pub citizen_not_found: AtomicU64,
    /// Rejections: citizen had no live entity.
    pub entity_not_present: AtomicU64,
    /// Rejections: non-positive quantity from a non-privileged sender.
    pub invalid_quantity: AtomicU64,
    /// Removal loops that could not collect the absorbed amount.
    pub inconsistencies: AtomicU64,
    /// Items placed into citizen inventories.
    pub items_deposited: AtomicU64,
    /// Items taken out of player inventories.
    pub items_removed: AtomicU64,
}

impl TransferCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            colony_not_found: AtomicU64::new(0),
            citizen_not_found: AtomicU64::new(0),
            entity_not_present: AtomicU64::new(0),
            invalid_quantity: AtomicU64::new(0),
            inconsistencies: AtomicU64::new(0),
            items_deposited: AtomicU64::new(0),
            items_removed: AtomicU64::new(0),
        }
    }

    /// Count one abandoned request.
    pub fn record_error(&self, err: &TransferError) {
        let counter = match err {
            TransferError::ColonyNotFound { .. } => &self.colony_not_found,
            TransferError::CitizenNotFound { .. } => &self.citizen_not_found,
            TransferError::EntityNotPresent { .. } => &self.entity_not_present,
            TransferError::InvalidQuantity { .. } => &self.invalid_quantity,
            TransferError::InventoryInconsistency { .. } => &self.inconsistencies,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Add moved item counts. Negative values are ignored.
    pub fn record_items(&self, deposited: i32, removed: i32) {
        self.items_deposited
            .fetch_add(u64::try_from(deposited).unwrap_or(0), Ordering::Relaxed);
        self.items_removed
            .fetch_add(u64::try_from(removed).unwrap_or(0), Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            completed: self.completed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            rejected: [
                self.colony_not_found.load(Ordering::Relaxed),
                self.citizen_not_found.load(Ordering::Relaxed),
                self.entity_not_present.load(Ordering::Relaxed),
                self.invalid_quantity.load(Ordering::Relaxed),
            ],
            inconsistencies: self.inconsistencies.load(Ordering::Relaxed),
            items_deposited: self.items_deposited.load(Ordering::Relaxed),
            items_removed: self.items_removed.load(Ordering::Relaxed),
        }
    }
}

impl Default for TransferCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Completed transfers.
    pub completed: u64,
    /// Skipped no-op transfers.
    pub skipped: u64,
    /// Rejections by reason:
    /// [colony not found, citizen not found, entity not present, invalid quantity].
    pub rejected: [u64; 4],
    /// Internal inconsistencies.
    pub inconsistencies: u64,
    /// Items deposited into citizens.
    pub items_deposited: u64,
    /// Items removed from players.
    pub items_removed: u64,
}

impl CounterSnapshot {
    /// Total rejected requests across all reasons.
    #[must_use]
    pub fn total_rejected(&self) -> u64 {
        self.rejected.iter().sum()
    }

    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP colony_transfers_completed_total Completed item transfers\n\
             # TYPE colony_transfers_completed_total counter\n\
             colony_transfers_completed_total {}\n\
             # HELP colony_transfers_skipped_total No-op privileged transfers\n\
             # TYPE colony_transfers_skipped_total counter\n\
             colony_transfers_skipped_total {}\n\
             # HELP colony_transfers_rejected_total Rejected transfers by reason\n\
             # TYPE colony_transfers_rejected_total counter\n\
             colony_transfers_rejected_total{{reason=\"colony_not_found\"}} {}\n\
             colony_transfers_rejected_total{{reason=\"citizen_not_found\"}} {}\n\
             colony_transfers_rejected_total{{reason=\"entity_not_present\"}} {}\n\
             colony_transfers_rejected_total{{reason=\"invalid_quantity\"}} {}\n\
             # HELP colony_transfer_inconsistencies_total Source removals that came up short\n\
             # TYPE colony_transfer_inconsistencies_total counter\n\
             colony_transfer_inconsistencies_total {}\n\
             # HELP colony_items_deposited_total Items deposited into citizen inventories\n\
             # TYPE colony_items_deposited_total counter\n\
             colony_items_deposited_total {}\n\
             # HELP colony_items_removed_total Items removed from player inventories\n\
             # TYPE colony_items_removed_total counter\n\
             colony_items_removed_total {}\n",
            self.completed,
            self.skipped,
            self.rejected[0],
            self.rejected[1],
            self.rejected[2],
            self.rejected[3],
            self.inconsistencies,
            self.items_deposited,
            self.items_removed,
        )
    }

    /// Format as a JSON object.
    ///
    /// # Errors
    /// Returns `ColonyError::Codec` if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::ColonyError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColonyId, DimensionId};

    #[test]
    fn errors_land_in_their_bucket() {
        let counters = TransferCounters::new();
        counters.record_error(&TransferError::ColonyNotFound {
            colony: ColonyId(5),
            dimension: DimensionId(0),
        });
        counters.record_items(40, -1);

        let snap = counters.snapshot();
        assert_eq!(snap.rejected, [1, 0, 0, 0]);
        assert_eq!(snap.total_rejected(), 1);
        assert_eq!(snap.items_deposited, 40);
        assert_eq!(snap.items_removed, 0);
    }

    #[test]
    fn prometheus_export_contains_all_series() {
        let snap = TransferCounters::new().snapshot();
        let text = snap.to_prometheus();
        assert!(text.contains("colony_transfers_completed_total 0"));
        assert!(text.contains("reason=\"invalid_quantity\"} 0"));
        assert!(text.contains("colony_items_removed_total 0"));
        assert!(snap.to_json().expect("json").contains("\"rejected\":[0,0,0,0]"));
    }
}

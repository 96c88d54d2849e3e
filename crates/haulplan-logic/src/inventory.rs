//! Ship-side cargo ledger.
//!
//! Tracks what is aboard, by item, against a fixed hold capacity. Quantities
//! never go negative and zero entries are pruned, so `inventory()` only ever
//! lists items actually in the hold.
//!
//! `force_pickup` skips the capacity check. It exists so a planner UI can
//! show an overloaded hold instead of silently refusing cargo; callers flag
//! the overload with [`ShipInventory::is_over_capacity`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Immutable copy of a ship's hold at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoSnapshot {
    pub capacity: u32,
    pub items: BTreeMap<String, u32>,
}

impl CargoSnapshot {
    pub fn total_scu(&self) -> u32 {
        self.items.values().fold(0u32, |acc, q| acc.saturating_add(*q))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInventory {
    capacity: u32,
    items: BTreeMap<String, u32>,
}

impl ShipInventory {
    /// Empty hold with the given capacity in SCU.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            items: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total SCU aboard.
    pub fn current_scu(&self) -> u32 {
        self.items.values().fold(0u32, |acc, q| acc.saturating_add(*q))
    }

    /// Free SCU, zero when overloaded.
    pub fn available_scu(&self) -> u32 {
        self.capacity.saturating_sub(self.current_scu())
    }

    pub fn quantity_of(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn can_pickup(&self, _item: &str, quantity: u32) -> bool {
        quantity <= self.available_scu()
    }

    /// Load cargo if it fits. Returns `false` and leaves the hold unchanged
    /// otherwise.
    pub fn pickup(&mut self, item: &str, quantity: u32) -> bool {
        if !self.can_pickup(item, quantity) {
            return false;
        }
        self.force_pickup(item, quantity);
        true
    }

    /// Load cargo regardless of free space.
    pub fn force_pickup(&mut self, item: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.items.entry(item.to_string()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Unload cargo. Returns `false` if less than `quantity` of `item` is aboard.
    pub fn dropoff(&mut self, item: &str, quantity: u32) -> bool {
        let Some(current) = self.items.get_mut(item) else {
            return quantity == 0;
        };
        if *current < quantity {
            return false;
        }
        *current -= quantity;
        if *current == 0 {
            self.items.remove(item);
        }
        true
    }

    pub fn is_over_capacity(&self) -> bool {
        self.current_scu() > self.capacity
    }

    pub fn inventory(&self) -> &BTreeMap<String, u32> {
        &self.items
    }

    pub fn snapshot(&self) -> CargoSnapshot {
        CargoSnapshot {
            capacity: self.capacity,
            items: self.items.clone(),
        }
    }

    /// Rebuild a hold from a snapshot. Zero-quantity rows are dropped.
    pub fn restore(snapshot: &CargoSnapshot) -> Self {
        Self {
            capacity: snapshot.capacity,
            items: snapshot
                .items
                .iter()
                .filter(|(_, q)| **q > 0)
                .map(|(k, q)| (k.clone(), *q))
                .collect(),
        }
    }
}

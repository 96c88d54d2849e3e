//! Station-side supply ledger.
//!
//! Each station holds item stock that is available for pickup. Stock is
//! seeded from the contract list (every contract's quantity becomes stock at
//! its source), consumed by pickups, and re-stocked by dropoffs. A dropoff at
//! a station can therefore feed a later pickup there, which models cargo
//! handed off between legs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::Contract;

/// Normalized station id for a free-text location name.
pub fn station_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationInventory {
    /// station id → item → SCU available
    stations: BTreeMap<String, BTreeMap<String, u32>>,
}

impl StationInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset, then stock each contract's quantity at its source.
    pub fn initialize_from_contracts(&mut self, contracts: &[Contract]) {
        self.stations.clear();
        for contract in contracts {
            self.add_dropoff(&contract.source, &contract.item, contract.quantity);
        }
    }

    /// Convenience constructor around [`Self::initialize_from_contracts`].
    pub fn from_contracts(contracts: &[Contract]) -> Self {
        let mut stations = Self::new();
        stations.initialize_from_contracts(contracts);
        stations
    }

    /// Items with stock at `station`. Empty when the station is unknown.
    pub fn available_items(&self, station: &str) -> BTreeMap<String, u32> {
        self.stations
            .get(&station_key(station))
            .cloned()
            .unwrap_or_default()
    }

    pub fn available(&self, station: &str, item: &str) -> u32 {
        self.stations
            .get(&station_key(station))
            .and_then(|items| items.get(item))
            .copied()
            .unwrap_or(0)
    }

    /// Take stock for a pickup. Returns `false` and changes nothing when the
    /// station has less than `quantity`.
    pub fn consume_pickup(&mut self, station: &str, item: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return true;
        }
        let key = station_key(station);
        let Some(items) = self.stations.get_mut(&key) else {
            return false;
        };
        let Some(stock) = items.get_mut(item) else {
            return false;
        };
        if *stock < quantity {
            return false;
        }
        *stock -= quantity;
        if *stock == 0 {
            items.remove(item);
            if items.is_empty() {
                self.stations.remove(&key);
            }
        }
        true
    }

    /// Re-stock a station. Always succeeds.
    pub fn add_dropoff(&mut self, station: &str, item: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let stock = self
            .stations
            .entry(station_key(station))
            .or_default()
            .entry(item.to_string())
            .or_insert(0);
        *stock = stock.saturating_add(quantity);
    }

    /// Station ids with any stock, in sorted order.
    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractStatus;

    fn contract(id: &str, source: &str, item: &str, quantity: u32) -> Contract {
        Contract {
            id: id.into(),
            record_id: String::new(),
            item: item.into(),
            source: source.into(),
            destination: "Lorville".into(),
            quantity,
            reward: 1000.0,
            timestamp: String::new(),
            status: ContractStatus::Open,
        }
    }

    #[test]
    fn test_seeded_from_contracts() {
        let stations = StationInventory::from_contracts(&[
            contract("a", "Port Olisar", "Gold", 10),
            contract("b", "Port Olisar", "Gold", 5),
            contract("c", "Area18", "Titanium", 8),
        ]);
        assert_eq!(stations.available("Port Olisar", "Gold"), 15);
        assert_eq!(stations.available("area18", "Titanium"), 8);
        assert_eq!(stations.available("Area18", "Gold"), 0);
    }

    #[test]
    fn test_initialize_resets() {
        let mut stations = StationInventory::new();
        stations.add_dropoff("Somewhere", "Scrap", 99);
        stations.initialize_from_contracts(&[contract("a", "Port Olisar", "Gold", 10)]);
        assert_eq!(stations.available("Somewhere", "Scrap"), 0);
        assert_eq!(stations.available("Port Olisar", "Gold"), 10);
    }

    #[test]
    fn test_consume_pickup() {
        let mut stations =
            StationInventory::from_contracts(&[contract("a", "Port Olisar", "Gold", 10)]);
        assert!(stations.consume_pickup("Port Olisar", "Gold", 4));
        assert_eq!(stations.available("Port Olisar", "Gold"), 6);
        assert!(stations.consume_pickup("Port Olisar", "Gold", 6));
        assert!(stations.available_items("Port Olisar").is_empty());
    }

    #[test]
    fn test_consume_insufficient_is_noop() {
        let mut stations =
            StationInventory::from_contracts(&[contract("a", "Port Olisar", "Gold", 10)]);
        assert!(!stations.consume_pickup("Port Olisar", "Gold", 11));
        assert!(!stations.consume_pickup("Port Olisar", "Titanium", 1));
        assert!(!stations.consume_pickup("Nowhere", "Gold", 1));
        assert_eq!(stations.available("Port Olisar", "Gold"), 10);
    }

    #[test]
    fn test_dropoff_restocks_for_later_pickup() {
        let mut stations = StationInventory::new();
        stations.add_dropoff("Area18", "Gold", 7);
        assert_eq!(stations.available("Area18", "Gold"), 7);
        assert!(stations.consume_pickup("AREA18", "Gold", 7));
    }

    #[test]
    fn test_clone_is_independent() {
        let stations =
            StationInventory::from_contracts(&[contract("a", "Port Olisar", "Gold", 10)]);
        let mut what_if = stations.clone();
        what_if.consume_pickup("Port Olisar", "Gold", 10);
        assert_eq!(stations.available("Port Olisar", "Gold"), 10);
        assert_eq!(what_if.available("Port Olisar", "Gold"), 0);
    }

    #[test]
    fn test_station_key() {
        assert_eq!(station_key("  Port Olisar "), "port olisar");
    }
}

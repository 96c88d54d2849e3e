//! What-if replay of a planned route against the cargo ledgers.
//!
//! After a route is built the player can untick items at individual stops
//! ("don't load the Gold at Area18"). [`recalculate`] replays the route on
//! clones of the caller's ledgers under that [`CargoSelection`] and reports
//! the hold after every step. Pickups use `force_pickup`, so an overloaded
//! hold shows up as `over_capacity` instead of being refused.
//!
//! Deliveries re-stock the destination station, so cargo dropped at one
//! stop can be picked up there by a later contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::inventory::{CargoSnapshot, ShipInventory};
use crate::route::{OptimizedRoute, RouteAction};
use crate::station::{station_key, StationInventory};

/// Per-stop pickup decisions: location → item → load it?
///
/// Anything not mentioned is loaded. Choices are keyed by the stop the
/// player sees, the resolved `RouteStep::location.name`. Station stock
/// stays keyed by the contract's own `source`/`destination` text, so a
/// noisy source such as "AREA18 (ArcCorp)" is deselected as "Area18" but
/// drawn from the "area18 (arccorp)" stock row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoSelection {
    choices: BTreeMap<String, BTreeMap<String, bool>>,
}

impl CargoSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, location: &str, item: &str, selected: bool) {
        self.choices
            .entry(station_key(location))
            .or_default()
            .insert(item.to_string(), selected);
    }

    pub fn is_selected(&self, location: &str, item: &str) -> bool {
        self.choices
            .get(&station_key(location))
            .and_then(|items| items.get(item))
            .copied()
            .unwrap_or(true)
    }

    /// Forget every choice, so everything is loaded again.
    pub fn select_all(&mut self) {
        self.choices.clear();
    }
}

/// What happened to one route step during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Start,
    Loaded,
    /// Pickup skipped: the item is deselected at this stop.
    Deselected,
    /// Pickup skipped: the station has too little stock.
    OutOfStock,
    Delivered,
    /// Delivery skipped: the cargo is not aboard.
    NotAboard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLoad {
    pub step_index: usize,
    pub outcome: StepOutcome,
    pub cargo: CargoSnapshot,
    pub current_scu: u32,
    pub over_capacity: bool,
}

/// Result of a replay, with the ledgers as they stand after the last step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub stops: Vec<StopLoad>,
    pub ship: ShipInventory,
    pub stations: StationInventory,
}

impl Loadout {
    /// Whether any step left the hold over capacity.
    pub fn ever_over_capacity(&self) -> bool {
        self.stops.iter().any(|s| s.over_capacity)
    }

    pub fn peak_scu(&self) -> u32 {
        self.stops.iter().map(|s| s.current_scu).max().unwrap_or(0)
    }
}

/// Replay `route` on clones of `ship` and `stations` under `selection`.
pub fn recalculate(
    route: &OptimizedRoute,
    ship: &ShipInventory,
    stations: &StationInventory,
    selection: &CargoSelection,
) -> Loadout {
    let mut ship = ship.clone();
    let mut stations = stations.clone();
    let mut stops = Vec::with_capacity(route.steps.len());

    for (step_index, step) in route.steps.iter().enumerate() {
        let outcome = match (step.action, step.contract.as_ref()) {
            (RouteAction::Start, _) | (_, None) => StepOutcome::Start,
            (RouteAction::Pickup, Some(c)) => {
                if !selection.is_selected(&step.location.name, &c.item) {
                    StepOutcome::Deselected
                } else if stations.consume_pickup(&c.source, &c.item, c.quantity) {
                    ship.force_pickup(&c.item, c.quantity);
                    StepOutcome::Loaded
                } else {
                    StepOutcome::OutOfStock
                }
            }
            (RouteAction::Deliver, Some(c)) => {
                if ship.dropoff(&c.item, c.quantity) {
                    stations.add_dropoff(&c.destination, &c.item, c.quantity);
                    StepOutcome::Delivered
                } else {
                    StepOutcome::NotAboard
                }
            }
        };

        if ship.is_over_capacity() && outcome == StepOutcome::Loaded {
            log::debug!(
                "Step {}: hold at {} / {} SCU",
                step_index,
                ship.current_scu(),
                ship.capacity()
            );
        }

        stops.push(StopLoad {
            step_index,
            outcome,
            cargo: ship.snapshot(),
            current_scu: ship.current_scu(),
            over_capacity: ship.is_over_capacity(),
        });
    }

    Loadout {
        stops,
        ship,
        stations,
    }
}

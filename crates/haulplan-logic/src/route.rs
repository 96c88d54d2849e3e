//! Route data model shared by both route builders.
//!
//! A route is an append-only list of [`RouteStep`]s that starts with a
//! `Start` step at the ship's position. Builders push steps through
//! [`RouteWalk`], which keeps the ship hold, the station ledger and the
//! running distance in step with every action it records.

use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::contract::{total_quantity, total_reward, Contract};
use crate::inventory::ShipInventory;
use crate::location::Location;
use crate::station::StationInventory;

/// Which builder sequences the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RouteStrategy {
    /// Nearest pending pickup or delivery next.
    #[default]
    #[serde(rename = "distance")]
    Distance,
    /// Cluster actions by location, fewest stops.
    #[serde(rename = "min-stops")]
    MinStops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAction {
    Start,
    Pickup,
    Deliver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub location: Location,
    pub action: RouteAction,
    /// Contract that motivated the step; `None` for the start step.
    pub contract: Option<Contract>,
    /// SCU aboard immediately after this step.
    pub cargo_on_board: u32,
    /// Distance travelled up to and including this step.
    pub cumulative_distance: f64,
}

/// A contract whose source and destination both resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContract {
    pub contract: Contract,
    pub source: Location,
    pub destination: Location,
}

/// Finished plan with aggregate statistics.
///
/// `total_reward` and `cargo_utilization` cover every *selected* contract,
/// including any the builder could not fit into the route.
/// `completed_reward` and `dropped_contract_ids` give the route-only view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub strategy: RouteStrategy,
    pub capacity: u32,
    pub steps: Vec<RouteStep>,
    pub total_distance: f64,
    pub total_fuel: u64,
    pub total_time_minutes: u64,
    pub total_reward: f64,
    /// Selected SCU / capacity × 100. Not clamped.
    pub cargo_utilization: f64,
    pub selected_contract_ids: Vec<String>,
    /// Selected contracts with no delivery step in the route.
    pub dropped_contract_ids: Vec<String>,
    pub completed_reward: f64,
    /// Distinct consecutive locations visited, start included.
    pub stop_count: usize,
}

impl OptimizedRoute {
    pub fn from_steps(
        strategy: RouteStrategy,
        capacity: u32,
        steps: Vec<RouteStep>,
        selected: &[Contract],
        config: &PlannerConfig,
    ) -> Self {
        let total_distance = steps.last().map_or(0.0, |s| s.cumulative_distance);

        let mut delivered: Vec<&Contract> = steps
            .iter()
            .filter(|s| s.action == RouteAction::Deliver)
            .filter_map(|s| s.contract.as_ref())
            .collect();
        let completed_reward = delivered.iter().map(|c| c.reward).sum();
        // Ids may repeat, so each delivery settles exactly one selected contract.
        let mut dropped_contract_ids = Vec::new();
        for c in selected {
            match delivered.iter().position(|d| *d == c) {
                Some(pos) => {
                    delivered.remove(pos);
                }
                None => dropped_contract_ids.push(c.id.clone()),
            }
        }

        let cargo_utilization = if capacity == 0 {
            0.0
        } else {
            total_quantity(selected) as f64 / capacity as f64 * 100.0
        };

        let stop_count = steps
            .iter()
            .enumerate()
            .filter(|(i, s)| *i == 0 || steps[i - 1].location.id != s.location.id)
            .count();

        Self {
            strategy,
            capacity,
            total_distance,
            total_fuel: config.fuel_for(total_distance),
            total_time_minutes: config.minutes_for(total_distance),
            total_reward: total_reward(selected),
            cargo_utilization,
            selected_contract_ids: selected.iter().map(|c| c.id.clone()).collect(),
            dropped_contract_ids,
            completed_reward,
            stop_count,
            steps,
        }
    }

    /// Route steps that reference `contract_id`, in route order.
    pub fn steps_for(&self, contract_id: &str) -> impl Iterator<Item = &RouteStep> {
        let id = contract_id.to_string();
        self.steps
            .iter()
            .filter(move |s| s.contract.as_ref().is_some_and(|c| c.id == id))
    }

    /// Utilization clamped to 0–100 for display.
    pub fn display_utilization(&self) -> f64 {
        self.cargo_utilization.clamp(0.0, 100.0)
    }
}

/// Cursor used by route builders to append steps.
pub(crate) struct RouteWalk<'a> {
    steps: Vec<RouteStep>,
    current: Location,
    distance: f64,
    ship: &'a mut ShipInventory,
    stations: &'a mut StationInventory,
}

impl<'a> RouteWalk<'a> {
    pub(crate) fn new(
        start: &Location,
        ship: &'a mut ShipInventory,
        stations: &'a mut StationInventory,
    ) -> Self {
        let steps = vec![RouteStep {
            location: start.clone(),
            action: RouteAction::Start,
            contract: None,
            cargo_on_board: ship.current_scu(),
            cumulative_distance: 0.0,
        }];
        Self {
            steps,
            current: start.clone(),
            distance: 0.0,
            ship,
            stations,
        }
    }

    pub(crate) fn current(&self) -> &Location {
        &self.current
    }

    /// Hold has room and the source station has stock.
    pub(crate) fn can_load(&self, rc: &ResolvedContract) -> bool {
        let c = &rc.contract;
        self.ship.can_pickup(&c.item, c.quantity)
            && self.stations.available(&c.source, &c.item) >= c.quantity
    }

    /// Record a pickup after travelling `travel`. Returns `false` if the
    /// ledgers refuse it, in which case no step is added.
    pub(crate) fn pickup(&mut self, rc: &ResolvedContract, travel: f64) -> bool {
        let c = &rc.contract;
        if !self.can_load(rc) {
            return false;
        }
        self.stations.consume_pickup(&c.source, &c.item, c.quantity);
        self.ship.pickup(&c.item, c.quantity);
        self.push(&rc.source, RouteAction::Pickup, c, travel);
        true
    }

    /// Record a delivery after travelling `travel`. Delivered cargo re-stocks
    /// the destination station.
    pub(crate) fn deliver(&mut self, rc: &ResolvedContract, travel: f64) -> bool {
        let c = &rc.contract;
        if !self.ship.dropoff(&c.item, c.quantity) {
            return false;
        }
        self.stations
            .add_dropoff(&c.destination, &c.item, c.quantity);
        self.push(&rc.destination, RouteAction::Deliver, c, travel);
        true
    }

    fn push(&mut self, location: &Location, action: RouteAction, contract: &Contract, travel: f64) {
        self.distance += travel;
        self.current = location.clone();
        log::debug!(
            "{:?} {} ({} SCU {}) at {}, {:.0} cumulative",
            action,
            contract.id,
            contract.quantity,
            contract.item,
            location.name,
            self.distance
        );
        self.steps.push(RouteStep {
            location: location.clone(),
            action,
            contract: Some(contract.clone()),
            cargo_on_board: self.ship.current_scu(),
            cumulative_distance: self.distance,
        });
    }

    pub(crate) fn into_steps(self) -> Vec<RouteStep> {
        self.steps
    }
}

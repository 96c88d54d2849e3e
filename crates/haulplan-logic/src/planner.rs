//! Planning pipeline: resolve → select → sequence → summarize.
//!
//! [`RoutePlanner`] holds nothing but a borrowed gazetteer and its config,
//! so one instance can serve any number of planning calls. Every call builds
//! fresh ledgers (or clones the caller's), which makes replanning with the
//! same inputs reproduce the same route.
//!
//! Problems with individual contracts never abort a plan. The contract is
//! left out and the reason is reported through [`PlanReport::exclusions`].
//! `plan` returns `None` for an empty contract list, capacity ≤ 0, an
//! unknown start, no resolvable contract, or nothing that fits.
//!
//! ```
//! use haulplan_logic::contract::{Contract, ContractStatus};
//! use haulplan_logic::location::{Gazetteer, GazetteerEntry};
//! use haulplan_logic::planner::{PlanRequest, RoutePlanner};
//! use haulplan_logic::route::RouteStrategy;
//!
//! let entry = |name: &str, x: f64| GazetteerEntry {
//!     display_name: name.into(),
//!     internal_key: name.to_lowercase(),
//!     system: "Stanton".into(),
//!     x,
//!     y: 0.0,
//!     z: 0.0,
//! };
//! let gazetteer = Gazetteer::from_entries(vec![entry("Alpha", 0.0), entry("Beta", 10.0)]).unwrap();
//! let planner = RoutePlanner::new(&gazetteer);
//! let request = PlanRequest {
//!     start: "Alpha".into(),
//!     capacity: 20,
//!     strategy: RouteStrategy::Distance,
//!     contracts: vec![Contract {
//!         id: "c1".into(),
//!         record_id: String::new(),
//!         item: "Gold".into(),
//!         source: "Alpha".into(),
//!         destination: "Beta".into(),
//!         quantity: 15,
//!         reward: 75_000.0,
//!         timestamp: String::new(),
//!         status: ContractStatus::Open,
//!     }],
//! };
//! let route = planner.plan(&request).unwrap();
//! assert_eq!(route.steps.len(), 3);
//! assert_eq!(route.cargo_utilization, 75.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{validate_config, ConfigError, PlannerConfig};
use crate::contract::{select_indices, Contract, ContractStatus};
use crate::distance_route::build_distance_route;
use crate::inventory::ShipInventory;
use crate::location::Gazetteer;
use crate::min_stops::build_min_stops_route;
use crate::route::{OptimizedRoute, ResolvedContract, RouteStrategy};
use crate::station::StationInventory;

/// Inputs for one planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Free-text start location, resolved through the gazetteer.
    pub start: String,
    /// Hold capacity in SCU. Zero or negative yields no route.
    pub capacity: i64,
    pub strategy: RouteStrategy,
    pub contracts: Vec<Contract>,
}

/// Why a contract is missing from the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanIssue {
    /// Source or destination has no gazetteer match.
    UnresolvedLocation(String),
    /// Quantity exceeds the whole hold (or the hold is empty).
    CapacityInfeasible { quantity: u32, capacity: i64 },
    /// Contract is completed or abandoned.
    Inactive(ContractStatus),
    /// Fits on its own but lost out to higher-reward contracts.
    NotSelected,
}

impl std::fmt::Display for PlanIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanIssue::UnresolvedLocation(name) => write!(f, "unknown location '{}'", name),
            PlanIssue::CapacityInfeasible { quantity, capacity } => {
                write!(f, "{} SCU does not fit a {} SCU hold", quantity, capacity)
            }
            PlanIssue::Inactive(status) => write!(f, "contract is {:?}", status),
            PlanIssue::NotSelected => write!(f, "not selected under capacity"),
        }
    }
}

impl std::error::Error for PlanIssue {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub contract_id: String,
    pub issue: PlanIssue,
}

/// Route plus the contracts that were left out and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub route: Option<OptimizedRoute>,
    pub exclusions: Vec<Exclusion>,
}

pub struct RoutePlanner<'g> {
    gazetteer: &'g Gazetteer,
    config: PlannerConfig,
}

impl<'g> RoutePlanner<'g> {
    /// Planner with default conversion constants.
    pub fn new(gazetteer: &'g Gazetteer) -> Self {
        Self {
            gazetteer,
            config: PlannerConfig::default(),
        }
    }

    /// Planner with a custom config; rejects invalid configs.
    pub fn with_config(
        gazetteer: &'g Gazetteer,
        config: PlannerConfig,
    ) -> Result<Self, Vec<ConfigError>> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self { gazetteer, config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(&self, request: &PlanRequest) -> Option<OptimizedRoute> {
        self.plan_report(request).route
    }

    /// Plan with an empty hold and station stock seeded from the request.
    pub fn plan_report(&self, request: &PlanRequest) -> PlanReport {
        let capacity = u32::try_from(request.capacity.max(0)).unwrap_or(u32::MAX);
        let ship = ShipInventory::new(capacity);
        let stations = StationInventory::from_contracts(&request.contracts);
        self.plan_from(request, &ship, &stations)
    }

    /// Plan starting from the caller's ledgers. Both are cloned; the
    /// baseline passed in is never modified. The hold is planned at
    /// `request.capacity` with whatever cargo `ship` already carries.
    pub fn plan_from(
        &self,
        request: &PlanRequest,
        ship: &ShipInventory,
        stations: &StationInventory,
    ) -> PlanReport {
        let mut exclusions = Vec::new();

        if request.contracts.is_empty() {
            log::debug!("No contracts to plan");
            return PlanReport {
                route: None,
                exclusions,
            };
        }

        if request.capacity <= 0 {
            log::warn!("Capacity {} SCU: nothing can be hauled", request.capacity);
            exclusions.extend(request.contracts.iter().map(|c| Exclusion {
                contract_id: c.id.clone(),
                issue: PlanIssue::CapacityInfeasible {
                    quantity: c.quantity,
                    capacity: request.capacity,
                },
            }));
            return PlanReport {
                route: None,
                exclusions,
            };
        }

        let Some(start) = self.gazetteer.resolve(&request.start) else {
            log::warn!("Start location '{}' not in gazetteer", request.start);
            return PlanReport {
                route: None,
                exclusions,
            };
        };

        let mut valid: Vec<ResolvedContract> = Vec::new();
        for contract in &request.contracts {
            match self.classify(contract, request.capacity) {
                Ok(resolved) => valid.push(resolved),
                Err(issue) => {
                    log::warn!("Excluding contract {}: {}", contract.id, issue);
                    exclusions.push(Exclusion {
                        contract_id: contract.id.clone(),
                        issue,
                    });
                }
            }
        }

        let plain: Vec<Contract> = valid.iter().map(|rc| rc.contract.clone()).collect();
        let picked = select_indices(&plain, request.capacity);
        for (i, rc) in valid.iter().enumerate() {
            if !picked.contains(&i) {
                exclusions.push(Exclusion {
                    contract_id: rc.contract.id.clone(),
                    issue: PlanIssue::NotSelected,
                });
            }
        }
        if picked.is_empty() {
            log::info!("No contract fits a {} SCU hold", request.capacity);
            return PlanReport {
                route: None,
                exclusions,
            };
        }

        // Keep the selector's reward order; builders break ties by position.
        let chosen: Vec<ResolvedContract> = picked.iter().map(|&i| valid[i].clone()).collect();
        let selected: Vec<Contract> = picked.into_iter().map(|i| plain[i].clone()).collect();

        // The hold keeps its cargo but takes the capacity selection ran against.
        let capacity = u32::try_from(request.capacity).unwrap_or(u32::MAX);
        if ship.capacity() != capacity {
            log::warn!(
                "Ship ledger capacity {} SCU differs from requested {}; planning at {}",
                ship.capacity(),
                request.capacity,
                capacity
            );
        }
        let mut snapshot = ship.snapshot();
        snapshot.capacity = capacity;
        let mut ship = ShipInventory::restore(&snapshot);
        let mut stations = stations.clone();
        let steps = match request.strategy {
            RouteStrategy::Distance => {
                build_distance_route(start, &chosen, &mut ship, &mut stations)
            }
            RouteStrategy::MinStops => {
                build_min_stops_route(start, &chosen, &mut ship, &mut stations)
            }
        };

        let route = OptimizedRoute::from_steps(
            request.strategy,
            ship.capacity(),
            steps,
            &selected,
            &self.config,
        );
        log::info!(
            "{:?} route: {} steps, {} stops, {:.0} distance, {:.0} reward ({} dropped)",
            route.strategy,
            route.steps.len(),
            route.stop_count,
            route.total_distance,
            route.total_reward,
            route.dropped_contract_ids.len()
        );

        PlanReport {
            route: Some(route),
            exclusions,
        }
    }

    fn classify(&self, contract: &Contract, capacity: i64) -> Result<ResolvedContract, PlanIssue> {
        if !contract.status.is_plannable() {
            return Err(PlanIssue::Inactive(contract.status));
        }
        let source = self
            .gazetteer
            .resolve(&contract.source)
            .ok_or_else(|| PlanIssue::UnresolvedLocation(contract.source.clone()))?;
        let destination = self
            .gazetteer
            .resolve(&contract.destination)
            .ok_or_else(|| PlanIssue::UnresolvedLocation(contract.destination.clone()))?;
        if contract.quantity as i64 > capacity {
            return Err(PlanIssue::CapacityInfeasible {
                quantity: contract.quantity,
                capacity,
            });
        }
        Ok(ResolvedContract {
            contract: contract.clone(),
            source: source.clone(),
            destination: destination.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::GazetteerEntry;
    use crate::route::RouteAction;

    fn gazetteer() -> Gazetteer {
        let entry = |name: &str, key: &str, x: f64, y: f64| GazetteerEntry {
            display_name: name.into(),
            internal_key: key.into(),
            system: "Stanton".into(),
            x,
            y,
            z: 0.0,
        };
        Gazetteer::from_entries(vec![
            entry("Port Olisar", "stanton_olisar", 0.0, 0.0),
            entry("Area18", "arccorp_area18", 4_000_000.0, 0.0),
            entry("Lorville", "hurston_lorville", 0.0, 3_000_000.0),
            entry("New Babbage", "microtech_new_babbage", -6_000_000.0, 0.0),
        ])
        .unwrap()
    }

    fn contract(id: &str, from: &str, to: &str, quantity: u32, reward: f64) -> Contract {
        Contract {
            id: id.into(),
            record_id: format!("rec-{}", id),
            item: "Agricium".into(),
            source: from.into(),
            destination: to.into(),
            quantity,
            reward,
            timestamp: "2955-03-01T12:00:00Z".into(),
            status: ContractStatus::Open,
        }
    }

    fn request(capacity: i64, contracts: Vec<Contract>) -> PlanRequest {
        PlanRequest {
            start: "Port Olisar".into(),
            capacity,
            strategy: RouteStrategy::Distance,
            contracts,
        }
    }

    #[test]
    fn test_empty_contracts_is_none() {
        let g = gazetteer();
        assert!(RoutePlanner::new(&g).plan(&request(100, vec![])).is_none());
    }

    #[test]
    fn test_non_positive_capacity_is_none() {
        let g = gazetteer();
        let planner = RoutePlanner::new(&g);
        for capacity in [0, -1, -1000] {
            let report =
                planner.plan_report(&request(capacity, vec![contract("a", "Area18", "Lorville", 1, 1.0)]));
            assert!(report.route.is_none());
            assert_eq!(report.exclusions.len(), 1);
        }
    }

    #[test]
    fn test_unknown_start_is_none() {
        let g = gazetteer();
        let mut req = request(100, vec![contract("a", "Area18", "Lorville", 1, 1.0)]);
        req.start = "Grim HEX".into();
        assert!(RoutePlanner::new(&g).plan(&req).is_none());
    }

    #[test]
    fn test_unresolved_contract_excluded() {
        let g = gazetteer();
        let report = RoutePlanner::new(&g).plan_report(&request(
            100,
            vec![
                contract("good", "Area18", "Lorville", 5, 10.0),
                contract("bad", "Area18", "Grim HEX", 5, 99.0),
            ],
        ));
        let route = report.route.unwrap();
        assert_eq!(route.selected_contract_ids, vec!["good".to_string()]);
        assert_eq!(
            report.exclusions,
            vec![Exclusion {
                contract_id: "bad".into(),
                issue: PlanIssue::UnresolvedLocation("Grim HEX".into()),
            }]
        );
    }

    #[test]
    fn test_all_unresolved_is_none() {
        let g = gazetteer();
        let report = RoutePlanner::new(&g)
            .plan_report(&request(100, vec![contract("a", "Nowhere", "Lorville", 1, 1.0)]));
        assert!(report.route.is_none());
    }

    #[test]
    fn test_inactive_excluded() {
        let g = gazetteer();
        let mut done = contract("done", "Area18", "Lorville", 1, 1.0);
        done.status = ContractStatus::Completed;
        let report = RoutePlanner::new(&g).plan_report(&request(10, vec![done]));
        assert!(report.route.is_none());
        assert_eq!(
            report.exclusions[0].issue,
            PlanIssue::Inactive(ContractStatus::Completed)
        );
    }

    #[test]
    fn test_oversized_contract_is_none() {
        let g = gazetteer();
        let report = RoutePlanner::new(&g)
            .plan_report(&request(30, vec![contract("a", "Area18", "Lorville", 50, 1.0)]));
        assert!(report.route.is_none());
        assert!(matches!(
            report.exclusions[0].issue,
            PlanIssue::CapacityInfeasible { quantity: 50, capacity: 30 }
        ));
    }

    #[test]
    fn test_greedy_exclusion_reported() {
        let g = gazetteer();
        let report = RoutePlanner::new(&g).plan_report(&request(
            20,
            vec![
                contract("small", "Area18", "Lorville", 10, 50_000.0),
                contract("large", "Area18", "Lorville", 15, 75_000.0),
            ],
        ));
        let route = report.route.unwrap();
        assert_eq!(route.selected_contract_ids, vec!["large".to_string()]);
        assert_eq!(route.total_reward, 75_000.0);
        assert_eq!(route.cargo_utilization, 75.0);
        assert_eq!(report.exclusions[0].issue, PlanIssue::NotSelected);
        // start, pickup, deliver
        assert_eq!(route.steps.len(), 3);
        assert_eq!(route.steps[1].action, RouteAction::Pickup);
        assert_eq!(route.steps[2].action, RouteAction::Deliver);
    }

    #[test]
    fn test_statistics() {
        let g = gazetteer();
        // Olisar → Area18 (4M) → Lorville (5M): 9M total.
        let route = RoutePlanner::new(&g)
            .plan(&request(10, vec![contract("a", "Area18", "Lorville", 10, 1.0)]))
            .unwrap();
        assert!((route.total_distance - 9_000_000.0).abs() < 1e-6);
        assert_eq!(route.total_fuel, 9);
        assert_eq!(route.total_time_minutes, 2);
        assert_eq!(route.cargo_utilization, 100.0);
        assert_eq!(route.completed_reward, 1.0);
        assert!(route.dropped_contract_ids.is_empty());
    }

    #[test]
    fn test_custom_config() {
        let g = gazetteer();
        let config = PlannerConfig {
            fuel_distance_per_unit: 3_000_000.0,
            distance_per_minute: 1_000_000.0,
        };
        let planner = RoutePlanner::with_config(&g, config).unwrap();
        let route = planner
            .plan(&request(10, vec![contract("a", "Area18", "Lorville", 10, 1.0)]))
            .unwrap();
        assert_eq!(route.total_fuel, 3);
        assert_eq!(route.total_time_minutes, 9);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let g = gazetteer();
        let config = PlannerConfig {
            fuel_distance_per_unit: 0.0,
            ..PlannerConfig::default()
        };
        assert!(RoutePlanner::with_config(&g, config).is_err());
    }

    #[test]
    fn test_plan_from_leaves_baseline_untouched() {
        let g = gazetteer();
        let req = request(10, vec![contract("a", "Area18", "Lorville", 10, 1.0)]);
        let ship = ShipInventory::new(10);
        let stations = StationInventory::from_contracts(&req.contracts);
        let before = (ship.clone(), stations.clone());
        let report = RoutePlanner::new(&g).plan_from(&req, &ship, &stations);
        assert!(report.route.is_some());
        assert_eq!((ship, stations), before);
    }

    #[test]
    fn test_plan_from_with_cargo_aboard() {
        // 6 SCU already aboard a 10 SCU hold leaves no room for 5 more.
        let g = gazetteer();
        let req = request(10, vec![contract("a", "Area18", "Lorville", 5, 1.0)]);
        let mut ship = ShipInventory::new(10);
        ship.pickup("Scrap", 6);
        let stations = StationInventory::from_contracts(&req.contracts);
        let route = RoutePlanner::new(&g)
            .plan_from(&req, &ship, &stations)
            .route
            .unwrap();
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.dropped_contract_ids, vec!["a".to_string()]);
        assert_eq!(route.total_reward, 1.0);
        assert_eq!(route.completed_reward, 0.0);
    }

    #[test]
    fn test_shared_ids_route_both_contracts() {
        let g = gazetteer();
        let mut gold = contract("X", "Area18", "Lorville", 5, 10.0);
        gold.item = "Gold".into();
        let mut iron = contract("X", "Area18", "Lorville", 7, 20.0);
        iron.item = "Iron".into();
        let report = RoutePlanner::new(&g).plan_report(&request(100, vec![gold, iron]));
        let route = report.route.unwrap();

        let pickups: Vec<&str> = route
            .steps
            .iter()
            .filter(|s| s.action == RouteAction::Pickup)
            .filter_map(|s| s.contract.as_ref().map(|c| c.item.as_str()))
            .collect();
        assert_eq!(pickups, vec!["Iron", "Gold"]);
        assert_eq!(route.selected_contract_ids, vec!["X".to_string(), "X".to_string()]);
        assert!(route.dropped_contract_ids.is_empty());
        assert_eq!(route.total_reward, 30.0);
        assert_eq!(route.completed_reward, 30.0);
        assert!(report.exclusions.is_empty());
    }

    #[test]
    fn test_shared_ids_not_selected_reported_once() {
        let g = gazetteer();
        let mut gold = contract("X", "Area18", "Lorville", 5, 10.0);
        gold.item = "Gold".into();
        let mut iron = contract("X", "Area18", "Lorville", 7, 20.0);
        iron.item = "Iron".into();
        let report = RoutePlanner::new(&g).plan_report(&request(8, vec![gold, iron]));
        let route = report.route.unwrap();
        assert_eq!(route.steps[1].contract.as_ref().unwrap().item, "Iron");
        assert_eq!(
            report.exclusions,
            vec![Exclusion {
                contract_id: "X".into(),
                issue: PlanIssue::NotSelected,
            }]
        );
    }

    #[test]
    fn test_plan_from_uses_request_capacity() {
        let g = gazetteer();
        let req = request(100, vec![contract("a", "Area18", "Lorville", 50, 1.0)]);
        let ship = ShipInventory::new(10);
        let stations = StationInventory::from_contracts(&req.contracts);
        let route = RoutePlanner::new(&g)
            .plan_from(&req, &ship, &stations)
            .route
            .unwrap();
        assert_eq!(route.capacity, 100);
        assert_eq!(route.cargo_utilization, 50.0);
        assert_eq!(route.steps.len(), 3);
        assert!(route.dropped_contract_ids.is_empty());
        // Caller's ledger keeps its own capacity.
        assert_eq!(ship.capacity(), 10);
    }
}

//! Nearest-next route builder.
//!
//! Every iteration looks at all outstanding actions (pickups that fit the
//! hold and have station stock, deliveries for cargo aboard) and takes the
//! closest one. Pickups are enumerated before deliveries and only a strictly
//! shorter candidate displaces the current best, so on exact ties the first
//! pickup in selection order wins.
//!
//! When nothing is feasible (remaining pickups overflow the hold and there
//! is nothing left to deliver) the walk stops and the remaining contracts are
//! left out of the route. Cost is O(n) per step, O(n²) overall.

use crate::inventory::ShipInventory;
use crate::location::Location;
use crate::route::{ResolvedContract, RouteStep, RouteWalk};
use crate::station::StationInventory;

#[derive(Debug, Clone, Copy)]
enum Move {
    /// Index into the pending-pickup list.
    Pickup(usize),
    /// Index into the aboard list.
    Deliver(usize),
}

/// Sequence `contracts` from `start`, mutating the given ledgers as it goes.
pub fn build_distance_route(
    start: &Location,
    contracts: &[ResolvedContract],
    ship: &mut ShipInventory,
    stations: &mut StationInventory,
) -> Vec<RouteStep> {
    let mut walk = RouteWalk::new(start, ship, stations);
    let mut available: Vec<usize> = (0..contracts.len()).collect();
    let mut aboard: Vec<usize> = Vec::new();

    while !available.is_empty() || !aboard.is_empty() {
        let mut best: Option<(Move, f64)> = None;

        for (slot, &i) in available.iter().enumerate() {
            let rc = &contracts[i];
            if !walk.can_load(rc) {
                continue;
            }
            let d = walk.current().distance_to(&rc.source);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((Move::Pickup(slot), d));
            }
        }
        for (slot, &i) in aboard.iter().enumerate() {
            let d = walk.current().distance_to(&contracts[i].destination);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((Move::Deliver(slot), d));
            }
        }

        let Some((next, d)) = best else {
            log::debug!(
                "No feasible move with {} pickups pending; stopping early",
                available.len()
            );
            break;
        };

        match next {
            Move::Pickup(slot) => {
                let i = available.remove(slot);
                if walk.pickup(&contracts[i], d) {
                    aboard.push(i);
                }
            }
            Move::Deliver(slot) => {
                let i = aboard.remove(slot);
                walk.deliver(&contracts[i], d);
            }
        }
    }

    walk.into_steps()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Contract, ContractStatus};
    use crate::route::RouteAction;

    fn loc(name: &str, x: f64) -> Location {
        Location {
            id: name.to_lowercase(),
            name: name.into(),
            x,
            y: 0.0,
            z: 0.0,
            system: "Stanton".into(),
        }
    }

    fn rc(id: &str, from: &Location, to: &Location, quantity: u32) -> ResolvedContract {
        ResolvedContract {
            contract: Contract {
                id: id.into(),
                record_id: String::new(),
                item: format!("item-{}", id),
                source: from.name.clone(),
                destination: to.name.clone(),
                quantity,
                reward: 1000.0,
                timestamp: String::new(),
                status: ContractStatus::Open,
            },
            source: from.clone(),
            destination: to.clone(),
        }
    }

    fn run(start: &Location, contracts: &[ResolvedContract], capacity: u32) -> Vec<RouteStep> {
        let plain: Vec<Contract> = contracts.iter().map(|c| c.contract.clone()).collect();
        let mut ship = ShipInventory::new(capacity);
        let mut stations = StationInventory::from_contracts(&plain);
        build_distance_route(start, contracts, &mut ship, &mut stations)
    }

    fn actions(steps: &[RouteStep]) -> Vec<(RouteAction, String)> {
        steps
            .iter()
            .map(|s| {
                (
                    s.action,
                    s.contract.as_ref().map(|c| c.id.clone()).unwrap_or_default(),
                )
            })
            .collect()
    }

    #[test]
    fn test_single_contract() {
        let (a, b) = (loc("A", 0.0), loc("B", 100.0));
        let steps = run(&a, &[rc("c1", &a, &b, 5)], 10);
        assert_eq!(
            actions(&steps),
            vec![
                (RouteAction::Start, String::new()),
                (RouteAction::Pickup, "c1".into()),
                (RouteAction::Deliver, "c1".into()),
            ]
        );
        assert_eq!(steps[2].cumulative_distance, 100.0);
    }

    #[test]
    fn test_prefers_nearest_action() {
        // Start at 0. c1: 10 → 100, c2: 20 → 30.
        // Expected: pick c1 (10), pick c2 (20), deliver c2 (30), deliver c1 (100).
        let start = loc("Start", 0.0);
        let (p1, d1) = (loc("P1", 10.0), loc("D1", 100.0));
        let (p2, d2) = (loc("P2", 20.0), loc("D2", 30.0));
        let steps = run(&start, &[rc("c1", &p1, &d1, 5), rc("c2", &p2, &d2, 5)], 20);
        let order: Vec<_> = actions(&steps).into_iter().skip(1).collect();
        assert_eq!(
            order,
            vec![
                (RouteAction::Pickup, "c1".to_string()),
                (RouteAction::Pickup, "c2".to_string()),
                (RouteAction::Deliver, "c2".to_string()),
                (RouteAction::Deliver, "c1".to_string()),
            ]
        );
        assert_eq!(steps.last().unwrap().cumulative_distance, 100.0);
    }

    #[test]
    fn test_capacity_forces_delivery_first() {
        // Both 8 SCU in a 10 SCU hold: second pickup waits for first delivery.
        let start = loc("Start", 0.0);
        let (p1, d1) = (loc("P1", 1.0), loc("D1", 50.0));
        let (p2, d2) = (loc("P2", 2.0), loc("D2", 60.0));
        let steps = run(&start, &[rc("c1", &p1, &d1, 8), rc("c2", &p2, &d2, 8)], 10);
        let order: Vec<_> = actions(&steps).into_iter().skip(1).collect();
        assert_eq!(order[0], (RouteAction::Pickup, "c1".to_string()));
        assert_eq!(order[1], (RouteAction::Deliver, "c1".to_string()));
        assert_eq!(order[2], (RouteAction::Pickup, "c2".to_string()));
        assert_eq!(order[3], (RouteAction::Deliver, "c2".to_string()));
        assert!(steps.iter().all(|s| s.cargo_on_board <= 10));
    }

    #[test]
    fn test_stops_when_nothing_fits() {
        let (a, b) = (loc("A", 0.0), loc("B", 10.0));
        let steps = run(&a, &[rc("big", &a, &b, 50)], 30);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].action, RouteAction::Start);
    }

    #[test]
    fn test_tie_prefers_pickup_in_input_order() {
        let start = loc("Start", 0.0);
        let left = loc("Left", -10.0);
        let right = loc("Right", 10.0);
        let far = loc("Far", 1000.0);
        let steps = run(&start, &[rc("r", &right, &far, 1), rc("l", &left, &far, 1)], 10);
        assert_eq!(actions(&steps)[1], (RouteAction::Pickup, "r".to_string()));
    }

    #[test]
    fn test_pickup_before_delivery_for_every_contract() {
        let start = loc("Start", 0.0);
        let places: Vec<Location> = (0..6)
            .map(|i| loc(&format!("L{}", i), i as f64 * 7.0))
            .collect();
        let contracts = vec![
            rc("a", &places[5], &places[0], 3),
            rc("b", &places[1], &places[4], 4),
            rc("c", &places[3], &places[2], 2),
        ];
        let steps = run(&start, &contracts, 10);
        let index_of = |action: RouteAction, id: &str| {
            steps
                .iter()
                .position(|s| s.action == action && s.contract.as_ref().is_some_and(|c| c.id == id))
                .unwrap()
        };
        for c in &contracts {
            let pick = index_of(RouteAction::Pickup, &c.contract.id);
            let drop = index_of(RouteAction::Deliver, &c.contract.id);
            assert!(pick < drop);
            assert!(steps[pick].cumulative_distance <= steps[drop].cumulative_distance);
        }
    }

    #[test]
    fn test_station_stock_gates_pickup() {
        let (a, b) = (loc("A", 0.0), loc("B", 10.0));
        let contracts = vec![rc("c1", &a, &b, 5)];
        let mut ship = ShipInventory::new(10);
        let mut stations = StationInventory::new();
        let steps = build_distance_route(&a, &contracts, &mut ship, &mut stations);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_ledgers_settle_after_route() {
        let (a, b) = (loc("A", 0.0), loc("B", 10.0));
        let contracts = vec![rc("c1", &a, &b, 5)];
        let mut ship = ShipInventory::new(10);
        let mut stations = StationInventory::from_contracts(&[contracts[0].contract.clone()]);
        build_distance_route(&a, &contracts, &mut ship, &mut stations);
        assert_eq!(ship.current_scu(), 0);
        assert_eq!(stations.available("A", "item-c1"), 0);
        assert_eq!(stations.available("B", "item-c1"), 5);
    }
}

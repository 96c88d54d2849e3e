//! Fewest-stops route builder.
//!
//! Contracts are bucketed by the physical location of their pickup and of
//! their delivery (lower-cased resolved name). A location that only receives
//! deliveries still gets a bucket. Buckets are then ordered once, nearest
//! next from the start, and each is visited exactly once in that order:
//!
//! 1. every pickup at the bucket that is not done yet, fits the hold and has
//!    station stock;
//! 2. every delivery at the bucket whose pickup is already done.
//!
//! There is no backtracking. A pickup refused at its only visit is never
//! retried, and a delivery whose bucket comes before its pickup's bucket is
//! never made. When a contract's pickup and delivery share a bucket, the
//! pickup loop running first is what puts the pickup ahead of the delivery.

use std::collections::{HashMap, HashSet};

use crate::inventory::ShipInventory;
use crate::location::Location;
use crate::route::{ResolvedContract, RouteStep, RouteWalk};
use crate::station::StationInventory;

/// Contracts touching one physical location.
#[derive(Debug, Clone)]
pub struct LocationGroup {
    pub location: Location,
    /// Indices of contracts picked up here.
    pub pickups: Vec<usize>,
    /// Indices of contracts delivered here.
    pub deliveries: Vec<usize>,
}

/// Bucket contracts by location, in order of first appearance.
pub fn group_by_location(contracts: &[ResolvedContract]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut slot = |location: &Location, groups: &mut Vec<LocationGroup>| -> usize {
        *index.entry(location.group_key()).or_insert_with(|| {
            groups.push(LocationGroup {
                location: location.clone(),
                pickups: Vec::new(),
                deliveries: Vec::new(),
            });
            groups.len() - 1
        })
    };

    for (i, rc) in contracts.iter().enumerate() {
        let pickup_slot = slot(&rc.source, &mut groups);
        groups[pickup_slot].pickups.push(i);
        let delivery_slot = slot(&rc.destination, &mut groups);
        groups[delivery_slot].deliveries.push(i);
    }
    groups
}

/// Greedy nearest-next ordering over groups, computed once from `start`.
pub fn visit_order(start: &Location, groups: &[LocationGroup]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..groups.len()).collect();
    let mut order = Vec::with_capacity(groups.len());
    let mut here = start;

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_d = f64::INFINITY;
        for (slot, &g) in remaining.iter().enumerate() {
            let d = here.distance_to(&groups[g].location);
            if d < best_d {
                best_d = d;
                best_slot = slot;
            }
        }
        let g = remaining.remove(best_slot);
        order.push(g);
        here = &groups[g].location;
    }
    order
}

/// Sequence `contracts` from `start` visiting each location group once.
pub fn build_min_stops_route(
    start: &Location,
    contracts: &[ResolvedContract],
    ship: &mut ShipInventory,
    stations: &mut StationInventory,
) -> Vec<RouteStep> {
    let groups = group_by_location(contracts);
    let order = visit_order(start, &groups);
    let mut walk = RouteWalk::new(start, ship, stations);
    let mut picked: HashSet<usize> = HashSet::new();
    let mut delivered: HashSet<usize> = HashSet::new();

    for g in order {
        let group = &groups[g];
        // Travel is charged to the first action taken at the group.
        let mut travel = Some(walk.current().distance_to(&group.location));

        for &i in &group.pickups {
            if picked.contains(&i) || !walk.can_load(&contracts[i]) {
                continue;
            }
            if walk.pickup(&contracts[i], travel.unwrap_or(0.0)) {
                travel = None;
                picked.insert(i);
            }
        }

        for &i in &group.deliveries {
            if !picked.contains(&i) || delivered.contains(&i) {
                continue;
            }
            if walk.deliver(&contracts[i], travel.unwrap_or(0.0)) {
                travel = None;
                delivered.insert(i);
            }
        }

        if travel.is_some() {
            log::debug!("Nothing actionable at {}; skipping visit", group.location.name);
        }
    }

    let skipped = contracts.len() - delivered.len();
    if skipped > 0 {
        log::debug!("{} contracts not completed by fewest-stops walk", skipped);
    }
    walk.into_steps()
}

//! Pure haul route planning logic for HaulPlan.
//!
//! This crate contains the planning engine independent of any UI, capture
//! or storage layer. Functions take plain data and return results, making
//! them unit-testable and usable from a native harness or any front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Fuel/time conversion constants and validation |
//! | [`contract`] | Contracts, status, reward-greedy selection |
//! | [`distance_route`] | Nearest-next pickup/delivery route builder |
//! | [`inventory`] | Ship hold ledger with checked and forced pickup |
//! | [`loadout`] | What-if replay of a route under per-stop cargo choices |
//! | [`location`] | Gazetteer loading and substring name resolution |
//! | [`min_stops`] | Location-clustering fewest-stops route builder |
//! | [`planner`] | Resolve → select → sequence → summarize pipeline |
//! | [`route`] | Route steps, strategies, aggregate statistics |
//! | [`station`] | Station stock ledger seeded from contracts |

pub mod config;
pub mod contract;
pub mod distance_route;
pub mod inventory;
pub mod loadout;
pub mod location;
pub mod min_stops;
pub mod planner;
pub mod route;
pub mod station;

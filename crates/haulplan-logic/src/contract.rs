//! Hauling contracts and reward-greedy selection under a capacity ceiling.
//!
//! Selection sorts by reward (highest first) and accepts each contract that
//! still fits the remaining hold space. Contracts that would overflow are
//! skipped, and smaller contracts further down the list are still considered.
//! This is first-fit, not an optimal 0/1 knapsack: a lower-reward combination
//! can beat the greedy pick on total reward.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a contract as reported by the contract source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[default]
    Open,
    Accepted,
    Completed,
    Abandoned,
}

impl ContractStatus {
    /// Whether a contract in this state still needs hauling.
    pub fn is_plannable(self) -> bool {
        matches!(self, ContractStatus::Open | ContractStatus::Accepted)
    }
}

/// A single pickup → delivery job. The planner never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub record_id: String,
    pub item: String,
    pub source: String,
    pub destination: String,
    /// Cargo units (SCU).
    pub quantity: u32,
    pub reward: f64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: ContractStatus,
}

/// Pick the reward-maximizing subset that fits `capacity`, greedily.
///
/// Ties on reward keep their input order. Returns an empty list when
/// `capacity <= 0` or nothing fits.
pub fn select_contracts(contracts: &[Contract], capacity: i64) -> Vec<Contract> {
    select_indices(contracts, capacity)
        .into_iter()
        .map(|i| contracts[i].clone())
        .collect()
}

/// Positions in `contracts` chosen by [`select_contracts`], in selection
/// order. Contract ids are not assumed unique.
pub fn select_indices(contracts: &[Contract], capacity: i64) -> Vec<usize> {
    if capacity <= 0 {
        return Vec::new();
    }

    let mut ranked: Vec<usize> = (0..contracts.len()).collect();
    ranked.sort_by(|&a, &b| contracts[b].reward.total_cmp(&contracts[a].reward));

    let mut remaining = capacity as u64;
    let mut selected = Vec::new();
    for i in ranked {
        let quantity = contracts[i].quantity as u64;
        if quantity <= remaining {
            remaining -= quantity;
            selected.push(i);
        }
    }
    selected
}

/// Sum of rewards.
pub fn total_reward(contracts: &[Contract]) -> f64 {
    contracts.iter().map(|c| c.reward).sum()
}

/// Sum of quantities in SCU.
pub fn total_quantity(contracts: &[Contract]) -> u64 {
    contracts.iter().map(|c| c.quantity as u64).sum()
}

//! Batch runs: many seeds under one policy, and the canonical policy comparison table.
use serde::{Deserialize, Serialize};

use super::{SimulationRequest, SimulationSummary, SwmConfig, simulate_seeded};
use crate::error::Result;
use crate::policy::PolicySpec;

/// The four reference policies compared side by side.
pub const CANONICAL_POLICIES: [(&str, [f64; 2]); 4] = [
    ("Coin-Toss", [0.0, 0.0]),
    ("Suppress-All", [20.0, 0.0]),
    ("Let-Burn", [-20.0, 0.0]),
    ("Known", [0.0, 20.0]),
];

/// One row of the canonical policy comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyComparison {
    pub name: String,
    pub parameters: Vec<f64>,
    pub average_reward: f64,
    pub reward_std: f64,
    pub suppression_rate: f64,
    pub average_probability: f64,
    pub joint_probability: f64,
}

impl PolicyComparison {
    #[must_use]
    pub fn from_summary(name: &str, summary: &SimulationSummary) -> Self {
        Self {
            name: name.to_string(),
            parameters: summary.generation_policy.clone(),
            average_reward: summary.average_reward,
            reward_std: summary.reward_std,
            suppression_rate: summary.suppression_rate,
            average_probability: summary.average_probability,
            joint_probability: summary.joint_probability,
        }
    }
}

/// Run every canonical policy with the same seed and timestep count.
///
/// # Errors
///
/// Propagates simulation errors (zero timesteps, invalid configuration).
pub fn compare_canonical_policies(
    timesteps: u32,
    seed: u64,
    config: &SwmConfig,
) -> Result<Vec<PolicyComparison>> {
    CANONICAL_POLICIES
        .iter()
        .map(|(name, parameters)| {
            let request = SimulationRequest::new(parameters.to_vec(), timesteps, seed);
            let summary = simulate_seeded(&request, config)?;
            log::info!(
                "{name}: avg reward {:.2}, suppression rate {:.2}",
                summary.average_reward,
                summary.suppression_rate
            );
            Ok(PolicyComparison::from_summary(name, &summary))
        })
        .collect()
}

/// Simulate `count` pathways under one policy with consecutive seeds from `start_seed`.
///
/// # Errors
///
/// Propagates the first simulation error.
pub fn simulate_batch(
    policy: &PolicySpec,
    timesteps: u32,
    start_seed: u64,
    count: u32,
    config: &SwmConfig,
) -> Result<Vec<SimulationSummary>> {
    (0..u64::from(count))
        .map(|offset| {
            let request =
                SimulationRequest::new(policy.clone(), timesteps, start_seed.wrapping_add(offset));
            simulate_seeded(&request, config)
        })
        .collect()
}

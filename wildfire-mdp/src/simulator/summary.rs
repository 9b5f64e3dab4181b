//! Per-step trajectory records and the aggregate summary of a finished simulation.
use serde::{Deserialize, Serialize};

use super::{ChoiceMode, SwmConfig};
use crate::constants::{
    SIMULATOR_VERSION, TIMBER_MAX, TIMBER_MIN, VULNERABILITY_MAX, VULNERABILITY_MIN,
};
use crate::error::{PathwayError, Result};
use crate::numbers::count_to_f64;

/// Everything observed during one timestep, recorded before the transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub vulnerability: f64,
    pub timber_value: f64,
    /// Uniform event draw; the only feature the policy sees.
    pub event_value: f64,
    /// Whether suppression was chosen.
    pub action: bool,
    /// Probability of the choice that was made.
    pub choice_prob: f64,
    /// Probability of suppressing under the generating policy.
    pub policy_value: f64,
    pub reward: f64,
    pub habitat_value: f64,
    pub timestep: u32,
}

/// Aggregate statistics of one simulated pathway plus an echo of its inputs.
///
/// Values are stored unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub id: u64,
    pub version: String,
    pub timesteps: u32,
    pub generation_policy: Vec<f64>,
    pub choice_mode: ChoiceMode,
    pub average_reward: f64,
    pub total_reward: f64,
    pub reward_std: f64,
    pub average_habitat: f64,
    pub suppressions: u32,
    pub suppression_rate: f64,
    /// Product of every `choice_prob`: probability of this exact trajectory.
    pub joint_probability: f64,
    pub average_probability: f64,
    pub vulnerability_min: f64,
    pub vulnerability_max: f64,
    pub timber_min: f64,
    pub timber_max: f64,
    pub config: SwmConfig,
    #[serde(default)]
    pub states: Vec<StepRecord>,
}

impl SimulationSummary {
    /// Aggregate the recorded steps of a finished run.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::NoTimesteps`] when `states` is empty.
    pub fn from_records(
        id: u64,
        generation_policy: Vec<f64>,
        choice_mode: ChoiceMode,
        config: SwmConfig,
        states: Vec<StepRecord>,
    ) -> Result<Self> {
        if states.is_empty() {
            return Err(PathwayError::NoTimesteps);
        }
        let count = count_to_f64(states.len());
        let timesteps = u32::try_from(states.len()).unwrap_or(u32::MAX);

        let total_reward: f64 = states.iter().map(|step| step.reward).sum();
        let average_reward = total_reward / count;
        let variance = states
            .iter()
            .map(|step| (step.reward - average_reward).powi(2))
            .sum::<f64>()
            / count;
        let average_habitat = states.iter().map(|step| step.habitat_value).sum::<f64>() / count;

        let suppressions = states.iter().filter(|step| step.action).count();
        let joint_probability = states.iter().map(|step| step.choice_prob).product();
        let average_probability = states.iter().map(|step| step.choice_prob).sum::<f64>() / count;

        Ok(Self {
            id,
            version: SIMULATOR_VERSION.to_string(),
            timesteps,
            generation_policy,
            choice_mode,
            average_reward,
            total_reward,
            reward_std: variance.sqrt(),
            average_habitat,
            suppressions: u32::try_from(suppressions).unwrap_or(u32::MAX),
            suppression_rate: count_to_f64(suppressions) / count,
            joint_probability,
            average_probability,
            vulnerability_min: VULNERABILITY_MIN,
            vulnerability_max: VULNERABILITY_MAX,
            timber_min: TIMBER_MIN,
            timber_max: TIMBER_MAX,
            config,
            states,
        })
    }

    /// Number of steps in which suppression was not chosen.
    #[must_use]
    pub fn let_burns(&self) -> u32 {
        self.timesteps.saturating_sub(self.suppressions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(
        timestep: u32,
        action: bool,
        choice_prob: f64,
        reward: f64,
        habitat: f64,
    ) -> StepRecord {
        StepRecord {
            vulnerability: 0.5,
            timber_value: 5.0,
            event_value: 0.4,
            action,
            choice_prob,
            policy_value: if action { choice_prob } else { 1.0 - choice_prob },
            reward,
            habitat_value: habitat,
            timestep,
        }
    }

    #[test]
    fn aggregates_match_hand_computation() {
        let states = vec![
            step(0, true, 0.8, 6.0, 4.0),
            step(1, false, 0.5, -24.0, 5.0),
            step(2, true, 0.25, 9.0, 6.0),
        ];
        let summary = SimulationSummary::from_records(
            7,
            vec![0.0, 1.0],
            ChoiceMode::Probabilistic,
            SwmConfig::default(),
            states,
        )
        .unwrap();

        assert_eq!(summary.timesteps, 3);
        assert_eq!(summary.suppressions, 2);
        assert_eq!(summary.let_burns(), 1);
        assert!((summary.total_reward + 9.0).abs() < 1e-12);
        assert!((summary.average_reward + 3.0).abs() < 1e-12);
        // deviations 9, -21, 12 -> (81 + 441 + 144) / 3 = 222
        assert!((summary.reward_std - 222.0_f64.sqrt()).abs() < 1e-12);
        assert!((summary.average_habitat - 5.0).abs() < 1e-12);
        assert!((summary.suppression_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.joint_probability - 0.1).abs() < 1e-12);
        assert!((summary.average_probability - 1.55 / 3.0).abs() < 1e-12);
        assert_eq!(summary.version, SIMULATOR_VERSION);
    }

    #[test]
    fn empty_trajectory_is_rejected() {
        let result = SimulationSummary::from_records(
            0,
            vec![0.0, 0.0],
            ChoiceMode::Deterministic,
            SwmConfig::default(),
            Vec::new(),
        );
        assert_eq!(result, Err(PathwayError::NoTimesteps));
    }
}

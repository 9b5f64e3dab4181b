//! Adapter for summaries produced by this crate's wildfire simulator.
use super::{TrajectorySource, metadata_from};
use crate::constants::SIMULATOR_POLICY_LENGTH;
use crate::error::{PathwayError, Result};
use crate::pathway::{Event, Pathway, RewardVec};
use crate::simulator::SimulationSummary;

pub const BUDGET_CHANNEL: &str = "budget";
pub const HABITAT_CHANNEL: &str = "habitat";

/// Mix of the budget (reward) and habitat channels reported per event.
///
/// A ratio of `0` reports pure budget, `1` pure habitat; anything in between reports both
/// weighted components, habitat first, so that their sum is the blended reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBlend {
    habitat_ratio: f64,
}

impl RewardBlend {
    /// # Errors
    ///
    /// Returns [`PathwayError::InvalidBlendRatio`] unless `habitat_ratio` lies in `[0, 1]`.
    pub fn new(habitat_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&habitat_ratio) {
            return Err(PathwayError::InvalidBlendRatio(habitat_ratio));
        }
        Ok(Self { habitat_ratio })
    }

    #[must_use]
    pub const fn budget() -> Self {
        Self { habitat_ratio: 0.0 }
    }

    #[must_use]
    pub const fn habitat() -> Self {
        Self { habitat_ratio: 1.0 }
    }

    #[must_use]
    pub const fn habitat_ratio(self) -> f64 {
        self.habitat_ratio
    }

    #[must_use]
    pub fn channels(self) -> Vec<String> {
        if self.habitat_ratio <= 0.0 {
            vec![BUDGET_CHANNEL.to_string()]
        } else if self.habitat_ratio >= 1.0 {
            vec![HABITAT_CHANNEL.to_string()]
        } else {
            vec![HABITAT_CHANNEL.to_string(), BUDGET_CHANNEL.to_string()]
        }
    }

    #[must_use]
    pub fn rewards(self, budget: f64, habitat: f64) -> RewardVec {
        let ratio = self.habitat_ratio;
        if ratio <= 0.0 {
            RewardVec::from_slice(&[budget])
        } else if ratio >= 1.0 {
            RewardVec::from_slice(&[habitat])
        } else {
            RewardVec::from_slice(&[habitat * ratio, budget * (1.0 - ratio)])
        }
    }
}

impl Default for RewardBlend {
    fn default() -> Self {
        Self::budget()
    }
}

/// A simulator summary paired with the reward blend to report.
#[derive(Debug, Clone, Copy)]
pub struct SwmTrajectory<'a> {
    pub summary: &'a SimulationSummary,
    pub blend: RewardBlend,
}

impl<'a> SwmTrajectory<'a> {
    #[must_use]
    pub const fn new(summary: &'a SimulationSummary, blend: RewardBlend) -> Self {
        Self { summary, blend }
    }
}

impl TrajectorySource for SwmTrajectory<'_> {
    fn to_pathway(&self) -> Result<Pathway> {
        let summary = self.summary;
        let mut pathway = Pathway::new(SIMULATOR_POLICY_LENGTH).with_id(summary.id);
        pathway.net_value = summary.total_reward;
        pathway.actions_1_taken = summary.suppressions;
        pathway.actions_0_taken = summary.let_burns();
        pathway.generation_joint_prob = summary.joint_probability;
        pathway.set_generation_parameters(&summary.generation_policy, false)?;
        pathway.reward_channels = self.blend.channels();

        pathway.events.reserve(summary.states.len());
        for step in &summary.states {
            let mut event = Event::new(step.timestep, [1.0, step.event_value]);
            event.action = step.action;
            event.decision_prob = step.choice_prob;
            event.action_prob = step.policy_value;
            event.rewards = self.blend.rewards(step.reward, step.habitat_value);
            pathway.push_event(event);
        }

        pathway.metadata = Some(metadata_from(summary, &["states"])?);
        Ok(pathway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyPreset;
    use crate::simulator::{SimulationRequest, SwmConfig, simulate_seeded};

    fn summary() -> SimulationSummary {
        simulate_seeded(
            &SimulationRequest::new(PolicyPreset::CoinToss, 60, 17),
            &SwmConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn scalar_fields_copy_exactly() {
        let summary = summary();
        let pathway = SwmTrajectory::new(&summary, RewardBlend::budget())
            .to_pathway()
            .unwrap();
        assert_eq!(pathway.id, 17);
        assert_eq!(pathway.net_value.to_bits(), summary.total_reward.to_bits());
        assert_eq!(pathway.actions_1_taken, summary.suppressions);
        assert_eq!(pathway.actions_0_taken, 60 - summary.suppressions);
        assert_eq!(
            pathway.generation_joint_prob.to_bits(),
            summary.joint_probability.to_bits()
        );
        assert_eq!(pathway.generation_policy_parameters(), &[0.0, 0.0]);
        assert_eq!(pathway.len(), 60);
    }

    #[test]
    fn events_carry_bias_and_event_value() {
        let summary = summary();
        let pathway = SwmTrajectory::new(&summary, RewardBlend::budget())
            .to_pathway()
            .unwrap();
        for (event, step) in pathway.events.iter().zip(&summary.states) {
            assert_eq!(event.state(), &[1.0, step.event_value]);
            assert_eq!(event.sequence_index, step.timestep);
            assert_eq!(event.action, step.action);
            assert!((event.decision_prob - step.choice_prob).abs() < f64::EPSILON);
            assert!((event.action_prob - step.policy_value).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn blend_extremes_report_single_channels() {
        let summary = summary();
        let budget = SwmTrajectory::new(&summary, RewardBlend::new(0.0).unwrap())
            .to_pathway()
            .unwrap();
        let habitat = SwmTrajectory::new(&summary, RewardBlend::new(1.0).unwrap())
            .to_pathway()
            .unwrap();
        assert_eq!(budget.reward_channels, vec![BUDGET_CHANNEL]);
        assert_eq!(habitat.reward_channels, vec![HABITAT_CHANNEL]);
        let paired = budget.events.iter().zip(&habitat.events);
        for ((b, h), step) in paired.zip(&summary.states) {
            assert_eq!(b.rewards.as_slice(), &[step.reward]);
            assert_eq!(h.rewards.as_slice(), &[step.habitat_value]);
        }
    }

    #[test]
    fn partial_blend_sums_to_weighted_mix() {
        let blend = RewardBlend::new(0.25).unwrap();
        let rewards = blend.rewards(8.0, 4.0);
        assert_eq!(rewards.as_slice(), &[1.0, 6.0]);
        assert_eq!(blend.channels(), vec![HABITAT_CHANNEL, BUDGET_CHANNEL]);
        assert_eq!(RewardBlend::new(1.5), Err(PathwayError::InvalidBlendRatio(1.5)));
        assert!(RewardBlend::new(f64::NAN).is_err());
    }

    #[test]
    fn budget_net_value_matches_recomputation() {
        let summary = summary();
        let mut pathway = SwmTrajectory::new(&summary, RewardBlend::budget())
            .to_pathway()
            .unwrap();
        let copied = pathway.net_value;
        let recomputed = pathway.recompute_net_value();
        assert!((copied - recomputed).abs() < 1e-9);
    }

    #[test]
    fn leftover_summary_fields_become_metadata() {
        let summary = summary();
        let pathway = SwmTrajectory::new(&summary, RewardBlend::budget())
            .to_pathway()
            .unwrap();
        let metadata = pathway.metadata.expect("metadata retained");
        assert!(!metadata.contains_key("states"));
        assert_eq!(metadata["version"], serde_json::json!("1.3"));
        assert_eq!(metadata["timesteps"], serde_json::json!(60));
        assert!(metadata["config"].get("severe_burn_cost").is_some());
    }
}

//! Adapter for pathways written by the legacy single-event simulator.
//!
//! Those files use human-readable keys and store each step as a positional 6-tuple
//! `[event_value, choice, choice_prob, policy_value, state_value, timestep]`. The state
//! value is the only reward, reported on the budget channel.
use serde::{Deserialize, Serialize};

use super::TrajectorySource;
use super::swm::BUDGET_CHANNEL;
use crate::constants::SIMULATOR_POLICY_LENGTH;
use crate::error::{PathwayError, Result};
use crate::numbers::is_probability;
use crate::pathway::{Event, Pathway, RewardVec};

type StateTuple = (f64, bool, f64, f64, f64, u32);

/// One legacy step, read from and written back to its positional form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateTuple", into = "StateTuple")]
pub struct SwimmState {
    pub event_value: f64,
    pub choice: bool,
    pub choice_prob: f64,
    pub policy_value: f64,
    pub state_value: f64,
    pub timestep: u32,
}

impl From<StateTuple> for SwimmState {
    fn from(
        (event_value, choice, choice_prob, policy_value, state_value, timestep): StateTuple,
    ) -> Self {
        Self {
            event_value,
            choice,
            choice_prob,
            policy_value,
            state_value,
            timestep,
        }
    }
}

impl From<SwimmState> for StateTuple {
    fn from(state: SwimmState) -> Self {
        (
            state.event_value,
            state.choice,
            state.choice_prob,
            state.policy_value,
            state.state_value,
            state.timestep,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwimmPathway {
    #[serde(rename = "ID Number")]
    pub id: u64,
    #[serde(rename = "Total Pathway Value")]
    pub total_value: f64,
    #[serde(rename = "Suppressions")]
    pub suppressions: u32,
    #[serde(rename = "Timesteps")]
    pub timesteps: u32,
    #[serde(rename = "Joint Probability")]
    pub joint_probability: f64,
    #[serde(rename = "Generation Policy")]
    pub generation_policy: Vec<f64>,
    #[serde(rename = "States")]
    pub states: Vec<SwimmState>,
}

impl SwimmPathway {
    fn check_probabilities(&self) -> Result<()> {
        for (index, state) in self.states.iter().enumerate() {
            if let Some(value) = [state.choice_prob, state.policy_value]
                .into_iter()
                .find(|&v| !is_probability(v))
            {
                return Err(PathwayError::ProbabilityOutOfRange { index, value });
            }
        }
        Ok(())
    }
}

impl TrajectorySource for SwimmPathway {
    fn to_pathway(&self) -> Result<Pathway> {
        self.check_probabilities()?;
        let mut pathway = Pathway::new(SIMULATOR_POLICY_LENGTH).with_id(self.id);
        pathway.net_value = self.total_value;
        pathway.actions_1_taken = self.suppressions;
        pathway.actions_0_taken = self.timesteps.saturating_sub(self.suppressions);
        pathway.generation_joint_prob = self.joint_probability;
        pathway.set_generation_parameters(&self.generation_policy, false)?;
        pathway.reward_channels = vec![BUDGET_CHANNEL.to_string()];

        pathway.events.reserve(self.states.len());
        for (position, state) in self.states.iter().enumerate() {
            // Legacy files number events by position, not by the stored timestep.
            let sequence_index = u32::try_from(position).unwrap_or(u32::MAX);
            let mut event = Event::new(sequence_index, [1.0, state.event_value]);
            event.action = state.choice;
            event.decision_prob = state.choice_prob;
            event.action_prob = state.policy_value;
            event.rewards = RewardVec::from_slice(&[state.state_value]);
            pathway.push_event(event);
        }
        Ok(pathway)
    }
}

//! Adapter for landscape-scale ignition records.
//!
//! These come from a spatial fire model whose policy scores a richer feature vector per
//! ignition (weather, fuel, timber and so on) rather than a single event draw. Rewards are
//! reported on two channels: suppression spending (as a negative) and logging revenue.
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{TrajectorySource, metadata_from};
use crate::error::{PathwayError, Result};
use crate::numbers::is_probability;
use crate::pathway::{Event, Pathway, RewardVec};

pub const SUPPRESSION_CHANNEL: &str = "suppression";
pub const LOGGING_CHANNEL: &str = "logging";

/// One ignition and the policy's response to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnitionRecord {
    pub year: u32,
    pub location: (f64, f64),
    /// Feature vector scored by the policy, bias term included.
    pub features: Vec<f64>,
    /// Whether the fire was suppressed.
    pub policy_choice: bool,
    /// Probability of suppressing under the generating policy.
    pub policy_prob: f64,
    pub timber_loss: f64,
    pub cells_burned: f64,
    pub burn_time: f64,
}

/// Landscape and model settings carried along as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeSettings {
    pub width: u32,
    pub height: u32,
    pub fire_reach: f64,
    pub fire_average_end_day: f64,
    pub suppression_effect_percent: f64,
    pub suppression_cost_per_cell: f64,
    pub suppression_cost_per_day: f64,
    pub growth_fuel_accumulation: f64,
    pub growth_model: u32,
    pub logging_block_width: f64,
    pub logging_min_value: f64,
    pub logging_slash_remaining: f64,
    pub logging_percent_of_increment: f64,
    pub logging_max_cuts: u32,
}

/// A full landscape pathway: one ignition per year plus yearly totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnitionPathway {
    pub id: u64,
    pub policy_parameters: Vec<f64>,
    pub net_value: f64,
    pub ignitions: Vec<IgnitionRecord>,
    pub yearly_suppression_costs: Vec<f64>,
    pub yearly_logging_totals: Vec<f64>,
    pub yearly_growth_totals: Vec<f64>,
    pub settings: LandscapeSettings,
}

impl IgnitionPathway {
    fn check_series(&self) -> Result<()> {
        let expected = self.ignitions.len();
        for series in [
            &self.yearly_suppression_costs,
            &self.yearly_logging_totals,
            &self.yearly_growth_totals,
        ] {
            if series.len() != expected {
                return Err(PathwayError::InputShape {
                    expected,
                    actual: series.len(),
                });
            }
        }
        Ok(())
    }

    fn check_probabilities(&self) -> Result<()> {
        if let Some((index, ignition)) = self
            .ignitions
            .iter()
            .enumerate()
            .find(|(_, ignition)| !is_probability(ignition.policy_prob))
        {
            return Err(PathwayError::ProbabilityOutOfRange {
                index,
                value: ignition.policy_prob,
            });
        }
        Ok(())
    }
}

impl TrajectorySource for IgnitionPathway {
    fn to_pathway(&self) -> Result<Pathway> {
        self.check_series()?;
        self.check_probabilities()?;
        let mut pathway = Pathway::new(self.policy_parameters.len()).with_id(self.id);
        pathway.net_value = self.net_value;
        pathway.reward_channels = vec![
            SUPPRESSION_CHANNEL.to_string(),
            LOGGING_CHANNEL.to_string(),
        ];

        for (year_index, ignition) in self.ignitions.iter().enumerate() {
            let sequence_index = u32::try_from(year_index).unwrap_or(u32::MAX);
            let mut event = Event::new(sequence_index, ignition.features.iter().copied());
            event.action = ignition.policy_choice;
            event.action_prob = ignition.policy_prob;
            event.decision_prob = if ignition.policy_choice {
                ignition.policy_prob
            } else {
                1.0 - ignition.policy_prob
            };
            event.rewards = RewardVec::from_slice(&[
                -self.yearly_suppression_costs[year_index],
                self.yearly_logging_totals[year_index],
            ]);
            event.metadata.extend([
                (
                    "growth_total".to_string(),
                    json!(self.yearly_growth_totals[year_index]),
                ),
                ("location_x".to_string(), json!(ignition.location.0)),
                ("location_y".to_string(), json!(ignition.location.1)),
                ("year".to_string(), json!(ignition.year)),
                ("timber_loss".to_string(), json!(ignition.timber_loss)),
                ("cells_burned".to_string(), json!(ignition.cells_burned)),
                ("burn_time".to_string(), json!(ignition.burn_time)),
            ]);
            pathway.push_event(event);
        }

        pathway.recount_actions();
        pathway.set_generation_parameters(&self.policy_parameters, true)?;
        pathway.metadata = Some(metadata_from(&self.settings, &[])?);
        Ok(pathway)
    }
}

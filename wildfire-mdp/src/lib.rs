//! Wildfire MDP
//!
//! Policy-evaluation toolkit for wildfire suppression decisions: logistic policies,
//! generic decision pathways, a seeded wildfire Markov decision process simulator,
//! adapters from simulator output formats, and KL divergence between a candidate policy
//! and the policies that generated a set of pathways.

pub mod adapters;
pub mod constants;
pub mod divergence;
pub mod error;
pub mod numbers;
pub mod pathway;
pub mod policy;
pub mod simulator;

// Re-export commonly used types
pub use adapters::{
    IgnitionPathway, IgnitionRecord, LandscapeSettings, RewardBlend, SwimmPathway, SwimmState,
    SwmTrajectory, TrajectorySource,
};
pub use divergence::{PooledProbabilities, kl_divergence};
pub use error::{ConfigError, PathwayError, Result};
pub use pathway::{Event, FeatureVec, Metadata, Pathway, RewardVec};
pub use policy::{Policy, PolicyPreset, PolicySpec};
pub use simulator::{
    CANONICAL_POLICIES, ChoiceMode, HabitatConfig, LandscapeState, PolicyComparison,
    SimulationRequest, SimulationSummary, StepRecord, SwmConfig, WildfireSession,
    compare_canonical_policies, simulate, simulate_batch, simulate_seeded,
};

/// Convert a batch of simulator summaries into pathways with a shared reward blend.
///
/// # Errors
///
/// Propagates the first adapter error.
pub fn pathways_from_summaries(
    summaries: &[SimulationSummary],
    blend: RewardBlend,
) -> Result<Vec<Pathway>> {
    summaries
        .iter()
        .map(|summary| SwmTrajectory::new(summary, blend).to_pathway())
        .collect()
}

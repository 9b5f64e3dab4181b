//! Generic decision pathways: ordered events plus the bookkeeping of the policy that
//! generated them.
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::error::{PathwayError, Result};
use crate::numbers::{index_to_exponent, to_feature_vector};
use crate::policy::Policy;

/// Free-form, informational key/value data. Never consulted by any computation.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Feature vectors are short (bias + a handful of features) and stored inline.
pub type FeatureVec = SmallVec<[f64; 4]>;

/// One value per reward channel.
pub type RewardVec = SmallVec<[f64; 2]>;

/// One timestep of a pathway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Position within the owning pathway; used as the discount exponent.
    pub sequence_index: u32,
    state: FeatureVec,
    /// Whether the controllable action was taken.
    pub action: bool,
    /// Probability of the action actually taken under the generating policy.
    pub action_prob: f64,
    /// Probability of the realised outcome in the producer's own terms.
    pub decision_prob: f64,
    #[serde(default)]
    pub rewards: RewardVec,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Event {
    #[must_use]
    pub fn new(sequence_index: u32, state: impl IntoIterator<Item = f64>) -> Self {
        Self {
            sequence_index,
            state: state.into_iter().collect(),
            action: false,
            action_prob: 0.5,
            decision_prob: 0.5,
            rewards: RewardVec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Build an event from integer or float features of any primitive width.
    #[must_use]
    pub fn from_values<T: ToPrimitive + Copy>(sequence_index: u32, values: &[T]) -> Self {
        Self::new(sequence_index, to_feature_vector(values))
    }

    #[must_use]
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    #[must_use]
    pub fn state_length(&self) -> usize {
        self.state.len()
    }

    pub fn set_state(&mut self, state: impl IntoIterator<Item = f64>) {
        self.state = state.into_iter().collect();
    }

    /// Sum of all reward components for this event.
    #[must_use]
    pub fn reward_total(&self) -> f64 {
        self.rewards.iter().sum()
    }
}

/// An ordered trajectory of events together with its generation bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pathway {
    pub id: u64,
    policy_length: usize,
    pub events: Vec<Event>,
    generation_policy_parameters: Vec<f64>,
    /// Product of the per-event probabilities under the generation policy.
    pub generation_joint_prob: f64,
    pub actions_0_taken: u32,
    pub actions_1_taken: u32,
    pub discount_rate: f64,
    /// Cached discounted reward sum; see [`Pathway::recompute_net_value`].
    pub net_value: f64,
    /// Names of the reward components carried by each event, in order.
    #[serde(default)]
    pub reward_channels: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl Pathway {
    /// Create an empty pathway for a policy of `policy_length` parameters.
    ///
    /// Generation parameters start at the all-ones sentinel until explicitly set.
    #[must_use]
    pub fn new(policy_length: usize) -> Self {
        Self {
            id: 0,
            policy_length,
            events: Vec::new(),
            generation_policy_parameters: vec![1.0; policy_length],
            generation_joint_prob: 1.0,
            actions_0_taken: 0,
            actions_1_taken: 0,
            discount_rate: 1.0,
            net_value: 0.0,
            reward_channels: Vec::new(),
            metadata: Some(Metadata::new()),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn policy_length(&self) -> usize {
        self.policy_length
    }

    #[must_use]
    pub fn generation_policy_parameters(&self) -> &[f64] {
        &self.generation_policy_parameters
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Replace the generation policy parameters, optionally recomputing the joint
    /// probability of the recorded events under them.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if `parameters` does not match the policy
    /// length, or if an event state cannot be scored by a policy of that length.
    pub fn set_generation_parameters(
        &mut self,
        parameters: &[f64],
        recompute_joint: bool,
    ) -> Result<()> {
        if parameters.len() != self.policy_length {
            return Err(PathwayError::InputShape {
                expected: self.policy_length,
                actual: parameters.len(),
            });
        }
        if recompute_joint {
            let policy = Policy::with_parameters(parameters.to_vec());
            self.generation_joint_prob = self.joint_probability_under(&policy)?;
        }
        self.generation_policy_parameters = parameters.to_vec();
        Ok(())
    }

    /// Product over the events, in sequence order, of the probability `policy` assigns to
    /// the action each event recorded.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if an event state does not match the policy.
    pub fn joint_probability_under(&self, policy: &Policy) -> Result<f64> {
        self.events
            .iter()
            .try_fold(1.0, |joint, event| {
                Ok::<f64, PathwayError>(joint * policy.event_probability(event)?)
            })
    }

    /// Recompute and cache the discounted reward sum.
    ///
    /// Must be called after any change to the events, their rewards or the discount rate.
    pub fn recompute_net_value(&mut self) -> f64 {
        let discount = self.discount_rate;
        self.net_value = self
            .events
            .iter()
            .map(|event| {
                event.reward_total() * discount.powi(index_to_exponent(event.sequence_index))
            })
            .sum();
        self.net_value
    }

    /// Recount both action counters from the recorded events.
    pub fn recount_actions(&mut self) {
        let taken = self.events.iter().filter(|event| event.action).count();
        let taken = u32::try_from(taken).unwrap_or(u32::MAX);
        let total = u32::try_from(self.events.len()).unwrap_or(u32::MAX);
        self.actions_1_taken = taken;
        self.actions_0_taken = total.saturating_sub(taken);
    }

    /// Drop the metadata mapping; numeric fields are untouched.
    pub fn strip_metadata(&mut self) {
        self.metadata = None;
    }

    /// Mutable access to the metadata mapping, recreating it if it was stripped.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Metadata::new)
    }
}

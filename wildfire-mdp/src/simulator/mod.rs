//! Simple wildfire-inspired MDP.
//!
//! Each timestep a fire of hidden severity ignites. The policy only sees the uniform
//! event draw, decides whether to suppress, and the landscape (vulnerability, timber,
//! habitat) evolves accordingly. All randomness comes from a caller-owned generator.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_REWARD, DETERMINISTIC_THRESHOLD, HABITAT_MAX, HABITAT_MIN, POLICY_SCORE_LIMIT,
    SIMULATOR_POLICY_LENGTH, START_HABITAT_RANGE, START_TIMBER_RANGE, START_VULNERABILITY_RANGE,
    TIMBER_MAX, TIMBER_MIN, VULNERABILITY_MAX, VULNERABILITY_MIN,
};
use crate::error::{PathwayError, Result};
use crate::numbers::logistic;
use crate::policy::PolicySpec;

pub mod batch;
pub mod config;
pub mod summary;

pub use batch::{CANONICAL_POLICIES, PolicyComparison, compare_canonical_policies, simulate_batch};
pub use config::{HabitatConfig, SwmConfig};
pub use summary::{SimulationSummary, StepRecord};

/// How the boolean suppression decision is drawn from the policy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceMode {
    /// Suppress with probability equal to the policy value.
    #[default]
    Probabilistic,
    /// Suppress whenever the policy value is at least one half.
    Deterministic,
}

/// Latent fire severity. Never exposed to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Mild,
    Severe,
}

/// Inputs of a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    /// Pathway identifier; also the seed used by [`simulate_seeded`].
    pub id: u64,
    pub timesteps: u32,
    pub policy: PolicySpec,
    pub choice_mode: ChoiceMode,
}

impl SimulationRequest {
    #[must_use]
    pub fn new(policy: impl Into<PolicySpec>, timesteps: u32, seed: u64) -> Self {
        Self {
            id: seed,
            timesteps,
            policy: policy.into(),
            choice_mode: ChoiceMode::Probabilistic,
        }
    }

    #[must_use]
    pub fn with_choice_mode(mut self, choice_mode: ChoiceMode) -> Self {
        self.choice_mode = choice_mode;
        self
    }
}

/// Observable and latent landscape state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeState {
    pub vulnerability: f64,
    pub timber_value: f64,
    pub habitat_value: f64,
    time_since_mild: u32,
    time_since_severe: u32,
}

impl LandscapeState {
    #[must_use]
    pub const fn time_since_mild(&self) -> u32 {
        self.time_since_mild
    }

    #[must_use]
    pub const fn time_since_severe(&self) -> u32 {
        self.time_since_severe
    }

    fn classify(&self, event_value: f64) -> Severity {
        if event_value >= 1.0 - self.vulnerability {
            Severity::Severe
        } else {
            Severity::Mild
        }
    }

    fn apply_transition(&mut self, config: &SwmConfig, suppressed: bool, severity: Severity) {
        if suppressed {
            self.vulnerability += config.vulnerability_change_after_suppression;
            self.timber_value += config.timber_change_after_suppression;
            self.time_since_mild = self.time_since_mild.saturating_add(1);
            self.time_since_severe = self.time_since_severe.saturating_add(1);
        } else {
            match severity {
                Severity::Severe => {
                    self.vulnerability += config.vulnerability_change_after_severe;
                    self.timber_value += config.timber_change_after_severe;
                    self.time_since_severe = 0;
                    self.time_since_mild = self.time_since_mild.saturating_add(1);
                }
                Severity::Mild => {
                    self.vulnerability += config.vulnerability_change_after_mild;
                    self.timber_value += config.timber_change_after_mild;
                    self.time_since_mild = 0;
                    self.time_since_severe = self.time_since_severe.saturating_add(1);
                }
            }
        }

        self.habitat_value += config
            .habitat
            .habitat_delta(self.time_since_mild, self.time_since_severe);

        self.vulnerability = self.vulnerability.clamp(VULNERABILITY_MIN, VULNERABILITY_MAX);
        self.timber_value = self.timber_value.clamp(TIMBER_MIN, TIMBER_MAX);
        self.habitat_value = self.habitat_value.clamp(HABITAT_MIN, HABITAT_MAX);
    }
}

/// Step-by-step simulation harness over a borrowed generator.
pub struct WildfireSession<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    config: &'a SwmConfig,
    parameters: [f64; SIMULATOR_POLICY_LENGTH],
    choice_mode: ChoiceMode,
    state: LandscapeState,
    timestep: u32,
}

impl<'a, R: Rng + ?Sized> WildfireSession<'a, R> {
    /// Resolve the policy, validate the configuration and draw the initial conditions.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] for policies that are not two parameters long
    /// and [`PathwayError::Config`] for invalid configuration.
    pub fn new(
        rng: &'a mut R,
        policy: &PolicySpec,
        choice_mode: ChoiceMode,
        config: &'a SwmConfig,
    ) -> Result<Self> {
        config.validate()?;
        let resolved = policy.resolve();
        let parameters: [f64; SIMULATOR_POLICY_LENGTH] = resolved
            .as_slice()
            .try_into()
            .map_err(|_| PathwayError::InputShape {
                expected: SIMULATOR_POLICY_LENGTH,
                actual: resolved.len(),
            })?;
        let choice_mode = match config.probabilistic_choices {
            Some(true) => ChoiceMode::Probabilistic,
            Some(false) => ChoiceMode::Deterministic,
            None => choice_mode,
        };

        // Draws happen even when overridden so the stream stays aligned across configs.
        let vulnerability = uniform(&mut *rng, START_VULNERABILITY_RANGE);
        let timber_value = uniform(&mut *rng, START_TIMBER_RANGE);
        let habitat_value = uniform(&mut *rng, START_HABITAT_RANGE);
        let state = LandscapeState {
            vulnerability: config.starting_vulnerability.unwrap_or(vulnerability),
            timber_value: config.starting_timber.unwrap_or(timber_value),
            habitat_value: config.starting_habitat.unwrap_or(habitat_value),
            time_since_mild: 0,
            time_since_severe: 0,
        };

        Ok(Self {
            rng,
            config,
            parameters,
            choice_mode,
            state,
            timestep: 0,
        })
    }

    #[must_use]
    pub fn state(&self) -> &LandscapeState {
        &self.state
    }

    #[must_use]
    pub const fn choice_mode(&self) -> ChoiceMode {
        self.choice_mode
    }

    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Run one timestep and return what was observed before the transition.
    pub fn advance(&mut self) -> StepRecord {
        let event_value = uniform(&mut *self.rng, (0.0, 1.0));
        let severity = self.state.classify(event_value);

        let score = (self.parameters[0] + self.parameters[1] * event_value)
            .clamp(-POLICY_SCORE_LIMIT, POLICY_SCORE_LIMIT);
        let policy_value = logistic(score);

        let roll = uniform(&mut *self.rng, (0.0, 1.0));
        let suppressed = match self.choice_mode {
            ChoiceMode::Probabilistic => roll < policy_value,
            ChoiceMode::Deterministic => policy_value >= DETERMINISTIC_THRESHOLD,
        };
        let choice_prob = if suppressed {
            policy_value
        } else {
            1.0 - policy_value
        };

        let reward = BASE_REWARD + self.state.timber_value
            - self.suppression_cost(suppressed, severity)
            - self.burn_penalty(suppressed, severity);

        let record = StepRecord {
            vulnerability: self.state.vulnerability,
            timber_value: self.state.timber_value,
            event_value,
            action: suppressed,
            choice_prob,
            policy_value,
            reward,
            habitat_value: self.state.habitat_value,
            timestep: self.timestep,
        };

        self.state.apply_transition(self.config, suppressed, severity);
        self.timestep += 1;
        record
    }

    fn suppression_cost(&self, suppressed: bool, severity: Severity) -> f64 {
        match (suppressed, severity) {
            (false, _) => 0.0,
            (true, Severity::Mild) => self.config.suppression_cost_mild,
            (true, Severity::Severe) => self.config.suppression_cost_severe,
        }
    }

    fn burn_penalty(&self, suppressed: bool, severity: Severity) -> f64 {
        if !suppressed && severity == Severity::Severe {
            self.config.severe_burn_cost
        } else {
            0.0
        }
    }
}

/// Uniform draw on `[lo, hi)`; degenerate ranges return `lo` but still consume a draw.
fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    let unit: f64 = rng.gen_range(0.0..1.0);
    lo + (hi - lo) * unit
}

/// Run a full simulation using the supplied generator.
///
/// # Errors
///
/// Returns [`PathwayError::NoTimesteps`] for empty runs, [`PathwayError::InputShape`] for
/// malformed policies and [`PathwayError::Config`] for invalid configuration.
pub fn simulate<R: Rng + ?Sized>(
    rng: &mut R,
    request: &SimulationRequest,
    config: &SwmConfig,
) -> Result<SimulationSummary> {
    if request.timesteps == 0 {
        return Err(PathwayError::NoTimesteps);
    }
    let mut session = WildfireSession::new(rng, &request.policy, request.choice_mode, config)?;
    let states: Vec<StepRecord> = (0..request.timesteps).map(|_| session.advance()).collect();
    let choice_mode = session.choice_mode();
    let parameters = session.parameters().to_vec();

    let summary = SimulationSummary::from_records(
        request.id,
        parameters,
        choice_mode,
        config.clone(),
        states,
    )?;
    log::debug!(
        "simulation {} complete: avg reward {:.1} (std {:.1}), avg habitat {:.1}, suppression rate {:.2}, avg prob {:.3}",
        summary.id,
        summary.average_reward,
        summary.reward_std,
        summary.average_habitat,
        summary.suppression_rate,
        summary.average_probability
    );
    Ok(summary)
}

/// Run a full simulation on a fresh `ChaCha20Rng` seeded from `request.id`.
///
/// Identical requests and configurations reproduce identical summaries.
///
/// # Errors
///
/// See [`simulate`].
pub fn simulate_seeded(
    request: &SimulationRequest,
    config: &SwmConfig,
) -> Result<SimulationSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(request.id);
    simulate(&mut rng, request, config)
}

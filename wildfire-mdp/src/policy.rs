//! Parametric logistic policies and the named presets used by the simulator.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use crate::error::{PathwayError, Result};
use crate::numbers::{dot, logistic};
use crate::pathway::Event;

/// Lowest probability a policy will report.
///
/// Products over long trajectories collapse to zero if a single event is allowed to
/// report an exact zero.
pub const PROBABILITY_LOWER_LIMIT: f64 = 0.001;
/// Highest probability a policy will report; mirrors the lower limit for the complement.
pub const PROBABILITY_UPPER_LIMIT: f64 = 0.999;

/// Logistic single-action policy over a fixed-length feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    parameters: Vec<f64>,
}

impl Policy {
    /// Create a policy of the given dimensionality with all parameters at zero.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            parameters: vec![0.0; length],
        }
    }

    /// Create a policy whose dimensionality is taken from `parameters`.
    #[must_use]
    pub fn with_parameters(parameters: Vec<f64>) -> Self {
        Self { parameters }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Replace the parameters, keeping the dimensionality fixed.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if the new vector has a different length.
    pub fn set_parameters(&mut self, parameters: &[f64]) -> Result<()> {
        if parameters.len() != self.parameters.len() {
            return Err(PathwayError::InputShape {
                expected: self.parameters.len(),
                actual: parameters.len(),
            });
        }
        self.parameters.copy_from_slice(parameters);
        Ok(())
    }

    /// Linear score of `features` against the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if `features` has the wrong length.
    pub fn score(&self, features: &[f64]) -> Result<f64> {
        dot(&self.parameters, features)
    }

    /// Probability of taking the action given `features`, clamped to the policy limits.
    ///
    /// A score that is not a number (overflow inside scoring) yields `0.0` with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if `features` has the wrong length.
    pub fn action_probability(&self, features: &[f64]) -> Result<f64> {
        let score = self.score(features)?;
        if score.is_nan() {
            log::warn!(
                "policy scoring overflowed (parameters {:?}, features {features:?}); reporting 0.0",
                self.parameters
            );
            return Ok(0.0);
        }
        Ok(logistic(score).clamp(PROBABILITY_LOWER_LIMIT, PROBABILITY_UPPER_LIMIT))
    }

    /// Probability that this policy would have produced the action recorded in `event`.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if the event state has the wrong length.
    pub fn event_probability(&self, event: &Event) -> Result<f64> {
        let p = self.action_probability(event.state())?;
        Ok(if event.action { p } else { 1.0 - p })
    }
}

/// Named policies accepted in place of an explicit parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// Strongly negative bias: almost never suppress.
    LetBurn,
    /// Strongly positive bias: almost always suppress.
    SuppressAll,
    /// Neutral: suppress half the time.
    CoinToss,
    /// Unrecognised preset code; behaves like [`PolicyPreset::CoinToss`].
    Unknown,
}

impl PolicyPreset {
    /// Parse a preset code. Anything other than `LB`, `SA` or `CT` maps to `Unknown`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "LB" => Self::LetBurn,
            "SA" => Self::SuppressAll,
            "CT" => Self::CoinToss,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LetBurn => "LB",
            Self::SuppressAll => "SA",
            Self::CoinToss => "CT",
            Self::Unknown => "??",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LetBurn => "Let-Burn",
            Self::SuppressAll => "Suppress-All",
            Self::CoinToss => "Coin-Toss",
            Self::Unknown => "Coin-Toss (fallback)",
        }
    }

    #[must_use]
    pub const fn parameters(self) -> [f64; 2] {
        match self {
            Self::LetBurn => [-20.0, 0.0],
            Self::SuppressAll => [20.0, 0.0],
            Self::CoinToss | Self::Unknown => [0.0, 0.0],
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Policy argument: either a named preset or an explicit parameter vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySpec {
    Named(PolicyPreset),
    Explicit(Vec<f64>),
}

impl PolicySpec {
    /// Concrete parameter vector for this policy.
    #[must_use]
    pub fn resolve(&self) -> Vec<f64> {
        match self {
            Self::Named(preset) => preset.parameters().to_vec(),
            Self::Explicit(parameters) => parameters.clone(),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Named(preset) => preset.label().to_string(),
            Self::Explicit(parameters) => format!("{parameters:?}"),
        }
    }
}

impl From<PolicyPreset> for PolicySpec {
    fn from(value: PolicyPreset) -> Self {
        Self::Named(value)
    }
}

impl From<Vec<f64>> for PolicySpec {
    fn from(value: Vec<f64>) -> Self {
        Self::Explicit(value)
    }
}

impl FromStr for PolicySpec {
    type Err = ParseFloatError;

    /// Numeric input (`"-20, 0"`) becomes an explicit vector; anything else is a preset code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let numeric = trimmed.contains(',')
            || trimmed
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.');
        if !numeric {
            return Ok(Self::Named(PolicyPreset::from_code(trimmed)));
        }
        trimmed
            .split(',')
            .map(|token| token.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Explicit)
    }
}

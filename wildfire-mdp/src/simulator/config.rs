//! Tunable costs, transition deltas and habitat thresholds for the wildfire model.
use serde::{Deserialize, Serialize};

use crate::constants::{
    HABITAT_MAX, HABITAT_MIN, TIMBER_MAX, TIMBER_MIN, VULNERABILITY_MAX, VULNERABILITY_MIN,
};
use crate::error::ConfigError;

/// Habitat dynamics driven by the time since the last mild and severe fires.
///
/// Habitat improves only while both counters sit inside their healthy windows; each
/// window that is violated costs its own loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitatConfig {
    #[serde(default = "HabitatConfig::default_mild_minimum")]
    pub mild_minimum: u32,
    #[serde(default = "HabitatConfig::default_mild_maximum")]
    pub mild_maximum: u32,
    #[serde(default = "HabitatConfig::default_severe_minimum")]
    pub severe_minimum: u32,
    #[serde(default = "HabitatConfig::default_severe_maximum")]
    pub severe_maximum: u32,
    #[serde(default = "HabitatConfig::default_loss")]
    pub loss_if_no_mild: f64,
    #[serde(default = "HabitatConfig::default_loss")]
    pub loss_if_no_severe: f64,
    #[serde(default = "HabitatConfig::default_gain")]
    pub gain: f64,
}

impl HabitatConfig {
    const fn default_mild_minimum() -> u32 {
        0
    }

    const fn default_mild_maximum() -> u32 {
        15
    }

    const fn default_severe_minimum() -> u32 {
        10
    }

    const fn default_severe_maximum() -> u32 {
        40
    }

    const fn default_loss() -> f64 {
        0.2
    }

    const fn default_gain() -> f64 {
        0.1
    }

    #[must_use]
    pub const fn mild_window_ok(&self, time_since_mild: u32) -> bool {
        time_since_mild >= self.mild_minimum && time_since_mild <= self.mild_maximum
    }

    #[must_use]
    pub const fn severe_window_ok(&self, time_since_severe: u32) -> bool {
        time_since_severe >= self.severe_minimum && time_since_severe <= self.severe_maximum
    }

    /// Habitat change for one step given the two latent counters.
    #[must_use]
    pub fn habitat_delta(&self, time_since_mild: u32, time_since_severe: u32) -> f64 {
        let mild_ok = self.mild_window_ok(time_since_mild);
        let severe_ok = self.severe_window_ok(time_since_severe);
        if mild_ok && severe_ok {
            return self.gain;
        }
        let mut delta = 0.0;
        if !mild_ok {
            delta -= self.loss_if_no_mild;
        }
        if !severe_ok {
            delta -= self.loss_if_no_severe;
        }
        delta
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mild_minimum > self.mild_maximum {
            return Err(ConfigError::WindowInverted {
                field: "habitat.mild",
                min: self.mild_minimum,
                max: self.mild_maximum,
            });
        }
        if self.severe_minimum > self.severe_maximum {
            return Err(ConfigError::WindowInverted {
                field: "habitat.severe",
                min: self.severe_minimum,
                max: self.severe_maximum,
            });
        }
        for (field, value) in [
            ("habitat.loss_if_no_mild", self.loss_if_no_mild),
            ("habitat.loss_if_no_severe", self.loss_if_no_severe),
            ("habitat.gain", self.gain),
        ] {
            ensure_finite(field, value)?;
        }
        Ok(())
    }
}

impl Default for HabitatConfig {
    fn default() -> Self {
        Self {
            mild_minimum: Self::default_mild_minimum(),
            mild_maximum: Self::default_mild_maximum(),
            severe_minimum: Self::default_severe_minimum(),
            severe_maximum: Self::default_severe_maximum(),
            loss_if_no_mild: Self::default_loss(),
            loss_if_no_severe: Self::default_loss(),
            gain: Self::default_gain(),
        }
    }
}

/// Full parameter set for one simulation. Every key is optional in JSON overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwmConfig {
    #[serde(default = "SwmConfig::default_suppression_cost_mild")]
    pub suppression_cost_mild: f64,
    #[serde(default = "SwmConfig::default_suppression_cost_severe")]
    pub suppression_cost_severe: f64,
    /// Timber lost when a severe fire is left to burn.
    #[serde(default = "SwmConfig::default_severe_burn_cost")]
    pub severe_burn_cost: f64,
    #[serde(default = "SwmConfig::default_vulnerability_change_after_suppression")]
    pub vulnerability_change_after_suppression: f64,
    #[serde(default = "SwmConfig::default_vulnerability_change_after_mild")]
    pub vulnerability_change_after_mild: f64,
    #[serde(default = "SwmConfig::default_vulnerability_change_after_severe")]
    pub vulnerability_change_after_severe: f64,
    #[serde(default = "SwmConfig::default_timber_change_after_suppression")]
    pub timber_change_after_suppression: f64,
    #[serde(default = "SwmConfig::default_timber_change_after_mild")]
    pub timber_change_after_mild: f64,
    #[serde(default = "SwmConfig::default_timber_change_after_severe")]
    pub timber_change_after_severe: f64,
    #[serde(default)]
    pub habitat: HabitatConfig,
    /// Fixed starting values; when absent the value is drawn uniformly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_vulnerability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_timber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_habitat: Option<f64>,
    /// Overrides the choice mode of the request when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilistic_choices: Option<bool>,
}

impl SwmConfig {
    const fn default_suppression_cost_mild() -> f64 {
        9.0
    }

    const fn default_suppression_cost_severe() -> f64 {
        13.0
    }

    const fn default_severe_burn_cost() -> f64 {
        40.0
    }

    const fn default_vulnerability_change_after_suppression() -> f64 {
        0.01
    }

    const fn default_vulnerability_change_after_mild() -> f64 {
        -0.01
    }

    const fn default_vulnerability_change_after_severe() -> f64 {
        -0.015
    }

    const fn default_timber_change_after_suppression() -> f64 {
        0.1
    }

    const fn default_timber_change_after_mild() -> f64 {
        0.1
    }

    const fn default_timber_change_after_severe() -> f64 {
        -5.0
    }

    /// Parse a (possibly partial) JSON override mapping and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from an already-parsed JSON override mapping and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the value has the wrong shape and any
    /// validation error.
    pub fn from_overrides(overrides: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the simulator.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("suppression_cost_mild", self.suppression_cost_mild),
            ("suppression_cost_severe", self.suppression_cost_severe),
            ("severe_burn_cost", self.severe_burn_cost),
            (
                "vulnerability_change_after_suppression",
                self.vulnerability_change_after_suppression,
            ),
            (
                "vulnerability_change_after_mild",
                self.vulnerability_change_after_mild,
            ),
            (
                "vulnerability_change_after_severe",
                self.vulnerability_change_after_severe,
            ),
            (
                "timber_change_after_suppression",
                self.timber_change_after_suppression,
            ),
            ("timber_change_after_mild", self.timber_change_after_mild),
            ("timber_change_after_severe", self.timber_change_after_severe),
        ] {
            ensure_finite(field, value)?;
        }
        self.habitat.validate()?;

        for (field, value, min, max) in [
            (
                "starting_vulnerability",
                self.starting_vulnerability,
                VULNERABILITY_MIN,
                VULNERABILITY_MAX,
            ),
            ("starting_timber", self.starting_timber, TIMBER_MIN, TIMBER_MAX),
            (
                "starting_habitat",
                self.starting_habitat,
                HABITAT_MIN,
                HABITAT_MAX,
            ),
        ] {
            if let Some(value) = value
                && !(min..=max).contains(&value)
            {
                return Err(ConfigError::RangeViolation {
                    field,
                    min,
                    max,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for SwmConfig {
    fn default() -> Self {
        Self {
            suppression_cost_mild: Self::default_suppression_cost_mild(),
            suppression_cost_severe: Self::default_suppression_cost_severe(),
            severe_burn_cost: Self::default_severe_burn_cost(),
            vulnerability_change_after_suppression:
                Self::default_vulnerability_change_after_suppression(),
            vulnerability_change_after_mild: Self::default_vulnerability_change_after_mild(),
            vulnerability_change_after_severe: Self::default_vulnerability_change_after_severe(),
            timber_change_after_suppression: Self::default_timber_change_after_suppression(),
            timber_change_after_mild: Self::default_timber_change_after_mild(),
            timber_change_after_severe: Self::default_timber_change_after_severe(),
            habitat: HabitatConfig::default(),
            starting_vulnerability: None,
            starting_timber: None,
            starting_habitat: None,
            probabilistic_choices: None,
        }
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

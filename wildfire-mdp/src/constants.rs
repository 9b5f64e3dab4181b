//! Fixed bounds and tuning constants of the wildfire model.
//!
//! Values that a study may want to vary live in [`crate::simulator::SwmConfig`]; the
//! constants here define the shape of the state space itself.

/// Version tag echoed into every simulation summary.
pub const SIMULATOR_VERSION: &str = "1.3";

// State bounds -------------------------------------------------------------
pub const VULNERABILITY_MIN: f64 = 0.02;
pub const VULNERABILITY_MAX: f64 = 1.0;
pub const TIMBER_MIN: f64 = 0.0;
pub const TIMBER_MAX: f64 = 10.0;
pub const HABITAT_MIN: f64 = 0.0;
pub const HABITAT_MAX: f64 = 10.0;

// Initial condition draws --------------------------------------------------
pub const START_VULNERABILITY_RANGE: (f64, f64) = (0.2, 0.8);
pub const START_TIMBER_RANGE: (f64, f64) = (2.0, 8.0);
pub const START_HABITAT_RANGE: (f64, f64) = (2.0, 8.0);

// Per-step dynamics --------------------------------------------------------
/// Baseline reward before timber value, suppression costs and burn penalties.
pub const BASE_REWARD: f64 = 10.0;
/// Policy scores are clamped to this magnitude before the logistic transform.
pub const POLICY_SCORE_LIMIT: f64 = 100.0;
/// Threshold on the policy value for deterministic choices.
pub const DETERMINISTIC_THRESHOLD: f64 = 0.5;
/// Parameters consumed by the simulator's policy: bias and event-value coefficient.
pub const SIMULATOR_POLICY_LENGTH: usize = 2;

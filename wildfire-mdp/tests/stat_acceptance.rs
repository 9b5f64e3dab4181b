use wildfire_mdp::numbers::logistic;
use wildfire_mdp::{
    ChoiceMode, PolicyPreset, SimulationRequest, SwmConfig, simulate_seeded,
};

const SAMPLE_SIZE: u32 = 10_000;
const TOLERANCE: f64 = 0.025;

fn suppression_rate(policy: impl Into<wildfire_mdp::PolicySpec>, seed: u64) -> f64 {
    let request = SimulationRequest::new(policy, SAMPLE_SIZE, seed);
    simulate_seeded(&request, &SwmConfig::default())
        .expect("default simulation succeeds")
        .suppression_rate
}

#[test]
fn let_burn_almost_never_suppresses() {
    let observed = suppression_rate(PolicyPreset::LetBurn, 0);
    assert!(observed <= TOLERANCE, "let-burn drifted: {observed:.4}");
}

#[test]
fn suppress_all_almost_always_suppresses() {
    let observed = suppression_rate(PolicyPreset::SuppressAll, 0);
    assert!(observed >= 1.0 - TOLERANCE, "suppress-all drifted: {observed:.4}");
}

#[test]
fn coin_toss_suppresses_half_the_fires() {
    let observed = suppression_rate(PolicyPreset::CoinToss, 7);
    assert!(
        (observed - 0.5).abs() <= TOLERANCE,
        "coin-toss drifted: {observed:.4}"
    );
}

#[test]
fn known_policy_tracks_expected_logistic_mass() {
    // Mean of logistic(20u) for u uniform on [0, 1).
    let expected = (20.0_f64.exp().ln_1p() - 2.0_f64.ln()) / 20.0;
    let observed = suppression_rate(vec![0.0, 20.0], 3);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "known policy drifted: observed {observed:.4}, expected {expected:.4}"
    );
}

#[test]
fn coin_toss_choice_probability_is_exactly_half() {
    let request = SimulationRequest::new(PolicyPreset::CoinToss, SAMPLE_SIZE, 1);
    let summary = simulate_seeded(&request, &SwmConfig::default()).expect("simulation");
    assert!((summary.average_probability - 0.5).abs() < 1e-12);
    assert!(summary.states.iter().all(|step| (step.policy_value - 0.5).abs() < f64::EPSILON));
}

#[test]
fn seeded_runs_are_reproducible() {
    let request = SimulationRequest::new(vec![0.0, 0.0], 1000, 42);
    let config = SwmConfig::default();
    let first = simulate_seeded(&request, &config).expect("first run");
    let second = simulate_seeded(&request, &config).expect("second run");
    assert_eq!(first, second);
    assert_eq!(first.total_reward.to_bits(), second.total_reward.to_bits());
}

#[test]
fn single_step_suppress_all_matches_logistic() {
    let mut suppressed = 0_u32;
    for seed in 0..u64::from(SAMPLE_SIZE / 10) {
        let request = SimulationRequest::new(vec![20.0, 0.0], 1, seed);
        let summary = simulate_seeded(&request, &SwmConfig::default()).expect("simulation");
        assert!((summary.states[0].policy_value - logistic(20.0)).abs() < 1e-15);
        suppressed += summary.suppressions;
    }
    assert_eq!(suppressed, SAMPLE_SIZE / 10);
}

#[test]
fn deterministic_let_burn_never_suppresses() {
    let request = SimulationRequest::new(PolicyPreset::LetBurn, SAMPLE_SIZE, 5)
        .with_choice_mode(ChoiceMode::Deterministic);
    let summary = simulate_seeded(&request, &SwmConfig::default()).expect("simulation");
    assert_eq!(summary.suppressions, 0);
    assert_eq!(summary.let_burns(), SAMPLE_SIZE);
}

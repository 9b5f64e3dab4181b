use wildfire_mdp::{
    Pathway, PathwayError, Policy, PolicyPreset, PolicySpec, RewardBlend, SwmConfig,
    kl_divergence, pathways_from_summaries, simulate_batch,
};

const PATHWAYS: u32 = 20;
const TIMESTEPS: u32 = 50;

fn pathways(policy: PolicySpec, blend: RewardBlend) -> Vec<Pathway> {
    let summaries = simulate_batch(&policy, TIMESTEPS, 100, PATHWAYS, &SwmConfig::default())
        .expect("batch simulation");
    pathways_from_summaries(&summaries, blend).expect("adapter conversion")
}

#[test]
fn generator_candidate_has_zero_divergence() {
    let coin_toss = pathways(PolicyPreset::CoinToss.into(), RewardBlend::budget());
    let kld = kl_divergence(&coin_toss, &[0.0, 0.0]).expect("kl");
    assert!(kld.abs() < 1e-12, "coin-toss self divergence {kld}");

    let known = pathways(vec![0.0, 20.0].into(), RewardBlend::budget());
    let kld = kl_divergence(&known, &[0.0, 20.0]).expect("kl");
    assert!(kld.abs() < 1e-9, "known self divergence {kld}");
}

#[test]
fn other_candidates_diverge_positively() {
    let known = pathways(vec![0.0, 20.0].into(), RewardBlend::budget());
    for candidate in [[0.0, 0.0], [1.0, -3.0], [-2.0, 5.0]] {
        let kld = kl_divergence(&known, &candidate).expect("kl");
        assert!(kld > 0.0, "candidate {candidate:?} gave {kld}");
    }
}

#[test]
fn divergence_rejects_wrong_candidate_length() {
    let coin_toss = pathways(PolicyPreset::CoinToss.into(), RewardBlend::budget());
    assert_eq!(
        kl_divergence(&coin_toss, &[0.0, 0.0, 1.0]),
        Err(PathwayError::InputShape {
            expected: 3,
            actual: 2
        })
    );
    assert_eq!(
        kl_divergence(&[], &[0.0, 0.0]),
        Err(PathwayError::EmptyDistribution)
    );
}

#[test]
fn divergence_rejects_non_finite_candidates() {
    let coin_toss = pathways(PolicyPreset::CoinToss.into(), RewardBlend::budget());
    for candidate in [[f64::NAN, 0.0], [0.0, f64::NAN]] {
        let result = kl_divergence(&coin_toss, &candidate);
        assert!(
            matches!(result, Err(PathwayError::ProbabilityOutOfRange { index: 0, .. })),
            "candidate {candidate:?} gave {result:?}"
        );
    }
}

#[test]
fn recomputed_joint_probability_matches_simulator_for_unclamped_policy() {
    for mut pathway in pathways(PolicyPreset::CoinToss.into(), RewardBlend::budget()) {
        let copied = pathway.generation_joint_prob;
        let parameters = pathway.generation_policy_parameters().to_vec();
        pathway
            .set_generation_parameters(&parameters, true)
            .expect("recompute");
        assert!((pathway.generation_joint_prob - copied).abs() <= copied * 1e-12);

        let policy = Policy::with_parameters(parameters);
        let product: f64 = pathway
            .events
            .iter()
            .map(|event| policy.event_probability(event).expect("event probability"))
            .product();
        assert!((pathway.generation_joint_prob - product).abs() <= product * 1e-12);
    }
}

#[test]
fn net_value_and_counters_survive_conversion() {
    for mut pathway in pathways(PolicyPreset::CoinToss.into(), RewardBlend::budget()) {
        let copied = pathway.net_value;
        assert!((pathway.recompute_net_value() - copied).abs() < 1e-9);
        assert_eq!(
            pathway.actions_0_taken + pathway.actions_1_taken,
            TIMESTEPS
        );

        let (zeros, ones) = (pathway.actions_0_taken, pathway.actions_1_taken);
        pathway.recount_actions();
        assert_eq!((pathway.actions_0_taken, pathway.actions_1_taken), (zeros, ones));

        pathway.discount_rate = 0.9;
        let discounted = pathway.recompute_net_value();
        let expected: f64 = pathway
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                event.reward_total() * 0.9_f64.powi(i32::try_from(index).expect("index fits"))
            })
            .sum();
        assert!((discounted - expected).abs() < 1e-9);
    }
}

#[test]
fn habitat_blend_sums_habitat_values() {
    let habitat = pathways(PolicyPreset::SuppressAll.into(), RewardBlend::habitat());
    for pathway in &habitat {
        assert_eq!(pathway.reward_channels, vec!["habitat".to_string()]);
        assert!(pathway.events.iter().all(|event| event.rewards.len() == 1));
        assert!(pathway
            .events
            .iter()
            .all(|event| (0.0..=10.0).contains(&event.reward_total())));
    }
}

#[test]
fn stripping_metadata_keeps_divergence_unchanged() {
    let mut coin_toss = pathways(PolicyPreset::CoinToss.into(), RewardBlend::budget());
    let before = kl_divergence(&coin_toss, &[1.0, -3.0]).expect("kl");
    for pathway in &mut coin_toss {
        pathway.strip_metadata();
    }
    let after = kl_divergence(&coin_toss, &[1.0, -3.0]).expect("kl");
    assert_eq!(before.to_bits(), after.to_bits());
}

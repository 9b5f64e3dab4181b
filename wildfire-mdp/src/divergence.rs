//! Kullback-Leibler divergence between the policy that generated a set of pathways and
//! a candidate policy.
//!
//! Every event from every pathway is pooled into two parallel sequences: the recorded
//! generating probability `P` and the candidate's raw action probability `Q` (not clamped
//! and not resolved for the action taken). Both are normalised to sum to one before
//! `Σ P ln(P / Q)` is taken.
use serde::{Deserialize, Serialize};

use crate::error::{PathwayError, Result};
use crate::numbers::{dot, is_probability, logistic};
use crate::pathway::Pathway;

/// Pooled per-event probabilities, in pathway order then event order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PooledProbabilities {
    pub true_probs: Vec<f64>,
    pub candidate_probs: Vec<f64>,
}

impl PooledProbabilities {
    /// Pool every event of `pathways` against the `candidate` parameter vector.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InputShape`] if an event state does not match the
    /// candidate's length.
    pub fn pool(pathways: &[Pathway], candidate: &[f64]) -> Result<Self> {
        let capacity = pathways.iter().map(Pathway::len).sum();
        let mut pooled = Self {
            true_probs: Vec::with_capacity(capacity),
            candidate_probs: Vec::with_capacity(capacity),
        };
        for event in pathways.iter().flat_map(|pathway| pathway.events.iter()) {
            pooled.true_probs.push(event.action_prob);
            pooled
                .candidate_probs
                .push(logistic(dot(candidate, event.state())?));
        }
        Ok(pooled)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.true_probs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.true_probs.is_empty()
    }

    /// Divergence of the normalised candidate distribution from the normalised true one.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::ProbabilityOutOfRange`] for a pooled value that is not a
    /// probability, [`PathwayError::EmptyDistribution`] if nothing was pooled or either
    /// sequence sums to zero, and [`PathwayError::DivergenceUndefined`] when the candidate
    /// assigns zero probability where the true distribution does not.
    pub fn kl_divergence(&self) -> Result<f64> {
        for (index, (&p_raw, &q_raw)) in self
            .true_probs
            .iter()
            .zip(&self.candidate_probs)
            .enumerate()
        {
            if let Some(value) = [p_raw, q_raw].into_iter().find(|&v| !is_probability(v)) {
                return Err(PathwayError::ProbabilityOutOfRange { index, value });
            }
        }
        let p_sum: f64 = self.true_probs.iter().sum();
        let q_sum: f64 = self.candidate_probs.iter().sum();
        if self.is_empty() || p_sum <= 0.0 || q_sum <= 0.0 {
            return Err(PathwayError::EmptyDistribution);
        }

        let mut divergence = 0.0;
        for (event_index, (&p_raw, &q_raw)) in self
            .true_probs
            .iter()
            .zip(&self.candidate_probs)
            .enumerate()
        {
            let p = p_raw / p_sum;
            if p == 0.0 {
                continue;
            }
            let q = q_raw / q_sum;
            if q == 0.0 {
                return Err(PathwayError::DivergenceUndefined { event_index });
            }
            divergence += p * (p / q).ln();
        }
        Ok(divergence)
    }
}

/// KL divergence of `candidate` from the policy that generated `pathways`.
///
/// # Errors
///
/// See [`PooledProbabilities::pool`] and [`PooledProbabilities::kl_divergence`].
pub fn kl_divergence(pathways: &[Pathway], candidate: &[f64]) -> Result<f64> {
    let pooled = PooledProbabilities::pool(pathways, candidate)?;
    log::debug!(
        "pooled {} events from {} pathways for divergence",
        pooled.len(),
        pathways.len()
    );
    pooled.kl_divergence()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::Event;

    const GENERATOR: [f64; 2] = [-1.0, 3.0];

    fn generated_pathways() -> Vec<Pathway> {
        let features = [[0.1, 0.8, 0.35], [0.55, 0.95, 0.0]];
        features
            .iter()
            .enumerate()
            .map(|(id, values)| {
                let mut pathway = Pathway::new(2).with_id(id as u64);
                for (idx, &x) in values.iter().enumerate() {
                    let mut event = Event::new(idx as u32, [1.0, x]);
                    event.action_prob = logistic(GENERATOR[0] + GENERATOR[1] * x);
                    pathway.push_event(event);
                }
                pathway
            })
            .collect()
    }

    #[test]
    fn pooling_preserves_pathway_then_event_order() {
        let pathways = generated_pathways();
        let pooled = PooledProbabilities::pool(&pathways, &GENERATOR).unwrap();
        assert_eq!(pooled.len(), 6);
        assert!((pooled.true_probs[3] - pathways[1].events[0].action_prob).abs() < 1e-15);
    }

    #[test]
    fn identical_candidate_has_zero_divergence() {
        let pathways = generated_pathways();
        let kld = kl_divergence(&pathways, &GENERATOR).unwrap();
        assert!(kld.abs() < 1e-12, "kld {kld}");
    }

    #[test]
    fn other_candidates_are_non_negative() {
        let pathways = generated_pathways();
        for candidate in [[0.0, 0.0], [2.0, -4.0], [-3.0, 10.0]] {
            let kld = kl_divergence(&pathways, &candidate).unwrap();
            assert!(kld > 0.0, "candidate {candidate:?} gave {kld}");
        }
    }

    #[test]
    fn zero_candidate_probability_is_undefined() {
        let pathways = generated_pathways();
        assert_eq!(
            kl_divergence(&pathways, &[-1.0e6, 0.0]),
            Err(PathwayError::EmptyDistribution)
        );

        let pooled = PooledProbabilities {
            true_probs: vec![0.5, 0.5],
            candidate_probs: vec![1.0, 0.0],
        };
        assert_eq!(
            pooled.kl_divergence(),
            Err(PathwayError::DivergenceUndefined { event_index: 1 })
        );
    }

    #[test]
    fn zero_true_probability_terms_are_skipped() {
        let pooled = PooledProbabilities {
            true_probs: vec![0.0, 1.0],
            candidate_probs: vec![0.0, 1.0],
        };
        assert_eq!(pooled.kl_divergence(), Ok(0.0));
    }

    #[test]
    fn non_finite_candidate_is_rejected() {
        let err = kl_divergence(&generated_pathways(), &[f64::NAN, 0.0]).unwrap_err();
        assert!(
            matches!(err, PathwayError::ProbabilityOutOfRange { index: 0, value } if value.is_nan()),
            "{err:?}"
        );
    }

    #[test]
    fn negative_true_probability_is_rejected() {
        let mut pathways = generated_pathways();
        pathways[0].events[2].action_prob = -0.2;
        assert_eq!(
            kl_divergence(&pathways, &GENERATOR),
            Err(PathwayError::ProbabilityOutOfRange {
                index: 2,
                value: -0.2
            })
        );

        let pooled = PooledProbabilities {
            true_probs: vec![0.4, 0.6],
            candidate_probs: vec![0.5, f64::INFINITY],
        };
        assert!(matches!(
            pooled.kl_divergence(),
            Err(PathwayError::ProbabilityOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn empty_input_and_shape_mismatch_are_errors() {
        assert_eq!(kl_divergence(&[], &GENERATOR), Err(PathwayError::EmptyDistribution));
        assert!(matches!(
            kl_divergence(&generated_pathways(), &[1.0, 2.0, 3.0]),
            Err(PathwayError::InputShape { .. })
        ));
    }
}

//! Numeric helpers: the logistic transform, dot products and safe numeric casts.

use num_traits::ToPrimitive;
use num_traits::cast::cast;

use crate::error::{PathwayError, Result};

/// Standard logistic function `1 / (1 + e^-x)`.
///
/// When `e^-x` overflows (very negative `x`) the analytic limit `0.0` is returned.
#[must_use]
pub fn logistic(value: f64) -> f64 {
    let exp = (-value).exp();
    if exp.is_infinite() {
        log::debug!("logistic overflow at {value}; returning limit 0.0");
        return 0.0;
    }
    1.0 / (1.0 + exp)
}

/// Whether `value` is a finite probability in `[0, 1]`.
#[must_use]
pub fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Sum of the element-wise products of two equal-length vectors.
///
/// # Errors
///
/// Returns [`PathwayError::InputShape`] when the lengths differ.
pub fn dot(left: &[f64], right: &[f64]) -> Result<f64> {
    if left.len() != right.len() {
        return Err(PathwayError::InputShape {
            expected: left.len(),
            actual: right.len(),
        });
    }
    Ok(left.iter().zip(right).map(|(a, b)| a * b).sum())
}

/// Convert any primitive numeric slice into the `f64` features the model scores.
///
/// Values that cannot be represented become `0.0`.
#[must_use]
pub fn to_feature_vector<T>(values: &[T]) -> Vec<f64>
where
    T: ToPrimitive + Copy,
{
    values
        .iter()
        .map(|value| value.to_f64().unwrap_or(0.0))
        .collect()
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert an `i32` exponent for `powi`, saturating large sequence indices.
#[must_use]
pub fn index_to_exponent(index: u32) -> i32 {
    cast::<u32, i32>(index).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_midpoint_and_limits() {
        assert!((logistic(0.0) - 0.5).abs() < f64::EPSILON);
        assert!(logistic(40.0) > 0.999_999);
        assert!(logistic(-40.0) < 1e-6);
    }

    #[test]
    fn logistic_extreme_negative_is_exactly_zero() {
        assert_eq!(logistic(-1.0e6).to_bits(), 0.0_f64.to_bits());
        assert_eq!(logistic(f64::NEG_INFINITY).to_bits(), 0.0_f64.to_bits());
        assert!((logistic(f64::INFINITY) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dot_rejects_mismatched_lengths() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), Ok(11.0));
        assert_eq!(
            dot(&[1.0, 2.0], &[3.0]),
            Err(PathwayError::InputShape {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn probabilities_are_finite_unit_interval_values() {
        assert!(is_probability(0.0) && is_probability(1.0) && is_probability(0.37));
        for value in [-0.1, 1.7, f64::NAN, f64::INFINITY] {
            assert!(!is_probability(value), "{value} accepted");
        }
    }

    #[test]
    fn feature_vectors_accept_integer_and_float_inputs() {
        assert_eq!(to_feature_vector(&[1_i32, 20, -3]), vec![1.0, 20.0, -3.0]);
        assert_eq!(to_feature_vector(&[0.25_f32]), vec![0.25]);
    }

    #[test]
    fn casts_saturate() {
        assert!((count_to_f64(12) - 12.0).abs() < f64::EPSILON);
        assert_eq!(index_to_exponent(u32::MAX), i32::MAX);
        assert_eq!(index_to_exponent(7), 7);
    }
}

//! Weighted quantiles
//!
//! The quantile function is the inverse of an empirical CDF built from the
//! sorted sample. Each step between neighbouring sorted values carries the
//! mean of their two weights, so the CDF runs from exactly 0 at the smallest
//! value to exactly 1 at the largest and is linear in between.

use crate::error::{StatsError, StatsResult};
use crate::interp::LinearInterpolator;
use crate::weights::weights_or_uniform;

fn check_probability(q: f64) -> StatsResult<()> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(StatsError::OutOfRange {
            value: q,
            min: 0.0,
            max: 1.0,
        })
    }
}

/// Build the inverse CDF of a weighted sample
///
/// Time complexity: O(n log n) for sorting
fn inverse_cdf(a: &[f64], w: &[f64]) -> StatsResult<LinearInterpolator> {
    if a.iter().any(|v| v.is_nan()) {
        return Err(StatsError::NonFinite("quantile sample"));
    }

    let mut order: Vec<usize> = (0..a.len()).collect();
    order.sort_by(|&i, &j| a[i].total_cmp(&a[j]));

    let mut cdf = Vec::with_capacity(a.len());
    cdf.push(0.0);
    let mut total = 0.0;
    for pair in order.windows(2) {
        total += w[pair[0]] + w[pair[1]];
        cdf.push(total);
    }
    if !(total > 0.0) {
        return Err(StatsError::ZeroTotalWeight { total });
    }
    for c in cdf.iter_mut() {
        *c /= total;
    }

    let sorted = order.iter().map(|&i| a[i]).collect();
    LinearInterpolator::new(cdf, sorted)
}

/// Weighted quantiles at several probabilities
///
/// Missing weights are uniform. A single-element sample returns that
/// element for every `q` in [0, 1].
pub fn quantiles(a: &[f64], q: &[f64], w: Option<&[f64]>) -> StatsResult<Vec<f64>> {
    if a.is_empty() {
        return Err(StatsError::EmptyInput("quantile sample"));
    }
    let w = weights_or_uniform(a.len(), w)?;

    if a.len() == 1 {
        return q
            .iter()
            .map(|&qi| check_probability(qi).map(|_| a[0]))
            .collect();
    }

    inverse_cdf(a, &w)?.eval_many(q)
}

/// Weighted quantile at a single probability
pub fn quantile(a: &[f64], q: f64, w: Option<&[f64]>) -> StatsResult<f64> {
    Ok(quantiles(a, &[q], w)?[0])
}

/// Weighted median
pub fn median(a: &[f64], w: Option<&[f64]>) -> StatsResult<f64> {
    quantile(a, 0.5, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_five() {
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.5, None).unwrap(), 3.0);
    }

    #[test]
    fn test_unsorted_input() {
        assert_eq!(quantile(&[5.0, 1.0, 4.0, 2.0, 3.0], 0.5, None).unwrap(), 3.0);
    }

    #[test]
    fn test_extremes() {
        let a = [0.3, -1.2, 7.5, 2.2];
        assert_eq!(quantile(&a, 0.0, None).unwrap(), -1.2);
        assert_eq!(quantile(&a, 1.0, None).unwrap(), 7.5);
    }

    #[test]
    fn test_interpolates_linearly() {
        // CDF knots at 0, 0.25, 0.5, 0.75, 1
        let q = quantiles(&[10.0, 20.0, 30.0, 40.0, 50.0], &[0.125, 0.875], None).unwrap();
        assert!((q[0] - 15.0).abs() < 1e-12);
        assert!((q[1] - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_shift_median() {
        // CDF steps 2, 10, 10 over a total of 22
        let w = [1.0, 1.0, 9.0, 1.0];
        let a = [1.0, 2.0, 3.0, 4.0];
        let m = median(&a, Some(&w)).unwrap();
        assert!(m > 2.5 && m < 3.0);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(quantile(&[4.2], 0.3, None).unwrap(), 4.2);
        assert!(quantile(&[4.2], 1.3, None).is_err());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            quantile(&[], 0.5, None),
            Err(StatsError::EmptyInput(_))
        ));
        assert!(matches!(
            quantile(&[1.0, 2.0], 1.5, None),
            Err(StatsError::OutOfRange { .. })
        ));
        assert!(matches!(
            quantile(&[1.0, 2.0], 0.5, Some(&[1.0])),
            Err(StatsError::LengthMismatch { .. })
        ));
        assert!(matches!(
            quantile(&[1.0, 2.0], 0.5, Some(&[0.0, 0.0])),
            Err(StatsError::ZeroTotalWeight { .. })
        ));
    }
}

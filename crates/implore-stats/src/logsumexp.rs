//! Log-sum-exp with graceful handling of `-inf`
//!
//! Computes `log(Σ bᵢ exp(aᵢ))` stably by shifting with the largest
//! contributing exponent. A term with `aᵢ = -inf` contributes exactly zero,
//! whatever its weight, following `lim_{x→-∞} x·exp(x) = 0`; the naive
//! evaluation would produce NaN once every exponent is `-inf`.

use ndarray::{Array, ArrayView, Axis, Dimension, RemoveAxis, Zip};

use crate::error::{StatsError, StatsResult};

/// Magnitude and sign of a weighted exponential sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedLogSum {
    /// `log |Σ bᵢ exp(aᵢ)|`
    pub value: f64,
    /// Sign of the sum: 1, -1 or 0
    pub sign: f64,
}

fn signed_sum<I>(terms: I) -> SignedLogSum
where
    I: Iterator<Item = (f64, f64)> + Clone,
{
    let masked = terms.map(|(a, b)| if a == f64::NEG_INFINITY { (a, 0.0) } else { (a, b) });

    let a_max = masked
        .clone()
        .filter(|&(_, b)| b != 0.0)
        .map(|(a, _)| a)
        .fold(f64::NEG_INFINITY, f64::max);
    let shift = if a_max.is_finite() { a_max } else { 0.0 };

    let sum: f64 = masked
        .map(|(a, b)| if b == 0.0 { 0.0 } else { b * (a - shift).exp() })
        .sum();

    let sign = if sum > 0.0 {
        1.0
    } else if sum < 0.0 {
        -1.0
    } else {
        0.0
    };

    SignedLogSum {
        value: sum.abs().ln() + shift,
        sign,
    }
}

fn check_weights(a_len: usize, b: Option<&[f64]>) -> StatsResult<()> {
    match b {
        Some(b) if b.len() != a_len => Err(StatsError::LengthMismatch {
            what: "logsumexp weights",
            expected: a_len,
            actual: b.len(),
        }),
        _ => Ok(()),
    }
}

/// `log(Σ bᵢ exp(aᵢ))` over a slice, with `b` defaulting to ones
///
/// A negative total yields NaN; use [`logsumexp_signed`] when weights can
/// be negative.
pub fn logsumexp(a: &[f64], b: Option<&[f64]>) -> StatsResult<f64> {
    let signed = logsumexp_signed(a, b)?;
    Ok(if signed.sign < 0.0 { f64::NAN } else { signed.value })
}

/// `log |Σ bᵢ exp(aᵢ)|` together with the sign of the sum
pub fn logsumexp_signed(a: &[f64], b: Option<&[f64]>) -> StatsResult<SignedLogSum> {
    check_weights(a.len(), b)?;
    Ok(match b {
        Some(b) => signed_sum(a.iter().copied().zip(b.iter().copied())),
        None => signed_sum(a.iter().map(|&ai| (ai, 1.0))),
    })
}

/// Reduce an array along `axis` with log-sum-exp
pub fn logsumexp_axis<D>(
    a: ArrayView<'_, f64, D>,
    b: Option<ArrayView<'_, f64, D>>,
    axis: Axis,
) -> StatsResult<Array<f64, D::Smaller>>
where
    D: Dimension + RemoveAxis,
{
    let (values, signs) = logsumexp_axis_signed(a, b, axis)?;
    Ok(Zip::from(&values)
        .and(&signs)
        .map_collect(|&value, &sign| if sign < 0.0 { f64::NAN } else { value }))
}

/// Reduce an array along `axis`, returning `(log |sum|, sign)` arrays
pub fn logsumexp_axis_signed<D>(
    a: ArrayView<'_, f64, D>,
    b: Option<ArrayView<'_, f64, D>>,
    axis: Axis,
) -> StatsResult<(Array<f64, D::Smaller>, Array<f64, D::Smaller>)>
where
    D: Dimension + RemoveAxis,
{
    if axis.index() >= a.ndim() {
        return Err(StatsError::InvalidAxis {
            axis: axis.index(),
            ndim: a.ndim(),
        });
    }

    let sums = match b {
        Some(b) => {
            if b.shape() != a.shape() {
                return Err(StatsError::LengthMismatch {
                    what: "logsumexp weights",
                    expected: a.len(),
                    actual: b.len(),
                });
            }
            Zip::from(a.lanes(axis))
                .and(b.lanes(axis))
                .map_collect(|la, lb| signed_sum(la.iter().copied().zip(lb.iter().copied())))
        }
        None => a.map_axis(axis, |lane| signed_sum(lane.iter().map(|&ai| (ai, 1.0)))),
    };

    Ok((sums.mapv(|s| s.value), sums.mapv(|s| s.sign)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_neg_inf_term_is_ignored() {
        assert_eq!(logsumexp(&[f64::NEG_INFINITY, 0.0], None).unwrap(), 0.0);
    }

    #[test]
    fn test_all_neg_inf() {
        let value = logsumexp(&[f64::NEG_INFINITY, f64::NEG_INFINITY], None).unwrap();
        assert_eq!(value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_matches_naive_sum() {
        let a = [0.1, -2.0, 3.5];
        let naive = a.iter().map(|x: &f64| x.exp()).sum::<f64>().ln();
        assert!((logsumexp(&a, None).unwrap() - naive).abs() < 1e-12);
    }

    #[test]
    fn test_large_exponents_stay_finite() {
        let value = logsumexp(&[1000.0, 1000.0], None).unwrap();
        assert!((value - (1000.0 + 2f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_weighted() {
        let value = logsumexp(&[0.0, 0.0], Some(&[2.0, 3.0])).unwrap();
        assert!((value - 5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_neg_inf_with_nonzero_weight() {
        let value = logsumexp(&[f64::NEG_INFINITY, 1.0], Some(&[5.0, 1.0])).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed() {
        let s = logsumexp_signed(&[0.0, 0.0], Some(&[1.0, -3.0])).unwrap();
        assert_eq!(s.sign, -1.0);
        assert!((s.value - 2f64.ln()).abs() < 1e-12);
        assert!(logsumexp(&[0.0, 0.0], Some(&[1.0, -3.0])).unwrap().is_nan());

        let zero = logsumexp_signed(&[0.0, 0.0], Some(&[1.0, -1.0])).unwrap();
        assert_eq!(zero.sign, 0.0);
        assert_eq!(zero.value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_weight_length_mismatch() {
        assert!(logsumexp(&[0.0, 1.0], Some(&[1.0])).is_err());
    }

    #[test]
    fn test_axis_reduction() {
        let a = array![[0.0, f64::NEG_INFINITY], [1.0, 1.0]];
        let rows = logsumexp_axis(a.view(), None, Axis(1)).unwrap();
        assert_eq!(rows[0], 0.0);
        assert!((rows[1] - (1.0 + 2f64.ln())).abs() < 1e-12);

        let cols = logsumexp_axis(a.view(), None, Axis(0)).unwrap();
        assert!((cols[0] - (1f64.exp() + 1.0).ln()).abs() < 1e-12);
        assert!((cols[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_axis_reduction_signed() {
        let a = array![[0.0, 0.0], [0.0, 0.0]];
        let b = array![[1.0, -2.0], [3.0, 1.0]];
        let (values, signs) = logsumexp_axis_signed(a.view(), Some(b.view()), Axis(1)).unwrap();
        assert_eq!(signs[0], -1.0);
        assert_eq!(signs[1], 1.0);
        assert!(values[0].abs() < 1e-12);
        assert!((values[1] - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_axis_out_of_bounds() {
        let a = array![1.0, 2.0];
        assert!(matches!(
            logsumexp_axis(a.view(), None, Axis(1)),
            Err(StatsError::InvalidAxis { axis: 1, ndim: 1 })
        ));
    }
}

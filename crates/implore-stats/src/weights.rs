//! Sample weights: effective sample size and integer resampling
//!
//! Nested-sampling output carries real-valued weights. For plotting it is
//! often cheaper to work with an equally weighted subset whose size is the
//! effective number of samples, obtained by stochastic rounding.

use std::borrow::Cow;

use rand::Rng;

use crate::error::{StatsError, StatsResult};

/// Resolve optional weights, defaulting to 1 for every sample
pub fn weights_or_uniform(n: usize, w: Option<&[f64]>) -> StatsResult<Cow<'_, [f64]>> {
    match w {
        Some(w) if w.len() != n => Err(StatsError::LengthMismatch {
            what: "weights",
            expected: n,
            actual: w.len(),
        }),
        Some(w) => Ok(Cow::Borrowed(w)),
        None => Ok(Cow::Owned(vec![1.0; n])),
    }
}

/// Channel capacity (effective sample size) of a set of weights
///
/// `N = exp(-H)` with `H = Σ pᵢ ln pᵢ` and `pᵢ = wᵢ / Σw`. Terms that
/// evaluate to NaN (zero weights, where `0 · ln 0`) are skipped.
/// A non-positive total is the caller's responsibility.
pub fn channel_capacity(w: &[f64]) -> f64 {
    let total: f64 = w.iter().sum();
    let entropy: f64 = w
        .iter()
        .map(|&wi| wi / total)
        .map(|p| p * p.ln())
        .filter(|term| !term.is_nan())
        .sum();
    (-entropy).exp()
}

/// Round weights to integer multiplicities using caller-supplied draws
///
/// Each weight is rescaled to `W = w · nsamples / Σw` (or `w / max(w)` when
/// `nsamples <= 0`). The integer part is kept and the fractional part rounds
/// up when the matching draw in `u` falls below it. `nsamples` defaults to
/// the channel capacity of `w`; missing weights are uniform.
pub fn compress_weights_with_draws(
    w: Option<&[f64]>,
    u: &[f64],
    nsamples: Option<f64>,
) -> StatsResult<Vec<usize>> {
    let w = weights_or_uniform(u.len(), w)?;
    if w.is_empty() {
        return Ok(Vec::new());
    }

    let nsamples = nsamples.unwrap_or_else(|| channel_capacity(&w));
    let scale = if nsamples <= 0.0 {
        let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max > 0.0) {
            return Err(StatsError::ZeroTotalWeight { total: max });
        }
        1.0 / max
    } else {
        let total: f64 = w.iter().sum();
        if !(total > 0.0) {
            return Err(StatsError::ZeroTotalWeight { total });
        }
        nsamples / total
    };

    Ok(w.iter()
        .zip(u)
        .map(|(&wi, &ui)| {
            let scaled = wi * scale;
            let integer = scaled.trunc();
            let fraction = scaled - integer;
            integer as usize + usize::from(ui < fraction)
        })
        .collect())
}

/// Round weights to integer multiplicities with fresh uniform draws
pub fn compress_weights<R: Rng + ?Sized>(
    w: &[f64],
    nsamples: Option<f64>,
    rng: &mut R,
) -> StatsResult<Vec<usize>> {
    let u: Vec<f64> = (0..w.len()).map(|_| rng.random::<f64>()).collect();
    compress_weights_with_draws(Some(w), &u, nsamples)
}

/// Expand a sample by integer multiplicities into an equally weighted one
pub fn repeat_by_counts(a: &[f64], counts: &[usize]) -> StatsResult<Vec<f64>> {
    if a.len() != counts.len() {
        return Err(StatsError::LengthMismatch {
            what: "multiplicities",
            expected: a.len(),
            actual: counts.len(),
        });
    }

    Ok(a.iter()
        .zip(counts)
        .flat_map(|(&value, &count)| std::iter::repeat(value).take(count))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_channel_capacity_uniform() {
        assert!((channel_capacity(&[1.0, 1.0, 1.0, 1.0]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_channel_capacity_ignores_zero_weights() {
        let n = channel_capacity(&[2.0, 0.0, 2.0, 0.0]);
        assert!((n - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_channel_capacity_single_dominant() {
        let n = channel_capacity(&[1.0, 1e-300, 1e-300]);
        assert!((n - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_or_uniform() {
        assert_eq!(weights_or_uniform(3, None).unwrap().as_ref(), &[1.0, 1.0, 1.0]);
        assert!(weights_or_uniform(3, Some(&[1.0])).is_err());
    }

    #[test]
    fn test_compress_weights_rounding() {
        // nsamples = 4 rescales to [1.5, 2.5]
        let w = [3.0, 5.0];
        let low = compress_weights_with_draws(Some(&w), &[0.9, 0.9], Some(4.0)).unwrap();
        assert_eq!(low, vec![1, 2]);
        let high = compress_weights_with_draws(Some(&w), &[0.1, 0.1], Some(4.0)).unwrap();
        assert_eq!(high, vec![2, 3]);
    }

    #[test]
    fn test_compress_weights_non_positive_nsamples() {
        // W = w / max(w)
        let w = [1.0, 4.0, 2.0];
        let counts = compress_weights_with_draws(Some(&w), &[0.5, 0.5, 0.5], Some(0.0)).unwrap();
        assert_eq!(counts, vec![0, 1, 0]);
        let counts = compress_weights_with_draws(Some(&w), &[0.1, 0.1, 0.1], Some(-1.0)).unwrap();
        assert_eq!(counts, vec![1, 1, 1]);
    }

    #[test]
    fn test_compress_weights_default_nsamples() {
        // Uniform weights: channel capacity equals n, so every count is 1
        let counts = compress_weights_with_draws(None, &[0.3; 5], None).unwrap();
        assert_eq!(counts, vec![1; 5]);
    }

    #[test]
    fn test_compress_weights_zero_total() {
        let err = compress_weights_with_draws(Some(&[0.0, 0.0]), &[0.5, 0.5], Some(3.0));
        assert!(matches!(err, Err(StatsError::ZeroTotalWeight { .. })));
    }

    #[test]
    fn test_compress_weights_with_rng() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = vec![1.0; 100];
        let counts = compress_weights(&w, Some(100.0), &mut rng).unwrap();
        assert!(counts.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_repeat_by_counts() {
        let out = repeat_by_counts(&[1.0, 2.0, 3.0], &[2, 0, 1]).unwrap();
        assert_eq!(out, vec![1.0, 1.0, 3.0]);
        assert!(repeat_by_counts(&[1.0], &[1, 2]).is_err());
    }
}

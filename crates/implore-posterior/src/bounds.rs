//! Prior bounds and reflecting boundary conditions
//!
//! A kernel density estimate leaks mass across a hard prior edge and
//! underestimates the density next to it. Reflecting the samples across each
//! finite bound before estimating, then trimming back to the bounds, removes
//! that bias.

use serde::{Deserialize, Serialize};

use crate::error::{validation, PosteriorResult};

/// Fraction of the data range within which samples must approach a bound
/// for it to be treated as strict
pub const STRICT_BOUND_TOLERANCE: f64 = 1e-2;

/// Optional lower and upper bound on one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    /// Bounds from optional limits
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// No bounds on either side
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Lower bound only
    pub fn lower(min: f64) -> Self {
        Self::new(Some(min), None)
    }

    /// Upper bound only
    pub fn upper(max: f64) -> Self {
        Self::new(None, Some(max))
    }

    /// Both bounds
    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Check that both bounds are finite and ordered
    pub fn validate(&self, name: &'static str) -> PosteriorResult<()> {
        validation::validate_bounds(name, self.min, self.max)
    }

    /// Whether neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether a value lies inside the set bounds
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Decide which bounds should clip the axis limits
///
/// A bound is kept only when the data come within 1% of the data range of
/// it; otherwise the samples never reach the prior edge and the axis is left
/// to auto-scale.
pub fn check_bounds(d: &[f64], bounds: Bounds) -> Bounds {
    if d.is_empty() {
        return bounds;
    }

    let min = d.iter().copied().fold(f64::INFINITY, f64::min);
    let max = d.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tolerance = STRICT_BOUND_TOLERANCE * (max - min);

    Bounds {
        min: bounds.min.filter(|&lo| !(min - lo > tolerance)),
        max: bounds.max.filter(|&hi| !(hi - max > tolerance)),
    }
}

/// Indices of the samples reflected across the lower and the upper bound
///
/// With both bounds the sample is split at the midpoint and each half is
/// reflected across its nearer bound; a single bound reflects every sample.
fn image_indices(d: &[f64], bounds: Bounds) -> (Vec<usize>, Vec<usize>) {
    match (bounds.min, bounds.max) {
        (Some(lo), Some(hi)) => {
            let mid = (lo + hi) / 2.0;
            (0..d.len()).partition(|&i| d[i] < mid)
        }
        (Some(_), None) => ((0..d.len()).collect(), vec![]),
        (None, Some(_)) => (vec![], (0..d.len()).collect()),
        (None, None) => (vec![], vec![]),
    }
}

/// `low images + values + high images`, each image produced by `image`
fn stack_images(
    values: &[f64],
    low: &[usize],
    high: &[usize],
    image: impl Fn(usize, bool) -> f64,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + low.len() + high.len());
    out.extend(low.iter().map(|&i| image(i, false)));
    out.extend_from_slice(values);
    out.extend(high.iter().map(|&i| image(i, true)));
    out
}

/// Reflect one axis across its bounds, carrying a second coordinate along
fn reflect_axis(primary: &[f64], carried: &[f64], bounds: Bounds) -> (Vec<f64>, Vec<f64>) {
    let (low, high) = image_indices(primary, bounds);
    let p = reflect_values(primary, bounds, &low, &high);
    let c = stack_images(carried, &low, &high, |i, _| carried[i]);
    (p, c)
}

fn reflect_values(d: &[f64], bounds: Bounds, low: &[usize], high: &[usize]) -> Vec<f64> {
    // Image lists are empty on any side without a bound
    let lo = bounds.min.unwrap_or_default();
    let hi = bounds.max.unwrap_or_default();
    stack_images(d, low, high, |i, upper| {
        if upper {
            2.0 * hi - d[i]
        } else {
            2.0 * lo - d[i]
        }
    })
}

/// Apply reflecting boundary conditions to a 1D sample
///
/// Returns `2·len(d)` points when any bound is set, otherwise a copy of `d`.
pub fn mirror_1d(d: &[f64], bounds: Bounds) -> Vec<f64> {
    let (low, high) = image_indices(d, bounds);
    reflect_values(d, bounds, &low, &high)
}

/// Apply reflecting boundary conditions to a 2D sample
///
/// The x reflection is applied first; the y reflection then acts on the
/// x-augmented set, so corner images are produced by composing both.
pub fn mirror_2d(
    x: &[f64],
    y: &[f64],
    xbounds: Bounds,
    ybounds: Bounds,
) -> PosteriorResult<(Vec<f64>, Vec<f64>)> {
    validation::validate_same_length("y samples", x.len(), y.len())?;

    let (x, y) = reflect_axis(x, y, xbounds);
    let (y, x) = reflect_axis(&y, &x, ybounds);
    Ok((x, y))
}

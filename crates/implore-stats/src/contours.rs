//! Iso-probability contour levels
//!
//! For a density (on a grid, or evaluated at weighted samples) and a list of
//! credible masses such as `[0.68, 0.95]`, find the density thresholds whose
//! super-level sets `{p >= level}` enclose those masses.
//!
//! The cumulative mass over ascending density is inverted at `1 - mass` for
//! each requested mass (largest mass first), and the maximum density is
//! appended to close the innermost region. Levels are solved on the density
//! scaled to a maximum of 1 and scaled back afterwards. Contouring backends
//! reject repeated levels, so equal neighbours are pulled apart by
//! [`separate_degenerate_levels`].

use ndarray::{ArrayBase, Data, Dimension};

use crate::error::{StatsError, StatsResult};
use crate::interp::LinearInterpolator;
use crate::weights::weights_or_uniform;

/// Credible masses used when none are requested explicitly
pub const DEFAULT_CONTOURS: [f64; 2] = [0.68, 0.95];

/// Offset applied to lower levels when two levels coincide
pub const LEVEL_EPSILON: f64 = 1e-5;

/// Convert credible masses into ascending cumulative-mass targets
fn mass_targets(contours: &[f64]) -> StatsResult<Vec<f64>> {
    if let Some(bad) = contours.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(StatsError::InvalidContours(format!(
            "mass {} is outside [0, 1]",
            bad
        )));
    }
    if contours.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(StatsError::InvalidContours(
            "masses must be given in ascending order".to_string(),
        ));
    }

    Ok(contours.iter().rev().map(|p| 1.0 - p).collect())
}

/// Lower a level by [`LEVEL_EPSILON`], or by one relative step where that
/// offset is below the level's precision
fn nudge_down(level: f64) -> f64 {
    let lowered = level - LEVEL_EPSILON;
    if lowered < level {
        lowered
    } else {
        level - level.abs().max(f64::MIN_POSITIVE) * f64::EPSILON
    }
}

/// Make a level sequence strictly increasing
///
/// Scans left to right; whenever a level equals its predecessor, every
/// preceding level is lowered by [`LEVEL_EPSILON`]. Returns the number of
/// repairs performed.
pub fn separate_degenerate_levels(levels: &mut [f64]) -> usize {
    let mut repairs = 0;
    for i in 1..levels.len() {
        if levels[i - 1] == levels[i] {
            for level in &mut levels[..i] {
                *level = nudge_down(*level);
            }
            repairs += 1;
        }
    }
    repairs
}

fn solve_levels(sorted_density: Vec<f64>, sorted_mass: Vec<f64>, contours: &[f64]) -> StatsResult<Vec<f64>> {
    let targets = mass_targets(contours)?;

    let total = sorted_mass.last().copied().unwrap_or(0.0);
    if !(total > 0.0) {
        return Err(StatsError::ZeroTotalWeight { total });
    }

    let mut x = Vec::with_capacity(sorted_mass.len() + 1);
    x.push(0.0);
    x.extend(sorted_mass.iter().map(|m| m / total));

    let max = sorted_density.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = if max > 0.0 && max.is_finite() { max } else { 1.0 };
    let mut y = Vec::with_capacity(sorted_density.len() + 1);
    y.push(0.0);
    y.extend(sorted_density.iter().map(|p| p / scale));

    let mut levels = LinearInterpolator::new(x, y)?.eval_many(&targets)?;
    levels.push(max / scale);
    separate_degenerate_levels(&mut levels);

    // Rescaling can round neighbouring levels together again
    for level in &mut levels {
        *level *= scale;
    }
    separate_degenerate_levels(&mut levels);
    Ok(levels)
}

/// Contour levels for a density grid of any dimension
///
/// Output has `contours.len() + 1` ascending entries, the last being the
/// maximum density.
pub fn iso_probability_contours<S, D>(pdf: &ArrayBase<S, D>, contours: &[f64]) -> StatsResult<Vec<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if pdf.is_empty() {
        return Err(StatsError::EmptyInput("density grid"));
    }
    if pdf.iter().any(|v| v.is_nan()) {
        return Err(StatsError::NonFinite("density grid"));
    }

    let mut density: Vec<f64> = pdf.iter().copied().collect();
    density.sort_by(f64::total_cmp);

    let mass: Vec<f64> = density
        .iter()
        .scan(0.0, |acc, &p| {
            *acc += p;
            Some(*acc)
        })
        .collect();

    solve_levels(density, mass, contours)
}

/// Contour levels from a density evaluated at (weighted) samples
///
/// Mass is accumulated from the sample weights rather than from the density
/// values themselves, since the samples already follow the distribution.
pub fn iso_probability_contours_from_samples(
    pdf: &[f64],
    contours: &[f64],
    weights: Option<&[f64]>,
) -> StatsResult<Vec<f64>> {
    if pdf.is_empty() {
        return Err(StatsError::EmptyInput("sample density"));
    }
    if pdf.iter().any(|v| v.is_nan()) {
        return Err(StatsError::NonFinite("sample density"));
    }
    let weights = weights_or_uniform(pdf.len(), weights)?;

    let mut order: Vec<usize> = (0..pdf.len()).collect();
    order.sort_by(|&i, &j| pdf[i].total_cmp(&pdf[j]));

    let density = order.iter().map(|&i| pdf[i]).collect();
    let mass = order
        .iter()
        .scan(0.0, |acc, &i| {
            *acc += weights[i];
            Some(*acc)
        })
        .collect();

    solve_levels(density, mass, contours)
}

//! Kernel density estimation with reflecting boundaries
//!
//! The estimator itself sits behind the [`DensityEstimator`] trait. The
//! functions here own what happens around it: samples are mirrored across
//! every bound the data actually reach, the estimator evaluates the mirrored
//! set on a grid, and the grid is trimmed back to the bounds and rescaled so
//! the retained density keeps unit mass.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::bounds::{check_bounds, mirror_1d, mirror_2d, Bounds};
use crate::error::{validation, PosteriorError, PosteriorResult};

/// Gaussian kernel density estimate on a 1D grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Density1d {
    pub x: Vec<f64>,
    pub p: Vec<f64>,
}

/// Density on a 2D grid; `p[[j, i]]` is the density at `(x[i], y[j])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Density2d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub p: Array2<f64>,
}

/// A density estimator producing gridded densities from samples
///
/// Implementations evaluate the density of exactly the samples they are
/// given; mirroring and trimming happen in [`kde_1d`] and [`kde_2d`]. The
/// grid must not extend past any supplied bound.
pub trait DensityEstimator {
    fn density_1d(&self, samples: &[f64], bounds: Bounds) -> PosteriorResult<Density1d>;

    fn density_2d(
        &self,
        x: &[f64],
        y: &[f64],
        xbounds: Bounds,
        ybounds: Bounds,
    ) -> PosteriorResult<Density2d>;
}

/// Gaussian KDE with Scott's-rule bandwidth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaussianKde {
    /// Grid points for 1D densities
    pub grid_1d: usize,
    /// Grid points per axis for 2D densities
    pub grid_2d: usize,
    /// Grid extends this many bandwidths past the outermost sample
    pub cut: f64,
}

impl Default for GaussianKde {
    fn default() -> Self {
        Self {
            grid_1d: 256,
            grid_2d: 100,
            cut: 3.0,
        }
    }
}

/// Samples folded into one kernel matrix at a time in 2D
const KERNEL_CHUNK: usize = 4096;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

fn std_dev(samples: &[f64]) -> f64 {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Scott's rule bandwidth, `σ n^(-1/(d+4))`
fn scott_bandwidth(samples: &[f64], dims: i32) -> f64 {
    let sigma = std_dev(samples);
    if sigma < f64::EPSILON {
        return 1.0;
    }
    sigma * (samples.len() as f64).powf(-1.0 / (dims as f64 + 4.0))
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut grid: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            grid[n - 1] = stop;
            grid
        }
    }
}

/// Grid covering the samples plus `cut` bandwidths, clipped to the bounds
fn grid_for(samples: &[f64], h: f64, cut: f64, bounds: Bounds, n: usize) -> PosteriorResult<Vec<f64>> {
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Err(PosteriorError::Density("samples are not finite".to_string()));
    }

    let lo = bounds.min.map_or(min - cut * h, |b| b.max(min - cut * h));
    let hi = bounds.max.map_or(max + cut * h, |b| b.min(max + cut * h));
    if !(lo < hi) {
        return Err(PosteriorError::Density(format!(
            "empty evaluation range [{}, {}]",
            lo, hi
        )));
    }
    Ok(linspace(lo, hi, n))
}

fn kernel_sum(at: f64, samples: &[f64], h: f64) -> f64 {
    samples
        .iter()
        .map(|&s| {
            let z = (at - s) / h;
            (-0.5 * z * z).exp()
        })
        .sum::<f64>()
}

/// Kernel matrix `K[g, s] = φ((grid[g] - samples[s]) / h) / h`
fn kernel_matrix(grid: &[f64], samples: &[f64], h: f64) -> Array2<f64> {
    Array2::from_shape_fn((grid.len(), samples.len()), |(g, s)| {
        let z = (grid[g] - samples[s]) / h;
        INV_SQRT_2PI / h * (-0.5 * z * z).exp()
    })
}

impl GaussianKde {
    fn evaluate_1d(&self, grid: &[f64], samples: &[f64], h: f64) -> Vec<f64> {
        let norm = INV_SQRT_2PI / (h * samples.len() as f64);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            grid.par_iter()
                .map(|&g| norm * kernel_sum(g, samples, h))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            grid.iter().map(|&g| norm * kernel_sum(g, samples, h)).collect()
        }
    }

    fn evaluate_2d(&self, gx: &[f64], gy: &[f64], x: &[f64], y: &[f64], h: (f64, f64)) -> Array2<f64> {
        let chunk = |start: usize| -> Array2<f64> {
            let end = (start + KERNEL_CHUNK).min(x.len());
            let kx = kernel_matrix(gx, &x[start..end], h.0);
            let ky = kernel_matrix(gy, &y[start..end], h.1);
            ky.dot(&kx.t())
        };
        let starts: Vec<usize> = (0..x.len()).step_by(KERNEL_CHUNK).collect();

        #[cfg(feature = "parallel")]
        let total = {
            use rayon::prelude::*;
            starts
                .par_iter()
                .map(|&s| chunk(s))
                .reduce(|| Array2::zeros((gy.len(), gx.len())), |a, b| a + b)
        };

        #[cfg(not(feature = "parallel"))]
        let total = starts
            .iter()
            .fold(Array2::zeros((gy.len(), gx.len())), |acc, &s| acc + chunk(s));

        total / x.len() as f64
    }
}

impl DensityEstimator for GaussianKde {
    fn density_1d(&self, samples: &[f64], bounds: Bounds) -> PosteriorResult<Density1d> {
        validation::validate_non_empty("1d density", samples.len())?;

        let h = scott_bandwidth(samples, 1);
        let x = grid_for(samples, h, self.cut, bounds, self.grid_1d)?;
        let p = self.evaluate_1d(&x, samples, h);
        Ok(Density1d { x, p })
    }

    fn density_2d(
        &self,
        x: &[f64],
        y: &[f64],
        xbounds: Bounds,
        ybounds: Bounds,
    ) -> PosteriorResult<Density2d> {
        validation::validate_non_empty("2d density", x.len())?;
        validation::validate_same_length("2d density y samples", x.len(), y.len())?;

        let hx = scott_bandwidth(x, 2);
        let hy = scott_bandwidth(y, 2);
        let gx = grid_for(x, hx, self.cut, xbounds, self.grid_2d)?;
        let gy = grid_for(y, hy, self.cut, ybounds, self.grid_2d)?;
        let p = self.evaluate_2d(&gx, &gy, x, y, (hx, hy));
        Ok(Density2d { x: gx, y: gy, p })
    }
}

fn mirror_ratio(mirrored: usize, original: usize) -> f64 {
    mirrored as f64 / original as f64
}

/// 1D density with reflecting boundary correction
///
/// Only bounds the data reach (see [`check_bounds`]) trigger mirroring.
/// Grid points outside the bounds are dropped.
pub fn kde_1d<E: DensityEstimator + ?Sized>(engine: &E, d: &[f64], bounds: Bounds) -> PosteriorResult<Density1d> {
    validation::validate_non_empty("kde_1d", d.len())?;
    bounds.validate("x bounds")?;

    let strict = check_bounds(d, bounds);
    let mirrored = mirror_1d(d, strict);
    tracing::debug!(
        samples = d.len(),
        mirrored = mirrored.len(),
        min = ?strict.min,
        max = ?strict.max,
        "Mirroring 1d samples"
    );

    let density = engine.density_1d(&mirrored, strict)?;
    let scale = mirror_ratio(mirrored.len(), d.len());
    let (x, p) = density
        .x
        .into_iter()
        .zip(density.p)
        .filter(|(x, _)| strict.contains(*x))
        .map(|(x, p)| (x, p * scale))
        .unzip();

    Ok(Density1d { x, p })
}

/// Keep grid rows/columns whose coordinates lie inside the bounds
fn trim_axis(coords: &[f64], bounds: Bounds) -> (Vec<f64>, Vec<usize>) {
    coords
        .iter()
        .enumerate()
        .filter(|&(_, &c)| bounds.contains(c))
        .map(|(i, &c)| (c, i))
        .unzip()
}

/// 2D density with reflecting boundary correction on both axes
pub fn kde_2d<E: DensityEstimator + ?Sized>(
    engine: &E,
    x: &[f64],
    y: &[f64],
    xbounds: Bounds,
    ybounds: Bounds,
) -> PosteriorResult<Density2d> {
    validation::validate_non_empty("kde_2d", x.len())?;
    validation::validate_same_length("kde_2d y samples", x.len(), y.len())?;
    xbounds.validate("x bounds")?;
    ybounds.validate("y bounds")?;

    let xstrict = check_bounds(x, xbounds);
    let ystrict = check_bounds(y, ybounds);
    let (mx, my) = mirror_2d(x, y, xstrict, ystrict)?;
    tracing::debug!(
        samples = x.len(),
        mirrored = mx.len(),
        "Mirroring 2d samples"
    );

    let density = engine.density_2d(&mx, &my, xstrict, ystrict)?;
    let (gx, cols) = trim_axis(&density.x, xstrict);
    let (gy, rows) = trim_axis(&density.y, ystrict);

    let p = select_grid(density.p.view(), &rows, &cols) * mirror_ratio(mx.len(), x.len());
    Ok(Density2d { x: gx, y: gy, p })
}

/// Sub-grid at the given row and column indices
pub(crate) fn select_grid(p: ArrayView2<'_, f64>, rows: &[usize], cols: &[usize]) -> Array2<f64> {
    p.select(Axis(0), rows).select(Axis(1), cols)
}

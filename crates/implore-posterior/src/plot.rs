//! Plot-ready data for 1D and 2D marginal posteriors
//!
//! These functions do everything a marginal plot needs short of drawing:
//! density estimation with boundary correction, normalization, contour
//! levels, trimming of negligible density and axis limits. The output is
//! handed to whatever renderer the caller uses.

use ndarray::{Array2, Axis};
use serde::Serialize;

use implore_stats::{separate_degenerate_levels, LinearInterpolator};

use crate::bounds::{check_bounds, Bounds};
use crate::error::{validation, PosteriorError, PosteriorResult};
use crate::kde::{kde_1d, kde_2d, select_grid, DensityEstimator};
use crate::options::{Contour2dOptions, OptionSet, Plot1dOptions, Scatter2dOptions};
use crate::style::{Color, ColorCycle, ColorRamp};

/// Normalized density below which grid points are not drawn
pub const DENSITY_FLOOR: f64 = 1e-2;

/// Cumulative mass (from the lowest density up) at which the filled
/// contour levels sit
pub const CONTOUR_MASS_FRACTIONS: [f64; 2] = [0.05, 0.33];

/// Y range of the twin axis carrying 1D densities
pub const DENSITY_YLIM: (f64, f64) = (0.0, 1.1);

/// A 1D marginal density curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plot1d {
    pub x: Vec<f64>,
    /// Density scaled to a maximum of 1
    pub p: Vec<f64>,
    /// Strict x limits; `None` sides are left to auto-scale
    pub xlim: Bounds,
    pub ylim: (f64, f64),
    pub color: Color,
}

/// Filled iso-probability contours of a 2D marginal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contour2d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Density scaled to a maximum of 1, `pdf[[j, i]]` at `(x[i], y[j])`
    pub pdf: Array2<f64>,
    /// Strictly increasing contour levels ending at 1
    pub levels: Vec<f64>,
    pub xlim: Bounds,
    pub ylim: Bounds,
    pub color: Color,
    pub ramp: ColorRamp,
    /// Fill colour of each band between consecutive levels
    pub fill_colors: Vec<Color>,
}

/// Raw 2D samples with axis limits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter2d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub xlim: Bounds,
    pub ylim: Bounds,
    pub color: Color,
}

fn normalize_to_max<'a, I>(values: I) -> PosteriorResult<f64>
where
    I: Iterator<Item = &'a f64>,
{
    let max = values.copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > 0.0) || !max.is_finite() {
        return Err(PosteriorError::Density(format!(
            "cannot normalize density with maximum {}",
            max
        )));
    }
    Ok(max)
}

/// Prepare a 1D marginal density curve
pub fn plot_1d<E: DensityEstimator + ?Sized>(
    engine: &E,
    data: &[f64],
    options: &Plot1dOptions,
    cycle: &mut ColorCycle,
) -> PosteriorResult<Plot1d> {
    options.validate()?;
    let color = options.resolve_color(cycle)?;

    let density = kde_1d(engine, data, options.bounds())?;
    let max = normalize_to_max(density.p.iter())?;

    let (x, p): (Vec<f64>, Vec<f64>) = density
        .x
        .into_iter()
        .zip(density.p)
        .map(|(x, p)| (x, p / max))
        .filter(|&(_, p)| p >= DENSITY_FLOOR)
        .unzip();
    let xlim = check_bounds(&x, options.bounds());

    Ok(Plot1d {
        x,
        p,
        xlim,
        ylim: DENSITY_YLIM,
        color,
    })
}

/// Contour levels for a density normalized to a maximum of 1
///
/// Levels sit where the cumulative mass over ascending density reaches
/// [`CONTOUR_MASS_FRACTIONS`], closed by 1. When the density does not fall
/// to zero anywhere on the grid, its minimum is prepended so the outer band
/// still reaches the edges, unless a nearly flat density already puts the
/// first level below it. Equal neighbours are separated.
pub fn contour_levels(pdf: &Array2<f64>) -> PosteriorResult<Vec<f64>> {
    let mut p: Vec<f64> = pdf.iter().copied().collect();
    if p.iter().any(|v| v.is_nan()) {
        return Err(PosteriorError::Density("density grid contains NaN".to_string()));
    }
    p.sort_by(f64::total_cmp);

    let mut cumulative = Vec::with_capacity(p.len() + 2);
    cumulative.push(0.0);
    let mut total = 0.0;
    for &v in &p {
        total += v;
        cumulative.push(total);
    }
    if !(total > 0.0) {
        return Err(implore_stats::StatsError::ZeroTotalWeight { total }.into());
    }
    for m in cumulative.iter_mut() {
        *m /= total;
    }
    cumulative.push(1.0);

    let min = p[0];
    let mut density = Vec::with_capacity(p.len() + 2);
    density.push(0.0);
    density.extend(p);
    density.push(1.0);

    let mut levels = LinearInterpolator::new(cumulative, density)?.eval_many(&CONTOUR_MASS_FRACTIONS)?;
    levels.push(1.0);
    if min != 0.0 && min <= levels[0] {
        levels.insert(0, min);
    }

    let repairs = separate_degenerate_levels(&mut levels);
    if repairs > 0 {
        tracing::debug!(repairs, "Separated degenerate contour levels");
    }
    Ok(levels)
}

/// Indices along `axis` whose lane holds any density at or above the floor
fn significant(pdf: &Array2<f64>, axis: Axis) -> Vec<usize> {
    pdf.axis_iter(axis)
        .enumerate()
        .filter(|(_, lane)| lane.iter().any(|&v| v >= DENSITY_FLOOR))
        .map(|(i, _)| i)
        .collect()
}

/// Prepare filled iso-probability contours of a 2D marginal
pub fn contour_plot_2d<E: DensityEstimator + ?Sized>(
    engine: &E,
    x: &[f64],
    y: &[f64],
    options: &Contour2dOptions,
    cycle: &mut ColorCycle,
) -> PosteriorResult<Contour2d> {
    options.validate()?;
    let color = options.resolve_color(cycle)?;

    let density = kde_2d(engine, x, y, options.xbounds(), options.ybounds())?;
    let max = normalize_to_max(density.p.iter())?;
    let pdf = density.p / max;

    let levels = contour_levels(&pdf)?;

    // Columns follow x, rows follow y
    let cols = significant(&pdf, Axis(1));
    let rows = significant(&pdf, Axis(0));
    let gx: Vec<f64> = cols.iter().map(|&i| density.x[i]).collect();
    let gy: Vec<f64> = rows.iter().map(|&j| density.y[j]).collect();
    let pdf = select_grid(pdf.view(), &rows, &cols);

    let xlim = check_bounds(&gx, options.xbounds());
    let ylim = check_bounds(&gy, options.ybounds());
    let ramp = ColorRamp::from_white(color);
    let fill_colors = ramp.band_colors(&levels);

    tracing::debug!(
        levels = levels.len(),
        nx = gx.len(),
        ny = gy.len(),
        "Prepared 2d contours"
    );

    Ok(Contour2d {
        x: gx,
        y: gy,
        pdf,
        levels,
        xlim,
        ylim,
        color,
        ramp,
        fill_colors,
    })
}

/// Prepare a 2D scatter of samples, honouring prior bounds in the limits
pub fn scatter_plot_2d(
    x: &[f64],
    y: &[f64],
    options: &Scatter2dOptions,
    cycle: &mut ColorCycle,
) -> PosteriorResult<Scatter2d> {
    options.validate()?;
    validation::validate_same_length("scatter y samples", x.len(), y.len())?;
    let color = options.resolve_color(cycle)?;

    Ok(Scatter2d {
        x: x.to_vec(),
        y: y.to_vec(),
        xlim: check_bounds(x, options.xbounds()),
        ylim: check_bounds(y, options.ybounds()),
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kde::{Density1d, Density2d, GaussianKde};

    /// Returns a fixed grid regardless of the samples
    struct FixedDensity {
        p1: Vec<f64>,
        p2: Array2<f64>,
    }

    impl DensityEstimator for FixedDensity {
        fn density_1d(&self, _samples: &[f64], _bounds: Bounds) -> PosteriorResult<Density1d> {
            let x = (0..self.p1.len()).map(|i| i as f64).collect();
            Ok(Density1d {
                x,
                p: self.p1.clone(),
            })
        }

        fn density_2d(&self, _x: &[f64], _y: &[f64], _xb: Bounds, _yb: Bounds) -> PosteriorResult<Density2d> {
            let (ny, nx) = self.p2.dim();
            Ok(Density2d {
                x: (0..nx).map(|i| i as f64).collect(),
                y: (0..ny).map(|j| j as f64).collect(),
                p: self.p2.clone(),
            })
        }
    }

    fn fixed(p1: Vec<f64>, p2: Array2<f64>) -> FixedDensity {
        FixedDensity { p1, p2 }
    }

    #[test]
    fn test_plot_1d_normalizes_and_trims() {
        let engine = fixed(vec![0.0, 0.001, 1.0, 4.0, 2.0, 0.01], Array2::zeros((1, 1)));
        let mut cycle = ColorCycle::new();
        let plot = plot_1d(&engine, &[0.0, 1.0], &Plot1dOptions::default(), &mut cycle).unwrap();
        assert_eq!(plot.x, vec![2.0, 3.0, 4.0]);
        assert_eq!(plot.p, vec![0.25, 1.0, 0.5]);
        assert_eq!(plot.ylim, (0.0, 1.1));
        assert_eq!(plot.color.to_hex(), "#1F77B4");
    }

    #[test]
    fn test_plot_1d_zero_density_fails() {
        let engine = fixed(vec![0.0, 0.0], Array2::zeros((1, 1)));
        let mut cycle = ColorCycle::new();
        assert!(plot_1d(&engine, &[0.0], &Plot1dOptions::default(), &mut cycle).is_err());
    }

    #[test]
    fn test_plot_1d_with_gaussian_kde() {
        let data: Vec<f64> = (0..500).map(|i| (i as f64 + 0.5) / 500.0).collect();
        let options = Plot1dOptions::default().with_bounds(Some(0.0), Some(1.0));
        let mut cycle = ColorCycle::new();
        let plot = plot_1d(&GaussianKde::default(), &data, &options, &mut cycle).unwrap();
        assert_eq!(plot.xlim, Bounds::between(0.0, 1.0));
        assert!(plot.p.iter().all(|&p| (DENSITY_FLOOR..=1.0).contains(&p)));
    }

    #[test]
    fn test_contour_levels_strictly_increase() {
        let pdf = Array2::from_shape_fn((20, 20), |(j, i)| {
            let (dx, dy) = (i as f64 - 9.5, j as f64 - 9.5);
            (-(dx * dx + dy * dy) / 20.0).exp()
        });
        let pdf = &pdf / pdf.iter().copied().fold(0.0, f64::max);
        let levels = contour_levels(&pdf).unwrap();
        assert_eq!(levels.len(), 4);
        assert!(levels.windows(2).all(|p| p[0] < p[1]));
        assert_eq!(levels[3], 1.0);
    }

    #[test]
    fn test_contour_levels_zero_edge_not_prepended() {
        let mut pdf = Array2::zeros((3, 3));
        pdf[[1, 1]] = 1.0;
        pdf[[1, 0]] = 0.5;
        let levels = contour_levels(&pdf).unwrap();
        assert_eq!(levels.len(), 3);
        assert!(levels.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn test_contour_levels_flat_density_repaired() {
        let pdf = Array2::from_elem((4, 4), 1.0);
        let levels = contour_levels(&pdf).unwrap();
        assert_eq!(levels.len(), 3);
        assert!(levels.windows(2).all(|p| p[0] < p[1]));
        assert_eq!(levels[2], 1.0);
    }

    #[test]
    fn test_contour_plot_trims_negligible_density() {
        let mut p2 = Array2::zeros((4, 5));
        p2[[1, 1]] = 2.0;
        p2[[1, 2]] = 1.0;
        p2[[2, 2]] = 0.5;
        p2[[3, 4]] = 0.001;
        let engine = fixed(vec![], p2);
        let mut cycle = ColorCycle::new();
        let options = Contour2dOptions::default().with_color("#D62728");
        let contour = contour_plot_2d(&engine, &[0.0, 1.0], &[0.0, 1.0], &options, &mut cycle).unwrap();

        assert_eq!(contour.x, vec![1.0, 2.0]);
        assert_eq!(contour.y, vec![1.0, 2.0]);
        assert_eq!(contour.pdf.dim(), (2, 2));
        assert_eq!(contour.pdf[[0, 0]], 1.0);
        assert_eq!(contour.fill_colors.len(), contour.levels.len() - 1);
        assert_eq!(contour.color.to_hex(), "#D62728");
        assert_eq!(contour.ramp.low, Color::white());
    }

    #[test]
    fn test_contour_plot_with_gaussian_kde() {
        let n = 400;
        let x: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64 / 100.0).collect();
        let y: Vec<f64> = (0..n).map(|i| ((i * 53) % 97) as f64 / 97.0).collect();
        let kde = GaussianKde {
            grid_2d: 40,
            ..Default::default()
        };
        let options = Contour2dOptions::default()
            .with_xbounds(Some(0.0), Some(1.0))
            .with_ybounds(Some(0.0), None);
        let mut cycle = ColorCycle::new();
        let contour = contour_plot_2d(&kde, &x, &y, &options, &mut cycle).unwrap();

        assert!(contour.levels.windows(2).all(|p| p[0] < p[1]));
        assert_eq!(contour.xlim, Bounds::between(0.0, 1.0));
        assert_eq!(contour.ylim.min, Some(0.0));
        assert_eq!(contour.pdf.dim(), (contour.y.len(), contour.x.len()));
    }

    #[test]
    fn test_scatter_limits() {
        let mut cycle = ColorCycle::new();
        let options = Scatter2dOptions::default()
            .with_xbounds(Some(0.0), None)
            .with_ybounds(None, Some(100.0));
        let scatter = scatter_plot_2d(&[0.0, 0.5, 1.0], &[0.0, 1.0, 2.0], &options, &mut cycle).unwrap();
        assert_eq!(scatter.xlim, Bounds::lower(0.0));
        assert_eq!(scatter.ylim, Bounds::unbounded());
        assert!(scatter_plot_2d(&[0.0], &[], &options, &mut cycle).is_err());
    }

    #[test]
    fn test_invalid_options_fail_before_estimation() {
        let engine = fixed(vec![1.0], Array2::ones((1, 1)));
        let mut cycle = ColorCycle::new();
        let options = Plot1dOptions::default().with_bounds(Some(1.0), Some(0.0));
        assert!(matches!(
            plot_1d(&engine, &[0.5], &options, &mut cycle),
            Err(PosteriorError::InvalidOption { .. })
        ));
    }
}

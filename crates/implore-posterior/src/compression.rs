//! Sample compression for scalable rendering
//!
//! Large weighted samples are reduced to at most `n` representative points
//! before plotting. In 1D every point's weight is moved to its nearest
//! representative. In 2D the representatives are triangulated (in whitened
//! coordinates) and every point's weight is shared equally between the three
//! corners of the triangle containing it.

use nalgebra::Matrix2;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{validation, PosteriorError, PosteriorResult};
use crate::triangulation::{scaled_triangulation, ScaledTriangulation};

/// Default number of representative points
pub const DEFAULT_COMPRESSION: usize = 1000;

/// Representative positions and their accumulated weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compressed1d {
    /// Sorted representative positions
    pub x: Vec<f64>,
    pub w: Vec<f64>,
}

impl Compressed1d {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.w.iter().sum()
    }
}

/// Triangulated representatives with per-vertex weights
#[derive(Debug, Clone)]
pub struct TriangularCompression {
    pub triangulation: ScaledTriangulation,
    /// Accumulated weight of each triangulation vertex
    pub weights: Vec<f64>,
    /// Weight of points outside the convex hull of the representatives
    pub dropped_weight: f64,
}

impl TriangularCompression {
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

fn resolve_weights(n: usize, w: Option<&[f64]>) -> PosteriorResult<Vec<f64>> {
    match w {
        Some(w) => {
            validation::validate_same_length("weights", n, w.len())?;
            if let Some(bad) = w.iter().find(|wi| !(**wi >= 0.0) || !wi.is_finite()) {
                return Err(PosteriorError::InvalidOption {
                    name: "w",
                    reason: format!("weight {} is not a finite non-negative number", bad),
                });
            }
            Ok(w.to_vec())
        }
        None => Ok(vec![1.0; n]),
    }
}

fn check_n(n: usize) -> PosteriorResult<()> {
    if n == 0 {
        return Err(PosteriorError::InvalidOption {
            name: "n",
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

/// Compress a 1D weighted sample onto at most `n` representatives
///
/// Representatives are drawn uniformly without replacement and sorted. Each
/// original point is binned against the midpoints between neighbouring
/// representatives and its weight added to that bin, so the total weight is
/// conserved.
pub fn sample_compression_1d<R: Rng + ?Sized>(
    x: &[f64],
    w: Option<&[f64]>,
    n: usize,
    rng: &mut R,
) -> PosteriorResult<Compressed1d> {
    check_n(n)?;
    let w = resolve_weights(x.len(), w)?;

    let mut centres: Vec<f64> = if x.len() > n {
        index::sample(rng, x.len(), n).into_iter().map(|i| x[i]).collect()
    } else {
        x.to_vec()
    };
    centres.sort_by(f64::total_cmp);

    let midpoints: Vec<f64> = centres.windows(2).map(|c| (c[0] + c[1]) / 2.0).collect();
    let mut weights = vec![0.0; centres.len()];
    for (&xi, &wi) in x.iter().zip(&w) {
        let bin = midpoints.partition_point(|&m| m <= xi);
        weights[bin] += wi;
    }

    tracing::debug!(samples = x.len(), compressed = centres.len(), "Compressed 1d sample");
    Ok(Compressed1d {
        x: centres,
        w: weights,
    })
}

/// Weighted 2×2 sample covariance, used to whiten before triangulating
pub fn sample_covariance(x: &[f64], y: &[f64], w: Option<&[f64]>) -> PosteriorResult<Matrix2<f64>> {
    validation::validate_non_empty("covariance", x.len())?;
    validation::validate_same_length("covariance y samples", x.len(), y.len())?;
    let w = resolve_weights(x.len(), w)?;

    let total: f64 = w.iter().sum();
    if !(total > 0.0) {
        return Err(implore_stats::StatsError::ZeroTotalWeight { total }.into());
    }

    let mean = |v: &[f64]| v.iter().zip(&w).map(|(a, b)| a * b).sum::<f64>() / total;
    let (mx, my) = (mean(x), mean(y));

    let mut cov = Matrix2::zeros();
    for ((&xi, &yi), &wi) in x.iter().zip(y).zip(&w) {
        let (dx, dy) = (xi - mx, yi - my);
        cov[(0, 0)] += wi * dx * dx;
        cov[(0, 1)] += wi * dx * dy;
        cov[(1, 1)] += wi * dy * dy;
    }
    cov[(1, 0)] = cov[(0, 1)];
    Ok(cov / total)
}

/// Compress a 2D weighted sample by splatting mass onto a triangulation
///
/// When at least `n` points carry weight, `n` of them are chosen with
/// probability proportional to weight; otherwise every point is used. Points
/// outside the convex hull of the chosen set are dropped and their weight is
/// reported in [`TriangularCompression::dropped_weight`].
pub fn triangular_sample_compression_2d<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    cov: &Matrix2<f64>,
    w: Option<&[f64]>,
    n: usize,
    rng: &mut R,
) -> PosteriorResult<TriangularCompression> {
    check_n(n)?;
    validation::validate_same_length("y samples", x.len(), y.len())?;
    let w = resolve_weights(x.len(), w)?;

    let nonzero = w.iter().filter(|&&wi| wi != 0.0).count();
    let chosen: Vec<usize> = if nonzero < n {
        (0..x.len()).collect()
    } else {
        index::sample_weighted(rng, x.len(), |i| w[i], n)
            .map_err(|e| PosteriorError::InvalidOption {
                name: "w",
                reason: e.to_string(),
            })?
            .into_vec()
    };

    let cx: Vec<f64> = chosen.iter().map(|&i| x[i]).collect();
    let cy: Vec<f64> = chosen.iter().map(|&i| y[i]).collect();
    let triangulation = scaled_triangulation(&cx, &cy, cov)?;

    let mut weights = vec![0.0; chosen.len()];
    let mut dropped_weight = 0.0;
    let mut dropped = 0usize;
    for ((&xi, &yi), &wi) in x.iter().zip(y).zip(&w) {
        match triangulation.find_triangle(xi, yi) {
            Some(t) => {
                for &v in &triangulation.triangles()[t] {
                    weights[v] += wi / 3.0;
                }
            }
            None => {
                dropped += 1;
                dropped_weight += wi;
            }
        }
    }

    tracing::debug!(
        samples = x.len(),
        vertices = chosen.len(),
        triangles = triangulation.triangles().len(),
        dropped,
        dropped_weight,
        "Compressed 2d sample"
    );

    Ok(TriangularCompression {
        triangulation,
        weights,
        dropped_weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_1d_small_input_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = sample_compression_1d(&[3.0, 1.0, 2.0], None, 10, &mut rng).unwrap();
        assert_eq!(c.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(c.w, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_1d_conserves_weight() {
        let mut rng = StdRng::seed_from_u64(7);
        let x: Vec<f64> = (0..500).map(|i| ((i * 7919) % 500) as f64 / 50.0).collect();
        let w: Vec<f64> = (0..500).map(|i| (i % 13) as f64 * 0.1).collect();
        let c = sample_compression_1d(&x, Some(&w), 40, &mut rng).unwrap();
        assert_eq!(c.len(), 40);
        assert!(c.x.windows(2).all(|p| p[0] <= p[1]));
        let total: f64 = w.iter().sum();
        assert!((c.total_weight() - total).abs() < 1e-9);
    }

    #[test]
    fn test_1d_bins_to_nearest_centre() {
        let mut rng = StdRng::seed_from_u64(0);
        let c = sample_compression_1d(&[0.0, 10.0], None, 2, &mut rng).unwrap();
        assert_eq!(c.x, vec![0.0, 10.0]);
        assert_eq!(c.w, vec![1.0, 1.0]);
    }

    #[test]
    fn test_1d_invalid() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_compression_1d(&[1.0], None, 0, &mut rng).is_err());
        assert!(sample_compression_1d(&[1.0, 2.0], Some(&[1.0]), 5, &mut rng).is_err());
        assert!(sample_compression_1d(&[1.0], Some(&[-1.0]), 5, &mut rng).is_err());
    }

    #[test]
    fn test_sample_covariance() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let cov = sample_covariance(&x, &y, None).unwrap();
        assert!((cov[(0, 0)] - 1.25).abs() < 1e-12);
        assert!((cov[(0, 1)] - 2.5).abs() < 1e-12);
        assert!((cov[(1, 1)] - 5.0).abs() < 1e-12);
        assert_eq!(cov[(0, 1)], cov[(1, 0)]);

        assert!(sample_covariance(&x, &y, Some(&[0.0; 4])).is_err());
    }

    #[test]
    fn test_2d_all_points_used_when_few_weighted() {
        let mut rng = StdRng::seed_from_u64(3);
        let x = [0.0, 1.0, 1.0, 0.0, 0.5];
        let y = [0.0, 0.0, 1.0, 1.0, 0.5];
        let c = triangular_sample_compression_2d(&x, &y, &Matrix2::identity(), None, 100, &mut rng).unwrap();
        assert_eq!(c.weights.len(), 5);
        assert_eq!(c.dropped_weight, 0.0);
        assert!((c.total_weight() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_2d_drops_points_outside_hull() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = 400;
        let x: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64 / 101.0).collect();
        let y: Vec<f64> = (0..n).map(|i| ((i * 53) % 97) as f64 / 97.0).collect();
        let cov = sample_covariance(&x, &y, None).unwrap();
        let c = triangular_sample_compression_2d(&x, &y, &cov, None, 50, &mut rng).unwrap();

        assert_eq!(c.weights.len(), 50);
        let total = n as f64;
        assert!((c.total_weight() + c.dropped_weight - total).abs() < 1e-9);
        assert!(c.dropped_weight < total / 2.0);
    }

    #[test]
    fn test_2d_zero_weight_points_never_chosen() {
        let mut rng = StdRng::seed_from_u64(11);
        let x: Vec<f64> = (0..20).map(|i| (i % 5) as f64 + 0.1 * (i / 5) as f64).collect();
        let y: Vec<f64> = (0..20).map(|i| (i / 5) as f64 + 0.07 * (i % 5) as f64).collect();
        let mut w = vec![1.0; 20];
        w[0] = 0.0;
        let c = triangular_sample_compression_2d(&x, &y, &Matrix2::identity(), Some(&w), 10, &mut rng).unwrap();
        assert_eq!(c.weights.len(), 10);
        assert!(!c.triangulation.points().contains(&[x[0], y[0]]));
    }
}

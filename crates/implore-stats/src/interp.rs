//! Piecewise-linear interpolation over a tabulated function
//!
//! Both the weighted quantile and the iso-probability contour solvers invert
//! a cumulative mass function by interpolating it linearly. Queries outside
//! the tabulated range are errors rather than extrapolations.

use crate::error::{StatsError, StatsResult};

/// Linear interpolant through `(x[i], y[i])` with non-decreasing `x`
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolator {
    /// Build an interpolant
    ///
    /// `x` may contain repeated values (flat stretches of a CDF), but must
    /// never decrease.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> StatsResult<Self> {
        if x.len() != y.len() {
            return Err(StatsError::LengthMismatch {
                what: "interpolation ordinates",
                expected: x.len(),
                actual: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(StatsError::TooFewPoints {
                needed: 2,
                got: x.len(),
            });
        }
        if x.iter().any(|v| v.is_nan()) {
            return Err(StatsError::NonFinite("interpolation abscissae"));
        }
        if x.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(StatsError::Unsorted);
        }

        Ok(Self { x, y })
    }

    /// Smallest tabulated abscissa
    pub fn min(&self) -> f64 {
        self.x[0]
    }

    /// Largest tabulated abscissa
    pub fn max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Evaluate at a single point
    ///
    /// Locates the first knot `x[k] >= q` and interpolates on `[x[k-1], x[k]]`.
    pub fn eval(&self, q: f64) -> StatsResult<f64> {
        let (min, max) = (self.min(), self.max());
        if !(min..=max).contains(&q) {
            return Err(StatsError::OutOfRange {
                value: q,
                min,
                max,
            });
        }

        let hi = self.x.partition_point(|&v| v < q).clamp(1, self.x.len() - 1);
        let lo = hi - 1;
        let (x0, x1) = (self.x[lo], self.x[hi]);
        let (y0, y1) = (self.y[lo], self.y[hi]);

        if q == x1 {
            return Ok(y1);
        }
        if x1 == x0 {
            return Ok(y0);
        }
        Ok(y0 + (y1 - y0) * (q - x0) / (x1 - x0))
    }

    /// Evaluate at several points
    pub fn eval_many(&self, qs: &[f64]) -> StatsResult<Vec<f64>> {
        qs.iter().map(|&q| self.eval(q)).collect()
    }
}

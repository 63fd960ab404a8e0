//! Histograms for path-based plotting
//!
//! Filling a histogram polygon on every redraw is expensive. Instead the
//! histogram is emitted as a single step-function polyline, normalized so its
//! tallest bin has height 1, which a renderer can update in place.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Bin specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bins {
    /// Number of equal-width bins over the range
    Count(usize),
    /// Explicit, strictly increasing bin edges
    Edges(Vec<f64>),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(10)
    }
}

/// Options for histogram binning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistogramOptions {
    /// Bin count or explicit edges (default: 10 bins)
    pub bins: Bins,
    /// Lower and upper range; defaults to the data extent
    pub range: Option<(f64, f64)>,
    /// Per-sample weights; defaults to 1
    pub weights: Option<Vec<f64>>,
}

impl HistogramOptions {
    /// Options with a fixed number of bins
    pub fn with_bins(bins: usize) -> Self {
        Self {
            bins: Bins::Count(bins),
            ..Default::default()
        }
    }

    /// Set the binning range
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Set per-sample weights
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Check the options without looking at any data
    pub fn validate(&self) -> StatsResult<()> {
        match &self.bins {
            Bins::Count(0) => {
                return Err(StatsError::InvalidHistogram(
                    "bin count must be positive".to_string(),
                ))
            }
            Bins::Edges(edges) if edges.len() < 2 => {
                return Err(StatsError::InvalidHistogram(
                    "at least two bin edges are required".to_string(),
                ))
            }
            Bins::Edges(edges) if edges.windows(2).any(|e| !(e[0] < e[1])) => {
                return Err(StatsError::InvalidHistogram(
                    "bin edges must increase monotonically".to_string(),
                ))
            }
            _ => {}
        }

        if let Some((min, max)) = self.range {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(StatsError::InvalidHistogram(format!(
                    "range [{}, {}] is not a finite, ordered interval",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

/// Binned counts (or summed weights) with their edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramCounts {
    /// Height of each bin
    pub counts: Vec<f64>,
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
}

/// Step-function polyline, four vertices per bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramPath {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

fn uniform_edges(a: &[f64], bins: usize, range: Option<(f64, f64)>) -> StatsResult<Vec<f64>> {
    let (mut first, mut last) = match range {
        Some(range) => range,
        None if a.is_empty() => (0.0, 1.0),
        None => {
            let min = a.iter().copied().fold(f64::INFINITY, f64::min);
            let max = a.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !min.is_finite() || !max.is_finite() || a.iter().any(|v| v.is_nan()) {
                return Err(StatsError::InvalidHistogram(
                    "autodetected range is not finite".to_string(),
                ));
            }
            (min, max)
        }
    };

    if first == last {
        first -= 0.5;
        last += 0.5;
    }

    let step = (last - first) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| first + step * i as f64).collect();
    edges[bins] = last;
    Ok(edges)
}

/// Bin a sample into a histogram
///
/// Values outside the outer edges are ignored; the last bin includes its
/// right edge.
pub fn histogram_counts(a: &[f64], options: &HistogramOptions) -> StatsResult<HistogramCounts> {
    options.validate()?;
    if let Some(weights) = &options.weights {
        if weights.len() != a.len() {
            return Err(StatsError::LengthMismatch {
                what: "histogram weights",
                expected: a.len(),
                actual: weights.len(),
            });
        }
    }

    let edges = match &options.bins {
        Bins::Count(bins) => uniform_edges(a, *bins, options.range)?,
        Bins::Edges(edges) => edges.clone(),
    };
    let nbins = edges.len() - 1;
    let (first, last) = (edges[0], edges[nbins]);

    let mut counts = vec![0.0; nbins];
    for (i, &value) in a.iter().enumerate() {
        if !(first..=last).contains(&value) {
            continue;
        }

        let mut bin = match options.bins {
            Bins::Count(_) => (((value - first) / (last - first)) * nbins as f64) as usize,
            Bins::Edges(_) => edges.partition_point(|&e| e <= value).saturating_sub(1),
        };
        bin = bin.min(nbins - 1);
        // Correct for rounding in the division
        if value < edges[bin] {
            bin -= 1;
        } else if bin + 1 < nbins && value >= edges[bin + 1] {
            bin += 1;
        }

        counts[bin] += options.weights.as_ref().map_or(1.0, |w| w[i]);
    }

    Ok(HistogramCounts { counts, edges })
}

/// Histogram as a normalized step-function polyline
///
/// Each bin contributes `(left, 0), (left, h), (right, h), (right, 0)`. An
/// all-zero histogram keeps zero heights rather than dividing by zero.
pub fn histogram(a: &[f64], options: &HistogramOptions) -> StatsResult<HistogramPath> {
    let HistogramCounts { counts, edges } = histogram_counts(a, options)?;

    let mut x = Vec::with_capacity(4 * counts.len());
    let mut y = Vec::with_capacity(4 * counts.len());
    for (bin, &height) in counts.iter().enumerate() {
        let (left, right) = (edges[bin], edges[bin + 1]);
        x.extend_from_slice(&[left, left, right, right]);
        y.extend_from_slice(&[0.0, height, height, 0.0]);
    }

    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max != 0.0 && max.is_finite() {
        for v in y.iter_mut() {
            *v /= max;
        }
    }

    Ok(HistogramPath { x, y })
}

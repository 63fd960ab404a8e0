//! Tick placement for posterior axes
//!
//! Axes in a corner plot are narrow, so only a handful of ticks fit. The
//! locator picks the largest "nice" step (1, 2, 2.5, 5 or 10 times a power
//! of ten) giving at most `nbins` intervals, brackets the view with ticks on
//! that step, and prunes the outermost ticks so labels of neighbouring axes
//! never collide.

use serde::{Deserialize, Serialize};

const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Default maximum number of ticks per axis
pub const DEFAULT_TICKS: usize = 3;

/// Which end ticks to remove
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prune {
    None,
    Lower,
    Upper,
    #[default]
    Both,
}

/// A tick mark on an axis
#[derive(Clone, Debug, PartialEq)]
pub struct TickMark {
    /// Position in data coordinates
    pub value: f64,

    /// Position in normalized coordinates (0.0 to 1.0)
    pub normalized: f64,

    pub label: String,
}

/// Max-N tick locator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickLocator {
    /// Maximum number of intervals between bracketing ticks
    pub nbins: usize,
    pub prune: Prune,
}

impl TickLocator {
    /// Locator allowing at most `ticks` visible ticks
    pub fn with_max_ticks(ticks: usize) -> Self {
        Self {
            nbins: ticks + 1,
            prune: Prune::Both,
        }
    }

    /// Tick values for the view `[min, max]`
    pub fn tick_values(&self, min: f64, max: f64) -> Vec<f64> {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let range = max - min;
        if !(range > 0.0) || !range.is_finite() || self.nbins == 0 {
            return vec![];
        }

        // Misaligned views can bracket one tick too many; widen the step
        let limit = match self.prune {
            Prune::None => self.nbins + 1,
            Prune::Lower | Prune::Upper => self.nbins,
            Prune::Both => self.nbins - 1,
        };
        let mut step = nice_step(range, self.nbins);
        loop {
            let ticks = self.bracket(min, max, step);
            if ticks.len() <= limit.max(1) {
                return ticks;
            }
            step = larger_step(step);
        }
    }

    fn bracket(&self, min: f64, max: f64, step: f64) -> Vec<f64> {
        let lo = snap(min / step, f64::floor) as i64;
        let hi = snap(max / step, f64::ceil) as i64;
        let mut ticks: Vec<f64> = (lo..=hi).map(|k| k as f64 * step).collect();

        match self.prune {
            Prune::None => {}
            Prune::Lower => {
                ticks.remove(0);
            }
            Prune::Upper => {
                ticks.pop();
            }
            Prune::Both => {
                ticks.pop();
                if !ticks.is_empty() {
                    ticks.remove(0);
                }
            }
        }
        ticks
    }

    /// Labelled tick marks inside `[min, max]`
    pub fn ticks(&self, min: f64, max: f64) -> Vec<TickMark> {
        let range = max - min;
        self.tick_values(min, max)
            .into_iter()
            .map(|value| (value, (value - min) / range))
            .filter(|(_, normalized)| (-0.001..=1.001).contains(normalized))
            .map(|(value, normalized)| TickMark {
                value,
                normalized: normalized.clamp(0.0, 1.0),
                label: format_number(value),
            })
            .collect()
    }
}

impl Default for TickLocator {
    fn default() -> Self {
        Self::with_max_ticks(DEFAULT_TICKS)
    }
}

/// Round to the nearest integer when within rounding error of it
fn snap(k: f64, round: fn(f64) -> f64) -> f64 {
    if (k - k.round()).abs() < 1e-9 {
        k.round()
    } else {
        round(k)
    }
}

/// Smallest nice step covering `range` in at most `nbins` intervals
fn nice_step(range: f64, nbins: usize) -> f64 {
    let raw = range / nbins as f64;
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    NICE_STEPS
        .iter()
        .find(|&&s| s >= residual * (1.0 - 1e-12))
        .map_or(10.0 * magnitude, |s| s * magnitude)
}

/// Next nice step above `step`
fn larger_step(step: f64) -> f64 {
    let magnitude = 10.0_f64.powf(step.log10().floor());
    [magnitude / 10.0, magnitude, magnitude * 10.0]
        .iter()
        .flat_map(|m| NICE_STEPS.iter().map(move |s| s * m))
        .find(|&s| s > step * (1.0 + 1e-9))
        .unwrap_or(100.0 * magnitude)
}

/// Tick values for `[min, max]` with at most `ticks` ticks, pruned at both ends
pub fn tick_locations(min: f64, max: f64, ticks: usize) -> Vec<f64> {
    TickLocator::with_max_ticks(ticks).tick_values(min, max)
}

/// Format a tick value for display
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 10000.0 || value.abs() < 0.01 {
        format!("{:.2e}", value)
    } else if value.fract().abs() < 1e-10 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.3}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

//! Error types for implore-stats

use thiserror::Error;

/// Errors raised by the weighted-statistics primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Parallel arrays of different lengths
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An input that must be non-empty was empty
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Not enough points to build an interpolant
    #[error("Need at least {needed} points, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    /// Normalization by a non-positive total
    #[error("Total weight must be positive, got {total}")]
    ZeroTotalWeight { total: f64 },

    /// NaN found where ordering is required
    #[error("Non-finite values in {0}")]
    NonFinite(&'static str),

    /// Query outside the tabulated domain
    #[error("Value {value} is outside the interpolation range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// Interpolation abscissae or death contours out of order
    #[error("Values must be non-decreasing")]
    Unsorted,

    /// Axis index beyond the array dimensionality
    #[error("Axis {axis} is out of bounds for an array of dimension {ndim}")]
    InvalidAxis { axis: usize, ndim: usize },

    /// Requested credible masses are unusable
    #[error("Invalid contour masses: {0}")]
    InvalidContours(String),

    /// Histogram binning could not be set up
    #[error("Invalid histogram configuration: {0}")]
    InvalidHistogram(String),
}

/// Result type alias for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = StatsError::LengthMismatch {
            what: "weights",
            expected: 4,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("weights"));
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_out_of_range_display() {
        let err = StatsError::OutOfRange {
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("1.5"));
    }
}

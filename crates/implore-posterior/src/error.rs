//! Error types for implore-posterior
//!
//! Provides error handling for:
//! - Statistics failures bubbled up from implore-stats
//! - Triangulation of degenerate point sets
//! - Covariance whitening
//! - Option parsing and validation

use implore_stats::StatsError;
use thiserror::Error;

use crate::triangulation::TriangulationError;

/// Main error type for posterior plotting operations
#[derive(Error, Debug)]
pub enum PosteriorError {
    /// Statistics errors
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Triangulation errors
    #[error("Triangulation failed: {0}")]
    Triangulation(#[from] TriangulationError),

    /// Mismatched parallel arrays
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No samples to work with
    #[error("No samples provided for {0}")]
    EmptySamples(&'static str),

    /// Covariance that cannot be Cholesky-factorized
    #[error("Covariance matrix is not positive definite: {0}")]
    InvalidCovariance(String),

    /// Option failed eager validation
    #[error("Invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// Option file could not be parsed (including unknown keys)
    #[error("Failed to parse options: {0}")]
    OptionParse(#[from] toml::de::Error),

    /// Density estimator could not produce a grid
    #[error("Density estimation failed: {0}")]
    Density(String),
}

/// Result type alias for posterior plotting operations
pub type PosteriorResult<T> = Result<T, PosteriorError>;

/// Validation utilities
pub mod validation {
    use super::*;

    /// Validate that two parallel arrays have the same length
    pub fn validate_same_length(
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> PosteriorResult<()> {
        if expected != actual {
            return Err(PosteriorError::LengthMismatch {
                what,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Validate that a sample is non-empty
    pub fn validate_non_empty(what: &'static str, len: usize) -> PosteriorResult<()> {
        if len == 0 {
            return Err(PosteriorError::EmptySamples(what));
        }
        Ok(())
    }

    /// Validate an optional lower/upper pair
    pub fn validate_bounds(
        name: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> PosteriorResult<()> {
        for value in [min, max].into_iter().flatten() {
            if !value.is_finite() {
                return Err(PosteriorError::InvalidOption {
                    name,
                    reason: format!("bound {} is not finite", value),
                });
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min >= max {
                return Err(PosteriorError::InvalidOption {
                    name,
                    reason: format!("lower bound {} must be below upper bound {}", min, max),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_error_converts() {
        let err: PosteriorError = StatsError::EmptyInput("density grid").into();
        assert!(err.to_string().contains("density grid"));
    }

    #[test]
    fn test_invalid_option_display() {
        let err = PosteriorError::InvalidOption {
            name: "n",
            reason: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("'n'"));
    }

    #[test]
    fn test_validate_same_length() {
        assert!(validation::validate_same_length("weights", 3, 3).is_ok());
        assert!(validation::validate_same_length("weights", 3, 2).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validation::validate_bounds("x", Some(0.0), Some(1.0)).is_ok());
        assert!(validation::validate_bounds("x", None, Some(1.0)).is_ok());
        assert!(validation::validate_bounds("x", Some(1.0), Some(1.0)).is_err());
        assert!(validation::validate_bounds("x", Some(f64::NAN), None).is_err());
    }
}

//! implore-stats - Weighted-sample statistics for posterior visualization
//!
//! Nested-sampling and MCMC output arrives as point clouds with irregular
//! weights. This crate provides the numerical primitives for turning such
//! samples into plot-ready quantities:
//!
//! - **logsumexp**: stable `log Σ b·exp(a)` that treats `-inf` terms as zero
//! - **Weights**: channel capacity (effective sample size) and stochastic
//!   rounding of weights to integer multiplicities
//! - **Quantiles**: weighted quantiles from a midpoint-weighted inverse CDF
//! - **Contours**: density thresholds enclosing given credible masses
//! - **Histograms**: binned counts and cheap step-function paths
//! - **Live points**: live-point counts from nested-sampling birth/death
//!   contours
//!
//! All functions are pure and synchronous. Randomness only enters through a
//! caller-supplied `rand::Rng` or an explicit array of draws.

pub mod contours;
pub mod error;
pub mod histogram;
pub mod interp;
pub mod live;
pub mod logsumexp;
pub mod quantile;
pub mod weights;

pub use contours::*;
pub use error::{StatsError, StatsResult};
pub use histogram::*;
pub use interp::LinearInterpolator;
pub use live::compute_nlive;
pub use logsumexp::*;
pub use quantile::*;
pub use weights::*;

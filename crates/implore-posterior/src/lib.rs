//! implore-posterior - Marginal posterior plots from weighted samples
//!
//! Turns nested-sampling or MCMC output into plot-ready data without
//! touching any rendering backend:
//!
//! - **Bounds**: reflecting boundary conditions at hard prior edges
//! - **KDE**: boundary-corrected 1D and 2D density grids around a pluggable
//!   [`DensityEstimator`]
//! - **Plots**: normalized 1D curves, filled iso-probability contours and
//!   scatter data with axis limits
//! - **Compression**: 1D binning and 2D triangulation-based reduction of
//!   large samples to a bounded number of weighted points
//! - **Layout**: 1D grids and corner-plot cell arrangements with tick
//!   locators
//!
//! Options are explicit structs that reject unknown keys and validate
//! eagerly; default colours come from a caller-owned [`ColorCycle`].
//!
//! # Example
//!
//! ```ignore
//! use implore_posterior::{contour_plot_2d, ColorCycle, Contour2dOptions, GaussianKde};
//!
//! let options = Contour2dOptions::default().with_xbounds(Some(0.0), None);
//! let mut cycle = ColorCycle::new();
//! let contours = contour_plot_2d(&GaussianKde::default(), &x, &y, &options, &mut cycle)?;
//! ```

pub mod bounds;
pub mod compression;
pub mod error;
pub mod kde;
pub mod layout;
pub mod options;
pub mod plot;
pub mod style;
pub mod ticks;
pub mod triangulation;

pub use bounds::{check_bounds, mirror_1d, mirror_2d, Bounds};
pub use compression::{
    sample_compression_1d, sample_covariance, triangular_sample_compression_2d, Compressed1d,
    TriangularCompression,
};
pub use error::{PosteriorError, PosteriorResult};
pub use kde::{kde_1d, kde_2d, Density1d, Density2d, DensityEstimator, GaussianKde};
pub use layout::{
    make_1d_axes, make_2d_axes, nest_level, param_pair, unique, Axes1dCell, Axes1dLayout,
    Axes2dCell, Axes2dLayout, CellPosition, Nested, ParamSpec,
};
pub use options::{
    Axes1dOptions, Axes2dOptions, CompressionOptions, Contour2dOptions, OptionSet, Plot1dOptions,
    Plot2dOptions, Scatter2dOptions,
};
pub use plot::{contour_levels, contour_plot_2d, plot_1d, scatter_plot_2d, Contour2d, Plot1d, Scatter2d};
pub use style::{Color, ColorCycle, ColorRamp};
pub use ticks::{tick_locations, Prune, TickLocator, TickMark};
pub use triangulation::{scaled_triangulation, ScaledTriangulation, TriFinder, Triangulation, TriangulationError};

// Re-export the statistics layer
pub use implore_stats;

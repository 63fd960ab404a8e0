//! Option structures for plots, layouts and compression
//!
//! Every option set is a plain struct with documented defaults. Parsing
//! rejects unknown keys and [`OptionSet::validate`] runs before any data is
//! touched, so a misspelt or out-of-range option fails at construction.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::compression::DEFAULT_COMPRESSION;
use crate::error::{validation, PosteriorError, PosteriorResult};
use crate::style::{Color, ColorCycle};
use crate::ticks::DEFAULT_TICKS;

/// Common behaviour of option structures
pub trait OptionSet: DeserializeOwned {
    /// Check option values without looking at any data
    fn validate(&self) -> PosteriorResult<()>;

    /// Parse from TOML and validate
    fn from_toml_str(s: &str) -> PosteriorResult<Self> {
        let options: Self = toml::from_str(s)?;
        options.validate()?;
        Ok(options)
    }
}

fn validate_color(color: &Option<String>) -> PosteriorResult<()> {
    match color {
        Some(c) if Color::from_hex(c).is_none() => Err(PosteriorError::InvalidOption {
            name: "color",
            reason: format!("'{}' is not a #RRGGBB colour", c),
        }),
        _ => Ok(()),
    }
}

fn resolve_color(color: &Option<String>, cycle: &mut ColorCycle) -> PosteriorResult<Color> {
    let hex = match color {
        Some(c) => c.as_str(),
        None => cycle.next_color(),
    };
    Color::from_hex(hex).ok_or_else(|| PosteriorError::InvalidOption {
        name: "color",
        reason: format!("'{}' is not a #RRGGBB colour", hex),
    })
}

fn validate_positive(name: &'static str, value: usize) -> PosteriorResult<()> {
    if value == 0 {
        return Err(PosteriorError::InvalidOption {
            name,
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

/// Options for a 1D marginal plot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Plot1dOptions {
    /// Lower prior bound (default: none)
    pub xmin: Option<f64>,
    /// Upper prior bound (default: none)
    pub xmax: Option<f64>,
    /// Line colour; the caller's colour cycle supplies one when absent
    pub color: Option<String>,
}

impl Plot1dOptions {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.xmin, self.xmax)
    }

    pub fn with_bounds(mut self, xmin: Option<f64>, xmax: Option<f64>) -> Self {
        self.xmin = xmin;
        self.xmax = xmax;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Explicit colour, or the next one from `cycle`
    pub fn resolve_color(&self, cycle: &mut ColorCycle) -> PosteriorResult<Color> {
        resolve_color(&self.color, cycle)
    }
}

impl OptionSet for Plot1dOptions {
    fn validate(&self) -> PosteriorResult<()> {
        validation::validate_bounds("xmin/xmax", self.xmin, self.xmax)?;
        validate_color(&self.color)
    }
}

/// Options for 2D marginal plots (contours and scatter)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Plot2dOptions {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    /// Fill colour; the caller's colour cycle supplies one when absent
    pub color: Option<String>,
}

/// Options for [`contour_plot_2d`](crate::plot::contour_plot_2d)
pub type Contour2dOptions = Plot2dOptions;

/// Options for [`scatter_plot_2d`](crate::plot::scatter_plot_2d)
pub type Scatter2dOptions = Plot2dOptions;

impl Plot2dOptions {
    pub fn xbounds(&self) -> Bounds {
        Bounds::new(self.xmin, self.xmax)
    }

    pub fn ybounds(&self) -> Bounds {
        Bounds::new(self.ymin, self.ymax)
    }

    pub fn with_xbounds(mut self, xmin: Option<f64>, xmax: Option<f64>) -> Self {
        self.xmin = xmin;
        self.xmax = xmax;
        self
    }

    pub fn with_ybounds(mut self, ymin: Option<f64>, ymax: Option<f64>) -> Self {
        self.ymin = ymin;
        self.ymax = ymax;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn resolve_color(&self, cycle: &mut ColorCycle) -> PosteriorResult<Color> {
        resolve_color(&self.color, cycle)
    }
}

impl OptionSet for Plot2dOptions {
    fn validate(&self) -> PosteriorResult<()> {
        validation::validate_bounds("xmin/xmax", self.xmin, self.xmax)?;
        validation::validate_bounds("ymin/ymax", self.ymin, self.ymax)?;
        validate_color(&self.color)
    }
}

/// Options for a grid of 1D axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Axes1dOptions {
    /// Display label per parameter; defaults to the parameter name
    pub tex: BTreeMap<String, String>,
    /// Number of columns (default: `ceil(sqrt(n_params))`)
    pub ncols: Option<usize>,
    /// Maximum number of x ticks per axis (default: 3)
    pub ticks: usize,
}

impl Default for Axes1dOptions {
    fn default() -> Self {
        Self {
            tex: BTreeMap::new(),
            ncols: None,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl OptionSet for Axes1dOptions {
    fn validate(&self) -> PosteriorResult<()> {
        if let Some(ncols) = self.ncols {
            validate_positive("ncols", ncols)?;
        }
        validate_positive("ticks", self.ticks)
    }
}

/// Options for a corner-plot grid of 2D axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Axes2dOptions {
    /// Display label per parameter; defaults to the parameter name
    pub tex: BTreeMap<String, String>,
    /// Keep only the upper (`true`) or lower (`false`) triangle; both when
    /// unset
    pub upper: Option<bool>,
    /// Whether to create the diagonal 1D cells (default: true)
    pub diagonal: bool,
    /// Maximum number of ticks per axis (default: 3)
    pub ticks: usize,
}

impl Default for Axes2dOptions {
    fn default() -> Self {
        Self {
            tex: BTreeMap::new(),
            upper: None,
            diagonal: true,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl OptionSet for Axes2dOptions {
    fn validate(&self) -> PosteriorResult<()> {
        validate_positive("ticks", self.ticks)
    }
}

/// Options for sample compression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionOptions {
    /// Maximum number of representative points (default: 1000)
    pub n: usize,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            n: DEFAULT_COMPRESSION,
        }
    }
}

impl OptionSet for CompressionOptions {
    fn validate(&self) -> PosteriorResult<()> {
        validate_positive("n", self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Axes1dOptions::default().ticks, 3);
        assert!(Axes2dOptions::default().diagonal);
        assert_eq!(CompressionOptions::default().n, 1000);
        assert!(Plot1dOptions::default().bounds().is_unbounded());
    }

    #[test]
    fn test_from_toml() {
        let options = Contour2dOptions::from_toml_str("xmin = 0.0\nymax = 2.0\ncolor = \"#FF0000\"\n").unwrap();
        assert_eq!(options.xbounds(), Bounds::lower(0.0));
        assert_eq!(options.ybounds(), Bounds::upper(2.0));
        assert_eq!(options.color.as_deref(), Some("#FF0000"));
    }

    #[test]
    fn test_unknown_option_fails_at_construction() {
        let err = Plot1dOptions::from_toml_str("xmin = 0.0\nlinewidth = 2\n").unwrap_err();
        assert!(matches!(err, PosteriorError::OptionParse(_)));
        assert!(Axes2dOptions::from_toml_str("lower = true\n").is_err());
    }

    #[test]
    fn test_validation() {
        assert!(Plot1dOptions::from_toml_str("xmin = 1.0\nxmax = 0.0\n").is_err());
        assert!(Plot1dOptions::default().with_color("not a colour").validate().is_err());
        assert!(Axes1dOptions::from_toml_str("ncols = 0\n").is_err());
        assert!(Axes2dOptions::from_toml_str("ticks = 0\n").is_err());
        assert!(CompressionOptions::from_toml_str("n = 0\n").is_err());
        assert_eq!(CompressionOptions::from_toml_str("n = 50\n").unwrap().n, 50);
    }

    #[test]
    fn test_resolve_color() {
        let mut cycle = ColorCycle::new();
        let explicit = Plot1dOptions::default().with_color("#000000");
        assert_eq!(explicit.resolve_color(&mut cycle).unwrap(), Color::rgb(0.0, 0.0, 0.0));
        // explicit colours leave the cycle untouched
        let first = Plot1dOptions::default().resolve_color(&mut cycle).unwrap();
        assert_eq!(first.to_hex(), "#1F77B4");
    }

    #[test]
    fn test_tex_labels_parse() {
        let options = Axes1dOptions::from_toml_str("[tex]\nx0 = '$x_0$'\n").unwrap();
        assert_eq!(options.tex.get("x0").map(String::as_str), Some("$x_0$"));
    }
}

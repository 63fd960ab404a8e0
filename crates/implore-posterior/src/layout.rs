//! Axis-grid layouts for 1D and corner plots
//!
//! The layouts are plain data: which cell shows which parameter(s), which
//! cells share an axis, and where labels and ticks go. A renderer turns a
//! layout into real axes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PosteriorError, PosteriorResult};
use crate::options::{Axes1dOptions, Axes2dOptions, OptionSet};
use crate::ticks::TickLocator;

/// A value or an arbitrarily nested sequence of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    Scalar(T),
    Sequence(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Depth of sequence nesting: 0 for a scalar, 1 for a flat (or empty)
    /// sequence, and so on
    pub fn nest_level(&self) -> usize {
        match self {
            Nested::Scalar(_) => 0,
            Nested::Sequence(items) => 1 + items.iter().map(Nested::nest_level).max().unwrap_or(0),
        }
    }
}

impl<T> From<Vec<T>> for Nested<T> {
    fn from(items: Vec<T>) -> Self {
        Nested::Sequence(items.into_iter().map(Nested::Scalar).collect())
    }
}

/// Depth of sequence nesting of `value`
pub fn nest_level<T>(value: &Nested<T>) -> usize {
    value.nest_level()
}

/// Parameters of a corner plot: one list for both axes, or separate lists
pub type ParamSpec = Nested<String>;

/// Corner-plot parameters from separate x and y lists
pub fn param_pair<S: Into<String>>(xparams: Vec<S>, yparams: Vec<S>) -> ParamSpec {
    let list = |params: Vec<S>| Nested::from(params.into_iter().map(Into::into).collect::<Vec<String>>());
    Nested::Sequence(vec![list(xparams), list(yparams)])
}

/// Elements of `items` in first-seen order without repeats
pub fn unique<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

fn label_for(tex: &BTreeMap<String, String>, param: &str) -> String {
    tex.get(param).cloned().unwrap_or_else(|| param.to_string())
}

/// One cell of a 1D grid; y ticks are always hidden
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axes1dCell {
    pub param: String,
    pub row: usize,
    pub col: usize,
    pub xlabel: String,
    pub xticks: TickLocator,
}

/// Grid of 1D axes, filled row by row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axes1dLayout {
    pub nrows: usize,
    pub ncols: usize,
    pub cells: Vec<Axes1dCell>,
}

impl Axes1dLayout {
    pub fn get(&self, param: &str) -> Option<&Axes1dCell> {
        self.cells.iter().find(|c| c.param == param)
    }
}

/// Lay out one 1D axis per parameter
///
/// `ncols` defaults to `ceil(sqrt(n))` and `nrows = ceil(n / ncols)`.
pub fn make_1d_axes<S: AsRef<str>>(params: &[S], options: &Axes1dOptions) -> PosteriorResult<Axes1dLayout> {
    options.validate()?;
    if params.is_empty() {
        return Err(PosteriorError::InvalidOption {
            name: "params",
            reason: "at least one parameter is required".to_string(),
        });
    }

    let n = params.len();
    let ncols = options.ncols.unwrap_or_else(|| (n as f64).sqrt().ceil() as usize);
    let nrows = (n + ncols - 1) / ncols;
    let locator = TickLocator::with_max_ticks(options.ticks);

    let cells = params
        .iter()
        .enumerate()
        .map(|(i, p)| Axes1dCell {
            param: p.as_ref().to_string(),
            row: i / ncols,
            col: i % ncols,
            xlabel: label_for(&options.tex, p.as_ref()),
            xticks: locator,
        })
        .collect();

    Ok(Axes1dLayout { nrows, ncols, cells })
}

/// Where a cell sits relative to the diagonal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellPosition {
    Diagonal,
    Lower,
    Upper,
}

/// One cell of a corner plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axes2dCell {
    pub row: usize,
    pub col: usize,
    pub xparam: String,
    pub yparam: String,
    pub position: CellPosition,
    /// `(row, col)` of the cell whose x axis this one shares
    pub sharex: Option<(usize, usize)>,
    /// `(row, col)` of the cell whose y axis this one shares
    pub sharey: Option<(usize, usize)>,
    /// Set on the last cell of each column
    pub xlabel: Option<String>,
    pub xticks: Option<TickLocator>,
    /// Set on the first cell of each row
    pub ylabel: Option<String>,
    pub yticks: Option<TickLocator>,
}

/// Corner-plot grid with `yparams` as rows and `xparams` as columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axes2dLayout {
    pub xparams: Vec<String>,
    pub yparams: Vec<String>,
    /// Cells in row-major order; skipped positions are absent
    pub cells: Vec<Axes2dCell>,
}

impl Axes2dLayout {
    pub fn nrows(&self) -> usize {
        self.yparams.len()
    }

    pub fn ncols(&self) -> usize {
        self.xparams.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Axes2dCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    /// Cell plotting `yparam` against `xparam`
    pub fn get(&self, xparam: &str, yparam: &str) -> Option<&Axes2dCell> {
        self.cells
            .iter()
            .find(|c| c.xparam == xparam && c.yparam == yparam)
    }

    /// Every parameter on either axis, rows first
    pub fn params(&self) -> Vec<String> {
        unique(&[self.yparams.clone(), self.xparams.clone()].concat())
    }
}

fn flat_strings(items: &[Nested<String>]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            Nested::Scalar(s) => Some(s.clone()),
            Nested::Sequence(_) => None,
        })
        .collect()
}

fn split_params(params: &ParamSpec) -> PosteriorResult<(Vec<String>, Vec<String>)> {
    let invalid = |reason: &str| PosteriorError::InvalidOption {
        name: "params",
        reason: reason.to_string(),
    };

    match (params, params.nest_level()) {
        (Nested::Sequence(items), 1) => {
            let flat = flat_strings(items).ok_or_else(|| invalid("expected a list of names"))?;
            Ok((flat.clone(), flat))
        }
        (Nested::Sequence(items), 2) if items.len() == 2 => match (&items[0], &items[1]) {
            (Nested::Sequence(x), Nested::Sequence(y)) => {
                let x = flat_strings(x).ok_or_else(|| invalid("x parameters must be names"))?;
                let y = flat_strings(y).ok_or_else(|| invalid("y parameters must be names"))?;
                Ok((x, y))
            }
            _ => Err(invalid("expected a pair of name lists")),
        },
        _ => Err(invalid("expected a list of names or a pair of name lists")),
    }
}

/// Lay out a corner plot
///
/// A cell is `Lower` when both of its parameters appear on both axes and
/// the column parameter comes first; otherwise off-diagonal cells are
/// `Upper`. `upper` keeps a single triangle and `diagonal = false` drops the
/// diagonal.
pub fn make_2d_axes(params: &ParamSpec, options: &Axes2dOptions) -> PosteriorResult<Axes2dLayout> {
    options.validate()?;
    let (xparams, yparams) = split_params(params)?;

    let all_params: Vec<&String> = yparams.iter().chain(&xparams).collect();
    let first_index = |p: &String| all_params.iter().position(|q| *q == p);

    let mut cells: Vec<Axes2dCell> = Vec::new();
    for (row, py) in yparams.iter().enumerate() {
        for (col, px) in xparams.iter().enumerate() {
            let lower = yparams.contains(px) && xparams.contains(py) && first_index(px) < first_index(py);

            if px == py && !options.diagonal {
                continue;
            }
            if options.upper == Some(lower) && px != py {
                continue;
            }

            let sharex = cells.iter().find(|c| c.col == col).map(|c| (c.row, c.col));
            let sharey = cells.iter().find(|c| c.row == row).map(|c| (c.row, c.col));
            let position = if px == py {
                CellPosition::Diagonal
            } else if lower {
                CellPosition::Lower
            } else {
                CellPosition::Upper
            };

            cells.push(Axes2dCell {
                row,
                col,
                xparam: px.clone(),
                yparam: py.clone(),
                position,
                sharex,
                sharey,
                xlabel: None,
                xticks: None,
                ylabel: None,
                yticks: None,
            });
        }
    }

    let locator = TickLocator::with_max_ticks(options.ticks);
    for row in 0..yparams.len() {
        if let Some(first) = cells.iter_mut().find(|c| c.row == row) {
            first.ylabel = Some(label_for(&options.tex, &yparams[row]));
            first.yticks = Some(locator);
        }
    }
    for col in 0..xparams.len() {
        if let Some(last) = cells.iter_mut().rev().find(|c| c.col == col) {
            last.xlabel = Some(label_for(&options.tex, &xparams[col]));
            last.xticks = Some(locator);
        }
    }

    tracing::trace!(
        nrows = yparams.len(),
        ncols = xparams.len(),
        cells = cells.len(),
        "Built corner plot layout"
    );

    Ok(Axes2dLayout {
        xparams,
        yparams,
        cells,
    })
}

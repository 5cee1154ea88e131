//! Chart descriptions handed to the renderer.
//!
//! A [`Chart`] carries already-aggregated values; drawing never touches the dataset.

use crate::stats::LinearFit;
use plotters::style::RGBColor;
use serde::Serialize;

/// Title and axis descriptions shared by every chart kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
}

impl Labels {
    pub fn new(title: &str, x_desc: &str, y_desc: &str) -> Self {
        Self {
            title: title.into(),
            x_desc: x_desc.into(),
            y_desc: y_desc.into(),
        }
    }
}

/// Bar direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    /// Categories on the Y axis, first category at the bottom.
    Horizontal,
}

/// A named series of values aligned with a category list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// One slot per category; `None` where the series has no data.
    pub values: Vec<Option<f64>>,
}

/// Everything the renderer can draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// One bar per category.
    Bars {
        labels: Labels,
        bars: Vec<(String, f64)>,
        color: RGBColor,
        orientation: Orientation,
    },
    /// Side-by-side bars, one per series within each category.
    GroupedBars {
        labels: Labels,
        categories: Vec<String>,
        series: Vec<Series>,
    },
    /// Single line over ordered categories, optionally filled down to zero.
    Line {
        labels: Labels,
        points: Vec<(String, f64)>,
        fill: bool,
    },
    /// One line with markers per series over shared ordered categories.
    MultiLine {
        labels: Labels,
        categories: Vec<String>,
        series: Vec<Series>,
    },
    /// Labelled points.
    Scatter {
        labels: Labels,
        points: Vec<(String, f64, f64)>,
    },
    /// Row-level scatter with fitted line and marginal histograms.
    JointRegression {
        labels: Labels,
        points: Vec<(f64, f64)>,
        fit: Option<LinearFit>,
        bins: usize,
    },
    /// Annotated square matrix on a diverging scale in `[-1, 1]`.
    Heatmap {
        labels: Labels,
        names: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
}

impl Chart {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            Chart::Bars { bars, .. } => bars.is_empty(),
            Chart::GroupedBars { categories, series, .. }
            | Chart::MultiLine { categories, series, .. } => categories.is_empty() || series.is_empty(),
            Chart::Line { points, .. } => points.is_empty(),
            Chart::Scatter { points, .. } => points.is_empty(),
            Chart::JointRegression { points, .. } => points.is_empty(),
            Chart::Heatmap { names, .. } => names.is_empty(),
        }
    }
}

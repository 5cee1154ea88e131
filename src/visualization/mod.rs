//! The visualization dispatcher.
//!
//! A closed [`Visualization`] enum names every chart the application offers. For a
//! variant the [`Dispatcher`] computes its [`Aggregation`] from the shared dataset,
//! turns it into a [`Chart`], renders a PNG and writes an explanation from the same
//! numbers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sales_viz::{Dataset, Dispatcher, RenderOptions};
//!
//! let data = Arc::new(Dataset::load("supermarket_sales.csv")?);
//! let dispatcher = Dispatcher::new(data, RenderOptions::default());
//! if let Some(result) = dispatcher.dispatch("revenue") {
//!     println!("{}", result.img_tag());
//! }
//! # Ok::<(), sales_viz::SalesError>(())
//! ```

pub mod aggregate;

pub use aggregate::{Aggregation, Cell, Table};

use crate::config::{DEFAULT_HEIGHT, HEATMAP_HEIGHT, RenderOptions};
use crate::dataset::Dataset;
use crate::error::{Result, SalesError};
use crate::explain;
use crate::models::{GroupBy, Measure};
use crate::viz::{self, Chart, Labels, Orientation, PngImage, util};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Bins per marginal histogram in the joint plot.
const JOINT_BINS: usize = 10;

/// Every chart the application can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visualization {
    ProductDistribution,
    Profitability,
    Revenue,
    SalesVolume,
    SalesVolumeByGender,
    MonthlyIncome,
    GrossIncomeByGender,
    MonthlyGrossIncome,
    TotalGrossIncomeByBranch,
    AverageRatingsByProductLines,
    ProductLinesGrossIncome,
    AverageRatingsVsSalesVolume,
    CogsAndGrossIncome,
    CorrelationHeatmap,
}

impl Visualization {
    /// All variants in menu order.
    pub const ALL: [Visualization; 14] = [
        Visualization::ProductDistribution,
        Visualization::Profitability,
        Visualization::Revenue,
        Visualization::SalesVolume,
        Visualization::SalesVolumeByGender,
        Visualization::MonthlyIncome,
        Visualization::GrossIncomeByGender,
        Visualization::MonthlyGrossIncome,
        Visualization::TotalGrossIncomeByBranch,
        Visualization::AverageRatingsByProductLines,
        Visualization::ProductLinesGrossIncome,
        Visualization::AverageRatingsVsSalesVolume,
        Visualization::CogsAndGrossIncome,
        Visualization::CorrelationHeatmap,
    ];

    /// Look up a request tag. Surrounding whitespace is ignored; matching is exact otherwise.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Visualization::ProductDistribution => "product_distribution",
            Visualization::Profitability => "profitability",
            Visualization::Revenue => "revenue",
            Visualization::SalesVolume => "sales_volume",
            Visualization::SalesVolumeByGender => "sales_volume_by_gender",
            Visualization::MonthlyIncome => "monthly_income",
            Visualization::GrossIncomeByGender => "gross_income_by_gender",
            Visualization::MonthlyGrossIncome => "monthly_gross_income",
            Visualization::TotalGrossIncomeByBranch => "total_gross_income_by_branch",
            Visualization::AverageRatingsByProductLines => "average_ratings_by_product_lines",
            Visualization::ProductLinesGrossIncome => "product_lines_gross_income",
            Visualization::AverageRatingsVsSalesVolume => "average_ratings_vs_sales_volume",
            Visualization::CogsAndGrossIncome => "cogs_and_gross_income",
            Visualization::CorrelationHeatmap => "correlation_heatmap",
        }
    }

    /// Chart caption.
    pub fn title(&self) -> &'static str {
        match self {
            Visualization::ProductDistribution => "Distribution of Product Line",
            Visualization::Profitability => "Total Profitability by Product Line",
            Visualization::Revenue => "Total Revenue by Product Line",
            Visualization::SalesVolume => "Total Sales Volume by Product Line",
            Visualization::SalesVolumeByGender => {
                "Sales Volume by Product Line, Segmented by Gender"
            }
            Visualization::MonthlyIncome => "Monthly Gross Income by Product Line",
            Visualization::GrossIncomeByGender => "Gross Income by Product Line, Grouped by Gender",
            Visualization::MonthlyGrossIncome => "Monthly Gross Income",
            Visualization::TotalGrossIncomeByBranch => "Total Gross Income by Branch",
            Visualization::AverageRatingsByProductLines => "Average Ratings by Product Line",
            Visualization::ProductLinesGrossIncome => "Product Line Gross Income",
            Visualization::AverageRatingsVsSalesVolume => "Average Rating vs. Sales Volume",
            Visualization::CogsAndGrossIncome => "COGS vs. Gross Income",
            Visualization::CorrelationHeatmap => "Correlation Heatmap",
        }
    }

    /// Alternative text for the rendered image.
    pub fn alt_text(&self) -> &'static str {
        match self {
            Visualization::CogsAndGrossIncome => {
                "Scatter of cost of goods sold against gross income with regression line"
            }
            Visualization::CorrelationHeatmap => "Correlation heatmap of the numeric columns",
            other => other.title(),
        }
    }

    /// Menu label: the tag with underscores as spaces, each word capitalized.
    pub fn display_name(&self) -> String {
        self.tag()
            .split('_')
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// (x axis, y axis) descriptions.
    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            Visualization::ProductDistribution => ("Product Line", "Count"),
            Visualization::Profitability => ("Product line", "Total Profitability"),
            Visualization::Revenue => ("Product line", "Total Revenue"),
            Visualization::SalesVolume => ("Total Sales Volume", "Product line"),
            Visualization::SalesVolumeByGender => ("Product line", "Quantity"),
            Visualization::MonthlyIncome => ("Month", "Gross Income"),
            Visualization::GrossIncomeByGender => ("Product Line", "Quantity"),
            Visualization::MonthlyGrossIncome => ("Month", "Gross Income"),
            Visualization::TotalGrossIncomeByBranch => ("Branch", "Total Gross Income"),
            Visualization::AverageRatingsByProductLines => ("Product line", "Rating"),
            Visualization::ProductLinesGrossIncome => ("Product line", "Gross Income"),
            Visualization::AverageRatingsVsSalesVolume => ("Average Rating", "Sales Volume"),
            Visualization::CogsAndGrossIncome => ("Cost of Goods Sold (COGS)", "Gross Income"),
            Visualization::CorrelationHeatmap => ("", ""),
        }
    }

    pub fn labels(&self) -> Labels {
        let (x, y) = self.axis_labels();
        Labels::new(self.title(), x, y)
    }

    /// Canvas size for this chart. The heatmap is taller in proportion to the default height.
    pub fn canvas_size(&self, options: &RenderOptions) -> (u32, u32) {
        match self {
            Visualization::CorrelationHeatmap => (
                options.width,
                options.height.saturating_mul(HEATMAP_HEIGHT) / DEFAULT_HEIGHT,
            ),
            _ => (options.width, options.height),
        }
    }

    /// Compute this visualization's numbers from the dataset.
    pub fn aggregate(&self, dataset: &Dataset) -> Aggregation {
        use aggregate::*;
        let rows = dataset.records();
        match self {
            Visualization::ProductDistribution => count_per(rows, GroupBy::ProductLine),
            Visualization::Profitability => {
                sum_per(rows, GroupBy::ProductLine, Measure::GrossIncome)
            }
            Visualization::Revenue => sum_per(rows, GroupBy::ProductLine, Measure::Total),
            Visualization::SalesVolume => {
                sum_per(rows, GroupBy::ProductLine, Measure::Quantity).sorted_ascending()
            }
            Visualization::SalesVolumeByGender => {
                sum_per_pair(rows, GroupBy::ProductLine, GroupBy::Gender, Measure::Quantity)
            }
            Visualization::MonthlyIncome => {
                sum_per_pair(rows, GroupBy::Month, GroupBy::ProductLine, Measure::GrossIncome)
            }
            Visualization::GrossIncomeByGender => {
                sum_per_pair(rows, GroupBy::ProductLine, GroupBy::Gender, Measure::Quantity)
            }
            Visualization::MonthlyGrossIncome => {
                sum_per(rows, GroupBy::Month, Measure::GrossIncome)
            }
            Visualization::TotalGrossIncomeByBranch => {
                sum_per(rows, GroupBy::Branch, Measure::GrossIncome)
            }
            Visualization::AverageRatingsByProductLines => {
                mean_per(rows, GroupBy::ProductLine, Measure::Rating)
            }
            Visualization::ProductLinesGrossIncome => {
                sum_per(rows, GroupBy::ProductLine, Measure::GrossIncome).sorted_ascending()
            }
            Visualization::AverageRatingsVsSalesVolume => {
                mean_vs_sum(rows, GroupBy::ProductLine, Measure::Rating, Measure::Quantity)
            }
            Visualization::CogsAndGrossIncome => {
                row_pairs(rows, Measure::Cogs, Measure::GrossIncome)
            }
            Visualization::CorrelationHeatmap => correlation(dataset),
        }
    }

    /// Chart description for an aggregation produced by [`Visualization::aggregate`].
    pub fn chart(&self, agg: &Aggregation) -> Result<Chart> {
        let labels = self.labels();
        let chart = match (self, agg) {
            (
                Visualization::ProductDistribution
                | Visualization::Profitability
                | Visualization::Revenue
                | Visualization::TotalGrossIncomeByBranch
                | Visualization::AverageRatingsByProductLines,
                Aggregation::Series { values, .. },
            ) => Chart::Bars {
                labels,
                bars: values.clone(),
                color: self.bar_color(),
                orientation: Orientation::Vertical,
            },
            (Visualization::SalesVolume, Aggregation::Series { values, .. }) => Chart::Bars {
                labels,
                bars: values.clone(),
                color: self.bar_color(),
                orientation: Orientation::Horizontal,
            },
            (
                Visualization::SalesVolumeByGender | Visualization::GrossIncomeByGender,
                Aggregation::Grouped {
                    categories, series, ..
                },
            ) => Chart::GroupedBars {
                labels,
                categories: categories.clone(),
                series: series.clone(),
            },
            (
                Visualization::MonthlyIncome,
                Aggregation::Grouped {
                    categories, series, ..
                },
            ) => Chart::MultiLine {
                labels,
                categories: categories.clone(),
                series: series.clone(),
            },
            (Visualization::MonthlyGrossIncome, Aggregation::Series { values, .. }) => {
                Chart::Line {
                    labels,
                    points: values.clone(),
                    fill: true,
                }
            }
            (Visualization::ProductLinesGrossIncome, Aggregation::Series { values, .. }) => {
                Chart::Line {
                    labels,
                    points: values.clone(),
                    fill: false,
                }
            }
            (Visualization::AverageRatingsVsSalesVolume, Aggregation::Paired { values, .. }) => {
                Chart::Scatter {
                    labels,
                    points: values.clone(),
                }
            }
            (Visualization::CogsAndGrossIncome, Aggregation::Points { values, fit, .. }) => {
                Chart::JointRegression {
                    labels,
                    points: values.clone(),
                    fit: *fit,
                    bins: JOINT_BINS,
                }
            }
            (Visualization::CorrelationHeatmap, Aggregation::Matrix { labels: names, values }) => {
                Chart::Heatmap {
                    labels,
                    names: names.clone(),
                    matrix: values.clone(),
                }
            }
            _ => {
                return Err(SalesError::Render(anyhow!(
                    "aggregation shape does not fit the `{}` chart",
                    self.tag()
                )));
            }
        };
        Ok(chart)
    }

    fn bar_color(&self) -> plotters::style::RGBColor {
        match self {
            Visualization::Profitability => util::LIGHT_GREEN,
            Visualization::Revenue => util::SKY_BLUE,
            Visualization::SalesVolume => util::SALMON,
            _ => util::STEEL_BLUE,
        }
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Visualization {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| SalesError::InvalidInput {
            field: "visualization_type",
            reason: format!("unknown visualization `{}`", s.trim()),
        })
    }
}

/// A rendered chart with its explanation.
#[derive(Debug, Clone)]
pub struct VisualizationResult {
    pub kind: Visualization,
    pub image: PngImage,
    /// HTML fragment.
    pub explanation: String,
}

impl VisualizationResult {
    pub fn data_uri(&self) -> String {
        self.image.data_uri()
    }

    /// `<img>` element with the image inlined.
    pub fn img_tag(&self) -> String {
        format!(
            r#"<img src="{}" alt="{}">"#,
            self.data_uri(),
            explain::escape_html(self.kind.alt_text())
        )
    }
}

/// Turns visualization requests into rendered charts over one shared dataset.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    dataset: Arc<Dataset>,
    options: RenderOptions,
}

impl Dispatcher {
    pub fn new(dataset: Arc<Dataset>, options: RenderOptions) -> Self {
        Self { dataset, options }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the visualization named by `tag`.
    ///
    /// Unknown tags give `None`. Rendering failures are logged and also give `None`;
    /// use [`Dispatcher::render`] to see the error.
    pub fn dispatch(&self, tag: &str) -> Option<VisualizationResult> {
        let Some(kind) = Visualization::from_tag(tag) else {
            log::debug!("unknown visualization tag {:?}", tag);
            return None;
        };
        match self.render(kind) {
            Ok(result) => Some(result),
            Err(e) => {
                log::error!("rendering {} failed: {}", kind, e);
                None
            }
        }
    }

    pub fn aggregate(&self, kind: Visualization) -> Aggregation {
        kind.aggregate(&self.dataset)
    }

    /// Aggregate, draw and explain one visualization.
    pub fn render(&self, kind: Visualization) -> Result<VisualizationResult> {
        let agg = self.aggregate(kind);
        let chart = kind.chart(&agg)?;
        let (width, height) = kind.canvas_size(&self.options);
        let image = viz::render_png(&chart, width, height, &self.options.locale)?;
        log::debug!(
            "rendered {} ({}x{}, {} bytes)",
            kind,
            width,
            height,
            image.bytes.len()
        );
        let explanation = explain::explain(kind, &agg, &self.options);
        Ok(VisualizationResult {
            kind,
            image,
            explanation,
        })
    }

    /// Render straight to a file (`.svg` or `.png`).
    pub fn render_to_file<P: AsRef<Path>>(&self, kind: Visualization, path: P) -> Result<()> {
        let agg = self.aggregate(kind);
        let chart = kind.chart(&agg)?;
        let (width, height) = kind.canvas_size(&self.options);
        viz::render_to_file(&chart, path, width, height, &self.options.locale)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips() {
        for v in Visualization::ALL {
            assert_eq!(Visualization::from_tag(v.tag()), Some(v));
            assert_eq!(v.to_string().parse::<Visualization>().unwrap(), v);
        }
        assert_eq!(
            Visualization::from_tag("  revenue\n"),
            Some(Visualization::Revenue)
        );
        assert_eq!(Visualization::from_tag("Revenue"), None);
        assert_eq!(Visualization::from_tag(""), None);
    }

    #[test]
    fn display_names_are_title_cased() {
        assert_eq!(
            Visualization::TotalGrossIncomeByBranch.display_name(),
            "Total Gross Income By Branch"
        );
        assert_eq!(Visualization::Revenue.display_name(), "Revenue");
    }

    #[test]
    fn heatmap_canvas_is_taller() {
        let opts = RenderOptions::default();
        assert_eq!(
            Visualization::CorrelationHeatmap.canvas_size(&opts),
            (1000, 800)
        );
        assert_eq!(Visualization::Revenue.canvas_size(&opts), (1000, 600));
    }

    #[test]
    fn mismatched_shape_is_render_error() {
        let agg = Aggregation::Matrix {
            labels: vec![],
            values: vec![],
        };
        assert!(matches!(
            Visualization::Revenue.chart(&agg),
            Err(SalesError::Render(_))
        ));
    }
}

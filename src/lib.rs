//! sales_viz
//!
//! A Rust library and web application for exploring a supermarket sales table.
//! Pairs with the `sales-viz` CLI.
//!
//! ### Features
//! - Load the sales CSV once into an immutable, shareable [`Dataset`]
//! - Fourteen fixed aggregations (by product line, branch, gender, month) rendered as PNG charts
//! - Explanations written from the live numbers
//! - Grouped summary statistics (count, min, max, mean, median)
//! - A linear-regression predictor for the sale total
//! - Export an aggregation as CSV or JSON
//! - An axum web front end serving all of the above
//!
//! ### Example
//! ```no_run
//! use std::sync::Arc;
//! use sales_viz::{Dataset, Dispatcher, RenderOptions, Visualization};
//! use sales_viz::models::{GroupBy, Measure};
//!
//! let data = Arc::new(Dataset::load("supermarket_sales.csv")?);
//! let dispatcher = Dispatcher::new(Arc::clone(&data), RenderOptions::default());
//! dispatcher.render_to_file(Visualization::Revenue, "revenue.png")?;
//! let agg = dispatcher.aggregate(Visualization::TotalGrossIncomeByBranch);
//! sales_viz::storage::save_csv(&agg, "branch_income.csv")?;
//! let stats = sales_viz::stats::grouped_summary(data.records(), GroupBy::Branch, Measure::Rating);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod explain;
pub mod models;
pub mod predict;
pub mod stats;
pub mod storage;
pub mod visualization;
pub mod viz;
pub mod web;

pub use config::RenderOptions;
pub use dataset::Dataset;
pub use error::{Result, SalesError};
pub use models::{GroupKey, SaleRecord, YearMonth};
pub use visualization::{Aggregation, Dispatcher, Visualization, VisualizationResult};

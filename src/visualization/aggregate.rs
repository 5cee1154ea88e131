//! Aggregations behind each visualization.
//!
//! Everything here is a pure function of the rows; no rendering happens in this module.
//! Category groupings come out in `BTreeMap` order (alphabetical labels, chronological months).

use crate::dataset::Dataset;
use crate::models::{GroupBy, GroupKey, Measure, SaleRecord};
use crate::stats::{self, LinearFit};
use crate::viz::Series;
use serde::Serialize;
use std::collections::BTreeSet;

/// The numbers a visualization draws, explains and exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Aggregation {
    /// One value per group.
    Series {
        key: String,
        measure: String,
        values: Vec<(String, f64)>,
    },
    /// One value per (category, sub-group) pair; `None` where a pair has no rows.
    Grouped {
        key: String,
        subkey: String,
        measure: String,
        categories: Vec<String>,
        series: Vec<Series>,
    },
    /// Two measures per group.
    Paired {
        key: String,
        x: String,
        y: String,
        values: Vec<(String, f64, f64)>,
    },
    /// Row-level pairs with their least-squares line.
    Points {
        x: String,
        y: String,
        values: Vec<(f64, f64)>,
        fit: Option<LinearFit>,
    },
    /// Square matrix over named columns. NaN where undefined (serialized as `null`).
    Matrix {
        labels: Vec<String>,
        values: Vec<Vec<f64>>,
    },
}

/// A table cell for export.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

/// Flat table view of an [`Aggregation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn number(v: f64) -> Cell {
    if v.is_finite() {
        Cell::Number(v)
    } else {
        Cell::Empty
    }
}

impl Aggregation {
    /// Sort a `Series` ascending by value, ties broken by label. Other shapes are returned unchanged.
    pub fn sorted_ascending(mut self) -> Self {
        if let Aggregation::Series { values, .. } = &mut self {
            values.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        }
        self
    }

    /// Number of data points (groups, pairs, rows or matrix cells).
    pub fn len(&self) -> usize {
        match self {
            Aggregation::Series { values, .. } => values.len(),
            Aggregation::Grouped { series, .. } => series
                .iter()
                .map(|s| s.values.iter().flatten().count())
                .sum(),
            Aggregation::Paired { values, .. } => values.len(),
            Aggregation::Points { values, .. } => values.len(),
            Aggregation::Matrix { labels, .. } => labels.len() * labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Long-format table: one row per group, pair or matrix row.
    pub fn to_table(&self) -> Table {
        match self {
            Aggregation::Series {
                key,
                measure,
                values,
            } => Table {
                headers: vec![key.clone(), measure.clone()],
                rows: values
                    .iter()
                    .map(|(l, v)| vec![Cell::Text(l.clone()), number(*v)])
                    .collect(),
            },
            Aggregation::Grouped {
                key,
                subkey,
                measure,
                categories,
                series,
            } => {
                let mut rows = Vec::new();
                for (ci, category) in categories.iter().enumerate() {
                    for s in series {
                        if let Some(Some(v)) = s.values.get(ci) {
                            rows.push(vec![
                                Cell::Text(category.clone()),
                                Cell::Text(s.name.clone()),
                                number(*v),
                            ]);
                        }
                    }
                }
                Table {
                    headers: vec![key.clone(), subkey.clone(), measure.clone()],
                    rows,
                }
            }
            Aggregation::Paired { key, x, y, values } => Table {
                headers: vec![key.clone(), x.clone(), y.clone()],
                rows: values
                    .iter()
                    .map(|(l, a, b)| vec![Cell::Text(l.clone()), number(*a), number(*b)])
                    .collect(),
            },
            Aggregation::Points { x, y, values, .. } => Table {
                headers: vec![x.clone(), y.clone()],
                rows: values
                    .iter()
                    .map(|(a, b)| vec![number(*a), number(*b)])
                    .collect(),
            },
            Aggregation::Matrix { labels, values } => {
                let mut headers = vec![String::new()];
                headers.extend(labels.iter().cloned());
                let rows = labels
                    .iter()
                    .zip(values)
                    .map(|(l, row)| {
                        let mut cells = vec![Cell::Text(l.clone())];
                        cells.extend(row.iter().map(|v| number(*v)));
                        cells
                    })
                    .collect();
                Table { headers, rows }
            }
        }
    }
}

/// Number of rows per group.
pub fn count_per(records: &[SaleRecord], by: GroupBy) -> Aggregation {
    let counts = stats::count_by(records, |r| by.key(r));
    Aggregation::Series {
        key: by.column_name().into(),
        measure: "Count".into(),
        values: counts
            .into_iter()
            .map(|(k, n)| (k.to_string(), n as f64))
            .collect(),
    }
}

/// Sum of `measure` per group.
pub fn sum_per(records: &[SaleRecord], by: GroupBy, measure: Measure) -> Aggregation {
    let sums = stats::sum_by(records, |r| by.key(r), |r| measure.value(r));
    Aggregation::Series {
        key: by.column_name().into(),
        measure: measure.column_name().into(),
        values: labelled(sums),
    }
}

/// Mean of `measure` per group.
pub fn mean_per(records: &[SaleRecord], by: GroupBy, measure: Measure) -> Aggregation {
    let means = stats::mean_by(records, |r| by.key(r), |r| measure.value(r));
    Aggregation::Series {
        key: by.column_name().into(),
        measure: measure.column_name().into(),
        values: labelled(means),
    }
}

fn labelled(map: std::collections::BTreeMap<GroupKey, f64>) -> Vec<(String, f64)> {
    map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Sum of `measure` per (`outer`, `inner`) pair. `outer` groups become categories,
/// `inner` groups become series.
pub fn sum_per_pair(
    records: &[SaleRecord],
    outer: GroupBy,
    inner: GroupBy,
    measure: Measure,
) -> Aggregation {
    let nested = stats::sum_by_pair(records, |r| outer.key(r), |r| inner.key(r), |r| {
        measure.value(r)
    });
    let inner_keys: BTreeSet<&GroupKey> = nested.values().flat_map(|m| m.keys()).collect();

    let categories: Vec<String> = nested.keys().map(|k| k.to_string()).collect();
    let series = inner_keys
        .into_iter()
        .map(|ik| Series {
            name: ik.to_string(),
            values: nested.values().map(|m| m.get(ik).copied()).collect(),
        })
        .collect();

    Aggregation::Grouped {
        key: outer.column_name().into(),
        subkey: inner.column_name().into(),
        measure: measure.column_name().into(),
        categories,
        series,
    }
}

/// Mean of `x` against sum of `y`, per group.
pub fn mean_vs_sum(records: &[SaleRecord], by: GroupBy, x: Measure, y: Measure) -> Aggregation {
    let means = stats::mean_by(records, |r| by.key(r), |r| x.value(r));
    let sums = stats::sum_by(records, |r| by.key(r), |r| y.value(r));
    let values = means
        .into_iter()
        .filter_map(|(k, m)| sums.get(&k).map(|s| (k.to_string(), m, *s)))
        .collect();
    Aggregation::Paired {
        key: by.column_name().into(),
        x: format!("Average {}", x.column_name()),
        y: format!("Total {}", y.column_name()),
        values,
    }
}

/// Row-level (`x`, `y`) pairs and the least-squares line through them.
pub fn row_pairs(records: &[SaleRecord], x: Measure, y: Measure) -> Aggregation {
    let values: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((x.value(r)?, y.value(r)?)))
        .collect();
    let (xs, ys): (Vec<f64>, Vec<f64>) = values.iter().copied().unzip();
    Aggregation::Points {
        x: x.column_name().into(),
        y: y.column_name().into(),
        fit: stats::linear_fit(&xs, &ys),
        values,
    }
}

/// Pearson correlation between every numeric column present in all rows.
pub fn correlation(dataset: &Dataset) -> Aggregation {
    let measures = dataset.numeric_columns();
    let columns: Vec<Vec<f64>> = measures.iter().map(|m| dataset.column(*m)).collect();
    Aggregation::Matrix {
        labels: measures.iter().map(|m| m.column_name().to_string()).collect(),
        values: stats::correlation_matrix(&columns),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(branch: &str, line: &str, gender: &str, income: f64, date: (i32, u32, u32)) -> SaleRecord {
        SaleRecord {
            invoice_id: None,
            branch: branch.into(),
            city: None,
            customer_type: None,
            gender: gender.into(),
            product_line: line.into(),
            unit_price: 10.0,
            quantity: 2,
            tax: income,
            total: 20.0 + income,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: None,
            payment: None,
            cogs: 20.0,
            gross_margin_pct: None,
            gross_income: income,
            rating: 7.0,
        }
    }

    #[test]
    fn grouped_fills_missing_pairs_with_none() {
        let rows = vec![
            rec("A", "Food", "Female", 1.0, (2019, 1, 1)),
            rec("A", "Food", "Male", 2.0, (2019, 1, 2)),
            rec("A", "Sports", "Male", 3.0, (2019, 1, 3)),
        ];
        let Aggregation::Grouped {
            categories, series, ..
        } = sum_per_pair(&rows, GroupBy::ProductLine, GroupBy::Gender, Measure::GrossIncome)
        else {
            panic!("expected grouped aggregation");
        };
        assert_eq!(categories, vec!["Food", "Sports"]);
        assert_eq!(series[0].name, "Female");
        assert_eq!(series[0].values, vec![Some(1.0), None]);
        assert_eq!(series[1].values, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn sorted_ascending_breaks_ties_by_label() {
        let agg = Aggregation::Series {
            key: "k".into(),
            measure: "m".into(),
            values: vec![("b".into(), 1.0), ("c".into(), 0.5), ("a".into(), 1.0)],
        }
        .sorted_ascending();
        let Aggregation::Series { values, .. } = agg else {
            unreachable!()
        };
        let labels: Vec<&str> = values.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }

    #[test]
    fn matrix_table_blanks_undefined_cells() {
        let agg = Aggregation::Matrix {
            labels: vec!["x".into(), "y".into()],
            values: vec![vec![1.0, f64::NAN], vec![f64::NAN, f64::NAN]],
        };
        let t = agg.to_table();
        assert_eq!(t.headers, vec!["", "x", "y"]);
        assert_eq!(t.rows[0][2], Cell::Empty);
        assert_eq!(t.rows[0][1], Cell::Number(1.0));
    }
}

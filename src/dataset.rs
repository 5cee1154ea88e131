//! The in-memory sales table.
//!
//! A [`Dataset`] is loaded once and never mutated. Callers share it through an
//! `Arc<Dataset>`; every aggregation reads the same snapshot.

use crate::error::{Result, SalesError};
use crate::models::{Measure, SaleRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Immutable, typed view of the source CSV plus its raw cells.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    cells: Vec<Vec<String>>,
    records: Vec<SaleRecord>,
}

impl Dataset {
    /// Load from a CSV file. Any unreadable or invalid row fails the whole load.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| SalesError::DatasetLoad {
            source_name: name.clone(),
            reason: e.to_string(),
        })?;
        let ds = Self::from_reader_named(file, &name)?;
        log::info!("loaded {} rows from {}", ds.len(), name);
        Ok(ds)
    }

    /// Load from any CSV reader (header row required).
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        Self::from_reader_named(rdr, "<reader>")
    }

    fn from_reader_named<R: Read>(rdr: R, name: &str) -> Result<Self> {
        let fail = |reason: String| SalesError::DatasetLoad {
            source_name: name.to_string(),
            reason,
        };

        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(rdr);
        let header_record: StringRecord = rdr.headers().map_err(|e| fail(e.to_string()))?.clone();

        let mut cells = Vec::new();
        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            // Line 1 is the header.
            let line = i + 2;
            let row = row.map_err(|e| fail(format!("line {line}: {e}")))?;
            let rec: SaleRecord = row
                .deserialize(Some(&header_record))
                .map_err(|e| fail(format!("line {line}: {e}")))?;
            cells.push(row.iter().map(str::to_string).collect());
            records.push(rec);
        }
        if records.is_empty() {
            return Err(fail("no data rows".into()));
        }

        Ok(Self {
            headers: header_record.iter().map(str::to_string).collect(),
            cells,
            records,
        })
    }

    /// Build from typed rows. The raw table is derived from the typed values.
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        let with_margin = records.iter().all(|r| r.gross_margin_pct.is_some());
        let mut headers: Vec<String> = [
            "Branch",
            "Gender",
            "Product line",
            "Unit price",
            "Quantity",
            "Tax 5%",
            "Total",
            "Date",
            "cogs",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        if with_margin {
            headers.push("gross margin percentage".into());
        }
        headers.push("gross income".into());
        headers.push("Rating".into());

        let cells = records
            .iter()
            .map(|r| {
                let mut row = vec![
                    r.branch.clone(),
                    r.gender.clone(),
                    r.product_line.clone(),
                    r.unit_price.to_string(),
                    r.quantity.to_string(),
                    r.tax.to_string(),
                    r.total.to_string(),
                    r.date.format("%-m/%-d/%Y").to_string(),
                    r.cogs.to_string(),
                ];
                if let Some(m) = r.gross_margin_pct.filter(|_| with_margin) {
                    row.push(m.to_string());
                }
                row.push(r.gross_income.to_string());
                row.push(r.rating.to_string());
                row
            })
            .collect();

        Self {
            headers,
            cells,
            records,
        }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header row as it appeared in the source.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Raw cell text, row by row, in source order.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// True when every row carries a value for `measure`.
    pub fn has_column(&self, measure: Measure) -> bool {
        self.records.iter().all(|r| measure.value(r).is_some())
    }

    /// Values of one numeric column; rows without a value are skipped.
    pub fn column(&self, measure: Measure) -> Vec<f64> {
        self.records.iter().filter_map(|r| measure.value(r)).collect()
    }

    /// Numeric columns present in every row, in source order.
    pub fn numeric_columns(&self) -> Vec<Measure> {
        Measure::NUMERIC_COLUMNS
            .into_iter()
            .filter(|m| self.has_column(*m))
            .collect()
    }
}

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date formats accepted in the `Date` column. The source file uses `M/D/YYYY`.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// One sales transaction (one row of the source CSV).
///
/// Header names match the source file exactly. Columns the visualizations
/// do not need are optional so trimmed-down exports still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRecord {
    #[serde(rename = "Invoice ID", default)]
    pub invoice_id: Option<String>,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "Customer type", default)]
    pub customer_type: Option<String>,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Product line")]
    pub product_line: String,
    #[serde(rename = "Unit price")]
    pub unit_price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Tax 5%")]
    pub tax: f64,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "Date", deserialize_with = "de_sale_date")]
    pub date: NaiveDate,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Payment", default)]
    pub payment: Option<String>,
    #[serde(rename = "cogs")]
    pub cogs: f64,
    #[serde(rename = "gross margin percentage", default)]
    pub gross_margin_pct: Option<f64>,
    #[serde(rename = "gross income")]
    pub gross_income: f64,
    #[serde(rename = "Rating")]
    pub rating: f64,
}

impl SaleRecord {
    /// Calendar month this sale falls into.
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

/// Parse a sale date in any of the accepted formats.
pub fn parse_sale_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Serde helper: parse the `Date` column into a real calendar date.
fn de_sale_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct DateVisitor;

    impl Visitor<'_> for DateVisitor {
        type Value = NaiveDate;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a date formatted as M/D/YYYY or YYYY-MM-DD")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_sale_date(s).ok_or_else(|| E::custom(format!("unrecognized date `{s}`")))
        }
    }

    deserializer.deserialize_str(DateVisitor)
}

/// A date truncated to its calendar month.
///
/// Field order makes the derived `Ord` chronological: year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Categorical dimension a summary can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GroupBy {
    ProductLine,
    Branch,
    Gender,
    Month,
}

impl GroupBy {
    pub fn key(&self, r: &SaleRecord) -> GroupKey {
        match self {
            GroupBy::ProductLine => GroupKey::Label(r.product_line.clone()),
            GroupBy::Branch => GroupKey::Label(r.branch.clone()),
            GroupBy::Gender => GroupKey::Label(r.gender.clone()),
            GroupBy::Month => GroupKey::Month(r.month()),
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            GroupBy::ProductLine => "Product line",
            GroupBy::Branch => "Branch",
            GroupBy::Gender => "Gender",
            GroupBy::Month => "Month",
        }
    }
}

/// Grouping key used in stats. Months keep their calendar type so ordering is chronological.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Label(String),
    Month(YearMonth),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Label(s) => f.write_str(s),
            GroupKey::Month(m) => m.fmt(f),
        }
    }
}

/// Numeric column of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    UnitPrice,
    Quantity,
    Tax,
    Total,
    Cogs,
    GrossMarginPct,
    GrossIncome,
    Rating,
}

impl Measure {
    /// All numeric columns, in source-file order.
    pub const NUMERIC_COLUMNS: [Measure; 8] = [
        Measure::UnitPrice,
        Measure::Quantity,
        Measure::Tax,
        Measure::Total,
        Measure::Cogs,
        Measure::GrossMarginPct,
        Measure::GrossIncome,
        Measure::Rating,
    ];

    /// Value for a row. `None` only for optional columns missing in that row.
    pub fn value(&self, r: &SaleRecord) -> Option<f64> {
        match self {
            Measure::UnitPrice => Some(r.unit_price),
            Measure::Quantity => Some(r.quantity as f64),
            Measure::Tax => Some(r.tax),
            Measure::Total => Some(r.total),
            Measure::Cogs => Some(r.cogs),
            Measure::GrossMarginPct => r.gross_margin_pct,
            Measure::GrossIncome => Some(r.gross_income),
            Measure::Rating => Some(r.rating),
        }
    }

    /// Header name in the source CSV.
    pub fn column_name(&self) -> &'static str {
        match self {
            Measure::UnitPrice => "Unit price",
            Measure::Quantity => "Quantity",
            Measure::Tax => "Tax 5%",
            Measure::Total => "Total",
            Measure::Cogs => "cogs",
            Measure::GrossMarginPct => "gross margin percentage",
            Measure::GrossIncome => "gross income",
            Measure::Rating => "Rating",
        }
    }
}

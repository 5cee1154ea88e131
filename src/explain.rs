//! HTML explanations written from the aggregated numbers.
//!
//! Each explanation is a fragment: an intro paragraph, a table of the figures behind
//! the chart, a short list of observations, and a closing remark. All labels taken
//! from the data are escaped.

use crate::config::RenderOptions;
use crate::stats::pearson;
use crate::visualization::{Aggregation, Visualization};
use crate::viz::Series;
use crate::viz::util::format_decimal;
use num_format::Locale;
use std::fmt::Write;

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// How the values of a visualization are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Currency,
    Count,
    Rating,
}

/// Locale-aware number formatting.
#[derive(Debug, Clone, Copy)]
struct Num {
    locale: &'static Locale,
    dec_sep: char,
}

impl Num {
    fn fixed(&self, v: f64, decimals: usize) -> String {
        format_decimal(v, decimals, self.locale, self.dec_sep)
    }

    fn unit(&self, v: f64, unit: Unit) -> String {
        match unit {
            Unit::Currency => format!("${}", self.fixed(v, 2)),
            Unit::Count => self.fixed(v, 0),
            Unit::Rating => self.fixed(v, 2),
        }
    }

    fn pct(&self, v: f64) -> String {
        format!("{}%", self.fixed(v, 1))
    }
}

fn unit_of(kind: Visualization) -> Unit {
    match kind {
        Visualization::ProductDistribution
        | Visualization::SalesVolume
        | Visualization::SalesVolumeByGender
        | Visualization::GrossIncomeByGender => Unit::Count,
        Visualization::AverageRatingsByProductLines => Unit::Rating,
        Visualization::Profitability
        | Visualization::Revenue
        | Visualization::MonthlyIncome
        | Visualization::MonthlyGrossIncome
        | Visualization::TotalGrossIncomeByBranch
        | Visualization::ProductLinesGrossIncome
        | Visualization::AverageRatingsVsSalesVolume
        | Visualization::CogsAndGrossIncome
        | Visualization::CorrelationHeatmap => Unit::Currency,
    }
}

/// Noun phrase for the measured quantity, used in sentences.
fn noun(kind: Visualization) -> &'static str {
    match kind {
        Visualization::ProductDistribution => "number of transactions",
        Visualization::Profitability => "total profitability",
        Visualization::Revenue => "total revenue",
        Visualization::SalesVolume
        | Visualization::SalesVolumeByGender
        | Visualization::GrossIncomeByGender => "sales volume",
        Visualization::AverageRatingsByProductLines => "average rating",
        Visualization::AverageRatingsVsSalesVolume => "average rating",
        Visualization::CorrelationHeatmap => "correlation",
        Visualization::MonthlyIncome
        | Visualization::MonthlyGrossIncome
        | Visualization::TotalGrossIncomeByBranch
        | Visualization::ProductLinesGrossIncome
        | Visualization::CogsAndGrossIncome => "gross income",
    }
}

fn intro(kind: Visualization) -> &'static str {
    match kind {
        Visualization::ProductDistribution => {
            "The chart counts the transactions recorded for each product line."
        }
        Visualization::Profitability => {
            "The chart shows the gross income earned by each product line, summed over all transactions."
        }
        Visualization::Revenue => {
            "The chart shows the total revenue (including tax) generated by each product line."
        }
        Visualization::SalesVolume => {
            "The chart shows the number of units sold per product line, from the lowest to the highest volume."
        }
        Visualization::SalesVolumeByGender => {
            "The chart splits the units sold in each product line by the gender of the customer."
        }
        Visualization::MonthlyIncome => {
            "The chart follows the gross income of every product line month by month."
        }
        Visualization::GrossIncomeByGender => {
            "The bars show units sold, not gross income: the quantity sold in each product line is split by the gender of the customer."
        }
        Visualization::MonthlyGrossIncome => {
            "The chart follows the store-wide gross income month by month."
        }
        Visualization::TotalGrossIncomeByBranch => {
            "The provided data presents the total gross income for each branch."
        }
        Visualization::AverageRatingsByProductLines => {
            "The chart shows the mean customer rating given to each product line."
        }
        Visualization::ProductLinesGrossIncome => {
            "The chart ranks the product lines by gross income, from the lowest to the highest."
        }
        Visualization::AverageRatingsVsSalesVolume => {
            "Each point is a product line, placed by its average customer rating and its total sales volume."
        }
        Visualization::CogsAndGrossIncome => {
            "Each point is a single transaction, placed by its cost of goods sold and its gross income. The margins show how both are distributed."
        }
        Visualization::CorrelationHeatmap => {
            "The heatmap shows the Pearson correlation between every pair of numeric columns, from -1 (blue) to +1 (red)."
        }
    }
}

fn closing(kind: Visualization) -> &'static str {
    match kind {
        Visualization::ProductDistribution | Visualization::SalesVolume => {
            "Comparing volumes helps with stock planning and shelf allocation."
        }
        Visualization::Profitability
        | Visualization::Revenue
        | Visualization::ProductLinesGrossIncome => {
            "These figures help assess the financial performance of each product line and support resource allocation."
        }
        Visualization::SalesVolumeByGender | Visualization::GrossIncomeByGender => {
            "Differences between customer groups can guide targeted marketing."
        }
        Visualization::MonthlyIncome | Visualization::MonthlyGrossIncome => {
            "Month-to-month movement points at seasonal patterns worth planning for."
        }
        Visualization::TotalGrossIncomeByBranch => {
            "Understanding how income is distributed across branches helps evaluate branch performance and allocate resources."
        }
        Visualization::AverageRatingsByProductLines | Visualization::AverageRatingsVsSalesVolume => {
            "Ratings are feedback on customer satisfaction; weak spots are candidates for improvement."
        }
        Visualization::CogsAndGrossIncome | Visualization::CorrelationHeatmap => {
            "Correlation describes how columns move together; it does not establish cause."
        }
    }
}

/// Build the explanation for `kind` from its aggregation.
pub fn explain(kind: Visualization, agg: &Aggregation, options: &RenderOptions) -> String {
    let num = Num {
        locale: options.num_locale(),
        dec_sep: options.decimal_separator(),
    };
    let unit = unit_of(kind);

    let mut out = String::new();
    let _ = writeln!(out, "<p>{}</p>", intro(kind));
    let insights = match agg {
        Aggregation::Series {
            key,
            measure,
            values,
        } => {
            let value_header = header_for(kind, measure);
            write_table(
                &mut out,
                &[key.as_str(), value_header.as_str()],
                values
                    .iter()
                    .map(|(l, v)| vec![escape_html(l), num.unit(*v, unit)]),
            );
            series_insights(kind, values, unit, num)
        }
        Aggregation::Grouped {
            key,
            categories,
            series,
            ..
        } => {
            let mut headers = vec![key.as_str()];
            headers.extend(series.iter().map(|s| s.name.as_str()));
            write_table(
                &mut out,
                &headers,
                categories.iter().enumerate().map(|(ci, c)| {
                    let mut row = vec![escape_html(c)];
                    row.extend(series.iter().map(|s| match s.values.get(ci) {
                        Some(Some(v)) => num.unit(*v, unit),
                        _ => "&ndash;".to_string(),
                    }));
                    row
                }),
            );
            grouped_insights(kind, categories, series, unit, num)
        }
        Aggregation::Paired { key, x, y, values } => {
            write_table(
                &mut out,
                &[key.as_str(), x.as_str(), y.as_str()],
                values.iter().map(|(l, a, b)| {
                    vec![
                        escape_html(l),
                        num.unit(*a, Unit::Rating),
                        num.unit(*b, Unit::Count),
                    ]
                }),
            );
            paired_insights(values, num)
        }
        Aggregation::Points { x, y, values, fit } => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = values.iter().copied().unzip();
            let mut items = vec![format!(
                "The chart covers <strong>{}</strong> transactions.",
                num.fixed(values.len() as f64, 0)
            )];
            if let Some(fit) = fit {
                items.push(format!(
                    "The fitted line is {} &asymp; {} + {} &times; {}: each additional $1 of {} goes with about ${} of {}.",
                    escape_html(y),
                    num.fixed(fit.intercept, 4),
                    num.fixed(fit.slope, 4),
                    escape_html(x),
                    escape_html(x),
                    num.fixed(fit.slope, 4),
                    escape_html(y),
                ));
            }
            let r = pearson(&xs, &ys);
            if r.is_finite() {
                items.push(format!(
                    "The correlation coefficient is {} ({} relationship).",
                    num.fixed(r, 3),
                    describe(r)
                ));
            }
            items
        }
        Aggregation::Matrix { labels, values } => {
            let mut headers = vec![""];
            headers.extend(labels.iter().map(String::as_str));
            write_table(
                &mut out,
                &headers,
                labels.iter().zip(values).map(|(l, row)| {
                    let mut cells = vec![escape_html(l)];
                    cells.extend(row.iter().map(|v| num.fixed(*v, 2)));
                    cells
                }),
            );
            matrix_insights(labels, values, num)
        }
    };

    if !insights.is_empty() {
        out.push_str("<p><strong>Insights:</strong></p>\n<ol>\n");
        for item in insights {
            let _ = writeln!(out, "  <li>{item}</li>");
        }
        out.push_str("</ol>\n");
    }
    let _ = writeln!(out, "<p>{}</p>", closing(kind));
    out
}

fn header_for(kind: Visualization, measure: &str) -> String {
    match unit_of(kind) {
        Unit::Currency => format!("{} ($)", measure),
        Unit::Count | Unit::Rating => measure.to_string(),
    }
}

fn write_table<I>(out: &mut String, headers: &[&str], rows: I)
where
    I: IntoIterator<Item = Vec<String>>,
{
    out.push_str("<table>\n  <tr>");
    for h in headers {
        let _ = write!(out, "<th>{}</th>", escape_html(h));
    }
    out.push_str("</tr>\n");
    for row in rows {
        out.push_str("  <tr>");
        for cell in row {
            let _ = write!(out, "<td>{cell}</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

/// True when values add up to a meaningful total.
fn additive(kind: Visualization) -> bool {
    kind != Visualization::AverageRatingsByProductLines
}

fn series_insights(kind: Visualization, values: &[(String, f64)], unit: Unit, num: Num) -> Vec<String> {
    let Some((top, top_v)) = values.iter().max_by(|a, b| a.1.total_cmp(&b.1)) else {
        return Vec::new();
    };
    let Some((low, low_v)) = values.iter().min_by(|a, b| a.1.total_cmp(&b.1)) else {
        return Vec::new();
    };
    let total: f64 = values.iter().map(|(_, v)| v).sum();
    let noun = noun(kind);

    let mut items = Vec::new();
    let mut first = format!(
        "<strong>{}</strong> has the highest {} at {}",
        escape_html(top),
        noun,
        num.unit(*top_v, unit)
    );
    if additive(kind) && total > 0.0 {
        let _ = write!(
            first,
            ", {} of the overall {}",
            num.pct(top_v / total * 100.0),
            num.unit(total, unit)
        );
    }
    first.push('.');
    items.push(first);

    if values.len() > 1 {
        items.push(format!(
            "<strong>{}</strong> has the lowest {} at {}.",
            escape_html(low),
            noun,
            num.unit(*low_v, unit)
        ));
        let gap = top_v - low_v;
        if *low_v > 0.0 {
            items.push(format!(
                "The gap between them is {} ({} above the lowest).",
                num.unit(gap, unit),
                num.pct(gap / low_v * 100.0)
            ));
        }
    }

    if kind == Visualization::MonthlyGrossIncome && values.len() > 1 {
        let (first_m, first_v) = &values[0];
        let (last_m, last_v) = &values[values.len() - 1];
        if *first_v > 0.0 {
            let change = (last_v - first_v) / first_v * 100.0;
            items.push(format!(
                "From {} to {} gross income {} by {}.",
                escape_html(first_m),
                escape_html(last_m),
                if change >= 0.0 { "rose" } else { "fell" },
                num.pct(change.abs())
            ));
        }
    }
    items
}

fn grouped_insights(
    kind: Visualization,
    categories: &[String],
    series: &[Series],
    unit: Unit,
    num: Num,
) -> Vec<String> {
    let mut items = Vec::new();
    let noun = noun(kind);

    let totals: Vec<(&str, f64)> = series
        .iter()
        .map(|s| (s.name.as_str(), s.values.iter().flatten().sum()))
        .collect();
    if let Some((name, v)) = totals.iter().max_by(|a, b| a.1.total_cmp(&b.1)) {
        items.push(format!(
            "Across all categories, <strong>{}</strong> leads with a {} of {}.",
            escape_html(name),
            noun,
            num.unit(*v, unit)
        ));
    }

    let category_totals: Vec<(&String, f64)> = categories
        .iter()
        .enumerate()
        .map(|(ci, c)| {
            let sum = series
                .iter()
                .filter_map(|s| s.values.get(ci).copied().flatten())
                .sum();
            (c, sum)
        })
        .collect();
    if let Some((c, v)) = category_totals.iter().max_by(|a, b| a.1.total_cmp(&b.1)) {
        items.push(format!(
            "<strong>{}</strong> has the highest combined {} ({}).",
            escape_html(c),
            noun,
            num.unit(*v, unit)
        ));
    }

    // per-category leaders only read well for a handful of sub-groups
    if series.len() <= 3 {
        for (ci, c) in categories.iter().enumerate() {
            let present: Vec<(&str, f64)> = series
                .iter()
                .filter_map(|s| s.values.get(ci).copied().flatten().map(|v| (s.name.as_str(), v)))
                .collect();
            let Some((lead, lead_v)) = present.iter().max_by(|a, b| a.1.total_cmp(&b.1)) else {
                continue;
            };
            let Some((_, low_v)) = present.iter().min_by(|a, b| a.1.total_cmp(&b.1)) else {
                continue;
            };
            if present.len() > 1 {
                items.push(format!(
                    "{}: <strong>{}</strong> ahead by {}.",
                    escape_html(c),
                    escape_html(lead),
                    num.unit(lead_v - low_v, unit)
                ));
            }
        }
    }
    items
}

fn paired_insights(values: &[(String, f64, f64)], num: Num) -> Vec<String> {
    let mut items = Vec::new();
    if let Some((l, x, _)) = values.iter().max_by(|a, b| a.1.total_cmp(&b.1)) {
        items.push(format!(
            "<strong>{}</strong> has the highest average rating ({}).",
            escape_html(l),
            num.unit(*x, Unit::Rating)
        ));
    }
    if let Some((l, _, y)) = values.iter().max_by(|a, b| a.2.total_cmp(&b.2)) {
        items.push(format!(
            "<strong>{}</strong> sells the most units ({}).",
            escape_html(l),
            num.unit(*y, Unit::Count)
        ));
    }
    if values.len() >= 3 {
        let xs: Vec<f64> = values.iter().map(|v| v.1).collect();
        let ys: Vec<f64> = values.iter().map(|v| v.2).collect();
        let r = pearson(&xs, &ys);
        if r.is_finite() {
            items.push(format!(
                "Across product lines, rating and sales volume show {} relationship (r = {}).",
                describe(r),
                num.fixed(r, 2)
            ));
        }
    }
    items
}

fn matrix_insights(labels: &[String], values: &[Vec<f64>], num: Num) -> Vec<String> {
    let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
    for (i, row) in values.iter().enumerate() {
        for (j, r) in row.iter().enumerate().skip(i + 1) {
            if r.is_finite() {
                pairs.push((i, j, *r));
            }
        }
    }
    pairs.sort_by(|a, b| b.2.total_cmp(&a.2));

    let name = |i: usize| escape_html(labels.get(i).map(String::as_str).unwrap_or(""));
    let mut items: Vec<String> = pairs
        .iter()
        .take(3)
        .filter(|(_, _, r)| *r > 0.0)
        .map(|(i, j, r)| {
            format!(
                "<strong>{}</strong> and <strong>{}</strong>: {} correlation ({}).",
                name(*i),
                name(*j),
                describe(*r),
                num.fixed(*r, 2)
            )
        })
        .collect();

    if let Some((i, j, r)) = pairs.iter().min_by(|a, b| a.2.abs().total_cmp(&b.2.abs())) {
        items.push(format!(
            "The weakest link is between <strong>{}</strong> and <strong>{}</strong> ({}).",
            name(*i),
            name(*j),
            num.fixed(*r, 2)
        ));
    }

    let undefined: Vec<String> = values
        .iter()
        .enumerate()
        .filter(|(i, row)| row.get(*i).is_some_and(|d| !d.is_finite()))
        .map(|(i, _)| name(i))
        .collect();
    if !undefined.is_empty() {
        items.push(format!(
            "{} never varies, so its correlations are undefined (n/a).",
            undefined.join(", ")
        ));
    }
    items
}

/// "a strong positive", "a weak negative", "no clear", ...
fn describe(r: f64) -> String {
    let strength = match r.abs() {
        a if a >= 0.7 => "a strong",
        a if a >= 0.4 => "a moderate",
        a if a >= 0.1 => "a weak",
        _ => return "no clear".to_string(),
    };
    let direction = if r > 0.0 { "positive" } else { "negative" };
    format!("{strength} {direction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[(&str, f64)]) -> Aggregation {
        Aggregation::Series {
            key: "Branch".into(),
            measure: "gross income".into(),
            values: values.iter().map(|(l, v)| (l.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn branch_explanation_uses_live_figures() {
        let agg = series(&[("A", 5057.1605), ("B", 5057.032), ("C", 5265.1765)]);
        let html = explain(
            Visualization::TotalGrossIncomeByBranch,
            &agg,
            &RenderOptions::default(),
        );
        assert!(html.contains("<td>$5,265.18</td>"), "{html}");
        assert!(html.contains("<strong>C</strong> has the highest gross income"));
        assert!(html.contains("<strong>B</strong> has the lowest"));
    }

    #[test]
    fn german_locale_swaps_separators() {
        let agg = series(&[("A", 1234.5)]);
        let opts = RenderOptions {
            locale: "de".into(),
            ..RenderOptions::default()
        };
        let html = explain(Visualization::TotalGrossIncomeByBranch, &agg, &opts);
        assert!(html.contains("$1.234,50"), "{html}");
    }

    #[test]
    fn gender_split_is_explained_in_units() {
        let agg = Aggregation::Grouped {
            key: "Product line".into(),
            subkey: "Gender".into(),
            measure: "Quantity".into(),
            categories: vec!["X".into()],
            series: vec![
                Series {
                    name: "Female".into(),
                    values: vec![Some(4.0)],
                },
                Series {
                    name: "Male".into(),
                    values: vec![Some(3.0)],
                },
            ],
        };
        let html = explain(
            Visualization::GrossIncomeByGender,
            &agg,
            &RenderOptions::default(),
        );
        assert!(html.contains("units sold, not gross income"), "{html}");
        assert!(html.contains("sales volume of 4"), "{html}");
        assert!(!html.contains('$'), "{html}");
    }

    #[test]
    fn labels_from_data_are_escaped() {
        let agg = series(&[("<script>", 1.0)]);
        let html = explain(Visualization::Profitability, &agg, &RenderOptions::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn undefined_correlations_are_reported() {
        let agg = Aggregation::Matrix {
            labels: vec!["x".into(), "flat".into()],
            values: vec![vec![1.0, f64::NAN], vec![f64::NAN, f64::NAN]],
        };
        let html = explain(Visualization::CorrelationHeatmap, &agg, &RenderOptions::default());
        assert!(html.contains("<td>n/a</td>"));
        assert!(html.contains("flat never varies"));
    }
}

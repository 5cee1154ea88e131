//! HTML pages. Plain string templates; every value from the data or the request is escaped.

use crate::dataset::Dataset;
use crate::explain::escape_html;
use crate::predict::{Prediction, PredictionForm};
use crate::visualization::{Visualization, VisualizationResult};
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;max-width:1100px}\
table{border-collapse:collapse;margin:1em 0}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f3f3f3}\
.error{color:#b00020}\
nav a{margin-right:1em}\
img{max-width:100%}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<nav><a href=\"/\">Visualizations</a><a href=\"/predict_sales\">Predict sales</a>\
<a href=\"/view_dataset\">View dataset</a></nav>\n\
<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// The visualization menu, with the rendered chart below it when there is one.
pub fn index(title: &str, selected: Option<&str>, result: Option<&VisualizationResult>) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/\">\n");
    body.push_str("<label for=\"visualization_type\">Choose a visualization:</label>\n");
    body.push_str("<select name=\"visualization_type\" id=\"visualization_type\">\n");
    for v in Visualization::ALL {
        let sel = if selected.is_some_and(|s| s.trim() == v.tag()) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            body,
            "  <option value=\"{}\"{}>{}</option>",
            v.tag(),
            sel,
            escape_html(&v.display_name())
        );
    }
    body.push_str("</select>\n<button type=\"submit\">Show</button>\n</form>\n");

    if let Some(r) = result {
        let _ = writeln!(body, "<h2>{}</h2>", escape_html(&r.kind.display_name()));
        let _ = writeln!(body, "<div class=\"plot\">{}</div>", r.img_tag());
        let _ = writeln!(body, "<div class=\"explanation\">\n{}</div>", r.explanation);
    }
    layout(title, &body)
}

/// The prediction form, echoing what was submitted, plus either an error or the result.
pub fn predict(
    title: &str,
    form: &PredictionForm,
    error: Option<&str>,
    prediction: Option<&Prediction>,
) -> String {
    let field = |name: &str, label: &str, value: &Option<String>| {
        format!(
            "<p><label for=\"{name}\">{label}</label> \
<input type=\"text\" name=\"{name}\" id=\"{name}\" value=\"{}\"></p>\n",
            escape_html(value.as_deref().unwrap_or(""))
        )
    };

    let mut body = String::from("<h2>Predict Sales</h2>\n<form method=\"post\" action=\"/predict_sales\">\n");
    body.push_str(&field("unit_price", "Unit price:", &form.unit_price));
    body.push_str(&field("quantity", "Quantity:", &form.quantity));
    body.push_str(&field("tax_percent", "Tax 5%:", &form.tax_percent));
    body.push_str(&field("gross_income", "Gross income:", &form.gross_income));
    body.push_str("<button type=\"submit\">Predict</button>\n</form>\n");

    if let Some(msg) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(msg));
    }
    if let Some(p) = prediction {
        let _ = writeln!(
            body,
            "<h3>Prediction</h3>\n<p>Predicted total: <strong>{:.4}</strong></p>\n\
<p>Mean squared error on {} held-out rows: {:.6}</p>\n\
<p>Inputs: unit price {}, quantity {}, tax {}, gross income {}</p>",
            p.predicted_total,
            p.test_rows,
            p.mse,
            p.input.unit_price,
            p.input.quantity,
            p.input.tax_percent,
            p.input.gross_income
        );
    }
    layout(title, &body)
}

/// The whole dataset as a table, cells in source order.
pub fn dataset_table(dataset: &Dataset) -> String {
    let mut html = String::from("<table class=\"dataframe\">\n<thead><tr>");
    for col in dataset.headers() {
        let _ = write!(html, "<th>{}</th>", escape_html(col));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in dataset.rows() {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn dataset(title: &str, table_html: &str, rows: usize) -> String {
    layout(
        title,
        &format!("<h2>Dataset</h2>\n<p>{rows} rows</p>\n{table_html}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_lists_every_visualization() {
        let html = index("Sales", Some("revenue"), None);
        for v in Visualization::ALL {
            assert!(html.contains(&format!("value=\"{}\"", v.tag())));
        }
        assert!(html.contains("<option value=\"revenue\" selected>Revenue</option>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn predict_form_escapes_echoed_input() {
        let form = PredictionForm {
            unit_price: Some("\"><script>".into()),
            ..PredictionForm::default()
        };
        let html = predict("Sales", &form, Some("invalid value for `unit_price`"), None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("class=\"error\""));
    }
}

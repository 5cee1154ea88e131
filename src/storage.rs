use crate::visualization::{Aggregation, Cell};
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix text cells that a spreadsheet would evaluate as a formula.
fn neutralize(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{s}"),
        _ => s.to_string(),
    }
}

fn cell_text(c: &Cell) -> String {
    match c {
        Cell::Text(s) => neutralize(s),
        Cell::Number(v) => v.to_string(),
        Cell::Empty => String::new(),
    }
}

/// Save an aggregation as CSV with header.
pub fn save_csv<P: AsRef<Path>>(agg: &Aggregation, path: P) -> Result<()> {
    let table = agg.to_table();
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(table.headers.iter().map(|h| neutralize(h)))?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(cell_text))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save an aggregation as pretty JSON.
pub fn save_json<P: AsRef<Path>>(agg: &Aggregation, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(agg)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save as JSON when the extension is `.json`, CSV otherwise.
pub fn save<P: AsRef<Path>>(agg: &Aggregation, path: P) -> Result<()> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        save_json(agg, path)
    } else {
        save_csv(agg, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let agg = Aggregation::Series {
            key: "Branch".into(),
            measure: "gross income".into(),
            values: vec![("A".into(), 15.0), ("=cmd()".into(), 7.0)],
        };
        save(&agg, &csvp).unwrap();
        save(&agg, &jsonp).unwrap();

        let csv = std::fs::read_to_string(&csvp).unwrap();
        assert_eq!(csv, "Branch,gross income\nA,15\n'=cmd(),7\n");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(json["shape"], "series");
        assert_eq!(json["values"][0][1], 15.0);
    }
}

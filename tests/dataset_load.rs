use sales_viz::models::Measure;
use sales_viz::{Dataset, SalesError};
use std::io::Write;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sales_sample.csv")
}

#[test]
fn loads_sample_with_all_columns() {
    let ds = Dataset::load(sample_path()).unwrap();
    assert_eq!(ds.len(), 60);
    assert_eq!(ds.headers().len(), 17);
    assert_eq!(ds.headers()[0], "Invoice ID");
    assert_eq!(ds.rows().count(), 60);

    let first = &ds.records()[0];
    assert_eq!(first.product_line, "Electronic accessories");
    assert_eq!(first.month().to_string(), "2018-12");
    assert_eq!(ds.rows().next().unwrap()[10], "12/1/2018");

    // gross margin is present everywhere, so all eight numeric columns qualify
    assert_eq!(ds.numeric_columns(), Measure::NUMERIC_COLUMNS.to_vec());
}

#[test]
fn missing_file_is_a_load_error() {
    let err = Dataset::load("definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, SalesError::DatasetLoad { .. }), "{err}");
}

#[test]
fn unparseable_date_fails_the_load() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        tmp,
        "Branch,Gender,Product line,Unit price,Quantity,Tax 5%,Total,Date,cogs,gross income,Rating"
    )
    .unwrap();
    writeln!(
        tmp,
        "A,Male,Sports and travel,10,1,0.5,10.5,31.01.2019,10,0.5,7"
    )
    .unwrap();
    let err = Dataset::load(tmp.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("line 2"), "{msg}");
    assert!(msg.contains("31.01.2019"), "{msg}");
}

#[test]
fn missing_required_column_fails_the_load() {
    let csv = "Branch,Gender,Product line,Unit price,Quantity,Tax 5%,Total,Date,cogs,gross income\n\
               A,Male,Sports and travel,10,1,0.5,10.5,1/31/2019,10,0.5\n";
    assert!(Dataset::from_reader(csv.as_bytes()).is_err());
}

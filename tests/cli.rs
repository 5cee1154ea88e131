use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::tempdir;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sales_sample.csv")
}

#[test]
fn help_works() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn list_prints_every_tag() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.arg("list");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("product_distribution"))
        .stdout(predicate::str::contains("correlation_heatmap"))
        .stdout(predicate::str::contains("COGS vs. Gross Income"));
}

#[test]
fn render_writes_image_and_export() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("revenue.png");
    let export = dir.path().join("revenue.csv");

    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.args(["render", "--data"])
        .arg(sample_path())
        .args(["--kind", "revenue", "--out"])
        .arg(&out)
        .arg("--export")
        .arg(&export)
        .arg("--explanation");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<strong>Insights:</strong>"));

    let png = std::fs::read(&out).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
    let csv = std::fs::read_to_string(&export).unwrap();
    assert!(csv.starts_with("Product line,Total\n"), "{csv}");
    assert_eq!(csv.lines().count(), 7);
}

#[test]
fn render_rejects_unknown_kind() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.args(["render", "--kind", "pie_chart", "--out", "x.png"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown visualization"));
}

#[test]
fn stats_by_branch() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.args(["stats", "--by", "branch", "--measure", "rating", "--data"])
        .arg(sample_path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("A • Rating  count=20 missing=0"))
        .stdout(predicate::str::contains("C • Rating"));
}

#[test]
fn predict_prints_total() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.args([
        "predict",
        "--unit-price",
        "74.69",
        "--quantity",
        "7",
        "--tax-percent",
        "10",
        "--gross-income",
        "10",
        "--data",
    ])
    .arg(sample_path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("predicted total: 210"))
        .stdout(predicate::str::contains("12 test rows"));
}

#[test]
fn predict_reports_bad_field() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.args([
        "predict",
        "--unit-price",
        "x",
        "--quantity",
        "7",
        "--tax-percent",
        "10",
        "--gross-income",
        "10",
        "--data",
    ])
    .arg(sample_path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unit_price"));
}

#[test]
fn missing_data_file_fails() {
    let mut cmd = Command::cargo_bin("sales-viz").unwrap();
    cmd.args(["stats", "--data", "no/such/file.csv"]);
    cmd.env_remove("SALES_VIZ_DATA");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no/such/file.csv"));
}

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use sales_viz::Dataset;
use sales_viz::config::{DEFAULT_TITLE, RenderOptions, ServerConfig};
use sales_viz::web::{AppState, router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Serve the sample on an ephemeral port from a background runtime.
fn spawn_server() -> SocketAddr {
    let data_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sales_sample.csv");
    let dataset = Arc::new(Dataset::load(&data_path).unwrap());
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig {
        data_path,
        addr,
        title: DEFAULT_TITLE.to_string(),
        render: RenderOptions {
            width: 500,
            height: 300,
            locale: "en".into(),
        },
    };
    let app = router(Arc::new(AppState::new(dataset, &config)));

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    addr
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

fn get(addr: SocketAddr, path: &str) -> (StatusCode, String) {
    let res = client()
        .get(format!("http://{addr}{path}"))
        .send()
        .unwrap();
    let status = res.status();
    (status, res.text().unwrap())
}

fn post(addr: SocketAddr, path: &str, form: &[(&str, &str)]) -> (StatusCode, String) {
    let res = client()
        .post(format!("http://{addr}{path}"))
        .form(form)
        .send()
        .unwrap();
    let status = res.status();
    (status, res.text().unwrap())
}

#[test]
fn menu_lists_every_visualization() {
    let addr = spawn_server();
    let (status, html) = get(addr, "/");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<option value=\"correlation_heatmap\">Correlation Heatmap</option>"));
    assert!(html.contains("<title>Supermarket Sales Analysis</title>"));
    assert!(!html.contains("<img"));
}

#[test]
fn selected_visualization_is_inlined() {
    let addr = spawn_server();
    let (status, html) = post(addr, "/", &[("visualization_type", "revenue")]);
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<img src=\"data:image/png;base64,"));
    assert!(html.contains("<h2>Revenue</h2>"));
    assert!(html.contains("<option value=\"revenue\" selected>"));
    assert!(html.contains("Insights"));
}

#[test]
fn unknown_or_missing_selection_shows_plain_menu() {
    let addr = spawn_server();
    for form in [&[("visualization_type", "pie_chart")][..], &[][..]] {
        let (status, html) = post(addr, "/", form);
        assert_eq!(status, StatusCode::OK, "{form:?}");
        assert!(html.contains("<select"));
        assert!(!html.contains("<img"), "{form:?}");
        assert!(!html.contains("<h2>"), "{form:?}");
    }
}

#[test]
fn non_form_selection_body_shows_plain_menu() {
    let addr = spawn_server();
    let res = client()
        .post(format!("http://{addr}/"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(r#"{"visualization_type":"revenue"}"#)
        .send()
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().unwrap();
    assert!(html.contains("<select"));
    assert!(!html.contains("<img"));
    assert!(!html.contains("<option value=\"revenue\" selected>"));
}

#[test]
fn prediction_form_round_trip() {
    let addr = spawn_server();
    let (status, html) = get(addr, "/predict_sales");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("name=\"unit_price\""));

    let (status, html) = post(
        addr,
        "/predict_sales",
        &[
            ("unit_price", "74.69"),
            ("quantity", "7"),
            ("tax_percent", "10"),
            ("gross_income", "10"),
        ],
    );
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Predicted total: <strong>210.0000</strong>"), "{html}");

    let (status, html) = post(
        addr,
        "/predict_sales",
        &[
            ("unit_price", "abc"),
            ("quantity", "7"),
            ("tax_percent", "10"),
            ("gross_income", "10"),
        ],
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("unit_price"));
    assert!(html.contains("class=\"error\""));
    // the submitted values are echoed back
    assert!(html.contains("value=\"abc\""));
}

#[test]
fn dataset_view_lists_rows() {
    let addr = spawn_server();
    let (status, html) = get(addr, "/view_dataset");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<p>60 rows</p>"));
    assert!(html.contains("<th>Invoice ID</th>"));
    assert!(html.contains("<td>Health and beauty</td>"));
    assert_eq!(html.matches("<tr>").count(), 61);
}

#[test]
fn aggregation_api_returns_json() {
    let addr = spawn_server();
    let (status, body) = get(addr, "/api/aggregation/total_gross_income_by_branch");
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["shape"], "series");
    assert_eq!(v["key"], "Branch");
    assert_eq!(v["values"].as_array().unwrap().len(), 3);

    let (status, body) = get(addr, "/api/aggregation/pie_chart");
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "error");
    assert_eq!(v["error"]["type"], "UnknownVisualization");
}

#[test]
fn health_reports_row_count() {
    let addr = spawn_server();
    let (status, body) = get(addr, "/healthz");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok 60 rows");
}

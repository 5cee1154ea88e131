use sales_viz::{Dataset, Dispatcher, RenderOptions, SalesError, Visualization};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn dispatcher() -> Dispatcher {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sales_sample.csv");
    Dispatcher::new(
        Arc::new(Dataset::load(path).unwrap()),
        RenderOptions::default(),
    )
}

#[test]
fn every_tag_renders_a_png_with_explanation() {
    let d = dispatcher();
    for v in Visualization::ALL {
        let result = d
            .dispatch(v.tag())
            .unwrap_or_else(|| panic!("{} did not render", v));
        assert_eq!(result.kind, v);
        assert!(result.image.bytes.starts_with(&PNG_SIGNATURE), "{v}");
        assert_eq!(
            (result.image.width, result.image.height),
            v.canvas_size(d.options())
        );
        assert!(result.explanation.contains("<table>"), "{v}");
        assert!(result.explanation.contains("<ol>"), "{v}");
        assert!(
            result
                .img_tag()
                .starts_with("<img src=\"data:image/png;base64,iVBORw0KGgo")
        );
    }
}

#[test]
fn unknown_tags_render_nothing() {
    let d = dispatcher();
    assert!(d.dispatch("pie_chart").is_none());
    assert!(d.dispatch("").is_none());
    assert!(d.dispatch("REVENUE").is_none());
    assert!(d.dispatch(" revenue ").is_some());

    let err = "pie_chart".parse::<Visualization>().unwrap_err();
    assert!(matches!(
        err,
        SalesError::InvalidInput {
            field: "visualization_type",
            ..
        }
    ));
}

#[test]
fn explanation_quotes_live_numbers() {
    let d = dispatcher();
    let result = d.render(Visualization::ProductLinesGrossIncome).unwrap();
    // Fashion accessories carries the largest gross income in the sample
    assert!(
        result.explanation.contains("Fashion accessories"),
        "{}",
        result.explanation
    );
    assert!(result.explanation.contains("$198.96"), "{}", result.explanation);
}

#[test]
fn render_to_file_writes_svg_and_png() {
    let d = dispatcher();
    let dir = tempdir().unwrap();

    let svg = dir.path().join("heatmap.svg");
    d.render_to_file(Visualization::CorrelationHeatmap, &svg)
        .unwrap();
    let text = std::fs::read_to_string(&svg).unwrap();
    assert!(text.contains("<svg"));
    assert!(text.contains("n/a"), "constant margin column should be marked");

    let png = dir.path().join("monthly.png");
    d.render_to_file(Visualization::MonthlyIncome, &png).unwrap();
    let bytes = std::fs::read(&png).unwrap();
    assert!(bytes.starts_with(&PNG_SIGNATURE));
}

#[test]
fn empty_dataset_is_a_render_error() {
    let d = Dispatcher::new(
        Arc::new(Dataset::from_records(Vec::new())),
        RenderOptions::default(),
    );
    assert!(matches!(
        d.render(Visualization::Revenue),
        Err(SalesError::Render(_))
    ));
    assert!(d.dispatch("revenue").is_none());
}

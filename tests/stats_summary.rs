use chrono::NaiveDate;
use sales_viz::models::{GroupBy, GroupKey, Measure, SaleRecord, YearMonth};
use sales_viz::stats::grouped_summary;

fn sale(branch: &str, date: (i32, u32, u32), rating: f64, margin: Option<f64>) -> SaleRecord {
    SaleRecord {
        invoice_id: None,
        branch: branch.into(),
        city: None,
        customer_type: None,
        gender: "Female".into(),
        product_line: "Food and beverages".into(),
        unit_price: 10.0,
        quantity: 1,
        tax: 0.5,
        total: 10.5,
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        time: None,
        payment: None,
        cogs: 10.0,
        gross_margin_pct: margin,
        gross_income: 0.5,
        rating,
    }
}

#[test]
fn grouped_stats_handle_missing_and_median_even_odd() {
    // Branch A ratings [1,2,3,4] -> median = (2+3)/2 = 2.5
    // Branch B ratings [10, 30] plus one row without a margin value
    let rows = vec![
        sale("A", (2019, 1, 1), 1.0, Some(4.76)),
        sale("A", (2019, 1, 2), 2.0, Some(4.76)),
        sale("A", (2019, 1, 3), 3.0, Some(4.76)),
        sale("A", (2019, 1, 4), 4.0, Some(4.76)),
        sale("B", (2019, 1, 5), 10.0, Some(4.76)),
        sale("B", (2019, 1, 6), 20.0, None),
        sale("B", (2019, 1, 7), 30.0, Some(4.76)),
    ];

    let got = grouped_summary(&rows, GroupBy::Branch, Measure::Rating);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(a.key, GroupKey::Label("A".into()));
    assert_eq!(a.count, 4);
    assert_eq!(a.missing, 0);
    assert_eq!(a.min, Some(1.0));
    assert_eq!(a.max, Some(4.0));
    assert!((a.mean.unwrap() - 2.5).abs() < 1e-9);
    assert!((a.median.unwrap() - 2.5).abs() < 1e-9);

    let b = &got[1];
    assert_eq!(b.count, 3);
    assert_eq!(b.median, Some(20.0));

    let margins = grouped_summary(&rows, GroupBy::Branch, Measure::GrossMarginPct);
    assert_eq!(margins[1].count, 2);
    assert_eq!(margins[1].missing, 1);
}

#[test]
fn month_groups_are_chronological_across_years() {
    let rows = vec![
        sale("A", (2019, 2, 1), 5.0, None),
        sale("A", (2018, 12, 31), 6.0, None),
        sale("A", (2019, 1, 15), 7.0, None),
        sale("A", (2018, 11, 2), 8.0, None),
    ];
    let got = grouped_summary(&rows, GroupBy::Month, Measure::Rating);
    let keys: Vec<GroupKey> = got.into_iter().map(|s| s.key).collect();
    assert_eq!(
        keys,
        vec![
            GroupKey::Month(YearMonth { year: 2018, month: 11 }),
            GroupKey::Month(YearMonth { year: 2018, month: 12 }),
            GroupKey::Month(YearMonth { year: 2019, month: 1 }),
            GroupKey::Month(YearMonth { year: 2019, month: 2 }),
        ]
    );
}

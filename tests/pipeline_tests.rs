use chrono::{NaiveDate, NaiveDateTime};
use ledger_dashboard::*;
use std::collections::BTreeSet;

fn header() -> Vec<String> {
    ColumnMapping::default()
        .headers()
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn sheet(data: &[[&str; 6]]) -> Vec<Vec<String>> {
    let mut rows = vec![header()];
    for row in data {
        rows.push(row.iter().map(|c| c.to_string()).collect());
    }
    rows
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Twelve months of shipments across four channels and three products, plus a few rows
/// outside the window and a few broken cells.
fn retail_ledger() -> Vec<Vec<String>> {
    let channels = ["C001", "C002", "C003", "C004"];
    let products = ["Green Tea", "Oolong", "Barley Tea"];

    let mut data: Vec<[String; 6]> = Vec::new();
    let mut seed = 7u64;
    for month_offset in 0..14u32 {
        let (year, month) = if month_offset < 9 {
            (2023, 4 + month_offset)
        } else {
            (2024, month_offset - 8)
        };
        for (ci, channel) in channels.iter().enumerate() {
            for (pi, product) in products.iter().enumerate() {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let qty = (seed >> 33) % 200 + (ci as u64) * 10;
                let revenue = qty * (1500 + pi as u64 * 500);
                data.push([
                    format!("{:04}-{:02}-{:02}", year, month, 3 + ci + pi),
                    format!("{:04}-{:02}", year, month),
                    channel.to_string(),
                    product.to_string(),
                    format!("{}", qty),
                    format_thousands_plain(revenue),
                ]);
            }
        }
    }

    data.push([
        "unknown".to_string(),
        "2024-03".to_string(),
        "C001".to_string(),
        "Oolong".to_string(),
        "4".to_string(),
        "8,000".to_string(),
    ]);
    data.push([
        "2024-03-15".to_string(),
        "2024-03".to_string(),
        "C002".to_string(),
        "Oolong".to_string(),
        "n/a".to_string(),
        "12,000".to_string(),
    ]);

    let mut rows = vec![header()];
    rows.extend(data.into_iter().map(|r| r.to_vec()));
    rows
}

fn format_thousands_plain(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn load(rows: &[Vec<String>]) -> (DashboardProcessor, Ledger) {
    let processor = DashboardProcessor::new(DashboardConfig::default()).unwrap();
    let ledger = processor.load(rows, now()).unwrap();
    (processor, ledger)
}

#[test]
fn test_window_keeps_only_trailing_year() {
    let (_, ledger) = load(&retail_ledger());
    let cutoff = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    assert!(!ledger.records.is_empty());
    assert!(ledger.records.iter().all(|r| r.date.unwrap() >= cutoff));
    assert_eq!(ledger.options.periods.first().map(String::as_str), Some("2023-06"));
    assert_eq!(ledger.options.periods.last().map(String::as_str), Some("2024-05"));
    assert_eq!(ledger.warnings.len(), 2);
}

#[test]
fn test_sum_decomposition() {
    let (_, ledger) = load(&retail_ledger());

    for field in [ValueField::Quantity, ValueField::Revenue] {
        for dimension in [Dimension::Period, Dimension::Channel, Dimension::Product] {
            let sums = sum_by(&ledger.records, dimension, field);
            for (key, sum) in &sums {
                let expected: f64 = ledger
                    .records
                    .iter()
                    .filter(|r| dimension.key(r) == key)
                    .map(|r| field.value(r).unwrap_or(0.0))
                    .sum();
                assert!((sum - expected).abs() < 1e-6, "{dimension:?}/{key}");
            }
            let grand: f64 = sums.values().sum();
            assert!((grand - total(&ledger.records, field)).abs() < 1e-6);
        }
    }
}

#[test]
fn test_select_all_is_a_no_op() {
    let (processor, ledger) = load(&retail_ledger());
    let (selected, _) = processor.select(&ledger, &FilterSelection::default());
    assert_eq!(selected, ledger.records);

    let explicit = apply_inclusion(&ledger.records, &ledger.options.select_all());
    assert_eq!(explicit, ledger.records);
}

#[test]
fn test_top_k_flag_counts() {
    let distinct: Aggregate = [("a", 50.0), ("b", 40.0), ("c", 30.0), ("d", 20.0), ("e", 10.0)]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    assert_eq!(rank(&distinct, 3).iter().filter(|e| e.is_top).count(), 3);

    let tied: Aggregate = [("a", 50.0), ("b", 40.0), ("c", 30.0), ("d", 30.0), ("e", 30.0)]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    assert_eq!(rank(&tied, 3).iter().filter(|e| e.is_top).count(), 5);

    let (_, ledger) = load(&retail_ledger());
    let products = rank(&sum_by(&ledger.records, Dimension::Product, ValueField::Revenue), 3);
    assert_eq!(products.iter().filter(|e| e.is_top).count(), 3);
    assert!(products.windows(2).all(|w| w[0].value >= w[1].value));
}

#[test]
fn test_pivot_total_equals_revenue_total() {
    let (processor, ledger) = load(&retail_ledger());
    let selection = FilterSelection {
        channels: Selection::only(["C001", "C003"]),
        ..FilterSelection::default()
    };
    let report = processor.report(&ledger, &selection);
    let (selected, _) = processor.select(&ledger, &selection);

    assert!((report.pivot.grand_total() - total(&selected, ValueField::Revenue)).abs() < 1e-6);
    assert!((report.kpis.total_revenue - report.pivot.grand_total()).abs() < 1e-6);
    assert_eq!(report.pivot.channels().len(), 2);
}

#[test]
fn test_pivot_rows_follow_latest_month() {
    let (processor, ledger) = load(&retail_ledger());
    let report = processor.report(&ledger, &FilterSelection::default());
    let pivot = &report.pivot;

    assert_eq!(pivot.anchor.as_deref(), Some("2024-05"));
    let latest = pivot.column("2024-05").unwrap();
    assert!(latest.windows(2).all(|w| w[0] >= w[1]));

    let col = pivot.column_index("2024-05").unwrap();
    let flagged = pivot.rows.iter().filter(|r| r.top_flags[col]).count();
    assert!(flagged >= 3);
    for (idx, period) in pivot.periods.iter().enumerate() {
        if period != "2024-05" {
            assert!(pivot.rows.iter().all(|r| !r.top_flags[idx]));
        }
    }
}

#[test]
fn test_gap_month_scenario() {
    let rows = sheet(&[
        ["2024-04-10", "2024-04", "A", "Tea", "1", "400"],
        ["2024-06-01", "2024-06", "A", "Tea", "1", "500"],
    ]);
    let processor = DashboardProcessor::new(DashboardConfig::default()).unwrap();
    let now = NaiveDate::from_ymd_opt(2024, 6, 30)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    let ledger = processor.load(&rows, now).unwrap();
    let report = processor.report(&ledger, &FilterSelection::default());

    let periods: Vec<&str> = report.trend.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(periods, vec!["2024-04", "2024-06"]);
    assert!((report.kpis.mom_percent - 25.0).abs() < 1e-9);
}

#[test]
fn test_trend_is_chronological() {
    let (processor, ledger) = load(&retail_ledger());
    let report = processor.report(&ledger, &FilterSelection::default());
    let months: Vec<YearMonth> = report
        .trend
        .iter()
        .map(|p| YearMonth::parse(&p.period).unwrap())
        .collect();
    assert_eq!(months.len(), 12);
    assert!(months.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_selected_periods_drive_anchor_and_mom() {
    let (processor, ledger) = load(&retail_ledger());
    let periods: BTreeSet<String> = ["2023-10", "2023-12"].iter().map(|s| s.to_string()).collect();
    let selection = FilterSelection {
        periods: Selection::Only(periods),
        ..FilterSelection::default()
    };
    let report = processor.report(&ledger, &selection);

    assert_eq!(report.pivot.periods, vec!["2023-10", "2023-12"]);
    assert_eq!(report.pivot.anchor.as_deref(), Some("2023-12"));

    let oct = report.trend[0].revenue;
    let dec = report.trend[1].revenue;
    assert!((report.kpis.mom_percent - (dec - oct) / oct * 100.0).abs() < 1e-9);
}

#[test]
fn test_report_serializes() {
    let (processor, ledger) = load(&retail_ledger());
    let json = processor
        .report(&ledger, &FilterSelection::default())
        .to_json()
        .unwrap();
    assert!(json.contains("\"kpis\""));
    assert!(json.contains("\"top_flags\""));
}

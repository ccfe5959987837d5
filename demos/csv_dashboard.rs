use chrono::NaiveDate;
use ledger_dashboard::*;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/sample_ledger.csv".to_string());

    println!("📒 Ledger dashboard from {}\n", path);

    let processor = DashboardProcessor::new(DashboardConfig::default())?;
    let mut cache = processor.snapshot_cache(CsvSource::new(&path));

    let now = NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .ok_or("invalid demo clock")?;
    let ledger = processor.load_cached(&mut cache, now)?;

    for warning in &ledger.warnings {
        println!("⚠️  {}", warning);
    }

    let report = processor.report(&ledger, &FilterSelection::default());
    let kpis = report.kpis.display();
    println!("Total quantity : {}", kpis.total_quantity);
    println!("Total revenue  : {}", kpis.total_revenue);
    println!("MoM            : {}", kpis.mom_percent);
    println!("Top channel    : {}\n", kpis.top_channel);

    println!("Monthly trend (억):");
    for point in &report.trend {
        println!("  {}  {:.4}", point.period, point.revenue_eok);
    }

    println!("\nChannel ranking:");
    for entry in &report.channel_ranking {
        let marker = if entry.is_top { "★" } else { " " };
        println!("  {} {:<6} {:>12.0}", marker, entry.key, entry.value);
    }

    // Same data, one month only: the pivot anchor follows the selection.
    let april = FilterSelection {
        periods: Selection::only(["2024-04"]),
        ..FilterSelection::default()
    };
    let april_report = processor.report(&ledger, &april);
    println!(
        "\nApril only: {} records, pivot anchored at {:?}",
        april_report.selected_record_count, april_report.pivot.anchor
    );

    let artifact = export_pivot(&report.pivot)?;
    std::fs::write(&artifact.file_name, &artifact.bytes)?;
    println!(
        "\n💾 Wrote {} ({} bytes, {})",
        artifact.file_name,
        artifact.bytes.len(),
        artifact.mime_type
    );

    Ok(())
}

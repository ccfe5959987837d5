//! # Ledger Dashboard
//!
//! A library for turning a shipment/sales ledger (one row per shipped line) into the
//! summaries of a sales dashboard, restricted to a trailing 12-month window.
//!
//! ## Core Concepts
//!
//! - **Record**: a normalized ledger line; bad dates and numbers become `None` instead of
//!   failing the batch
//! - **Window**: records older than `now - 12 months` are dropped once, right after ingestion
//! - **Selection**: explicit inclusion sets over period, channel and product; "select all"
//!   is resolved against the values actually observed
//! - **Summaries**: KPIs, monthly trend with month-over-month change, channel and product
//!   rankings with top-K flags, and a channel x period pivot that can be exported as `.xlsx`
//!
//! Nothing here reads the system clock: the caller passes `now` in.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_dashboard::*;
//! use chrono::Local;
//!
//! let processor = DashboardProcessor::new(DashboardConfig::default())?;
//! let mut cache = processor.snapshot_cache(CsvSource::new("ledger.csv"));
//!
//! let now = Local::now().naive_local();
//! let ledger = processor.load_cached(&mut cache, now)?;
//! let report = processor.report(&ledger, &FilterSelection::default());
//!
//! println!("{:?}", report.kpis.display());
//! let xlsx = export_pivot(&report.pivot)?;
//! std::fs::write(&xlsx.file_name, &xlsx.bytes)?;
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingestion;
pub mod pivot;
pub mod ranking;
pub mod report;
pub mod schema;
pub mod source;
pub mod trend;
pub mod utils;

#[cfg(feature = "sheets")]
pub mod sheets;

pub use aggregate::{sum_by, sum_by_pair, total, Aggregate, Dimension, PairAggregate, ValueField};
pub use error::{DashboardError, Result};
pub use export::{export_pivot, ExportArtifact, PIVOT_FILE_NAME, PIVOT_SHEET_NAME, XLSX_MIME_TYPE};
pub use filter::{
    apply_inclusion, within_window, FilterOptions, FilterSelection, InclusionSets, Selection,
};
pub use ingestion::{normalize_rows, LedgerField, Normalized, ParseWarning};
pub use pivot::{anchor_period, build_pivot, PivotBuilder, PivotRow, PivotTable};
pub use ranking::{rank, top_k_flags, top_key, RankedEntry, NO_ENTRY};
pub use report::{DashboardReport, KpiDisplay, KpiSummary};
pub use schema::*;
pub use source::{CsvSource, MemorySource, RowSource, Snapshot, SnapshotCache};
pub use trend::{month_over_month, monthly_trend, TrendPoint};
pub use utils::YearMonth;

use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info};

/// Windowed ledger for one pipeline run, plus what the filter pickers should offer.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub records: Vec<Record>,
    pub options: FilterOptions,
    pub warnings: Vec<ParseWarning>,
    /// The `now` the window was anchored at.
    pub as_of: NaiveDateTime,
    pub snapshot_age: Option<TimeDelta>,
}

pub struct DashboardProcessor {
    config: DashboardConfig,
}

impl DashboardProcessor {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// A snapshot cache over `source`, refreshing after the configured TTL.
    pub fn snapshot_cache<S: RowSource>(&self, source: S) -> SnapshotCache<S> {
        SnapshotCache::with_ttl_secs(source, self.config.cache_ttl_secs)
    }

    /// Normalizes raw rows and applies the recency window.
    pub fn load(&self, rows: &[Vec<String>], now: NaiveDateTime) -> Result<Ledger> {
        let normalized = normalize_rows(rows, &self.config.columns)?;
        let records = within_window(&normalized.records, now, self.config.window_months);

        info!(
            "Loaded {} ledger records within {} months of {} ({} outside window or undated, {} parse warnings)",
            records.len(),
            self.config.window_months,
            now,
            normalized.records.len() - records.len(),
            normalized.warnings.len()
        );

        Ok(Ledger {
            options: FilterOptions::from_records(&records),
            records,
            warnings: normalized.warnings,
            as_of: now,
            snapshot_age: None,
        })
    }

    /// Like [`load`](Self::load), reading rows through the snapshot cache.
    pub fn load_cached<S: RowSource>(
        &self,
        cache: &mut SnapshotCache<S>,
        now: NaiveDateTime,
    ) -> Result<Ledger> {
        let snapshot = cache.get(now)?;
        let age = snapshot.age(now);
        let mut ledger = self.load(&snapshot.rows, now)?;
        ledger.snapshot_age = Some(age);
        Ok(ledger)
    }

    /// Records passing the caller's filter selection.
    pub fn select(&self, ledger: &Ledger, selection: &FilterSelection) -> (Vec<Record>, InclusionSets) {
        let sets = selection.resolve(&ledger.options);
        let records = apply_inclusion(&ledger.records, &sets);
        debug!(
            "Selection kept {} of {} records ({} periods, {} channels, {} products)",
            records.len(),
            ledger.records.len(),
            sets.periods.len(),
            sets.channels.len(),
            sets.products.len()
        );
        (records, sets)
    }

    /// Recomputes every summary for one filter state.
    pub fn report(&self, ledger: &Ledger, selection: &FilterSelection) -> DashboardReport {
        let (records, sets) = self.select(ledger, selection);
        let top_k = self.config.top_k;

        let monthly = sum_by(&records, Dimension::Period, ValueField::Revenue);
        let anchor = anchor_period(&sets.periods);
        let pivot = PivotBuilder::new(top_k)
            .with_row_header(self.config.columns.channel.clone())
            .build(&records, anchor.as_deref());

        DashboardReport {
            kpis: KpiSummary::from_records(&records),
            trend: monthly_trend(&monthly),
            channel_ranking: rank(&sum_by(&records, Dimension::Channel, ValueField::Revenue), top_k),
            product_ranking: rank(&sum_by(&records, Dimension::Product, ValueField::Revenue), top_k),
            pivot,
            selected_record_count: records.len(),
            snapshot_age_secs: ledger.snapshot_age.map(|age| age.num_seconds()),
        }
    }
}

/// One-shot pipeline: rows in, report out.
pub fn build_dashboard(
    config: &DashboardConfig,
    rows: &[Vec<String>],
    now: NaiveDateTime,
    selection: &FilterSelection,
) -> Result<DashboardReport> {
    let processor = DashboardProcessor::new(config.clone())?;
    let ledger = processor.load(rows, now)?;
    Ok(processor.report(&ledger, selection))
}

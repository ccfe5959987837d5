use crate::aggregate::{sum_by, total, Dimension, ValueField};
use crate::pivot::PivotTable;
use crate::ranking::{top_key, RankedEntry};
use crate::schema::Record;
use crate::trend::{month_over_month, TrendPoint};
use crate::utils::format_thousands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_quantity: f64,
    pub total_revenue: f64,
    /// Change between the two most recent periods present, in percent.
    pub mom_percent: f64,
    /// Channel with the highest revenue, `—` when nothing is selected.
    pub top_channel: String,
}

/// KPI values formatted for display cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiDisplay {
    pub total_quantity: String,
    pub total_revenue: String,
    pub mom_percent: String,
    pub top_channel: String,
}

impl KpiSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let monthly = sum_by(records, Dimension::Period, ValueField::Revenue);
        let by_channel = sum_by(records, Dimension::Channel, ValueField::Revenue);

        Self {
            total_quantity: total(records, ValueField::Quantity),
            total_revenue: total(records, ValueField::Revenue),
            mom_percent: month_over_month(&monthly),
            top_channel: top_key(&by_channel),
        }
    }

    pub fn display(&self) -> KpiDisplay {
        KpiDisplay {
            total_quantity: format_thousands(self.total_quantity, 0),
            total_revenue: format!("{} 원", format_thousands(self.total_revenue, 0)),
            mom_percent: format!("{:.2} %", self.mom_percent),
            top_channel: self.top_channel.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub kpis: KpiSummary,
    pub trend: Vec<TrendPoint>,
    pub channel_ranking: Vec<RankedEntry>,
    pub product_ranking: Vec<RankedEntry>,
    pub pivot: PivotTable,
    pub selected_record_count: usize,
    /// Age of the ledger snapshot the report was computed from, when known.
    pub snapshot_age_secs: Option<i64>,
}

impl DashboardReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

use crate::aggregate::{sum_by_pair, Dimension, ValueField};
use crate::ranking::top_k_flags;
use crate::schema::Record;
use crate::utils::period_sort_key;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub channel: String,
    /// One value per entry of [`PivotTable::periods`], zero where nothing was shipped.
    pub values: Vec<f64>,
    /// Top-K flags aligned with `values`; only the anchor column can be flagged.
    pub top_flags: Vec<bool>,
}

/// Revenue cross-tab with channels as rows and periods as columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Caption of the row label column (shown above the channel codes).
    pub row_header: String,
    /// Periods present in the data, chronologically.
    pub periods: Vec<String>,
    pub rows: Vec<PivotRow>,
    /// Anchor period the rows were sorted by, if it is one of the columns.
    pub anchor: Option<String>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, period: &str) -> Option<usize> {
        self.periods.iter().position(|p| p == period)
    }

    pub fn cell(&self, channel: &str, period: &str) -> Option<f64> {
        let col = self.column_index(period)?;
        self.rows
            .iter()
            .find(|row| row.channel == channel)
            .map(|row| row.values[col])
    }

    pub fn column(&self, period: &str) -> Option<Vec<f64>> {
        let col = self.column_index(period)?;
        Some(self.rows.iter().map(|row| row.values[col]).collect())
    }

    pub fn channels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.channel.as_str()).collect()
    }

    pub fn grand_total(&self) -> f64 {
        self.rows.iter().flat_map(|row| row.values.iter()).sum()
    }
}

/// The most recent of the selected periods.
pub fn anchor_period(selected: &BTreeSet<String>) -> Option<String> {
    selected
        .iter()
        .max_by(|a, b| period_sort_key(a).cmp(&period_sort_key(b)))
        .cloned()
}

pub struct PivotBuilder {
    top_k: usize,
    row_header: String,
}

impl PivotBuilder {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            row_header: "channel".to_string(),
        }
    }

    pub fn with_row_header(mut self, header: impl Into<String>) -> Self {
        self.row_header = header.into();
        self
    }

    /// Builds the channel x period revenue pivot.
    ///
    /// Rows start in ascending channel order. When `anchor` names one of the columns, rows
    /// are stably re-sorted by that column descending and its top-K cells are flagged;
    /// otherwise the order is left alone and nothing is flagged.
    pub fn build(&self, records: &[Record], anchor: Option<&str>) -> PivotTable {
        let sums = sum_by_pair(records, Dimension::Channel, Dimension::Period, ValueField::Revenue);

        let channels: BTreeSet<&str> = sums.keys().map(|(channel, _)| channel.as_str()).collect();
        let mut periods: Vec<String> = sums
            .keys()
            .map(|(_, period)| period.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        periods.sort_by(|a, b| period_sort_key(a).cmp(&period_sort_key(b)));

        let mut rows: Vec<PivotRow> = channels
            .into_iter()
            .map(|channel| {
                let values: Vec<f64> = periods
                    .iter()
                    .map(|period| {
                        sums.get(&(channel.to_string(), period.clone()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect();
                PivotRow {
                    channel: channel.to_string(),
                    top_flags: vec![false; values.len()],
                    values,
                }
            })
            .collect();

        let anchor_col = anchor.and_then(|a| periods.iter().position(|p| p == a));
        if let Some(col) = anchor_col {
            rows.sort_by(|a, b| {
                b.values[col]
                    .partial_cmp(&a.values[col])
                    .unwrap_or(Ordering::Equal)
            });

            let column: Vec<f64> = rows.iter().map(|row| row.values[col]).collect();
            for (row, is_top) in rows.iter_mut().zip(top_k_flags(&column, self.top_k)) {
                row.top_flags[col] = is_top;
            }
        }

        debug!(
            "Pivot built with {} channels x {} periods (anchor {:?})",
            rows.len(),
            periods.len(),
            anchor_col.map(|col| &periods[col])
        );

        PivotTable {
            row_header: self.row_header.clone(),
            anchor: anchor_col.map(|col| periods[col].clone()),
            periods,
            rows,
        }
    }
}

pub fn build_pivot(records: &[Record], anchor: Option<&str>, top_k: usize) -> PivotTable {
    PivotBuilder::new(top_k).build(records, anchor)
}

use crate::aggregate::Dimension;
use crate::schema::Record;
use crate::utils::{period_sort_key, window_cutoff};
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keeps records dated on or after `now - months`. Records without a date are dropped.
pub fn within_window(records: &[Record], now: NaiveDateTime, months: u32) -> Vec<Record> {
    let cutoff = window_cutoff(now, months);

    let kept: Vec<Record> = records
        .iter()
        .filter(|r| {
            r.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .is_some_and(|start| start >= cutoff)
        })
        .cloned()
        .collect();

    debug!(
        "Window filter kept {} of {} records (cutoff {})",
        kept.len(),
        records.len(),
        cutoff
    );
    kept
}

/// Explicit inclusion sets. An empty set excludes every record on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionSets {
    pub periods: BTreeSet<String>,
    pub channels: BTreeSet<String>,
    pub products: BTreeSet<String>,
}

impl InclusionSets {
    pub fn contains(&self, record: &Record) -> bool {
        self.periods.contains(&record.period)
            && self.channels.contains(&record.channel)
            && self.products.contains(&record.product)
    }
}

pub fn apply_inclusion(records: &[Record], sets: &InclusionSets) -> Vec<Record> {
    records
        .iter()
        .filter(|r| sets.contains(r))
        .cloned()
        .collect()
}

/// Distinct values observed per dimension, in the order a picker should list them.
/// Periods are chronological, channels and products ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub periods: Vec<String>,
    pub channels: Vec<String>,
    pub products: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let distinct = |dimension: Dimension| -> Vec<String> {
            records
                .iter()
                .map(|r| dimension.key(r).to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        let mut periods = distinct(Dimension::Period);
        periods.sort_by(|a, b| period_sort_key(a).cmp(&period_sort_key(b)));

        Self {
            periods,
            channels: distinct(Dimension::Channel),
            products: distinct(Dimension::Product),
        }
    }

    /// Inclusion sets equal to everything observed.
    pub fn select_all(&self) -> InclusionSets {
        InclusionSets {
            periods: self.periods.iter().cloned().collect(),
            channels: self.channels.iter().cloned().collect(),
            products: self.products.iter().cloned().collect(),
        }
    }
}

/// One dimension's filter state as chosen by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "values")]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    /// Expands `All` to the observed values; `Only` is taken as-is.
    pub fn resolve(&self, observed: &[String]) -> BTreeSet<String> {
        match self {
            Selection::All => observed.iter().cloned().collect(),
            Selection::Only(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub periods: Selection,
    #[serde(default)]
    pub channels: Selection,
    #[serde(default)]
    pub products: Selection,
}

impl FilterSelection {
    pub fn resolve(&self, options: &FilterOptions) -> InclusionSets {
        InclusionSets {
            periods: self.periods.resolve(&options.periods),
            channels: self.channels.resolve(&options.channels),
            products: self.products.resolve(&options.products),
        }
    }
}

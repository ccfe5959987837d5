use crate::aggregate::Aggregate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Shown in place of a top entry when there is nothing to rank.
pub const NO_ENTRY: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
    /// Whether the value is among the K largest values.
    pub is_top: bool,
}

/// Smallest value still counted as top-K: the K-th largest value, counting repeats.
/// `None` when K is zero. All values qualify when there are fewer than K.
pub fn top_k_threshold(values: &[f64], k: usize) -> Option<f64> {
    if k == 0 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    sorted
        .get(k - 1)
        .or_else(|| sorted.last())
        .copied()
}

/// Flags every value that reaches the top-K threshold, so ties at the K-th value are
/// all flagged.
pub fn top_k_flags(values: &[f64], k: usize) -> Vec<bool> {
    match top_k_threshold(values, k) {
        Some(threshold) => values.iter().map(|v| *v >= threshold).collect(),
        None => vec![false; values.len()],
    }
}

/// Entries sorted by value descending, ties broken by key ascending.
pub fn rank(aggregate: &Aggregate, k: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<(&String, f64)> = aggregate.iter().map(|(key, v)| (key, *v)).collect();
    entries.sort_by(|(ka, va), (kb, vb)| {
        vb.partial_cmp(va)
            .unwrap_or(Ordering::Equal)
            .then_with(|| ka.cmp(kb))
    });

    let values: Vec<f64> = entries.iter().map(|(_, v)| *v).collect();
    let flags = top_k_flags(&values, k);

    entries
        .into_iter()
        .zip(flags)
        .map(|((key, value), is_top)| RankedEntry {
            key: key.clone(),
            value,
            is_top,
        })
        .collect()
}

/// Key with the largest value (smallest key on ties), or [`NO_ENTRY`] when empty.
pub fn top_key(aggregate: &Aggregate) -> String {
    rank(aggregate, 1)
        .into_iter()
        .next()
        .map(|entry| entry.key)
        .unwrap_or_else(|| NO_ENTRY.to_string())
}

use crate::schema::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summed values keyed by one dimension value.
pub type Aggregate = BTreeMap<String, f64>;

/// Summed values keyed by a (row, column) pair of dimension values.
pub type PairAggregate = BTreeMap<(String, String), f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Period,
    Channel,
    Product,
}

impl Dimension {
    pub fn key<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            Dimension::Period => &record.period,
            Dimension::Channel => &record.channel,
            Dimension::Product => &record.product,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueField {
    Quantity,
    Revenue,
}

impl ValueField {
    pub fn value(&self, record: &Record) -> Option<f64> {
        match self {
            ValueField::Quantity => record.quantity,
            ValueField::Revenue => record.revenue,
        }
    }

    /// The value a record contributes to a sum; missing values count as zero.
    pub fn summand(&self, record: &Record) -> f64 {
        self.value(record).unwrap_or(0.0)
    }
}

pub fn total(records: &[Record], field: ValueField) -> f64 {
    records.iter().map(|r| field.summand(r)).sum()
}

/// Group-by-sum over a single dimension. Keys compare by exact string equality.
pub fn sum_by(records: &[Record], dimension: Dimension, field: ValueField) -> Aggregate {
    let mut sums = Aggregate::new();
    for record in records {
        *sums.entry(dimension.key(record).to_string()).or_insert(0.0) += field.summand(record);
    }
    sums
}

/// Group-by-sum over two dimensions at once.
pub fn sum_by_pair(
    records: &[Record],
    rows: Dimension,
    columns: Dimension,
    field: ValueField,
) -> PairAggregate {
    let mut sums = PairAggregate::new();
    for record in records {
        let key = (
            rows.key(record).to_string(),
            columns.key(record).to_string(),
        );
        *sums.entry(key).or_insert(0.0) += field.summand(record);
    }
    sums
}

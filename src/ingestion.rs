use crate::error::{DashboardError, Result};
use crate::schema::{ColumnMapping, Record};
use crate::utils::{parse_ledger_date, parse_ledger_number};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerField {
    Date,
    Quantity,
    Revenue,
}

impl fmt::Display for LedgerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedgerField::Date => "date",
            LedgerField::Quantity => "quantity",
            LedgerField::Revenue => "revenue",
        };
        f.write_str(name)
    }
}

/// A cell that could not be coerced; the field became `None` and the record was kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Zero-based index of the data row (the header is not counted).
    pub row: usize,
    pub field: LedgerField,
    pub value: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: could not parse {} from '{}'",
            self.row, self.field, self.value
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<Record>,
    pub warnings: Vec<ParseWarning>,
}

struct ColumnIndex {
    date: usize,
    period: usize,
    channel: usize,
    product: usize,
    quantity: usize,
    revenue: usize,
}

impl ColumnIndex {
    fn locate(header: &[String], mapping: &ColumnMapping) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);

        let positions: Vec<Option<usize>> =
            mapping.headers().into_iter().map(|name| find(name)).collect();

        let missing: Vec<String> = mapping
            .headers()
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(DashboardError::SchemaError { missing });
        }

        let at = |idx: usize| positions[idx].unwrap_or_default();
        Ok(Self {
            date: at(0),
            period: at(1),
            channel: at(2),
            product: at(3),
            quantity: at(4),
            revenue: at(5),
        })
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Turns raw worksheet rows into typed records.
///
/// The first row is the header. Unparseable dates and numbers become `None` and are
/// reported as [`ParseWarning`]s; only a missing required column fails the batch.
pub fn normalize_rows(rows: &[Vec<String>], mapping: &ColumnMapping) -> Result<Normalized> {
    let Some((header, body)) = rows.split_first() else {
        return Err(DashboardError::SchemaError {
            missing: mapping.headers().iter().map(|h| h.to_string()).collect(),
        });
    };

    let columns = ColumnIndex::locate(header, mapping)?;

    let mut normalized = Normalized::default();
    for (row_idx, row) in body.iter().enumerate() {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let raw_date = cell(row, columns.date);
        let date = parse_ledger_date(raw_date);
        if date.is_none() && !raw_date.trim().is_empty() {
            normalized.warnings.push(ParseWarning {
                row: row_idx,
                field: LedgerField::Date,
                value: raw_date.to_string(),
            });
        }

        let mut number = |idx: usize, field: LedgerField| {
            let raw = cell(row, idx);
            let parsed = parse_ledger_number(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                normalized.warnings.push(ParseWarning {
                    row: row_idx,
                    field,
                    value: raw.to_string(),
                });
            }
            parsed
        };
        let quantity = number(columns.quantity, LedgerField::Quantity);
        let revenue = number(columns.revenue, LedgerField::Revenue);

        normalized.records.push(Record {
            date,
            period: cell(row, columns.period).to_string(),
            channel: cell(row, columns.channel).to_string(),
            product: cell(row, columns.product).to_string(),
            quantity,
            revenue,
        });
    }

    for warning in &normalized.warnings {
        warn!("Ledger cell coerced to null: {}", warning);
    }
    debug!(
        "Normalized {} ledger rows ({} parse warnings)",
        normalized.records.len(),
        normalized.warnings.len()
    );

    Ok(normalized)
}

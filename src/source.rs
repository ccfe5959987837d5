use crate::error::Result;
use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Anything that can hand over a complete worksheet snapshot, header row first.
pub trait RowSource {
    fn fetch_rows(&self) -> Result<Vec<Vec<String>>>;
}

/// Fixed rows, for tests and for callers that fetched the sheet themselves.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Vec<String>>,
}

impl MemorySource {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

impl RowSource for MemorySource {
    fn fetch_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }
}

/// A CSV export of the ledger worksheet.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RowSource for CsvSource {
    fn fetch_rows(&self) -> Result<Vec<Vec<String>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rows: Vec<Vec<String>>,
    pub fetched_at: NaiveDateTime,
}

impl Snapshot {
    pub fn age(&self, now: NaiveDateTime) -> TimeDelta {
        now - self.fetched_at
    }
}

/// Reuses the last fetched snapshot until it is older than the TTL.
///
/// The clock is always passed in; the cache never reads the system time.
pub struct SnapshotCache<S> {
    source: S,
    ttl: TimeDelta,
    snapshot: Option<Snapshot>,
}

impl<S: RowSource> SnapshotCache<S> {
    pub fn new(source: S, ttl: TimeDelta) -> Self {
        Self {
            source,
            ttl,
            snapshot: None,
        }
    }

    pub fn with_ttl_secs(source: S, ttl_secs: i64) -> Self {
        Self::new(source, TimeDelta::seconds(ttl_secs))
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn is_stale(&self, now: NaiveDateTime) -> bool {
        match &self.snapshot {
            Some(snapshot) => snapshot.age(now) >= self.ttl,
            None => true,
        }
    }

    pub fn age(&self, now: NaiveDateTime) -> Option<TimeDelta> {
        self.snapshot.as_ref().map(|s| s.age(now))
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    /// Returns the cached snapshot, refetching first if it is missing or stale.
    /// A failed refetch leaves the previous snapshot in place.
    pub fn get(&mut self, now: NaiveDateTime) -> Result<&Snapshot> {
        let snapshot = match self.snapshot.take() {
            Some(current) if current.age(now) < self.ttl => current,
            previous => match self.source.fetch_rows() {
                Ok(rows) => {
                    info!("Fetched ledger snapshot with {} rows", rows.len());
                    Snapshot {
                        rows,
                        fetched_at: now,
                    }
                }
                Err(e) => {
                    warn!("Ledger refresh failed: {}", e);
                    self.snapshot = previous;
                    return Err(e);
                }
            },
        };

        Ok(&*self.snapshot.insert(snapshot))
    }
}

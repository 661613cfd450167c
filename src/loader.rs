//! Multi-source loading with partial-failure tolerance.
//!
//! Each yearly source is read and normalized independently; a malformed or
//! missing file is recorded as a warning and never prevents the remaining
//! years from loading. Zero successful sources degrade to an empty table —
//! callers treat empty as "no data", not as an error.

use crate::error::{InsightsError, Result};
use crate::normalize::{normalize, NormalizeHints};
use crate::schema::SalesRecord;
use crate::source::{SourceRef, TableStore};
use crate::table::RawTable;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// One yearly source: a period label (stamped onto every row it yields) and
/// where to read it from.
#[derive(Debug, Clone)]
pub struct SalesSource {
    pub period: String,
    pub reference: SourceRef,
    /// Rows to discard before the real header row (banner lines in combined
    /// exports). Zero for the ordinary yearly files.
    pub skip_rows: usize,
}

impl SalesSource {
    pub fn new(period: impl Into<String>, reference: SourceRef) -> Self {
        Self {
            period: period.into(),
            reference,
            skip_rows: 0,
        }
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub period: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub records: Vec<SalesRecord>,
    pub warnings: Vec<LoadWarning>,
    pub skipped_sources: usize,
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loads and unions all sources into one long-format table.
pub fn load_sales(
    sources: &[SalesSource],
    store: &dyn TableStore,
    hints: &NormalizeHints,
) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    for source in sources {
        match load_one(source, store, hints, &mut outcome) {
            Ok(count) => {
                info!(
                    "loaded {} rows from {} ({})",
                    count,
                    source.reference.describe(),
                    source.period
                );
            }
            Err(err) => {
                warn!(
                    "skipping source {} ({}): {}",
                    source.reference.describe(),
                    source.period,
                    err
                );
                outcome.warnings.push(LoadWarning {
                    period: source.period.clone(),
                    message: err.to_string(),
                });
                outcome.skipped_sources += 1;
            }
        }
    }

    info!(
        "load batch complete: {} rows, {} of {} sources skipped",
        outcome.records.len(),
        outcome.skipped_sources,
        sources.len()
    );
    outcome
}

fn load_one(
    source: &SalesSource,
    store: &dyn TableStore,
    hints: &NormalizeHints,
    outcome: &mut LoadOutcome,
) -> Result<usize> {
    let raw = read_source(&source.reference, store)?;
    let raw = if source.skip_rows > 0 {
        raw.skip_rows(source.skip_rows)
    } else {
        raw
    };

    let normalized = normalize(&raw, hints, &source.period)?;
    for message in normalized.warnings {
        outcome.warnings.push(LoadWarning {
            period: source.period.clone(),
            message,
        });
    }

    let count = normalized.rows.len();
    outcome
        .records
        .extend(normalized.rows.into_iter().map(|row| SalesRecord {
            outlet: row.outlet,
            year: source.period.clone(),
            month: row.month,
            brand: row.brand,
            sales: row.sales,
            bills: row.bills,
            day: row.day,
        }));
    Ok(count)
}

fn read_source(reference: &SourceRef, store: &dyn TableStore) -> Result<RawTable> {
    match reference {
        SourceRef::Local(path) => {
            if !path.exists() {
                return Err(InsightsError::SourceUnavailable {
                    location: path.display().to_string(),
                });
            }
            RawTable::from_path(path)
        }
        SourceRef::Object { bucket, key } => {
            if !store.exists(bucket, key) {
                return Err(InsightsError::SourceUnavailable {
                    location: format!("s3://{}/{}", bucket, key),
                });
            }
            store.read(bucket, key)
        }
    }
}

/// Identity + modification marker for a batch of sources, used as the cache
/// key. Local files use their mtime; objects use the store's revision.
pub fn source_fingerprint(sources: &[SalesSource], store: &dyn TableStore) -> String {
    let mut parts = Vec::with_capacity(sources.len());
    for source in sources {
        let marker = match &source.reference {
            SourceRef::Local(path) => path
                .metadata()
                .and_then(|m| m.modified())
                .map(|mtime| DateTime::<Utc>::from(mtime).to_rfc3339())
                .unwrap_or_else(|_| "absent".to_string()),
            SourceRef::Object { bucket, key } => store
                .revision(bucket, key)
                .unwrap_or_else(|| "absent".to_string()),
        };
        parts.push(format!(
            "{}={}@{}",
            source.period,
            source.reference.describe(),
            marker
        ));
    }
    parts.join(";")
}

/// Caller-owned cache around [`load_sales`], invalidated when any source's
/// modification marker changes. The single cached value is reused across all
/// derived views in a session.
#[derive(Debug, Default)]
pub struct LoadCache {
    fingerprint: Option<String>,
    outcome: Option<LoadOutcome>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_or_reuse(
        &mut self,
        sources: &[SalesSource],
        store: &dyn TableStore,
        hints: &NormalizeHints,
    ) -> &LoadOutcome {
        let fingerprint = source_fingerprint(sources, store);
        let stale = self.fingerprint.as_deref() != Some(fingerprint.as_str());
        if stale || self.outcome.is_none() {
            info!("load cache miss, recomputing normalized table");
            self.outcome = Some(load_sales(sources, store, hints));
            self.fingerprint = Some(fingerprint);
        }
        self.outcome.as_ref().expect("cache populated above")
    }

    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.outcome = None;
    }
}

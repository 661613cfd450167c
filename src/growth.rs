//! Period-over-period growth.
//!
//! Growth joins two grouped period tables on their dimension value and
//! reports absolute and percentage change. A zero baseline never produces a
//! raw float infinity: the percent is a two-variant sentinel so downstream
//! formatting cannot silently stringify `inf`.

use crate::aggregate::GroupedRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Percentage change with an explicit marker for growth from a zero base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PercentChange {
    Value(f64),
    /// Base was zero and the comparison value positive.
    Infinite,
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Value(pct) => write!(f, "{:.2}%", pct),
            PercentChange::Infinite => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodPair {
    pub from: String,
    pub to: String,
}

impl PeriodPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for PeriodPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEntry {
    pub keys: Vec<String>,
    pub base: f64,
    pub compare: f64,
    pub delta: f64,
    pub percent: PercentChange,
}

impl GrowthEntry {
    pub fn key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthTable {
    pub periods: PeriodPair,
    pub entries: Vec<GrowthEntry>,
}

/// One period's grouped values, labelled for chaining.
#[derive(Debug, Clone)]
pub struct PeriodTable {
    pub period: String,
    pub rows: Vec<GroupedRow>,
}

impl PeriodTable {
    pub fn new(period: impl Into<String>, rows: Vec<GroupedRow>) -> Self {
        Self {
            period: period.into(),
            rows,
        }
    }
}

fn percent_change(base: f64, compare: f64) -> PercentChange {
    if base == 0.0 {
        if compare == 0.0 {
            PercentChange::Value(0.0)
        } else {
            PercentChange::Infinite
        }
    } else {
        PercentChange::Value((compare / base - 1.0) * 100.0)
    }
}

/// Joins two period tables and computes growth per dimension value.
///
/// The join is inner: a value must appear in both periods to report growth.
/// Values present in only one period stay visible in the raw per-period
/// tables but are excluded here. Entries come back sorted descending by
/// percent (infinite growth first).
pub fn compute_growth(
    periods: PeriodPair,
    base: &[GroupedRow],
    compare: &[GroupedRow],
) -> GrowthTable {
    let compare_by_key: BTreeMap<&[String], f64> = compare
        .iter()
        .map(|r| (r.keys.as_slice(), r.value))
        .collect();

    let mut entries: Vec<GrowthEntry> = base
        .iter()
        .filter_map(|row| {
            let compare_value = *compare_by_key.get(row.keys.as_slice())?;
            Some(GrowthEntry {
                keys: row.keys.clone(),
                base: row.value,
                compare: compare_value,
                delta: compare_value - row.value,
                percent: percent_change(row.value, compare_value),
            })
        })
        .collect();

    entries.sort_by(|a, b| match (a.percent, b.percent) {
        (PercentChange::Infinite, PercentChange::Infinite) => a.keys.cmp(&b.keys),
        (PercentChange::Infinite, _) => std::cmp::Ordering::Less,
        (_, PercentChange::Infinite) => std::cmp::Ordering::Greater,
        (PercentChange::Value(x), PercentChange::Value(y)) => {
            y.total_cmp(&x).then_with(|| a.keys.cmp(&b.keys))
        }
    });

    GrowthTable { periods, entries }
}

/// Pairwise growth across an ordered run of periods: N periods yield N-1
/// tables, each keyed by its period pair.
pub fn chained_growth(periods: &[PeriodTable]) -> Vec<GrowthTable> {
    periods
        .windows(2)
        .map(|pair| {
            compute_growth(
                PeriodPair::new(pair[0].period.clone(), pair[1].period.clone()),
                &pair[0].rows,
                &pair[1].rows,
            )
        })
        .collect()
}

/// Projects a value forward by a percentage (the dashboard's
/// "projected at 10% growth" column).
pub fn project(value: f64, percent: f64) -> f64 {
    value * (1.0 + percent / 100.0)
}

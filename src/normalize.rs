//! Heuristic normalization of raw source tables into the canonical schema.
//!
//! Yearly exports disagree on header position, column naming, and currency
//! formatting, and they embed subtotal rows in the data body. The normalizer
//! absorbs all of that: it locates columns through an ordered rule chain,
//! drops summary rows, melts wide month-per-column layouts into long format,
//! and coerces localized money strings. A source is only rejected outright
//! when no plausible outlet column exists at all.

use crate::error::{InsightsError, Result};
use crate::schema::Month;
use crate::table::RawTable;
use log::{debug, warn};

/// One way of locating a column, tried in order until one matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRule {
    /// Trimmed header equals the name, case-insensitively.
    Exact(String),
    /// Trimmed header contains the name, case-insensitively.
    Substring(String),
    /// Fixed 0-based column index. A last resort, not a precise mapping;
    /// every hit is logged as a guess.
    Position(usize),
}

impl ColumnRule {
    pub fn exact(name: &str) -> Self {
        ColumnRule::Exact(name.to_string())
    }

    pub fn substring(name: &str) -> Self {
        ColumnRule::Substring(name.to_string())
    }

    fn locate(&self, headers: &[String]) -> Option<usize> {
        match self {
            ColumnRule::Exact(name) => headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name)),
            ColumnRule::Substring(name) => headers
                .iter()
                .position(|h| h.trim().to_ascii_uppercase().contains(&name.to_ascii_uppercase())),
            ColumnRule::Position(idx) => {
                if *idx < headers.len() {
                    Some(*idx)
                } else {
                    None
                }
            }
        }
    }
}

/// Tries each rule in order, returning the first matching column index.
pub fn locate_column<'a>(
    headers: &[String],
    rules: &'a [ColumnRule],
) -> Option<(usize, &'a ColumnRule)> {
    rules
        .iter()
        .find_map(|rule| rule.locate(headers).map(|idx| (idx, rule)))
}

/// Column-discovery hints for one source layout.
///
/// The defaults match the MTD export family: a `SALONS` identifier column
/// (3rd column when unlabelled), an `S.NO` row-sequence column, and either
/// twelve month-named sales columns (wide layout) or `Month` / `MTD SALES` /
/// `MTD BILLS` columns (long layout).
#[derive(Debug, Clone)]
pub struct NormalizeHints {
    pub outlet: Vec<ColumnRule>,
    pub sequence: Vec<ColumnRule>,
    pub brand: Vec<ColumnRule>,
    pub month_label: Vec<ColumnRule>,
    pub sales: Vec<ColumnRule>,
    pub bills: Vec<ColumnRule>,
    pub day: Vec<ColumnRule>,
}

impl Default for NormalizeHints {
    fn default() -> Self {
        Self {
            outlet: vec![
                ColumnRule::exact("SALONS"),
                ColumnRule::substring("SALON"),
                ColumnRule::Position(2),
            ],
            sequence: vec![ColumnRule::exact("S.NO")],
            brand: vec![ColumnRule::exact("BRAND")],
            month_label: vec![ColumnRule::exact("Month")],
            sales: vec![ColumnRule::exact("MTD SALES")],
            bills: vec![ColumnRule::exact("MTD BILLS")],
            day: vec![ColumnRule::exact("DAY SALES")],
        }
    }
}

/// A canonical row before the loader stamps it with its source period.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub outlet: String,
    pub month: Month,
    pub brand: Option<String>,
    pub sales: Option<f64>,
    pub bills: Option<u64>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub rows: Vec<NormalizedRow>,
    /// Heuristic fallbacks and dropped-row notices, for the caller's
    /// warning list.
    pub warnings: Vec<String>,
}

struct Columns {
    outlet: usize,
    sequence: Option<usize>,
    brand: Option<usize>,
    month_label: Option<usize>,
    sales: Option<usize>,
    bills: Option<usize>,
    day: Option<usize>,
    /// (column index, month) pairs for the wide layout.
    wide_months: Vec<(usize, Month)>,
}

/// Normalizes a raw table into canonical rows.
///
/// Fails with [`InsightsError::Schema`] only when no outlet column can be
/// located after the whole rule chain; callers treat that as a skipped
/// source, not a fatal batch error.
pub fn normalize(
    raw: &RawTable,
    hints: &NormalizeHints,
    source_name: &str,
) -> Result<NormalizeOutcome> {
    let headers: Vec<String> = raw.headers.iter().map(|h| h.trim().to_string()).collect();
    let mut outcome = NormalizeOutcome::default();

    let (outlet_idx, outlet_rule) =
        locate_column(&headers, &hints.outlet).ok_or_else(|| InsightsError::Schema {
            source_name: source_name.to_string(),
            details: "no plausible outlet column found".to_string(),
        })?;

    if let ColumnRule::Position(idx) = outlet_rule {
        warn!(
            "{}: outlet column guessed by position {} ('{}')",
            source_name,
            idx,
            headers.get(*idx).map(String::as_str).unwrap_or("")
        );
        outcome.warnings.push(format!(
            "outlet column guessed by position {} ('{}')",
            idx,
            headers.get(*idx).map(String::as_str).unwrap_or("")
        ));
    }

    let columns = Columns {
        outlet: outlet_idx,
        sequence: locate_column(&headers, &hints.sequence).map(|(i, _)| i),
        brand: locate_column(&headers, &hints.brand).map(|(i, _)| i),
        month_label: locate_column(&headers, &hints.month_label).map(|(i, _)| i),
        sales: locate_column(&headers, &hints.sales).map(|(i, _)| i),
        bills: locate_column(&headers, &hints.bills).map(|(i, _)| i),
        day: locate_column(&headers, &hints.day).map(|(i, _)| i),
        wide_months: wide_month_columns(&headers),
    };

    if columns.month_label.is_none() && columns.wide_months.is_empty() {
        return Err(InsightsError::Schema {
            source_name: source_name.to_string(),
            details: "no month column or month-named columns found".to_string(),
        });
    }

    let mut dropped_labels = 0usize;
    for row in &raw.rows {
        let outlet = match outlet_cell(raw, row, &columns) {
            Some(o) => o,
            None => continue,
        };

        let brand = columns
            .brand
            .and_then(|i| raw.cell(row, i))
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        if let Some(label_idx) = columns.month_label {
            // Long layout: one input row, one canonical row.
            let label = raw.cell(row, label_idx).unwrap_or("");
            let month = match Month::parse_label(label) {
                Some(m) => m,
                None => {
                    // Month is grouping-required; a row without one cannot
                    // enter the canonical table.
                    debug!("{}: dropping row with month label '{}'", source_name, label);
                    dropped_labels += 1;
                    continue;
                }
            };

            outcome.rows.push(NormalizedRow {
                outlet,
                month,
                brand,
                sales: columns.sales.and_then(|i| parse_money(raw.cell(row, i))),
                bills: columns.bills.and_then(|i| parse_count(raw.cell(row, i))),
                day: columns.day.and_then(|i| parse_day(raw.cell(row, i))),
            });
        } else {
            // Wide layout: melt each month-named column into its own row.
            for &(col, month) in &columns.wide_months {
                let cell = raw.cell(row, col).map(str::trim).unwrap_or("");
                if cell.is_empty() {
                    continue;
                }
                outcome.rows.push(NormalizedRow {
                    outlet: outlet.clone(),
                    month,
                    brand: brand.clone(),
                    sales: parse_money(Some(cell)),
                    bills: None,
                    day: None,
                });
            }
        }
    }

    if dropped_labels > 0 {
        outcome.warnings.push(format!(
            "dropped {} row(s) with unrecognized month labels",
            dropped_labels
        ));
    }

    Ok(outcome)
}

/// Columns whose trimmed header exactly matches a full month name.
fn wide_month_columns(headers: &[String]) -> Vec<(usize, Month)> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| {
            Month::ALL
                .iter()
                .find(|m| m.name().eq_ignore_ascii_case(header.trim()))
                .map(|m| (idx, *m))
        })
        .collect()
}

/// Applies the summary-row filters to the outlet cell, returning the outlet
/// name only for a genuine data row.
fn outlet_cell(raw: &RawTable, row: &[String], columns: &Columns) -> Option<String> {
    let outlet = raw.cell(row, columns.outlet)?.trim();
    if outlet.is_empty() || is_purely_numeric(outlet) {
        return None;
    }
    // Safety net against summary rows that carry a label instead of a number.
    if outlet.to_ascii_lowercase().contains("total") {
        return None;
    }
    if let Some(seq_idx) = columns.sequence {
        let seq = raw.cell(row, seq_idx).unwrap_or("").trim();
        if parse_money(Some(seq)).is_none() {
            return None;
        }
    }
    Some(outlet.to_string())
}

fn is_purely_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Coerces a localized money string. Strips the currency symbol, thousands
/// separators, and spaces; anything that still fails to parse (or parses
/// negative) becomes missing, never zero.
pub fn parse_money(cell: Option<&str>) -> Option<f64> {
    let cleaned: String = cell?
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '₹')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| *v >= 0.0)
}

pub fn parse_count(cell: Option<&str>) -> Option<u64> {
    let value = parse_money(cell)?;
    if value.fract() == 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

fn parse_day(cell: Option<&str>) -> Option<u32> {
    let value = parse_count(cell)?;
    u32::try_from(value).ok().filter(|d| (1..=31).contains(d))
}

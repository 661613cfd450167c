//! The canonical schema every heterogeneous source layout is normalized into.
//!
//! One [`SalesRecord`] per outlet-month-year (optionally per day). Duplicate
//! `(outlet, year, month)` keys are legal in the long table — they arise when
//! multiple source files cover overlapping periods — and are summed by the
//! aggregation engine, never overwritten.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::Result;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// Calendar order, the only valid sort order for month labels.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// 1-based calendar position.
    pub fn ordinal(&self) -> u32 {
        Month::ALL.iter().position(|m| m == self).unwrap() as u32 + 1
    }

    /// Parses a month label, accepting full names and the three-letter
    /// abbreviations that appear in older exports, case-insensitively.
    pub fn parse_label(label: &str) -> Option<Month> {
        let trimmed = label.trim();
        for month in Month::ALL {
            if month.name().eq_ignore_ascii_case(trimmed) {
                return Some(month);
            }
            if trimmed.len() == 3 && month.name()[..3].eq_ignore_ascii_case(trimmed) {
                return Some(month);
            }
        }
        None
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Month::parse_label(s).ok_or(())
    }
}

/// One row of the canonical long-format sales table.
///
/// `sales` and `bills` are `None` when the source cell was absent or
/// unparseable — missing is never silently coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SalesRecord {
    pub outlet: String,
    pub year: String,
    pub month: Month,
    pub brand: Option<String>,
    pub sales: Option<f64>,
    pub bills: Option<u64>,
    /// Day of month, present only for daily-granularity rows.
    pub day: Option<u32>,
}

/// One row of service/product category data.
///
/// Business unit and outlet are independent dimensions: a sale has both an
/// outlet and, when service-level detail exists, a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryRecord {
    pub business_unit: String,
    pub item_category: String,
    pub item_subcategory: Option<String>,
    pub total_sales: Option<f64>,
    pub total_quantity: Option<f64>,
    pub transaction_count: Option<u64>,
    pub year: Option<String>,
}

pub const CANONICAL_HEADERS: [&str; 7] =
    ["outlet", "year", "month", "brand", "sales", "bills", "day"];

/// Persists the normalized table as the canonical cache CSV.
pub fn write_canonical_csv<W: Write>(records: &[SalesRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reloads a canonical cache CSV written by [`write_canonical_csv`].
pub fn read_canonical_csv<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// JSON Schema description of the canonical record, for documenting the
/// cache file format.
pub fn canonical_schema_json() -> std::result::Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(SalesRecord);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parse_full_and_abbreviated() {
        assert_eq!(Month::parse_label("January"), Some(Month::January));
        assert_eq!(Month::parse_label("jan"), Some(Month::January));
        assert_eq!(Month::parse_label(" SEP "), Some(Month::September));
        assert_eq!(Month::parse_label("Sept"), None);
        assert_eq!(Month::parse_label("Totals"), None);
    }

    #[test]
    fn test_month_calendar_ordering() {
        assert!(Month::January < Month::December);
        assert_eq!(Month::March.ordinal(), 3);
        let mut shuffled = vec![Month::May, Month::January, Month::December];
        shuffled.sort();
        assert_eq!(shuffled, vec![Month::January, Month::May, Month::December]);
    }

    #[test]
    fn test_canonical_csv_round_trip() {
        let records = vec![
            SalesRecord {
                outlet: "ADYAR".to_string(),
                year: "2023".to_string(),
                month: Month::January,
                brand: Some("Naturals".to_string()),
                sales: Some(100_000.0),
                bills: Some(412),
                day: None,
            },
            SalesRecord {
                outlet: "T NAGAR".to_string(),
                year: "2023".to_string(),
                month: Month::February,
                brand: None,
                sales: None,
                bills: None,
                day: Some(14),
            },
        ];

        let mut buf = Vec::new();
        write_canonical_csv(&records, &mut buf).unwrap();
        let header_line = String::from_utf8_lossy(&buf)
            .lines()
            .next()
            .unwrap()
            .to_string();
        assert_eq!(header_line, CANONICAL_HEADERS.join(","));

        let reloaded = read_canonical_csv(buf.as_slice()).unwrap();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = canonical_schema_json().unwrap();
        assert!(schema_json.contains("outlet"));
        assert!(schema_json.contains("month"));
    }
}

//! Untyped tabular data as read from a CSV source.
//!
//! A [`RawTable`] is the input to the schema normalizer: a header row plus
//! string cells, with no assumptions about column names, ordering, or row
//! shape. Yearly exports are hand-maintained spreadsheets, so readers are
//! always flexible about ragged rows.

use crate::error::Result;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Re-interprets the table with row `n` as the header row, discarding
    /// everything above it. Combined multi-year exports carry a banner line
    /// above the real header.
    pub fn skip_rows(&self, n: usize) -> Self {
        if n == 0 || self.rows.is_empty() {
            return self.clone();
        }
        let header_idx = n - 1;
        if header_idx >= self.rows.len() {
            return Self::default();
        }
        Self {
            headers: self.rows[header_idx].clone(),
            rows: self.rows[header_idx + 1..].to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Cell accessor tolerant of ragged rows.
    pub fn cell<'a>(&self, row: &'a [String], col: usize) -> Option<&'a str> {
        row.get(col).map(|s| s.as_str())
    }
}

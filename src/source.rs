//! Where raw tables come from.
//!
//! Object storage is an external collaborator behind the [`TableStore`]
//! trait; local CSV files are read directly. Nothing here interprets table
//! contents.

use crate::error::{InsightsError, Result};
use crate::table::RawTable;
use std::collections::HashMap;
use std::path::PathBuf;

/// The object-storage collaborator: existence check plus whole-object read,
/// with an optional revision marker (etag, version id) for cache keys.
pub trait TableStore {
    fn exists(&self, bucket: &str, key: &str) -> bool;
    fn read(&self, bucket: &str, key: &str) -> Result<RawTable>;
    fn revision(&self, _bucket: &str, _key: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Local(PathBuf),
    Object { bucket: String, key: String },
}

impl SourceRef {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        SourceRef::Local(path.into())
    }

    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        SourceRef::Object {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SourceRef::Local(path) => path.display().to_string(),
            SourceRef::Object { bucket, key } => format!("s3://{}/{}", bucket, key),
        }
    }
}

/// In-memory [`TableStore`] stub, for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), String>,
    revisions: HashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bucket: &str, key: &str, csv_text: &str) {
        self.objects
            .insert((bucket.to_string(), key.to_string()), csv_text.to_string());
    }

    pub fn set_revision(&mut self, bucket: &str, key: &str, revision: &str) {
        self.revisions
            .insert((bucket.to_string(), key.to_string()), revision.to_string());
    }
}

impl TableStore for MemoryStore {
    fn exists(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    fn read(&self, bucket: &str, key: &str) -> Result<RawTable> {
        let text = self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| InsightsError::SourceUnavailable {
                location: format!("s3://{}/{}", bucket, key),
            })?;
        RawTable::from_csv_reader(text.as_bytes())
    }

    fn revision(&self, bucket: &str, key: &str) -> Option<String> {
        self.revisions
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.insert("reports", "mtd-2023.csv", "SALONS,January\nADYAR,1000\n");
        assert!(store.exists("reports", "mtd-2023.csv"));
        assert!(!store.exists("reports", "missing.csv"));

        let table = store.read("reports", "mtd-2023.csv").unwrap();
        assert_eq!(table.headers, vec!["SALONS", "January"]);
        assert!(matches!(
            store.read("reports", "missing.csv"),
            Err(InsightsError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            SourceRef::object("b", "k.csv").describe(),
            "s3://b/k.csv"
        );
        assert_eq!(SourceRef::local("dataset/MTD - 2022.csv").describe(), "dataset/MTD - 2022.csv");
    }
}

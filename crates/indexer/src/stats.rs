use crate::types::FileIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about one index build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of files indexed
    pub files: usize,

    /// Files dropped for exceeding the size ceiling
    pub skipped_large: usize,

    /// Files dropped because they could not be read
    pub skipped_errors: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Errors encountered
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self) {
        self.files += 1;
    }

    pub fn add_error(&mut self, error: String) {
        self.skipped_errors += 1;
        self.errors.push(error);
    }
}

/// Per-kind and per-extension counts of an index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub total: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_extension: BTreeMap<String, usize>,
}

impl IndexSummary {
    pub fn of(index: &FileIndex) -> Self {
        let mut summary = Self {
            total: index.len(),
            ..Self::default()
        };
        for record in index.records() {
            *summary
                .by_kind
                .entry(record.kind.as_str().to_string())
                .or_insert(0) += 1;
            *summary
                .by_extension
                .entry(record.extension.clone())
                .or_insert(0) += 1;
        }
        summary
    }
}

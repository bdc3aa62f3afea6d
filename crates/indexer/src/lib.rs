//! # Assist Indexer
//!
//! Builds an in-memory index of a project tree for context selection.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (excluded dirs pruned, extension + size filters)
//!     │      └─> Candidate files
//!     │
//!     ├──> Keyword Extractor (vocabulary terms, declared identifiers)
//!     │      └─> Keyword sets
//!     │
//!     └──> Classifier (first-match path rules)
//!            └─> FileIndex snapshot
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use assist_indexer::{FileIndexer, IndexOptions};
//!
//! fn main() -> assist_indexer::Result<()> {
//!     let indexer = FileIndexer::new(IndexOptions::for_root("/path/to/project"))?;
//!     let index = indexer.snapshot();
//!
//!     println!("Indexed {} files", index.len());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod indexer;
mod keywords;
mod scanner;
mod stats;
mod types;

pub use config::IndexOptions;
pub use error::{IndexerError, Result};
pub use indexer::{build_index, FileIndexer};
pub use keywords::{KeywordExtractor, DOMAIN_TERMS, REGION_TERMS};
pub use scanner::{normalize_rel_path, FileScanner, ScanReport, ScannedFile};
pub use stats::{IndexStats, IndexSummary};
pub use types::{FileIndex, FileKind, FileRecord};

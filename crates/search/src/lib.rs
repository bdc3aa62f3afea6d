//! # Assist Search
//!
//! Relevance scoring, rule-driven file selection and budgeted context
//! assembly over an [`assist_indexer::FileIndex`] snapshot.
//!
//! ## Selection order
//!
//! ```text
//! pinned files present in the index
//!   + ranked files (score > 0, best first) up to `max_files`
//!   <- trigger rules insert forced files at the front, table order
//!   <- interface words insert markup files at the front
//!   -> styling words append stylesheets
//! ```

mod assembler;
mod error;
mod reader;
mod rules;
mod scorer;
mod selector;
mod service;
mod text_search;

pub use assembler::{AssembledContext, ContextAssembler, ContextOptions};
pub use error::{Result, SearchError};
pub use reader::{resolve_under_root, FileReader};
pub use rules::{QueryCategory, SelectionRules, TriggerRule};
pub use scorer::{BoostCondition, RelevanceScorer, ScoreBoost, DEFAULT_BOOSTS};
pub use selector::{rank, FileSelector, ScoredFile};
pub use service::ContextService;
pub use text_search::{file_summary, search_files, MAX_HITS_PER_FILE};

use crate::assembler::{AssembledContext, ContextAssembler, ContextOptions};
use crate::error::{Result, SearchError};
use crate::reader::FileReader;
use crate::rules::SelectionRules;
use crate::scorer::RelevanceScorer;
use crate::selector::{rank, FileSelector, ScoredFile};
use crate::text_search;
use assist_indexer::{FileIndex, FileIndexer, IndexOptions, IndexStats, IndexSummary};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Index, read cache and selection rules for one project root
pub struct ContextService {
    indexer: FileIndexer,
    reader: FileReader,
    scorer: RelevanceScorer,
    rules: SelectionRules,
    options: ContextOptions,
}

impl ContextService {
    pub fn new(
        index_options: IndexOptions,
        options: ContextOptions,
        rules: SelectionRules,
    ) -> Result<Self> {
        options.validate().map_err(SearchError::InvalidOptions)?;
        rules.validate().map_err(SearchError::InvalidOptions)?;

        let reader = FileReader::new(index_options.root.clone(), options.cache_capacity);
        let indexer = FileIndexer::new(index_options)?;

        Ok(Self {
            indexer,
            reader,
            scorer: RelevanceScorer::default(),
            rules,
            options,
        })
    }

    pub fn index(&self) -> Arc<FileIndex> {
        self.indexer.snapshot()
    }

    /// Rebuild the index and drop every cached read
    pub fn refresh(&self) -> Result<IndexStats> {
        let stats = self.indexer.refresh()?;
        self.reader.invalidate();
        Ok(stats)
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary::of(&self.index())
    }

    pub fn ranked(&self, query: &str) -> Vec<ScoredFile> {
        rank(&self.index(), query, &self.scorer)
    }

    pub fn context_files(&self, query: &str) -> Vec<String> {
        let index = self.index();
        FileSelector::new(&self.rules, &self.scorer, self.options.max_files).select(query, &index)
    }

    /// Context for `query` within the configured character budget
    pub fn prepare_context(&self, query: &str, files: Option<&[String]>) -> AssembledContext {
        self.prepare_context_with_budget(query, files, self.options.max_chars)
    }

    /// Context for `query`; explicit `files` bypass selection
    pub fn prepare_context_with_budget(
        &self,
        query: &str,
        files: Option<&[String]>,
        max_chars: usize,
    ) -> AssembledContext {
        let selection = match files {
            Some(files) => files.to_vec(),
            None => self.context_files(query),
        };
        let context = self.assemble(&selection, max_chars);
        log::info!(
            "Prepared context with {} files ({} chars)",
            context.files.len(),
            context.total_chars
        );
        context
    }

    pub fn assemble(&self, paths: &[String], max_chars: usize) -> AssembledContext {
        ContextAssembler::new(&self.reader, self.options.safety_margin).assemble(paths, max_chars)
    }

    pub fn file_summary(&self, path: &str, max_lines: usize) -> Result<String> {
        text_search::file_summary(&self.reader, path, max_lines)
    }

    pub fn search_files(
        &self,
        pattern: &str,
        suffix: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        text_search::search_files(&self.index(), &self.reader, pattern, suffix)
    }

    pub fn cached_files(&self) -> usize {
        self.reader.cached_len()
    }
}

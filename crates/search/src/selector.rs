use crate::rules::SelectionRules;
use crate::scorer::RelevanceScorer;
use assist_indexer::FileIndex;
use serde::Serialize;
use std::cmp::Ordering;

/// A file together with its relevance to the current query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFile {
    pub path: String,
    pub score: f32,
}

/// Every file with a positive score, best first, ties broken by path
pub fn rank(index: &FileIndex, query: &str, scorer: &RelevanceScorer) -> Vec<ScoredFile> {
    let mut scored: Vec<ScoredFile> = index
        .records()
        .filter_map(|record| {
            let score = scorer.score(record, query);
            (score > 0.0).then(|| ScoredFile {
                path: record.path.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    scored
}

/// Ordered selection of paths to feed into assembly
pub struct FileSelector<'a> {
    rules: &'a SelectionRules,
    scorer: &'a RelevanceScorer,
    max_files: usize,
}

impl<'a> FileSelector<'a> {
    pub fn new(rules: &'a SelectionRules, scorer: &'a RelevanceScorer, max_files: usize) -> Self {
        Self {
            rules,
            scorer,
            max_files,
        }
    }

    pub fn select(&self, query: &str, index: &FileIndex) -> Vec<String> {
        let query_lower = query.to_lowercase();

        let mut selected: Vec<String> = self
            .rules
            .pinned
            .iter()
            .filter(|path| index.contains(path))
            .cloned()
            .collect();

        for candidate in rank(index, query, self.scorer) {
            if selected.len() >= self.max_files {
                break;
            }
            if !selected.contains(&candidate.path) {
                selected.push(candidate.path);
            }
        }

        for rule in &self.rules.triggers {
            if !query_lower.contains(rule.trigger.as_str()) {
                continue;
            }
            for pattern in &rule.include {
                let matches = index
                    .paths()
                    .filter(|path| path.contains(pattern.as_str()))
                    .take(self.rules.per_pattern_take);
                for path in matches {
                    if !selected.iter().any(|s| s == path) {
                        selected.insert(0, path.to_string());
                    }
                }
            }
        }

        let mentions = |words: &[String]| words.iter().any(|w| query_lower.contains(w.as_str()));

        if mentions(&self.rules.ui_words) {
            let markup: Vec<&str> = index
                .paths()
                .filter(|path| path.ends_with(".html"))
                .take(self.rules.ui_take)
                .collect();
            for path in markup {
                if !selected.iter().any(|s| s == path) {
                    selected.insert(0, path.to_string());
                }
            }
        }

        if mentions(&self.rules.style_words) {
            let stylesheets: Vec<&str> = index
                .paths()
                .filter(|path| path.ends_with(".css"))
                .take(self.rules.style_take)
                .collect();
            for path in stylesheets {
                if !selected.iter().any(|s| s == path) {
                    selected.push(path.to_string());
                }
            }
        }

        log::debug!("Selected {} files for query", selected.len());
        selected
    }
}

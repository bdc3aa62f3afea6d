use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Closed set of file categories used by scoring and selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    ParserModule,
    ServiceModule,
    UtilityModule,
    #[serde(rename = "html_template")]
    MarkupTemplate,
    Stylesheet,
    AiModule,
    TestFile,
    Documentation,
    Other,
}

impl FileKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParserModule => "parser_module",
            Self::ServiceModule => "service_module",
            Self::UtilityModule => "utility_module",
            Self::MarkupTemplate => "html_template",
            Self::Stylesheet => "stylesheet",
            Self::AiModule => "ai_module",
            Self::TestFile => "test_file",
            Self::Documentation => "documentation",
            Self::Other => "other",
        }
    }

    /// Classify a relative path. First matching rule wins.
    #[must_use]
    pub fn classify(rel_path: &str) -> Self {
        CLASSIFICATION_RULES
            .iter()
            .find(|(pattern, _)| pattern.matches(rel_path))
            .map_or(Self::Other, |(_, kind)| *kind)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum PathPattern {
    Contains(&'static str),
    EndsWith(&'static str),
}

impl PathPattern {
    fn matches(self, rel_path: &str) -> bool {
        match self {
            Self::Contains(needle) => rel_path.contains(needle),
            Self::EndsWith(suffix) => rel_path.ends_with(suffix),
        }
    }
}

const CLASSIFICATION_RULES: &[(PathPattern, FileKind)] = &[
    (PathPattern::Contains("parser"), FileKind::ParserModule),
    (PathPattern::Contains("services"), FileKind::ServiceModule),
    (PathPattern::Contains("utils"), FileKind::UtilityModule),
    (PathPattern::EndsWith(".html"), FileKind::MarkupTemplate),
    (PathPattern::EndsWith(".css"), FileKind::Stylesheet),
    (PathPattern::Contains("ai_assistant"), FileKind::AiModule),
    (PathPattern::Contains("test"), FileKind::TestFile),
    (PathPattern::EndsWith(".md"), FileKind::Documentation),
];

/// Indexed metadata and preview for one file
///
/// Records are replaced wholesale on refresh and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the index root, `/`-separated
    pub path: String,

    /// Size on disk in bytes
    pub size: u64,

    /// Lower-cased extension without the leading dot
    pub extension: String,

    /// Vocabulary terms and declared identifiers found in the file
    pub keywords: BTreeSet<String>,

    /// Bounded prefix of the file content
    pub preview: String,

    pub kind: FileKind,
}

impl FileRecord {
    pub fn has_keyword(&self, term: &str) -> bool {
        self.keywords.contains(term)
    }
}

/// Immutable snapshot of the indexed tree, keyed by relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    root: PathBuf,
    records: BTreeMap<String, FileRecord>,
}

impl FileIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            records: BTreeMap::new(),
        }
    }

    pub fn from_records(root: impl Into<PathBuf>, records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut index = Self::new(root);
        for record in records {
            index.insert(record);
        }
        index
    }

    pub(crate) fn insert(&mut self, record: FileRecord) {
        self.records.insert(record.path.clone(), record);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Paths in lexical order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }
}

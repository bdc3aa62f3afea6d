use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for index builds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Directory every indexed path is relative to
    pub root: PathBuf,

    /// Allowed extensions, without the leading dot
    pub include_extensions: Vec<String>,

    /// Directory names pruned before descending
    pub exclude_dirs: Vec<String>,

    /// Files larger than this are never indexed
    pub max_file_bytes: u64,

    /// Characters of content kept as preview
    pub preview_chars: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include_extensions: ["js", "ts", "html", "css", "py", "json", "md", "txt"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude_dirs: ["node_modules", "venv", "__pycache__", ".git", "dist", "build"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_bytes: 500_000,
            preview_chars: 500,
        }
    }
}

impl IndexOptions {
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.include_extensions.is_empty() {
            return Err("include_extensions must not be empty".to_string());
        }
        if self
            .include_extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err("include_extensions entries are bare extensions like \"ts\"".to_string());
        }
        if self.max_file_bytes == 0 {
            return Err("max_file_bytes must be > 0".to_string());
        }
        Ok(())
    }

    pub(crate) fn allows_extension(&self, ext: &str) -> bool {
        self.include_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }

    pub(crate) fn excludes_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|dir| dir == name)
    }
}

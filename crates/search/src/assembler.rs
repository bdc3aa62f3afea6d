use crate::reader::FileReader;
use serde::{Deserialize, Serialize};

const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Budgets for context selection and assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
    /// Character budget of an assembled context
    pub max_chars: usize,

    /// Cap on the pinned plus ranked part of a selection
    pub max_files: usize,

    /// Entries kept in the file read cache
    pub cache_capacity: usize,

    /// Characters held back per file on top of the header
    pub safety_margin: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_chars: 50_000,
            max_files: 20,
            cache_capacity: 100,
            safety_margin: 100,
        }
    }
}

impl ContextOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_files == 0 {
            return Err("max_files must be > 0".to_string());
        }
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be > 0".to_string());
        }
        Ok(())
    }
}

/// Context text plus the files that made it in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembledContext {
    pub text: String,

    /// Paths actually included, a prefix of the readable selection
    pub files: Vec<String>,

    /// True if a file was cut or trailing files were dropped for budget
    pub truncated: bool,

    /// Length of `text` in characters
    pub total_chars: usize,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn header(path: &str) -> String {
    format!("\n=== {path} ===\n")
}

/// Concatenates path-labelled file blocks within a character budget
pub struct ContextAssembler<'a> {
    reader: &'a FileReader,
    safety_margin: usize,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(reader: &'a FileReader, safety_margin: usize) -> Self {
        Self {
            reader,
            safety_margin,
        }
    }

    pub fn assemble(&self, paths: &[String], max_chars: usize) -> AssembledContext {
        let mut out = AssembledContext::default();

        for (position, path) in paths.iter().enumerate() {
            let content = match self.reader.read(path) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!("Skipping unreadable file {path}: {err}");
                    continue;
                }
            };

            let block_header = header(path);
            let header_chars = block_header.chars().count();
            let reserved = out.total_chars + header_chars + self.safety_margin;
            if reserved >= max_chars {
                let omitted = paths.len() - position;
                log::debug!("Context budget exhausted; omitting {omitted} file(s)");
                out.truncated = true;
                break;
            }
            let available = max_chars - reserved;

            let content_chars = content.chars().count();
            let body = if content_chars > available {
                out.truncated = true;
                // The marker counts against the budget; drop it if it cannot fit
                match available.checked_sub(TRUNCATION_MARKER.len()) {
                    Some(keep) => {
                        let mut cut: String = content.chars().take(keep).collect();
                        cut.push_str(TRUNCATION_MARKER);
                        cut
                    }
                    None => content.chars().take(available).collect(),
                }
            } else {
                content.to_string()
            };

            out.total_chars += header_chars + body.chars().count();
            out.text.push_str(&block_header);
            out.text.push_str(&body);
            out.files.push(path.clone());
        }

        out
    }
}

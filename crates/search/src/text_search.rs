use crate::error::Result;
use crate::reader::FileReader;
use assist_indexer::FileIndex;
use regex::RegexBuilder;
use std::collections::BTreeMap;

/// Hits kept per file
pub const MAX_HITS_PER_FILE: usize = 5;

/// First `max_lines` lines of a file, noting how many were left out
pub fn file_summary(reader: &FileReader, path: &str, max_lines: usize) -> Result<String> {
    let content = reader.read(path)?;
    let total = content.lines().count();
    let mut summary = content
        .lines()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n");
    if total > max_lines {
        summary.push_str(&format!("\n... [{} more lines]", total - max_lines));
    }
    Ok(summary)
}

/// Case-insensitive regex search over indexed files
///
/// `suffix` restricts the search to paths ending with it (e.g. `.ts`).
/// Files that cannot be read are skipped.
pub fn search_files(
    index: &FileIndex,
    reader: &FileReader,
    pattern: &str,
    suffix: Option<&str>,
) -> Result<BTreeMap<String, Vec<String>>> {
    let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    let mut results = BTreeMap::new();

    for path in index.paths() {
        if suffix.is_some_and(|s| !path.ends_with(s)) {
            continue;
        }
        let content = match reader.read(path) {
            Ok(content) => content,
            Err(err) => {
                log::debug!("search skipped {path}: {err}");
                continue;
            }
        };

        let hits: Vec<String> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| re.is_match(line))
            .take(MAX_HITS_PER_FILE)
            .map(|(i, line)| format!("Line {}: {}", i + 1, line.trim()))
            .collect();
        if !hits.is_empty() {
            results.insert(path.to_string(), hits);
        }
    }

    Ok(results)
}

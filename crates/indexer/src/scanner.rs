use crate::config::IndexOptions;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file that passed the extension and size filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub rel_path: String,
    pub extension: String,
    pub size: u64,
}

/// Outcome of one walk, including what was filtered out
#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: Vec<ScannedFile>,
    pub skipped_large: usize,
    pub errors: Vec<String>,
}

/// Depth-first walker over the configured root
pub struct FileScanner<'a> {
    options: &'a IndexOptions,
}

impl<'a> FileScanner<'a> {
    pub fn new(options: &'a IndexOptions) -> Self {
        Self { options }
    }

    /// Walk the tree. Excluded directories are pruned before descent and
    /// symlinks are not followed.
    pub fn scan(&self) -> ScanReport {
        let mut report = ScanReport::default();
        let root = self.options.root.as_path();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Failed to read entry: {err}");
                    report.errors.push(err.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = extension_of(path) else {
                continue;
            };
            if !self.options.allows_extension(&extension) {
                continue;
            }

            let rel_path = normalize_rel_path(path, root);
            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(err) => {
                    log::debug!("Error indexing {rel_path}: {err}");
                    report.errors.push(format!("{rel_path}: {err}"));
                    continue;
                }
            };
            if size > self.options.max_file_bytes {
                log::debug!(
                    "Skipping large file {rel_path} ({size} bytes > {})",
                    self.options.max_file_bytes
                );
                report.skipped_large += 1;
                continue;
            }

            report.files.push(ScannedFile {
                path: path.to_path_buf(),
                rel_path,
                extension,
                size,
            });
        }

        log::debug!("Scanner found {} candidate files", report.files.len());
        report
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.options.excludes_dir(name))
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Relative, `/`-separated form of `path` under `root`
pub fn normalize_rel_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut s = rel.to_string_lossy().to_string();
    if s.contains('\\') {
        s = s.replace('\\', "/");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn rel_paths(report: &ScanReport) -> Vec<&str> {
        report.files.iter().map(|f| f.rel_path.as_str()).collect()
    }

    #[test]
    fn prunes_excluded_directories() {
        let temp = tempdir().unwrap();
        let modules = temp.path().join("node_modules").join("pkg");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("index.js"), b"module.exports = {}").unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/app.ts"), b"export function main() {}").unwrap();

        let opts = IndexOptions::for_root(temp.path());
        let report = FileScanner::new(&opts).scan();

        assert_eq!(rel_paths(&report), vec!["src/app.ts"]);
    }

    #[test]
    fn filters_by_extension_and_size() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("notes.md"), b"# notes").unwrap();
        fs::write(temp.path().join("image.png"), b"\x89PNG").unwrap();
        fs::write(temp.path().join("big.txt"), vec![b'a'; 64]).unwrap();

        let opts = IndexOptions {
            max_file_bytes: 32,
            ..IndexOptions::for_root(temp.path())
        };
        let report = FileScanner::new(&opts).scan();

        assert_eq!(rel_paths(&report), vec!["notes.md"]);
        assert_eq!(report.skipped_large, 1);
    }

    #[test]
    fn root_named_like_an_excluded_dir_is_still_walked() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("build");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("main.js"), b"function start() {}").unwrap();

        let opts = IndexOptions::for_root(&root);
        let report = FileScanner::new(&opts).scan();

        assert_eq!(rel_paths(&report), vec!["main.js"]);
    }
}

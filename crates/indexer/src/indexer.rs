use crate::config::IndexOptions;
use crate::error::{IndexerError, Result};
use crate::keywords::KeywordExtractor;
use crate::scanner::{FileScanner, ScannedFile};
use crate::stats::IndexStats;
use crate::types::{FileIndex, FileKind, FileRecord};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Walk `options.root` once and index every eligible file.
///
/// Per-file failures are logged and counted; only an unusable root fails the build.
pub fn build_index(
    options: &IndexOptions,
    extractor: &KeywordExtractor,
) -> Result<(FileIndex, IndexStats)> {
    options.validate().map_err(IndexerError::InvalidOptions)?;
    if !options.root.is_dir() {
        return Err(IndexerError::InvalidPath(format!(
            "Path does not exist or is not a directory: {}",
            options.root.display()
        )));
    }

    let start = Instant::now();
    let mut stats = IndexStats::new();
    let mut index = FileIndex::new(options.root.clone());

    let report = FileScanner::new(options).scan();
    stats.skipped_large = report.skipped_large;
    for error in report.errors {
        stats.add_error(error);
    }

    for file in report.files {
        match index_file(&file, options, extractor) {
            Ok(record) => {
                index.insert(record);
                stats.add_file();
            }
            Err(err) => {
                log::debug!("Error indexing {}: {err}", file.rel_path);
                stats.add_error(format!("{}: {err}", file.rel_path));
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let elapsed_ms = start.elapsed().as_millis() as u64;
    stats.time_ms = elapsed_ms;
    Ok((index, stats))
}

fn index_file(
    file: &ScannedFile,
    options: &IndexOptions,
    extractor: &KeywordExtractor,
) -> std::io::Result<FileRecord> {
    let bytes = std::fs::read(&file.path)?;
    let content = String::from_utf8_lossy(&bytes);
    let preview: String = content.chars().take(options.preview_chars).collect();

    Ok(FileRecord {
        path: file.rel_path.clone(),
        size: file.size,
        extension: file.extension.clone(),
        keywords: extractor.extract(&content, &file.extension),
        preview,
        kind: FileKind::classify(&file.rel_path),
    })
}

/// Owns the current index snapshot for one root
///
/// Readers take an `Arc` snapshot and never observe a half-built index;
/// `refresh` builds outside the lock and swaps the pointer.
pub struct FileIndexer {
    options: IndexOptions,
    extractor: KeywordExtractor,
    current: RwLock<Arc<FileIndex>>,
}

impl FileIndexer {
    /// Create an indexer and build its first snapshot
    pub fn new(options: IndexOptions) -> Result<Self> {
        Self::with_extractor(options, KeywordExtractor::default())
    }

    pub fn with_extractor(options: IndexOptions, extractor: KeywordExtractor) -> Result<Self> {
        let (index, stats) = build_index(&options, &extractor)?;
        log::info!(
            "File index built with {} files ({} ms)",
            stats.files,
            stats.time_ms
        );
        Ok(Self {
            options,
            extractor,
            current: RwLock::new(Arc::new(index)),
        })
    }

    /// Current index snapshot
    pub fn snapshot(&self) -> Arc<FileIndex> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Rebuild from disk and replace the snapshot
    pub fn refresh(&self) -> Result<IndexStats> {
        log::info!("Refreshing file index...");
        let (index, stats) = build_index(&self.options, &self.extractor)?;
        let fresh = Arc::new(index);
        match self.current.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
        log::info!("File index refreshed with {} files", stats.files);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_root_is_rejected() {
        let temp = tempdir().unwrap();
        let opts = IndexOptions::for_root(temp.path().join("nope"));
        let err = FileIndexer::new(opts).err().expect("must fail");
        assert!(matches!(err, IndexerError::InvalidPath(_)));
    }

    #[test]
    fn record_carries_preview_and_kind() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src/services")).unwrap();
        let body = format!("export class EmailSender {{}}\n{}", "x".repeat(800));
        fs::write(temp.path().join("src/services/emailSender.ts"), &body).unwrap();

        let indexer = FileIndexer::new(IndexOptions::for_root(temp.path())).unwrap();
        let index = indexer.snapshot();
        let record = index.get("src/services/emailSender.ts").expect("indexed");

        assert_eq!(record.kind, FileKind::ServiceModule);
        assert_eq!(record.extension, "ts");
        assert_eq!(record.preview.chars().count(), 500);
        assert_eq!(record.size, body.len() as u64);
        assert!(record.has_keyword("emailsender"));
    }

    #[test]
    fn refresh_swaps_in_new_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.md"), "alpha").unwrap();

        let indexer = FileIndexer::new(IndexOptions::for_root(temp.path())).unwrap();
        let before = indexer.snapshot();
        assert_eq!(before.len(), 1);

        fs::write(temp.path().join("b.md"), "beta").unwrap();
        let stats = indexer.refresh().unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(indexer.snapshot().len(), 2);
        assert_eq!(before.len(), 1, "old snapshots stay intact");
    }
}

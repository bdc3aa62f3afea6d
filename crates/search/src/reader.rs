use crate::error::{Result, SearchError};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Resolve a root-relative path, rejecting anything that could leave the root
pub fn resolve_under_root(root: &Path, rel_path: &str) -> Result<PathBuf> {
    let rel = Path::new(rel_path);
    let escapes = rel_path.is_empty()
        || rel.is_absolute()
        || rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(SearchError::PathOutsideRoot(rel_path.to_string()));
    }
    Ok(root.join(rel))
}

/// Bounded LRU cache of file contents keyed by relative path
///
/// Only successful reads are cached. The cache is cleared wholesale when the
/// index is rebuilt.
pub struct FileReader {
    root: PathBuf,
    cache: Mutex<LruCache<String, Arc<str>>>,
}

impl FileReader {
    pub fn new(root: impl Into<PathBuf>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            root: root.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<str>>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn read(&self, rel_path: &str) -> Result<Arc<str>> {
        if let Some(hit) = self.lock().get(rel_path) {
            return Ok(Arc::clone(hit));
        }

        let full = resolve_under_root(&self.root, rel_path)?;
        let bytes = std::fs::read(&full)?;
        let content: Arc<str> = Arc::from(String::from_utf8_lossy(&bytes).as_ref());

        self.lock().put(rel_path.to_string(), Arc::clone(&content));
        Ok(content)
    }

    pub fn invalidate(&self) {
        let mut cache = self.lock();
        let dropped = cache.len();
        cache.clear();
        log::debug!("File read cache cleared ({dropped} entries)");
    }

    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parent_and_absolute_paths_are_rejected() {
        let root = Path::new("/project");
        assert!(matches!(
            resolve_under_root(root, "../secret.txt"),
            Err(SearchError::PathOutsideRoot(_))
        ));
        assert!(matches!(
            resolve_under_root(root, "src/../../x"),
            Err(SearchError::PathOutsideRoot(_))
        ));
        assert!(matches!(
            resolve_under_root(root, "/etc/passwd"),
            Err(SearchError::PathOutsideRoot(_))
        ));
        assert_eq!(
            resolve_under_root(root, "src/a.ts").unwrap(),
            PathBuf::from("/project/src/a.ts")
        );
    }

    #[test]
    fn cache_serves_stale_content_until_invalidated() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.md"), "first").unwrap();
        let reader = FileReader::new(temp.path(), 4);

        assert_eq!(&*reader.read("a.md").unwrap(), "first");
        fs::write(temp.path().join("a.md"), "second").unwrap();
        assert_eq!(&*reader.read("a.md").unwrap(), "first");

        reader.invalidate();
        assert_eq!(reader.cached_len(), 0);
        assert_eq!(&*reader.read("a.md").unwrap(), "second");
    }

    #[test]
    fn capacity_bounds_entries_and_failures_are_not_cached() {
        let temp = tempdir().unwrap();
        for name in ["a.md", "b.md", "c.md"] {
            fs::write(temp.path().join(name), name).unwrap();
        }
        let reader = FileReader::new(temp.path(), 2);

        for name in ["a.md", "b.md", "c.md"] {
            reader.read(name).unwrap();
        }
        assert!(reader.read("missing.md").is_err());
        assert_eq!(reader.cached_len(), 2);
        assert_eq!(reader.capacity(), 2);
    }
}

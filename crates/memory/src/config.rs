use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ten years; keeps the timeout representable
const MAX_TIMEOUT_HOURS: u64 = 24 * 365 * 10;

/// Where session state lives between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Full snapshot mirrored to a JSON file on every mutation
    #[default]
    File,
    /// Process lifetime only
    Memory,
}

/// Conversation memory settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryOptions {
    /// Messages returned in a context window; twice this triggers a trim
    pub max_messages: usize,

    pub session_timeout_hours: u64,

    pub backend: StorageBackend,

    /// Snapshot file for the `file` backend
    pub store_path: PathBuf,

    /// Trailing discarded messages inspected when summarizing
    pub summary_scan: usize,

    /// Characters of each user message kept in the summary
    pub summary_preview_chars: usize,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            max_messages: 10,
            session_timeout_hours: 24,
            backend: StorageBackend::File,
            store_path: PathBuf::from("conversation_sessions.json"),
            summary_scan: 5,
            summary_preview_chars: 50,
        }
    }
}

impl MemoryOptions {
    /// In-memory store with default limits
    pub fn in_memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            ..Self::default()
        }
    }

    pub fn session_timeout(&self) -> chrono::Duration {
        let hours = self.session_timeout_hours.min(MAX_TIMEOUT_HOURS);
        #[allow(clippy::cast_possible_wrap)]
        let hours = hours as i64;
        chrono::Duration::hours(hours)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_messages == 0 {
            return Err("max_messages must be > 0".to_string());
        }
        if self.backend == StorageBackend::File && self.store_path.as_os_str().is_empty() {
            return Err("store_path must be set for the file backend".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(MemoryOptions::default().validate().is_ok());
        assert!(MemoryOptions::in_memory().validate().is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let opts = MemoryOptions {
            max_messages: 0,
            ..MemoryOptions::in_memory()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn backend_parses_from_toml_style_names() {
        let opts: MemoryOptions =
            serde_json::from_str(r#"{"backend":"memory","max_messages":4}"#).unwrap();
        assert_eq!(opts.backend, StorageBackend::Memory);
        assert_eq!(opts.max_messages, 4);
        assert_eq!(opts.summary_scan, 5);
    }
}

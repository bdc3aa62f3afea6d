use crate::error::Result;
use crate::types::Session;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Session id to session, as stored in the snapshot document
pub type SessionMap = BTreeMap<String, Session>;

/// Durable copy of the whole session map
pub trait SessionMirror: Send + Sync {
    /// Best-effort load; any failure yields an empty map
    fn load(&self) -> SessionMap;

    /// Overwrite the durable copy with `sessions`
    fn save(&self, sessions: &SessionMap) -> Result<()>;

    fn describe(&self) -> String;
}

/// Pretty-printed JSON snapshot written via a temporary file and rename
pub struct JsonFileMirror {
    path: PathBuf,
}

impl JsonFileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionMirror for JsonFileMirror {
    fn load(&self) -> SessionMap {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No session snapshot at {}, starting empty",
                    self.path.display()
                );
                return SessionMap::new();
            }
            Err(err) => {
                log::error!(
                    "Failed to read session snapshot {}: {err}",
                    self.path.display()
                );
                return SessionMap::new();
            }
        };

        match serde_json::from_slice::<SessionMap>(&bytes) {
            Ok(sessions) => {
                log::info!("Loaded {} sessions from file", sessions.len());
                sessions
            }
            Err(err) => {
                log::error!(
                    "Malformed session snapshot {}: {err}",
                    self.path.display()
                );
                SessionMap::new()
            }
        }
    }

    fn save(&self, sessions: &SessionMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(sessions)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Mirror for the memory-only backend
pub struct NullMirror;

impl SessionMirror for NullMirror {
    fn load(&self) -> SessionMap {
        SessionMap::new()
    }

    fn save(&self, _sessions: &SessionMap) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

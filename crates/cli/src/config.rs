use anyhow::{Context, Result};
use assist_indexer::IndexOptions;
use assist_memory::{MemoryOptions, StorageBackend};
use assist_search::{ContextOptions, SelectionRules};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_ENV: &str = "ASSIST_CONFIG";

const DEFAULT_SYSTEM_PROMPT: &str = "You are the dispatch automation assistant. \
Answer questions about the dispatch parser, email sender, portal automation, \
scheduler and contact spreadsheets using the project files provided as context. \
When proposing a configuration, include it in a ```json code block.";

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantOptions {
    pub system_prompt: String,

    /// Send the session window along with each query
    pub include_history: bool,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            include_history: true,
        }
    }
}

/// Top-level configuration, one table per concern
///
/// ```toml
/// [index]
/// root = "/srv/dispatch"
///
/// [context]
/// max_chars = 30000
///
/// [memory]
/// backend = "memory"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistConfig {
    #[serde(default)]
    pub index: IndexOptions,
    #[serde(default)]
    pub context: ContextOptions,
    #[serde(default)]
    pub rules: SelectionRules,
    #[serde(default)]
    pub memory: MemoryOptions,
    #[serde(default)]
    pub assistant: AssistantOptions,
}

/// Command-line values that win over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub memory_only: bool,
    pub max_chars: Option<usize>,
}

impl AssistConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Explicit path, else `ASSIST_CONFIG`, else defaults
    ///
    /// A named file that does not exist yields defaults; one that exists but
    /// does not parse is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let Some(path) = explicit.map(Path::to_path_buf).or(from_env) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(root) = &overrides.root {
            self.index.root = root.clone();
        }
        if let Some(store) = &overrides.store {
            self.memory.store_path = store.clone();
        }
        if overrides.memory_only {
            self.memory.backend = StorageBackend::Memory;
        }
        if let Some(max_chars) = overrides.max_chars {
            self.context.max_chars = max_chars;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.index
            .validate()
            .map_err(|e| anyhow::anyhow!("[index] {e}"))?;
        self.context
            .validate()
            .map_err(|e| anyhow::anyhow!("[context] {e}"))?;
        self.rules
            .validate()
            .map_err(|e| anyhow::anyhow!("[rules] {e}"))?;
        self.memory
            .validate()
            .map_err(|e| anyhow::anyhow!("[memory] {e}"))?;
        Ok(())
    }
}

//! TOML configuration for choosing and tuning a backend.
//!
//! ```toml
//! backend = "fs"
//!
//! [fs]
//! root = "./snippet"
//!
//! [remote]
//! kind = "Snippet"
//! timeout_ms = 5000
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::fs::{FsStore, DEFAULT_ROOT};
use crate::memory::MemoryStore;
use crate::remote::SNIPPET_KIND;
use crate::traits::SnippetStore;

/// Which backend to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    #[default]
    Fs,
    Remote,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Fs => "fs",
            Self::Remote => "remote",
        })
    }
}

impl FromStr for Backend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "fs" => Ok(Self::Fs),
            "remote" => Ok(Self::Remote),
            other => Err(StoreError::Config(format!(
                "unknown backend {other:?} (expected memory, fs, or remote)"
            ))),
        }
    }
}

/// Top-level store configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    pub fs: FsConfig,
    pub remote: RemoteConfig,
}

/// `[fs]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Root directory of the shard tree.
    pub root: PathBuf,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
        }
    }
}

/// `[remote]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Entity kind snippets are stored under.
    pub kind: String,
    /// Per-call deadline applied on top of the caller's context.
    pub timeout_ms: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            kind: SNIPPET_KIND.to_string(),
            timeout_ms: None,
        }
    }
}

impl StoreConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse config from a TOML string.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))?;
        if config.backend == Backend::Remote && config.remote.kind.is_empty() {
            return Err(StoreError::Config("remote.kind must not be empty".into()));
        }
        Ok(config)
    }
}

/// Build a local backend from configuration.
///
/// The remote backend needs a client for the external service and is built
/// with [`RemoteStore::from_config`](crate::RemoteStore::from_config) instead.
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn SnippetStore>> {
    let store: Arc<dyn SnippetStore> = match config.backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Fs => Arc::new(FsStore::open(&config.fs.root)?),
        Backend::Remote => {
            return Err(StoreError::Config(
                "the remote backend needs a datastore client; build it with RemoteStore::from_config"
                    .into(),
            ))
        }
    };
    info!(backend = store.backend(), "snippet store ready");
    Ok(store)
}

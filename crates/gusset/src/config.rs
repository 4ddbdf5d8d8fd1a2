//! Configuration management for gusset.
//!
//! Configuration lives in `.gusset/config.yml` under the project root.
//! A missing file is not an error; defaults apply.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::analysis::DEFAULT_RANKING_SIZE;

/// Directory holding gusset data and configuration.
const GUSSET_DIR: &str = ".gusset";

/// Configuration file name inside the gusset directory.
const CONFIG_FILE: &str = "config.yml";

/// Data file name inside the data directory.
const DATA_FILE: &str = "dependencies.jsonl";

/// Configuration for gusset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory where dependency data is stored
    pub data_dir: PathBuf,

    /// Number of entries in the most-blocked/most-blocking rankings
    pub ranking_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(GUSSET_DIR),
            ranking_size: DEFAULT_RANKING_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration from `.gusset/config.yml` under the given root,
    /// falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(root: &Path) -> Result<Self> {
        let path = root.join(GUSSET_DIR).join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Path of the JSONL data file under the configured data directory.
    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE)
    }
}

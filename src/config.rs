//! Configuration.
//!
//! ```toml
//! log_filter = "pg_anyset=debug"
//!
//! [rewrite]
//! in_to_any = true
//! not_in_to_all = true
//! membership_nodes = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnysetError, AnysetResult};
use crate::parser::Membership;

/// File looked up in the working directory.
pub const LOCAL_CONFIG: &str = "pg-anyset.toml";

/// Which rewrite forms are enabled. All are on by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// `col IN (?)` → `col = ANY(?)`
    pub in_to_any: bool,
    /// `col NOT IN (?)` → `col != ALL(?)`
    pub not_in_to_all: bool,
    /// Builder-made IN nodes → `= ANY`
    pub membership_nodes: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            in_to_any: true,
            not_in_to_all: true,
            membership_nodes: true,
        }
    }
}

impl RewriteConfig {
    pub fn allows(&self, membership: Membership) -> bool {
        match membership {
            Membership::In => self.in_to_any,
            Membership::NotIn => self.not_in_to_all,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rewrite: RewriteConfig,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Config {
    pub fn from_toml(content: &str) -> AnysetResult<Self> {
        toml::from_str(content).map_err(|e| AnysetError::Config(e.to_string()))
    }

    /// Load from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> AnysetResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `./pg-anyset.toml`, then `<config dir>/pg-anyset/config.toml`,
    /// falling back to defaults when neither exists.
    pub fn discover() -> AnysetResult<Self> {
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pg-anyset").join("config.toml"));
        }
        paths
    }
}

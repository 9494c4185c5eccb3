//! Unified path management for causette files.
//!
//! All configuration and persisted state live under the platform config
//! directory:
//!
//! ```text
//! ~/.config/causette/          # Linux; platform-appropriate elsewhere
//! ├── config.toml              # Client configuration
//! └── store.json               # Identifiers and message cache
//! ```

use causette_core::error::{CausetteError, Result};
use std::path::PathBuf;

/// Path resolution for causette's configuration and state files.
pub struct CausettePaths;

impl CausettePaths {
    /// Returns the causette configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("causette"))
            .ok_or_else(|| CausetteError::config("Cannot determine config directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted key-value store.
    pub fn store_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("store.json"))
    }
}

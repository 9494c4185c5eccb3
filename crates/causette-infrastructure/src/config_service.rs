//! Configuration loading.
//!
//! Reads [`WidgetConfig`] from a TOML file. A missing file yields the
//! defaults; a present-but-invalid file is an error, so a typo in the config
//! does not silently fall back to defaults.

use causette_core::error::Result;
use causette_core::WidgetConfig;
use std::fs;
use std::path::Path;

/// Loads the client configuration from `path`.
///
/// Missing file → `Ok(WidgetConfig::default())`. Unknown fields are ignored;
/// absent fields take their defaults.
pub fn load_widget_config(path: &Path) -> Result<WidgetConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(WidgetConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: WidgetConfig = toml::from_str(&content)?;
    Ok(config)
}

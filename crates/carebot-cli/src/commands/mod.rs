//! CLI command implementations.

pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use carebot_core::CarebotConfig;
use std::path::Path;

/// Load configuration from the given file if it exists, otherwise fall back
/// to defaults. Environment overrides apply in both cases.
pub fn load_config(path: &Path) -> Result<CarebotConfig> {
    if path.exists() {
        CarebotConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    } else {
        tracing::warn!(config = %path.display(), "Config file not found, using defaults");
        Ok(CarebotConfig::from_env())
    }
}

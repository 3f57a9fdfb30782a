use anyhow::{Context, Result};
use gpuwatch_exporter::ExporterConfig;
use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static CONFIG_PATH: OnceCell<PathBuf> = OnceCell::new();

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gpuwatch")
        .join("config.toml")
}

/// Get the config file path
pub fn get_config_path() -> PathBuf {
    CONFIG_PATH.get().cloned().unwrap_or_else(default_config_path)
}

/// Set custom config path
pub fn set_config_path(path: &str) {
    let _ = CONFIG_PATH.set(PathBuf::from(path));
}

/// Load configuration.
///
/// A path given with `--config` must exist. The default location is optional
/// and falls back to built-in defaults.
pub fn load_config() -> Result<ExporterConfig> {
    let config_path = get_config_path();

    if CONFIG_PATH.get().is_none() && !config_path.exists() {
        debug!("No config file at {}, using defaults", config_path.display());
        return Ok(ExporterConfig::default());
    }

    load_config_from(&config_path)
}

/// Load configuration from a TOML file
pub fn load_config_from(path: &Path) -> Result<ExporterConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found at {}",
            path.display()
        ));
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ExporterConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Render configuration as TOML
pub fn render_config(config: &ExporterConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

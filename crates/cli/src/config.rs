//! CLI configuration utilities

use anyhow::{Context, Result, bail};
use railo_core::Settings;
use std::path::{Path, PathBuf};

/// Config file looked up in the data directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the data directory: flag, then `RAILO_STATE_DIR`, then the system data dir
pub fn data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("RAILO_STATE_DIR").map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("railo")
        })
}

/// Load settings from `path`, or from the data directory's config file if present
pub fn load_settings(path: Option<&Path>, data_dir: &Path) -> Result<Settings> {
    let default_path = data_dir.join(CONFIG_FILE_NAME);
    let path = path.or_else(|| default_path.exists().then_some(default_path.as_path()));
    Settings::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })
}

/// Write the default configuration to `path`
pub fn generate_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Settings::default().to_toml()?)?;
    Ok(())
}

// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{AppConfig, Ecosystem, RawAppConfig, RawEcosystem};
use crate::errors::{Result, ServectlError};
use crate::fs::FileSystem;

/// Load `config.json` and validate it.
///
/// A missing or unreadable file is a configuration error, not an IO error:
/// nothing can run without it.
pub fn load_config(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let contents = read_required(fs, path, "config")?;
    let raw: RawAppConfig = serde_json::from_str(&contents).map_err(|e| {
        ServectlError::ConfigError(format!("parsing config {}: {e}", path.display()))
    })?;
    AppConfig::try_from(raw)
}

/// Load the deployment profile list.
pub fn load_profiles(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Ecosystem> {
    let path = path.as_ref();
    let contents = read_required(fs, path, "deployment profile")?;
    let raw: RawEcosystem = serde_json::from_str(&contents).map_err(|e| {
        ServectlError::ConfigError(format!(
            "parsing deployment profiles {}: {e}",
            path.display()
        ))
    })?;
    Ecosystem::try_from(raw)
}

fn read_required(fs: &dyn FileSystem, path: &Path, what: &str) -> Result<String> {
    fs.read_to_string(path).map_err(|e| {
        ServectlError::ConfigError(format!("cannot read {what} file {}: {e:#}", path.display()))
    })
}

/// Directory that relative paths in the config are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "deploy/config.json"),
///   we use that directory.
/// - If it's just a bare filename like "config.json" (parent = ""),
///   we fall back to the current working directory "."
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

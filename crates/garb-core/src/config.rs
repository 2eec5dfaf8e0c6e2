//! Catalog and user configuration.
//!
//! Catalog config lives at `.garb/config.toml` inside the catalog root;
//! user config at the platform config dir (`garb/config.toml`). Both are
//! optional: a missing file yields defaults, a malformed one is an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::CATALOG_DIR;

/// Relative path of the catalog config inside the catalog root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub user: IdentityConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Default acting user for this catalog, used when neither `--user` nor
/// `GARB_USER` is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Refresh a smart collection automatically after its rules change.
    #[serde(default = "default_true")]
    pub on_rule_change: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            on_rule_change: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn config_path(catalog_root: &Path) -> PathBuf {
    catalog_root.join(CATALOG_DIR).join(CONFIG_FILE)
}

/// Load the catalog config, falling back to defaults when the file is
/// absent.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_catalog_config(catalog_root: &Path) -> Result<CatalogConfig> {
    let path = config_path(catalog_root);
    if !path.exists() {
        return Ok(CatalogConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
}

/// Write the catalog config, creating `.garb/` if needed.
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub fn save_catalog_config(catalog_root: &Path, config: &CatalogConfig) -> Result<()> {
    let path = config_path(catalog_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(config).context("serialize config")?;
    std::fs::write(&path, raw).with_context(|| format!("write config {}", path.display()))
}

/// Load the user-level config from the platform config dir, if present.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<CatalogConfig> {
    let Some(dir) = dirs::config_dir() else {
        return Ok(CatalogConfig::default());
    };
    let path = dir.join("garb").join(CONFIG_FILE);
    if !path.exists() {
        return Ok(CatalogConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read user config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse user config {}", path.display()))
}

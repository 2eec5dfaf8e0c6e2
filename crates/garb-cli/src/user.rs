//! Acting-user resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `GARB_USER` env > `user.name` in the
//! catalog config > `user.name` in the platform-level config. Every command
//! that touches the catalog requires an identity; there is no anonymous mode.

use garb_core::config::CatalogConfig;
use garb_core::model::UserId;
use std::env;

/// Errors from user resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserResolutionError {
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for UserResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UserResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

fn resolve_user_with(
    cli_flag: Option<&str>,
    catalog_config: &CatalogConfig,
    user_config: &CatalogConfig,
    env: &dyn EnvReader,
) -> Option<String> {
    if let Some(user) = cli_flag {
        if !user.trim().is_empty() {
            return Some(user.to_string());
        }
    }

    if let Some(val) = env.get("GARB_USER") {
        return Some(val);
    }

    if let Some(ref name) = catalog_config.user.name {
        if !name.trim().is_empty() {
            return Some(name.clone());
        }
    }

    if let Some(ref name) = user_config.user.name {
        if !name.trim().is_empty() {
            return Some(name.clone());
        }
    }

    None
}

/// Resolve the acting user following the chain above, or `None` when no
/// source provides one.
pub fn resolve_user(
    cli_flag: Option<&str>,
    catalog_config: &CatalogConfig,
    user_config: &CatalogConfig,
) -> Option<String> {
    resolve_user_with(cli_flag, catalog_config, user_config, &RealEnv)
}

/// Resolve the acting user or fail with a message suitable for the terminal.
///
/// # Errors
///
/// Returns [`UserResolutionError`] when no source in the chain yields an
/// identity, or the resolved name is rejected by the core.
pub fn require_user(
    cli_flag: Option<&str>,
    catalog_config: &CatalogConfig,
    user_config: &CatalogConfig,
) -> Result<UserId, UserResolutionError> {
    let name =
        resolve_user(cli_flag, catalog_config, user_config).ok_or_else(|| UserResolutionError {
            message: "no acting user: set --user, GARB_USER, or user.name in config".to_string(),
        })?;

    UserId::new(name).map_err(|e| UserResolutionError {
        message: e.to_string(),
    })
}

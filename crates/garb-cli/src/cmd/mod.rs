//! Command handlers for the `gb` binary.

pub mod collection;
pub mod garment;
pub mod init;
pub mod refresh;
pub mod rule;
pub mod stats;
pub mod tag;

use crate::output::{CliError, OutputMode, render_error};
use crate::user;
use garb_core::ErrorCode;
use garb_core::config::{self, CatalogConfig};
use garb_core::db::{self, try_open_catalog};
use garb_core::model::UserId;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Location of the catalog database under a catalog root.
pub fn db_path(root: &Path) -> PathBuf {
    root.join(db::CATALOG_DIR).join(db::DB_FILE)
}

/// An opened catalog plus the resolved acting user, shared by every command
/// that reads or writes the store.
pub struct Session {
    pub conn: Connection,
    pub user: UserId,
    pub config: CatalogConfig,
}

impl Session {
    /// Open the catalog at `root` and resolve the acting user.
    ///
    /// Renders a mode-appropriate error (uninitialized catalog, broken
    /// config, missing identity) before failing, so callers just `?`.
    pub fn open(root: &Path, user_flag: Option<&str>, output: OutputMode) -> anyhow::Result<Self> {
        let config = match config::load_catalog_config(root) {
            Ok(config) => config,
            Err(e) => {
                render_error(
                    output,
                    &CliError::with_code(format!("{e:#}"), ErrorCode::ConfigParseError),
                )?;
                anyhow::bail!("{e:#}");
            }
        };
        let user_config = config::load_user_config().unwrap_or_default();

        let Some(conn) = try_open_catalog(&db_path(root))? else {
            render_error(
                output,
                &CliError::with_code(
                    format!("no catalog found in {}", root.display()),
                    ErrorCode::NotInitialized,
                ),
            )?;
            anyhow::bail!("no catalog found in {}", root.display());
        };

        let user = match user::require_user(user_flag, &config, &user_config) {
            Ok(user) => user,
            Err(e) => {
                render_error(
                    output,
                    &CliError::with_code(e.message.clone(), ErrorCode::Unauthorized),
                )?;
                anyhow::bail!("{}", e.message);
            }
        };

        Ok(Self { conn, user, config })
    }
}

/// Render a flag-value validation failure and convert it into the process
/// failure, mirroring [`crate::output::fail`] for core errors.
pub fn invalid(output: OutputMode, err: &crate::validate::ValidationError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &err.to_cli_error()) {
        return render_err;
    }
    anyhow::anyhow!("invalid {} '{}': {}", err.field, err.value, err.reason)
}

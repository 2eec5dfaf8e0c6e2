//! `gb init` — create a catalog in the current directory.

use crate::output::{OutputMode, render};
use clap::Args;
use garb_core::config::{self, CatalogConfig};
use garb_core::db::open_catalog;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Record this name as the catalog's default acting user.
    #[arg(long)]
    pub default_user: Option<String>,
}

#[derive(Serialize)]
struct InitResult {
    ok: bool,
    path: String,
    created: bool,
}

pub fn run_init(
    args: &InitArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let db_path = super::db_path(project_root);
    let created = !db_path.exists();

    // Opening creates the directory and the schema; re-running is harmless.
    drop(open_catalog(&db_path)?);

    let default_user = args
        .default_user
        .as_deref()
        .or(user_flag)
        .map(str::to_string);
    if let Some(name) = default_user {
        let mut catalog_config = config::load_catalog_config(project_root)?;
        catalog_config.user.name = Some(name);
        config::save_catalog_config(project_root, &catalog_config)?;
    } else if created {
        config::save_catalog_config(project_root, &CatalogConfig::default())?;
    }

    let result = InitResult {
        ok: true,
        path: db_path.display().to_string(),
        created,
    };
    render(output, &result, |r, w| {
        if r.created {
            writeln!(w, "✓ Initialized catalog at {}", r.path)
        } else {
            writeln!(w, "✓ Catalog already present at {}", r.path)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_the_catalog_layout() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = InitArgs { default_user: None };
        run_init(&args, None, OutputMode::Json, dir.path()).expect("init");

        assert!(super::super::db_path(dir.path()).exists());
        assert!(dir.path().join(".garb").join("config.toml").exists());
    }

    #[test]
    fn init_is_idempotent_and_records_the_default_user() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = InitArgs { default_user: None };
        run_init(&args, None, OutputMode::Json, dir.path()).expect("first init");

        let again = InitArgs {
            default_user: Some("ana".into()),
        };
        run_init(&again, None, OutputMode::Json, dir.path()).expect("second init");

        let config = config::load_catalog_config(dir.path()).expect("load config");
        assert_eq!(config.user.name.as_deref(), Some("ana"));
    }
}

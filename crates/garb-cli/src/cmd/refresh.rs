//! `gb refresh` — re-derive smart collection membership.

use crate::output::{CliError, OutputMode, fail, render, render_error};
use clap::Args;
use garb_core::sync;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Collection id (cl-xxxxxxxx). Omit with --all to refresh every smart
    /// collection.
    pub collection: Option<String>,

    /// Refresh all of this user's smart collections, isolating failures.
    #[arg(long, conflicts_with = "collection")]
    pub all: bool,
}

#[derive(Serialize)]
struct OutcomeRow {
    collection_id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<sync::RefreshStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CliError>,
}

#[derive(Serialize)]
struct ReportOut {
    refreshed: usize,
    failed: usize,
    outcomes: Vec<OutcomeRow>,
}

pub fn run(
    args: &RefreshArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let session = super::Session::open(project_root, user_flag, output)?;
    let user = &session.user;

    if args.all {
        let report = sync::refresh_all(&session.conn, user).map_err(|e| fail(output, &e))?;
        let out = ReportOut {
            refreshed: report.refreshed(),
            failed: report.failed(),
            outcomes: report
                .outcomes
                .into_iter()
                .map(|o| OutcomeRow {
                    collection_id: o.collection_id.as_str().to_string(),
                    name: o.name,
                    stats: o.result.as_ref().ok().copied(),
                    error: o.result.as_ref().err().map(CliError::from),
                })
                .collect(),
        };
        render(output, &out, |r, w| {
            for row in &r.outcomes {
                match (&row.stats, &row.error) {
                    (Some(s), _) => writeln!(
                        w,
                        "✓ {}  {}  +{} -{} ({} members)",
                        row.collection_id, row.name, s.added, s.removed, s.members
                    )?,
                    (None, Some(e)) => {
                        writeln!(w, "✗ {}  {}  {}", row.collection_id, row.name, e.message)?;
                    }
                    (None, None) => {}
                }
            }
            writeln!(w, "{} refreshed, {} failed", r.refreshed, r.failed)
        })?;

        if out.failed > 0 {
            anyhow::bail!("{} collection(s) failed to refresh", out.failed);
        }
        return Ok(());
    }

    let Some(ref collection) = args.collection else {
        let err = CliError::new("pass a collection id, or --all");
        render_error(output, &err)?;
        anyhow::bail!("{}", err.message);
    };

    let id = crate::validate::parse_collection_id(collection)
        .map_err(|e| super::invalid(output, &e))?;
    let stats = sync::refresh(&session.conn, user, &id).map_err(|e| fail(output, &e))?;
    render(output, &stats, |s, w| {
        writeln!(
            w,
            "✓ Refreshed {}: +{} -{} ({} members)",
            id.as_str(),
            s.added,
            s.removed,
            s.members
        )
    })
}

//! `gb stats` — aggregate wardrobe statistics.

use crate::output::{OutputMode, display_cost, render};
use clap::Args;
use garb_core::stats::{WardrobeStats, wardrobe_stats};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct StatsArgs {}

fn write_counts(
    w: &mut dyn Write,
    heading: &str,
    counts: &std::collections::HashMap<String, usize>,
) -> std::io::Result<()> {
    if counts.is_empty() {
        return Ok(());
    }
    writeln!(w, "{heading}:")?;
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (name, count) in rows {
        writeln!(w, "  {count:>5}  {name}")?;
    }
    Ok(())
}

fn write_stats(stats: &WardrobeStats, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "garments: {}", stats.garments)?;
    write_counts(w, "by category", &stats.by_category)?;
    write_counts(w, "by status", &stats.by_status)?;
    write_counts(w, "by brand", &stats.by_brand)?;
    write_counts(w, "tag usage", &stats.tag_usage)?;

    if stats.costed_garments > 0 {
        writeln!(
            w,
            "cost: {} across {} garments",
            display_cost(stats.total_cost_cents),
            stats.costed_garments
        )?;
        if let Some(avg) = stats.avg_cost_cents() {
            writeln!(w, "  average: {}", display_cost(avg))?;
        }
    }

    if !stats.collections.is_empty() {
        writeln!(w, "collections:")?;
        for c in &stats.collections {
            let kind = if c.is_smart { "smart" } else { "manual" };
            writeln!(w, "  {:>5}  {}  {} ({})", c.garments, c.collection_id, c.name, kind)?;
        }
    }
    Ok(())
}

pub fn run(
    _args: &StatsArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let session = super::Session::open(project_root, user_flag, output)?;
    let stats = wardrobe_stats(&session.conn, &session.user)?;
    render(output, &stats, |s, w| write_stats(s, w))
}

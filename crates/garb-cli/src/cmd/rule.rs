//! `gb rule` — smart-collection rule management.

use crate::output::{OutputMode, fail, render, render_success};
use clap::{Args, Subcommand};
use garb_core::db::catalog::Catalog;
use garb_core::db::query;
use garb_core::rules::{RuleField, RuleOp};
use garb_core::sync;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum RuleCommand {
    /// Replace a smart collection's rules with the given set.
    Set(SetArgs),
    /// List a collection's rules in user order.
    List {
        /// Collection id (cl-xxxxxxxx).
        collection: String,
    },
    /// Remove all rules; the next refresh empties the membership.
    Clear {
        /// Collection id (cl-xxxxxxxx).
        collection: String,
    },
    /// List the fields and operators rules may use.
    Fields,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Collection id (cl-xxxxxxxx).
    pub collection: String,

    /// Rules as field:op:value, replacing the current set.
    #[arg(required = true)]
    pub rules: Vec<String>,
}

#[derive(Serialize)]
struct FieldsResult {
    fields: Vec<&'static str>,
    operators: Vec<&'static str>,
}

fn maybe_refresh(
    session: &super::Session,
    collection_id: &garb_core::model::CollectionId,
    output: OutputMode,
) -> anyhow::Result<Option<sync::RefreshStats>> {
    if !session.config.refresh.on_rule_change {
        return Ok(None);
    }
    sync::refresh(&session.conn, &session.user, collection_id)
        .map(Some)
        .map_err(|e| fail(output, &e))
}

pub fn run(
    command: &RuleCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let RuleCommand::Fields = command {
        let result = FieldsResult {
            fields: RuleField::ALL.iter().map(|f| f.as_str()).collect(),
            operators: RuleOp::ALL.iter().map(|o| o.as_str()).collect(),
        };
        return render(output, &result, |r, w| {
            writeln!(w, "fields:    {}", r.fields.join(", "))?;
            writeln!(w, "operators: {}", r.operators.join(", "))
        });
    }

    let session = super::Session::open(project_root, user_flag, output)?;
    let catalog = Catalog::new(&session.conn);
    let user = &session.user;

    match command {
        // handled before the session is opened
        RuleCommand::Fields => Ok(()),

        RuleCommand::Set(args) => {
            let id = crate::validate::parse_collection_id(&args.collection)
                .map_err(|e| super::invalid(output, &e))?;
            let rules = args
                .rules
                .iter()
                .map(|raw| crate::validate::parse_rule_arg(raw))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| super::invalid(output, &e))?;

            catalog
                .replace_rules(user, &id, &rules)
                .map_err(|e| fail(output, &e))?;
            let stats = maybe_refresh(&session, &id, output)?;

            match stats {
                Some(stats) => render(output, &stats, |s, w| {
                    writeln!(
                        w,
                        "✓ Rules set; refreshed: +{} -{} ({} members)",
                        s.added, s.removed, s.members
                    )
                }),
                None => render_success(output, "Rules set (refresh deferred)"),
            }
        }

        RuleCommand::List { collection } => {
            let id = crate::validate::parse_collection_id(collection)
                .map_err(|e| super::invalid(output, &e))?;
            query::get_collection(&session.conn, user, &id)?
                .ok_or_else(|| garb_core::Error::not_found("collection", id.as_str()))
                .map_err(|e| fail(output, &e))?;
            let rules = query::rules_for_collection(&session.conn, &id)?;
            render(output, &rules, |items, w| {
                for rule in items {
                    writeln!(w, "{}  {} {} {:?}", rule.position, rule.field, rule.op, rule.value)?;
                }
                Ok(())
            })
        }

        RuleCommand::Clear { collection } => {
            let id = crate::validate::parse_collection_id(collection)
                .map_err(|e| super::invalid(output, &e))?;
            catalog
                .replace_rules(user, &id, &[])
                .map_err(|e| fail(output, &e))?;
            let stats = maybe_refresh(&session, &id, output)?;

            match stats {
                Some(stats) => render(output, &stats, |s, w| {
                    writeln!(
                        w,
                        "✓ Rules cleared; refreshed: +{} -{} ({} members)",
                        s.added, s.removed, s.members
                    )
                }),
                None => render_success(output, "Rules cleared (refresh deferred)"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: RuleCommand,
    }

    #[test]
    fn set_requires_at_least_one_rule() {
        assert!(Wrapper::try_parse_from(["test", "set", "cl-0a1b2c3d"]).is_err());
        let w = Wrapper::parse_from(["test", "set", "cl-0a1b2c3d", "category:equals:Shirts"]);
        let RuleCommand::Set(args) = w.command else {
            panic!("expected set");
        };
        assert_eq!(args.rules, vec!["category:equals:Shirts"]);
    }

    #[test]
    fn fields_needs_no_catalog() {
        let dir = tempfile::tempdir().expect("temp dir");
        run(&RuleCommand::Fields, None, OutputMode::Json, dir.path()).expect("fields");
    }
}

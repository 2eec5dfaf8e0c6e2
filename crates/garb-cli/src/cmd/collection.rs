//! `gb collection` — collection CRUD and manual membership.

use crate::output::{OutputMode, fail, render, render_success};
use clap::{Args, Subcommand};
use garb_core::db::catalog::{Catalog, CollectionPatch, NewCollection};
use garb_core::db::query;
use garb_core::model::{Collection, Garment};
use garb_core::sync;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum CollectionCommand {
    /// Create a collection; passing rules makes it a smart collection.
    Create(CreateArgs),
    /// List this user's collections.
    List(ListArgs),
    /// Show a collection with its rules and members.
    Show {
        /// Collection id (cl-xxxxxxxx).
        id: String,
    },
    /// Update a collection's descriptive fields.
    Update(UpdateArgs),
    /// Delete a collection; rules and membership follow.
    Rm {
        /// Collection id (cl-xxxxxxxx).
        id: String,
    },
    /// Add a garment to a manual collection. Idempotent.
    Add {
        /// Collection id (cl-xxxxxxxx).
        collection: String,
        /// Garment id (gm-xxxxxxxx).
        garment: String,
    },
    /// Remove a garment from a manual collection. Idempotent.
    Remove {
        /// Collection id (cl-xxxxxxxx).
        collection: String,
        /// Garment id (gm-xxxxxxxx).
        garment: String,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Collection name.
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Display color as #rrggbb.
    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub image_url: Option<String>,

    /// Make this a smart collection even with zero rules.
    #[arg(long)]
    pub smart: bool,

    /// Smart-collection rule as field:op:value (repeatable; implies --smart).
    #[arg(long = "rule")]
    pub rules: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only smart collections.
    #[arg(long, conflicts_with = "manual")]
    pub smart: bool,

    /// Only manually curated collections.
    #[arg(long)]
    pub manual: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Collection id (cl-xxxxxxxx).
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Display color as #rrggbb.
    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub image_url: Option<String>,
}

#[derive(Serialize)]
struct CollectionDetail {
    #[serde(flatten)]
    collection: Collection,
    rules: Vec<query::RawRule>,
    members: Vec<Garment>,
}

fn write_collection_row(c: &Collection, w: &mut dyn Write) -> std::io::Result<()> {
    let kind = if c.is_smart { "smart" } else { "manual" };
    writeln!(w, "{}  {}  {}", c.id.as_str(), kind, c.name)
}

fn write_detail(d: &CollectionDetail, w: &mut dyn Write) -> std::io::Result<()> {
    write_collection_row(&d.collection, w)?;
    if let Some(ref description) = d.collection.description {
        writeln!(w, "  {description}")?;
    }
    if !d.rules.is_empty() {
        writeln!(w, "  rules:")?;
        for rule in &d.rules {
            writeln!(w, "    {} {} {:?}", rule.field, rule.op, rule.value)?;
        }
    }
    writeln!(w, "  members: {}", d.members.len())?;
    for garment in &d.members {
        writeln!(w, "    {}  {}", garment.id.as_str(), garment.name)?;
    }
    Ok(())
}

pub fn run(
    command: &CollectionCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let session = super::Session::open(project_root, user_flag, output)?;
    let catalog = Catalog::new(&session.conn);
    let user = &session.user;

    match command {
        CollectionCommand::Create(args) => {
            let rules = args
                .rules
                .iter()
                .map(|raw| crate::validate::parse_rule_arg(raw))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| super::invalid(output, &e))?;
            let input = NewCollection {
                name: args.name.clone(),
                description: args.description.clone(),
                color: args.color.clone(),
                image_url: args.image_url.clone(),
                rules: if args.smart || !rules.is_empty() {
                    Some(rules)
                } else {
                    None
                },
            };
            let collection = catalog
                .create_collection(user, input)
                .map_err(|e| fail(output, &e))?;

            if collection.is_smart && session.config.refresh.on_rule_change {
                sync::refresh(&session.conn, user, &collection.id)
                    .map_err(|e| fail(output, &e))?;
            }
            render(output, &collection, |c, w| write_collection_row(c, w))
        }

        CollectionCommand::List(args) => {
            let smart = match (args.smart, args.manual) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let collections = query::list_collections(&session.conn, user, smart)?;
            render(output, &collections, |items, w| {
                for c in items {
                    write_collection_row(c, w)?;
                }
                Ok(())
            })
        }

        CollectionCommand::Show { id } => {
            let id = crate::validate::parse_collection_id(id)
                .map_err(|e| super::invalid(output, &e))?;
            let collection = query::get_collection(&session.conn, user, &id)?
                .ok_or_else(|| garb_core::Error::not_found("collection", id.as_str()))
                .map_err(|e| fail(output, &e))?;
            let detail = CollectionDetail {
                rules: query::rules_for_collection(&session.conn, &id)?,
                members: query::member_garments(&session.conn, user, &id)?,
                collection,
            };
            render(output, &detail, |d, w| write_detail(d, w))
        }

        CollectionCommand::Update(args) => {
            let id = crate::validate::parse_collection_id(&args.id)
                .map_err(|e| super::invalid(output, &e))?;
            let patch = CollectionPatch {
                name: args.name.clone(),
                description: args.description.clone(),
                color: args.color.clone(),
                image_url: args.image_url.clone(),
            };
            let collection = catalog
                .update_collection(user, &id, &patch)
                .map_err(|e| fail(output, &e))?;
            render(output, &collection, |c, w| write_collection_row(c, w))
        }

        CollectionCommand::Rm { id } => {
            let id = crate::validate::parse_collection_id(id)
                .map_err(|e| super::invalid(output, &e))?;
            catalog
                .delete_collection(user, &id)
                .map_err(|e| fail(output, &e))?;
            render_success(output, &format!("Removed collection {}", id.as_str()))
        }

        CollectionCommand::Add { collection, garment } => {
            let collection_id = crate::validate::parse_collection_id(collection)
                .map_err(|e| super::invalid(output, &e))?;
            let garment_id = crate::validate::parse_garment_id(garment)
                .map_err(|e| super::invalid(output, &e))?;
            catalog
                .add_member(user, &collection_id, &garment_id)
                .map_err(|e| fail(output, &e))?;
            render_success(
                output,
                &format!(
                    "Added {} to {}",
                    garment_id.as_str(),
                    collection_id.as_str()
                ),
            )
        }

        CollectionCommand::Remove { collection, garment } => {
            let collection_id = crate::validate::parse_collection_id(collection)
                .map_err(|e| super::invalid(output, &e))?;
            let garment_id = crate::validate::parse_garment_id(garment)
                .map_err(|e| super::invalid(output, &e))?;
            catalog
                .remove_member(user, &collection_id, &garment_id)
                .map_err(|e| fail(output, &e))?;
            render_success(
                output,
                &format!(
                    "Removed {} from {}",
                    garment_id.as_str(),
                    collection_id.as_str()
                ),
            )
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
        command: CollectionCommand,
    }

    #[test]
    fn create_with_rules_is_smart() {
        let w = Wrapper::parse_from([
            "test",
            "create",
            "Summer Shirts",
            "--rule",
            "category:equals:Shirts",
            "--rule",
            "tags:contains:summer",
        ]);
        let CollectionCommand::Create(args) = w.command else {
            panic!("expected create");
        };
        assert_eq!(args.name, "Summer Shirts");
        assert_eq!(args.rules.len(), 2);
        assert!(!args.smart);
    }

    #[test]
    fn list_smart_and_manual_conflict() {
        assert!(Wrapper::try_parse_from(["test", "list", "--smart", "--manual"]).is_err());
        assert!(Wrapper::try_parse_from(["test", "list", "--smart"]).is_ok());
    }

    #[test]
    fn membership_commands_take_collection_then_garment() {
        let w = Wrapper::parse_from(["test", "add", "cl-0a1b2c3d", "gm-deadbeef"]);
        assert!(matches!(
            w.command,
            CollectionCommand::Add { ref collection, ref garment }
                if collection == "cl-0a1b2c3d" && garment == "gm-deadbeef"
        ));
    }
}

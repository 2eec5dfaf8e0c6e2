//! `gb tag` — tag CRUD and garment attachment.

use crate::output::{OutputMode, fail, render, render_success};
use clap::{Args, Subcommand};
use garb_core::db::catalog::Catalog;
use garb_core::db::query;
use garb_core::model::Tag;
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// Create a tag.
    Add(AddArgs),
    /// List this user's tags.
    List,
    /// Rename and/or recolor a tag.
    Update(UpdateArgs),
    /// Delete a tag; garment attachments follow.
    Rm {
        /// Tag id (tg-xxxxxxxx).
        id: String,
    },
    /// Attach a tag to a garment by name. Idempotent.
    Attach {
        /// Garment id (gm-xxxxxxxx).
        garment: String,
        /// Tag name.
        tag: String,
    },
    /// Detach a tag from a garment by name. Idempotent.
    Detach {
        /// Garment id (gm-xxxxxxxx).
        garment: String,
        /// Tag name.
        tag: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Tag name; unique per user, case-insensitively.
    pub name: String,

    /// Display color as #rrggbb.
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Tag id (tg-xxxxxxxx).
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    /// Display color as #rrggbb.
    #[arg(long)]
    pub color: Option<String>,
}

fn write_tag(tag: &Tag, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}  {}  {}", tag.id.as_str(), tag.color, tag.name)
}

pub fn run(
    command: &TagCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let session = super::Session::open(project_root, user_flag, output)?;
    let catalog = Catalog::new(&session.conn);
    let user = &session.user;

    match command {
        TagCommand::Add(args) => {
            let tag = catalog
                .create_tag(user, &args.name, args.color.as_deref())
                .map_err(|e| fail(output, &e))?;
            render(output, &tag, |t, w| write_tag(t, w))
        }

        TagCommand::List => {
            let tags = query::list_tags(&session.conn, user)?;
            render(output, &tags, |items, w| {
                for tag in items {
                    write_tag(tag, w)?;
                }
                Ok(())
            })
        }

        TagCommand::Update(args) => {
            let id = crate::validate::parse_tag_id(&args.id).map_err(|e| super::invalid(output, &e))?;
            let tag = catalog
                .update_tag(user, &id, args.name.as_deref(), args.color.as_deref())
                .map_err(|e| fail(output, &e))?;
            render(output, &tag, |t, w| write_tag(t, w))
        }

        TagCommand::Rm { id } => {
            let id = crate::validate::parse_tag_id(id).map_err(|e| super::invalid(output, &e))?;
            catalog.delete_tag(user, &id).map_err(|e| fail(output, &e))?;
            render_success(output, &format!("Removed tag {}", id.as_str()))
        }

        TagCommand::Attach { garment, tag } => {
            let garment_id = crate::validate::parse_garment_id(garment)
                .map_err(|e| super::invalid(output, &e))?;
            catalog
                .attach_tag(user, &garment_id, tag)
                .map_err(|e| fail(output, &e))?;
            render_success(
                output,
                &format!("Tagged {} with '{}'", garment_id.as_str(), tag),
            )
        }

        TagCommand::Detach { garment, tag } => {
            let garment_id = crate::validate::parse_garment_id(garment)
                .map_err(|e| super::invalid(output, &e))?;
            catalog
                .detach_tag(user, &garment_id, tag)
                .map_err(|e| fail(output, &e))?;
            render_success(
                output,
                &format!("Untagged '{}' from {}", tag, garment_id.as_str()),
            )
        }
    }
}

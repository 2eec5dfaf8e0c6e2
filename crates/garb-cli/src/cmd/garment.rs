//! `gb garment` — garment CRUD and listing.

use crate::output::{OutputMode, display_cost, fail, render, render_success};
use clap::{Args, Subcommand};
use garb_core::db::catalog::{Catalog, GarmentPatch, NewGarment};
use garb_core::db::query::{self, GarmentFilter, SortOrder};
use garb_core::model::Garment;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand, Debug)]
pub enum GarmentCommand {
    /// Add a garment to the catalog.
    Add(AddArgs),
    /// List garments, optionally filtered.
    List(ListArgs),
    /// Show one garment by id.
    Show {
        /// Garment id (gm-xxxxxxxx).
        id: String,
    },
    /// Update fields on a garment.
    Update(UpdateArgs),
    /// Remove a garment; tag and collection rows follow.
    Rm {
        /// Garment id (gm-xxxxxxxx).
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Garment name.
    #[arg(short, long)]
    pub name: String,

    /// Category, e.g. Shirts, Pants, Shoes.
    #[arg(short, long)]
    pub category: String,

    #[arg(long)]
    pub material: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub size: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    /// Purchase date (YYYY-MM-DD).
    #[arg(long)]
    pub purchased: Option<String>,

    /// Purchase cost, e.g. 49.99 or $49.99.
    #[arg(long)]
    pub cost: Option<String>,

    /// Care instructions.
    #[arg(long)]
    pub care: Option<String>,

    /// Lifecycle status (active, laundry, stored, donated, discarded).
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Existing tag names to attach (repeatable).
    #[arg(short, long)]
    pub tag: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by category (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by lifecycle status.
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by brand (case-insensitive).
    #[arg(long)]
    pub brand: Option<String>,

    /// Filter by tag name.
    #[arg(long)]
    pub tag: Option<String>,

    /// Maximum number of rows.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Rows to skip (pagination).
    #[arg(long)]
    pub offset: Option<u32>,

    /// Sort order: updated_desc, created_desc, or name.
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Garment id (gm-xxxxxxxx).
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub material: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub size: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    /// Purchase date (YYYY-MM-DD).
    #[arg(long)]
    pub purchased: Option<String>,

    /// Purchase cost, e.g. 49.99 or $49.99.
    #[arg(long)]
    pub cost: Option<String>,

    #[arg(long)]
    pub care: Option<String>,

    /// Lifecycle status (active, laundry, stored, donated, discarded).
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

fn write_garment(g: &Garment, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}  {}", g.id.as_str(), g.name)?;
    writeln!(w, "  category: {}  status: {}", g.category, g.status)?;
    if let Some(ref brand) = g.brand {
        writeln!(w, "  brand: {brand}")?;
    }
    if let Some(ref material) = g.material {
        writeln!(w, "  material: {material}")?;
    }
    if let Some(ref color) = g.color {
        writeln!(w, "  color: {color}")?;
    }
    if let Some(ref size) = g.size {
        writeln!(w, "  size: {size}")?;
    }
    if let Some(purchased) = g.purchased {
        writeln!(w, "  purchased: {purchased}")?;
    }
    if let Some(cents) = g.cost_cents {
        writeln!(w, "  cost: {}", display_cost(cents))?;
    }
    if let Some(ref care) = g.care {
        writeln!(w, "  care: {care}")?;
    }
    if let Some(ref notes) = g.notes {
        writeln!(w, "  notes: {notes}")?;
    }
    if !g.tags.is_empty() {
        writeln!(w, "  tags: {}", g.tags.join(", "))?;
    }
    Ok(())
}

fn write_garment_row(g: &Garment, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{}  {}  {}  {}",
        g.id.as_str(),
        g.status,
        g.category,
        g.name
    )
}

pub fn run(
    command: &GarmentCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let session = super::Session::open(project_root, user_flag, output)?;
    let catalog = Catalog::new(&session.conn);
    let user = &session.user;

    match command {
        GarmentCommand::Add(args) => {
            let input = NewGarment {
                name: args.name.clone(),
                category: args.category.clone(),
                material: args.material.clone(),
                color: args.color.clone(),
                size: args.size.clone(),
                brand: args.brand.clone(),
                purchased: args
                    .purchased
                    .as_deref()
                    .map(crate::validate::parse_date)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?,
                cost_cents: args
                    .cost
                    .as_deref()
                    .map(crate::validate::parse_cost)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?,
                care: args.care.clone(),
                status: args
                    .status
                    .as_deref()
                    .map(crate::validate::parse_status)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?
                    .unwrap_or_default(),
                notes: args.notes.clone(),
                tags: args.tag.clone(),
            };
            let garment = catalog
                .create_garment(user, input)
                .map_err(|e| fail(output, &e))?;
            render(output, &garment, |g, w| write_garment(g, w))
        }

        GarmentCommand::List(args) => {
            let filter = GarmentFilter {
                category: args.category.clone(),
                status: args
                    .status
                    .as_deref()
                    .map(crate::validate::parse_status)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?,
                brand: args.brand.clone(),
                tag: args.tag.clone(),
                limit: args.limit,
                offset: args.offset,
                sort: args
                    .sort
                    .as_deref()
                    .map(SortOrder::from_str)
                    .transpose()?
                    .unwrap_or_default(),
            };
            let garments = query::list_garments(&session.conn, user, &filter)?;
            render(output, &garments, |items, w| {
                for g in items {
                    write_garment_row(g, w)?;
                }
                Ok(())
            })
        }

        GarmentCommand::Show { id } => {
            let id = crate::validate::parse_garment_id(id).map_err(|e| super::invalid(output, &e))?;
            let garment = query::get_garment(&session.conn, user, &id)?
                .ok_or_else(|| garb_core::Error::not_found("garment", id.as_str()))
                .map_err(|e| fail(output, &e))?;
            render(output, &garment, |g, w| write_garment(g, w))
        }

        GarmentCommand::Update(args) => {
            let id = crate::validate::parse_garment_id(&args.id)
                .map_err(|e| super::invalid(output, &e))?;
            let patch = GarmentPatch {
                name: args.name.clone(),
                category: args.category.clone(),
                material: args.material.clone(),
                color: args.color.clone(),
                size: args.size.clone(),
                brand: args.brand.clone(),
                purchased: args
                    .purchased
                    .as_deref()
                    .map(crate::validate::parse_date)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?,
                cost_cents: args
                    .cost
                    .as_deref()
                    .map(crate::validate::parse_cost)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?,
                care: args.care.clone(),
                status: args
                    .status
                    .as_deref()
                    .map(crate::validate::parse_status)
                    .transpose()
                    .map_err(|e| super::invalid(output, &e))?,
                notes: args.notes.clone(),
            };
            let garment = catalog
                .update_garment(user, &id, &patch)
                .map_err(|e| fail(output, &e))?;
            render(output, &garment, |g, w| write_garment(g, w))
        }

        GarmentCommand::Rm { id } => {
            let id = crate::validate::parse_garment_id(id).map_err(|e| super::invalid(output, &e))?;
            catalog
                .delete_garment(user, &id)
                .map_err(|e| fail(output, &e))?;
            render_success(output, &format!("Removed garment {}", id.as_str()))
        }
    }
}

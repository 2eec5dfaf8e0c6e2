//! SQLite query helpers for the catalog database.
//!
//! Provides typed Rust structs and composable query functions for common
//! access patterns: list/filter garments, get by id, list tags and
//! collections, read rule triplets and membership rows.
//!
//! All functions take a shared `&Connection`, scope every lookup by
//! `user_id`, and return typed structs (never raw rows). Ownership misses
//! read as absence: a row owned by another user is simply not found.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, params, params_from_iter, types::Type};
use std::collections::BTreeSet;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::model::id::{CollectionId, GarmentId, TagId, UserId};
use crate::model::{Collection, Garment, Status, Tag};
use crate::rules::Rule;

/// Columns selected for garment rows, matching [`row_to_garment`].
const GARMENT_COLUMNS: &str = "garment_id, user_id, name, category, material, color, size, \
     brand, purchased, cost_cents, care, status, notes, created_at_us, updated_at_us";

/// Same columns qualified with the `g` alias, for joined queries.
const GARMENT_COLUMNS_G: &str = "g.garment_id, g.user_id, g.name, g.category, g.material, \
     g.color, g.size, g.brand, g.purchased, g.cost_cents, g.care, g.status, g.notes, \
     g.created_at_us, g.updated_at_us";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A stored rule triplet, still in loose string form.
///
/// `position` preserves the user's rule order for diagnostics; evaluation
/// is conjunctive so order never affects the outcome.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RawRule {
    pub position: i64,
    pub field: String,
    pub op: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort order for garment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently updated first.
    #[default]
    UpdatedDesc,
    /// Most recently created first.
    CreatedDesc,
    /// Alphabetical by name.
    NameAsc,
}

impl SortOrder {
    const fn sql_clause(self) -> &'static str {
        match self {
            Self::UpdatedDesc => "ORDER BY g.updated_at_us DESC, g.garment_id ASC",
            Self::CreatedDesc => "ORDER BY g.created_at_us DESC, g.garment_id ASC",
            Self::NameAsc => "ORDER BY g.name COLLATE NOCASE ASC, g.garment_id ASC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdatedDesc => f.write_str("updated_desc"),
            Self::CreatedDesc => f.write_str("created_desc"),
            Self::NameAsc => f.write_str("name"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "updated_desc" | "updated-desc" | "recent" => Ok(Self::UpdatedDesc),
            "created_desc" | "created-desc" | "newest" => Ok(Self::CreatedDesc),
            "name" | "alpha" => Ok(Self::NameAsc),
            other => bail!(
                "unknown sort order '{other}': expected one of updated_desc, created_desc, name"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Filter criteria for garment listings.
///
/// All fields are optional. When multiple fields are set, they are combined
/// with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct GarmentFilter {
    /// Filter by category (case-insensitive exact match).
    pub category: Option<String>,
    /// Filter by lifecycle status.
    pub status: Option<Status>,
    /// Filter by brand (case-insensitive exact match).
    pub brand: Option<String>,
    /// Filter by tag name (garment must carry this tag).
    pub tag: Option<String>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Sort order.
    pub sort: SortOrder,
}

// ---------------------------------------------------------------------------
// Garments
// ---------------------------------------------------------------------------

fn row_to_garment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Garment> {
    let conversion = |idx: usize, e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    };

    let id: String = row.get(0)?;
    let user: String = row.get(1)?;
    let purchased: Option<String> = row.get(8)?;
    let status: String = row.get(11)?;

    Ok(Garment {
        id: GarmentId::parse(&id).map_err(|e| conversion(0, e))?,
        user_id: UserId::new(user).map_err(|e| conversion(1, e.to_string()))?,
        name: row.get(2)?,
        category: row.get(3)?,
        material: row.get(4)?,
        color: row.get(5)?,
        size: row.get(6)?,
        brand: row.get(7)?,
        purchased: purchased
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|e| conversion(8, e.to_string()))
            })
            .transpose()?,
        cost_cents: row.get(9)?,
        care: row.get(10)?,
        status: Status::from_str(&status).map_err(|e| conversion(11, e))?,
        notes: row.get(12)?,
        tags: Vec::new(),
        created_at_us: row.get(13)?,
        updated_at_us: row.get(14)?,
    })
}

/// Read the tag names attached to a garment, alphabetical.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn tag_names_for(conn: &Connection, garment_id: &GarmentId) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT t.name
             FROM garment_tags gt
             INNER JOIN tags t ON t.tag_id = gt.tag_id
             WHERE gt.garment_id = ?1
             ORDER BY t.name COLLATE NOCASE ASC",
        )
        .context("prepare tag_names_for query")?;

    let rows = stmt
        .query_map(params![garment_id.as_str()], |row| row.get(0))
        .context("execute tag_names_for query")?;

    rows.collect::<rusqlite::Result<Vec<String>>>()
        .context("read tag_names_for rows")
}

/// Fetch a single garment by id, scoped to its owner, with tags hydrated.
///
/// Returns `None` if the garment does not exist or is owned by someone else.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_garment(
    conn: &Connection,
    user: &UserId,
    garment_id: &GarmentId,
) -> Result<Option<Garment>> {
    let sql = format!("SELECT {GARMENT_COLUMNS} FROM garments WHERE garment_id = ?1 AND user_id = ?2");
    let mut stmt = conn.prepare(&sql).context("prepare get_garment query")?;

    let result = stmt.query_row(params![garment_id.as_str(), user.as_str()], row_to_garment);

    match result {
        Ok(mut garment) => {
            garment.tags = tag_names_for(conn, &garment.id)?;
            Ok(Some(garment))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_garment for '{garment_id}'")),
    }
}

/// List a user's garments matching the given filter, tags hydrated.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_garments(conn: &Connection, user: &UserId, filter: &GarmentFilter) -> Result<Vec<Garment>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    param_values.push(Box::new(user.as_str().to_string()));
    conditions.push(format!("g.user_id = ?{}", param_values.len()));

    if let Some(ref category) = filter.category {
        param_values.push(Box::new(category.clone()));
        conditions.push(format!(
            "g.category = ?{} COLLATE NOCASE",
            param_values.len()
        ));
    }

    if let Some(status) = filter.status {
        param_values.push(Box::new(status.as_str().to_string()));
        conditions.push(format!("g.status = ?{}", param_values.len()));
    }

    if let Some(ref brand) = filter.brand {
        param_values.push(Box::new(brand.clone()));
        conditions.push(format!("g.brand = ?{} COLLATE NOCASE", param_values.len()));
    }

    // Tag filter requires a JOIN through the edge table
    let mut joins = String::new();
    if let Some(ref tag) = filter.tag {
        param_values.push(Box::new(tag.clone()));
        let _ = write!(
            joins,
            " INNER JOIN garment_tags gt ON gt.garment_id = g.garment_id \
              INNER JOIN tags t ON t.tag_id = gt.tag_id AND t.name = ?{} COLLATE NOCASE",
            param_values.len()
        );
    }

    let where_clause = format!(" WHERE {}", conditions.join(" AND "));
    let sort_clause = filter.sort.sql_clause();

    let limit_clause = match (filter.limit, filter.offset) {
        (Some(limit), Some(offset)) => format!(" LIMIT {limit} OFFSET {offset}"),
        (Some(limit), None) => format!(" LIMIT {limit}"),
        (None, Some(offset)) => format!(" LIMIT -1 OFFSET {offset}"),
        (None, None) => String::new(),
    };

    let sql = format!(
        "SELECT {GARMENT_COLUMNS_G} FROM garments g{joins}{where_clause} {sort_clause}{limit_clause}"
    );

    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare list_garments query: {sql}"))?;

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();

    let rows = stmt
        .query_map(params_from_iter(params_ref), row_to_garment)
        .context("execute list_garments query")?;

    let mut garments = Vec::new();
    for row in rows {
        let mut garment = row.context("read list_garments row")?;
        garment.tags = tag_names_for(conn, &garment.id)?;
        garments.push(garment);
    }
    Ok(garments)
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

fn row_to_tag(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    let conversion = |idx: usize, e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    };
    let id: String = row.get(0)?;
    let user: String = row.get(1)?;
    Ok(Tag {
        id: TagId::parse(&id).map_err(|e| conversion(0, e))?,
        user_id: UserId::new(user).map_err(|e| conversion(1, e.to_string()))?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at_us: row.get(4)?,
    })
}

/// List a user's tags, alphabetical.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tags(conn: &Connection, user: &UserId) -> Result<Vec<Tag>> {
    let mut stmt = conn
        .prepare(
            "SELECT tag_id, user_id, name, color, created_at_us
             FROM tags
             WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE ASC",
        )
        .context("prepare list_tags query")?;

    let rows = stmt
        .query_map(params![user.as_str()], row_to_tag)
        .context("execute list_tags query")?;

    rows.collect::<rusqlite::Result<Vec<Tag>>>()
        .context("read list_tags rows")
}

/// Fetch a tag by id, scoped to its owner.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_tag(conn: &Connection, user: &UserId, tag_id: &TagId) -> Result<Option<Tag>> {
    let result = conn.query_row(
        "SELECT tag_id, user_id, name, color, created_at_us
         FROM tags
         WHERE tag_id = ?1 AND user_id = ?2",
        params![tag_id.as_str(), user.as_str()],
        row_to_tag,
    );
    match result {
        Ok(tag) => Ok(Some(tag)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_tag for '{tag_id}'")),
    }
}

/// Find a user's tag by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_tag_by_name(conn: &Connection, user: &UserId, name: &str) -> Result<Option<Tag>> {
    let result = conn.query_row(
        "SELECT tag_id, user_id, name, color, created_at_us
         FROM tags
         WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE",
        params![user.as_str(), name],
        row_to_tag,
    );
    match result {
        Ok(tag) => Ok(Some(tag)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("find_tag_by_name for '{name}'")),
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

fn row_to_collection(row: &rusqlite::Row<'_>) -> rusqlite::Result<Collection> {
    let conversion = |idx: usize, e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    };
    let id: String = row.get(0)?;
    let user: String = row.get(1)?;
    Ok(Collection {
        id: CollectionId::parse(&id).map_err(|e| conversion(0, e))?,
        user_id: UserId::new(user).map_err(|e| conversion(1, e.to_string()))?,
        name: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        image_url: row.get(5)?,
        is_smart: row.get(6)?,
        created_at_us: row.get(7)?,
        updated_at_us: row.get(8)?,
    })
}

const COLLECTION_COLUMNS: &str = "collection_id, user_id, name, description, color, image_url, \
     is_smart, created_at_us, updated_at_us";

/// Fetch a collection by id, scoped to its owner.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_collection(
    conn: &Connection,
    user: &UserId,
    collection_id: &CollectionId,
) -> Result<Option<Collection>> {
    let sql = format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections WHERE collection_id = ?1 AND user_id = ?2"
    );
    let result = conn.query_row(
        &sql,
        params![collection_id.as_str(), user.as_str()],
        row_to_collection,
    );
    match result {
        Ok(collection) => Ok(Some(collection)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_collection for '{collection_id}'")),
    }
}

/// List a user's collections, optionally restricted to smart or manual ones.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_collections(
    conn: &Connection,
    user: &UserId,
    smart: Option<bool>,
) -> Result<Vec<Collection>> {
    let mut sql = format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE user_id = ?1");
    if let Some(smart) = smart {
        let _ = write!(sql, " AND is_smart = {}", i32::from(smart));
    }
    sql.push_str(" ORDER BY name COLLATE NOCASE ASC, collection_id ASC");

    let mut stmt = conn.prepare(&sql).context("prepare list_collections query")?;
    let rows = stmt
        .query_map(params![user.as_str()], row_to_collection)
        .context("execute list_collections query")?;

    rows.collect::<rusqlite::Result<Vec<Collection>>>()
        .context("read list_collections rows")
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Read a collection's stored rule triplets in user order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn rules_for_collection(
    conn: &Connection,
    collection_id: &CollectionId,
) -> Result<Vec<RawRule>> {
    let mut stmt = conn
        .prepare(
            "SELECT position, field, op, value
             FROM collection_rules
             WHERE collection_id = ?1
             ORDER BY position ASC, rule_id ASC",
        )
        .context("prepare rules_for_collection query")?;

    let rows = stmt
        .query_map(params![collection_id.as_str()], |row| {
            Ok(RawRule {
                position: row.get(0)?,
                field: row.get(1)?,
                op: row.get(2)?,
                value: row.get(3)?,
            })
        })
        .context("execute rules_for_collection query")?;

    rows.collect::<rusqlite::Result<Vec<RawRule>>>()
        .context("read rules_for_collection rows")
}

/// Load and re-arm a collection's rules into their typed form.
///
/// # Errors
///
/// Returns [`crate::Error::Validation`] when a stored triplet no longer
/// parses (e.g. a field name from an older schema), and
/// [`crate::Error::Internal`] on storage failures.
pub fn load_rules(
    conn: &Connection,
    collection_id: &CollectionId,
) -> crate::Result<Vec<Rule>> {
    let raw = rules_for_collection(conn, collection_id)?;
    raw.iter()
        .map(|r| Rule::parse(&r.field, &r.op, &r.value))
        .collect()
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// Read a collection's current membership as a set of garment id strings.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn member_ids(conn: &Connection, collection_id: &CollectionId) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare("SELECT garment_id FROM collection_garments WHERE collection_id = ?1")
        .context("prepare member_ids query")?;

    let rows = stmt
        .query_map(params![collection_id.as_str()], |row| row.get(0))
        .context("execute member_ids query")?;

    rows.collect::<rusqlite::Result<BTreeSet<String>>>()
        .context("read member_ids rows")
}

/// List the garments currently in a collection, tags hydrated.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn member_garments(
    conn: &Connection,
    user: &UserId,
    collection_id: &CollectionId,
) -> Result<Vec<Garment>> {
    let sql = format!(
        "SELECT {GARMENT_COLUMNS_G}
         FROM collection_garments cg
         INNER JOIN garments g ON g.garment_id = cg.garment_id
         WHERE cg.collection_id = ?1 AND g.user_id = ?2
         ORDER BY g.name COLLATE NOCASE ASC, g.garment_id ASC"
    );
    let mut stmt = conn.prepare(&sql).context("prepare member_garments query")?;

    let rows = stmt
        .query_map(params![collection_id.as_str(), user.as_str()], row_to_garment)
        .context("execute member_garments query")?;

    let mut garments = Vec::new();
    for row in rows {
        let mut garment = row.context("read member_garments row")?;
        garment.tags = tag_names_for(conn, &garment.id)?;
        garments.push(garment);
    }
    Ok(garments)
}

#[cfg(test)]
mod tests {
    use super::{GarmentFilter, SortOrder, list_garments};
    use crate::db::catalog::{Catalog, NewGarment};
    use crate::db::migrations;
    use crate::model::UserId;
    use rusqlite::Connection;
    use std::str::FromStr;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        migrations::migrate(&mut conn).expect("migrate");
        conn
    }

    fn user(name: &str) -> UserId {
        UserId::new(name).expect("non-empty user")
    }

    #[test]
    fn sort_order_parses_aliases() {
        assert_eq!(
            SortOrder::from_str("recent").expect("alias"),
            SortOrder::UpdatedDesc
        );
        assert_eq!(
            SortOrder::from_str("alpha").expect("alias"),
            SortOrder::NameAsc
        );
        assert!(SortOrder::from_str("sideways").is_err());
    }

    #[test]
    fn list_garments_is_scoped_by_user() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");
        let ben = user("ben");

        catalog
            .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
            .expect("create ana garment");
        catalog
            .create_garment(&ben, NewGarment::named("Denim Jacket", "Jackets"))
            .expect("create ben garment");

        let anas = list_garments(&conn, &ana, &GarmentFilter::default()).expect("list ana");
        assert_eq!(anas.len(), 1);
        assert_eq!(anas[0].name, "Linen Shirt");

        let bens = list_garments(&conn, &ben, &GarmentFilter::default()).expect("list ben");
        assert_eq!(bens.len(), 1);
        assert_eq!(bens[0].name, "Denim Jacket");
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        catalog
            .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
            .expect("create garment");

        let filter = GarmentFilter {
            category: Some("shirts".into()),
            ..GarmentFilter::default()
        };
        let hits = list_garments(&conn, &ana, &filter).expect("list");
        assert_eq!(hits.len(), 1);

        let filter = GarmentFilter {
            category: Some("pants".into()),
            ..GarmentFilter::default()
        };
        assert!(list_garments(&conn, &ana, &filter).expect("list").is_empty());
    }
}

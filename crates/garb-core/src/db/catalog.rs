//! Catalog write path: garment, tag, and collection CRUD.
//!
//! [`Catalog`] wraps a shared `&Connection` and performs every multi-row
//! write inside a `BEGIN IMMEDIATE` transaction. All operations are scoped
//! by the acting user's id; an entity owned by another user reads as not
//! found, never as a permission distinction.
//!
//! Membership rows of smart collections are owned by [`crate::sync`];
//! manual add/remove against a smart collection is rejected here with a
//! validation error.

use rusqlite::{Connection, params};

use super::{now_us, query};
use crate::error::Error;
use crate::model::id::{CollectionId, GarmentId, TagId, UserId};
use crate::model::{Collection, Garment, Status, Tag, tag};
use crate::rules::Rule;

/// Longest accepted garment/tag/collection name.
pub const MAX_NAME_LEN: usize = 200;

/// Input for a new garment. Only `name` and `category` are required.
#[derive(Debug, Clone, Default)]
pub struct NewGarment {
    pub name: String,
    pub category: String,
    pub material: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub brand: Option<String>,
    pub purchased: Option<chrono::NaiveDate>,
    pub cost_cents: Option<i64>,
    pub care: Option<String>,
    pub status: Status,
    pub notes: Option<String>,
    /// Names of existing tags to attach on creation.
    pub tags: Vec<String>,
}

impl NewGarment {
    /// Minimal garment input with everything else defaulted.
    #[must_use]
    pub fn named(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update for a garment; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct GarmentPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub brand: Option<String>,
    pub purchased: Option<chrono::NaiveDate>,
    pub cost_cents: Option<i64>,
    pub care: Option<String>,
    pub status: Option<Status>,
    pub notes: Option<String>,
}

/// Input for a new collection. Rules present ⇒ smart collection.
#[derive(Debug, Clone, Default)]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    /// `Some` makes this a smart collection with the given rules; rules may
    /// be empty (a zero-rule smart collection derives zero members).
    pub rules: Option<Vec<Rule>>,
}

impl NewCollection {
    /// Minimal manual collection input.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Minimal smart collection input.
    #[must_use]
    pub fn smart(name: &str, rules: Vec<Rule>) -> Self {
        Self {
            name: name.to_string(),
            rules: Some(rules),
            ..Self::default()
        }
    }
}

/// Partial update for a collection's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

fn validate_name(field: &'static str, s: &str) -> crate::Result<()> {
    if s.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty".to_string()));
    }
    if s.trim() != s {
        return Err(Error::validation(
            field,
            "must not start or end with whitespace".to_string(),
        ));
    }
    if s.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(
            field,
            format!("must be <= {MAX_NAME_LEN} characters"),
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(Error::validation(
            field,
            "must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Write-side API over the catalog database.
pub struct Catalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Catalog<'conn> {
    /// Create a catalog over the given connection.
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn in_txn<T>(&self, f: impl FnOnce() -> crate::Result<T>) -> crate::Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f() {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Garments
    // -----------------------------------------------------------------------

    /// Create a garment, attaching any named tags (which must exist).
    ///
    /// # Errors
    ///
    /// Validation on a bad name/category, `NotFound` on an unknown tag name,
    /// `Internal` on storage failure.
    pub fn create_garment(&self, user: &UserId, input: NewGarment) -> crate::Result<Garment> {
        validate_name("name", &input.name)?;
        validate_name("category", &input.category)?;

        let id = GarmentId::generate();
        let now = now_us();

        self.in_txn(|| {
            self.conn.execute(
                "INSERT INTO garments (
                    garment_id, user_id, name, category, material, color, size, brand,
                    purchased, cost_cents, care, status, notes, created_at_us, updated_at_us
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    id.as_str(),
                    user.as_str(),
                    input.name,
                    input.category,
                    input.material,
                    input.color,
                    input.size,
                    input.brand,
                    input.purchased.map(|d| d.format("%Y-%m-%d").to_string()),
                    input.cost_cents,
                    input.care,
                    input.status.as_str(),
                    input.notes,
                    now,
                    now
                ],
            )?;

            for name in &input.tags {
                self.attach_tag_inner(user, &id, name, now)?;
            }
            Ok(())
        })?;

        tracing::debug!(garment = %id, user = %user, "garment created");
        self.fetch_garment(user, &id)
    }

    /// Apply a partial update to a garment.
    ///
    /// # Errors
    ///
    /// `NotFound` when the garment is absent or not owned by `user`.
    pub fn update_garment(
        &self,
        user: &UserId,
        garment_id: &GarmentId,
        patch: &GarmentPatch,
    ) -> crate::Result<Garment> {
        if let Some(ref name) = patch.name {
            validate_name("name", name)?;
        }
        if let Some(ref category) = patch.category {
            validate_name("category", category)?;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        let mut set = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
            values.push(value);
            sets.push(format!("{column} = ?{}", values.len()));
        };

        if let Some(ref v) = patch.name {
            set("name", Box::new(v.clone()));
        }
        if let Some(ref v) = patch.category {
            set("category", Box::new(v.clone()));
        }
        if let Some(ref v) = patch.material {
            set("material", Box::new(v.clone()));
        }
        if let Some(ref v) = patch.color {
            set("color", Box::new(v.clone()));
        }
        if let Some(ref v) = patch.size {
            set("size", Box::new(v.clone()));
        }
        if let Some(ref v) = patch.brand {
            set("brand", Box::new(v.clone()));
        }
        if let Some(v) = patch.purchased {
            set("purchased", Box::new(v.format("%Y-%m-%d").to_string()));
        }
        if let Some(v) = patch.cost_cents {
            set("cost_cents", Box::new(v));
        }
        if let Some(ref v) = patch.care {
            set("care", Box::new(v.clone()));
        }
        if let Some(v) = patch.status {
            set("status", Box::new(v.as_str().to_string()));
        }
        if let Some(ref v) = patch.notes {
            set("notes", Box::new(v.clone()));
        }

        if sets.is_empty() {
            return self.fetch_garment(user, garment_id);
        }

        values.push(Box::new(now_us()));
        sets.push(format!("updated_at_us = ?{}", values.len()));

        values.push(Box::new(garment_id.as_str().to_string()));
        let id_pos = values.len();
        values.push(Box::new(user.as_str().to_string()));
        let user_pos = values.len();

        let sql = format!(
            "UPDATE garments SET {} WHERE garment_id = ?{id_pos} AND user_id = ?{user_pos}",
            sets.join(", ")
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(AsRef::as_ref).collect();
        let changed = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(params_ref))?;

        if changed == 0 {
            return Err(Error::not_found("garment", garment_id.as_str()));
        }
        self.fetch_garment(user, garment_id)
    }

    /// Delete a garment; membership and tag edges cascade.
    ///
    /// # Errors
    ///
    /// `NotFound` when the garment is absent or not owned by `user`.
    pub fn delete_garment(&self, user: &UserId, garment_id: &GarmentId) -> crate::Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM garments WHERE garment_id = ?1 AND user_id = ?2",
            params![garment_id.as_str(), user.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found("garment", garment_id.as_str()));
        }
        tracing::debug!(garment = %garment_id, user = %user, "garment deleted");
        Ok(())
    }

    fn fetch_garment(&self, user: &UserId, garment_id: &GarmentId) -> crate::Result<Garment> {
        query::get_garment(self.conn, user, garment_id)?
            .ok_or_else(|| Error::not_found("garment", garment_id.as_str()))
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    /// Create a tag.
    ///
    /// # Errors
    ///
    /// `Conflict` when the user already has a tag with this name (names are
    /// compared case-insensitively).
    pub fn create_tag(
        &self,
        user: &UserId,
        name: &str,
        color: Option<&str>,
    ) -> crate::Result<Tag> {
        validate_name("tag name", name)?;

        if let Some(existing) = query::find_tag_by_name(self.conn, user, name)? {
            return Err(Error::Conflict {
                kind: "tag",
                name: existing.name,
            });
        }

        let id = TagId::generate();
        self.conn.execute(
            "INSERT INTO tags (tag_id, user_id, name, color, created_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.as_str(),
                user.as_str(),
                name,
                color.unwrap_or(tag::DEFAULT_COLOR),
                now_us()
            ],
        )?;

        query::get_tag(self.conn, user, &id)?
            .ok_or_else(|| Error::not_found("tag", id.as_str()))
    }

    /// Rename and/or recolor a tag.
    ///
    /// # Errors
    ///
    /// `NotFound` on an unknown tag, `Conflict` when renaming onto another
    /// tag's name.
    pub fn update_tag(
        &self,
        user: &UserId,
        tag_id: &TagId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> crate::Result<Tag> {
        let current = query::get_tag(self.conn, user, tag_id)?
            .ok_or_else(|| Error::not_found("tag", tag_id.as_str()))?;

        if let Some(name) = name {
            validate_name("tag name", name)?;
            if let Some(existing) = query::find_tag_by_name(self.conn, user, name)? {
                if existing.id != current.id {
                    return Err(Error::Conflict {
                        kind: "tag",
                        name: existing.name,
                    });
                }
            }
        }

        self.conn.execute(
            "UPDATE tags SET name = ?1, color = ?2 WHERE tag_id = ?3 AND user_id = ?4",
            params![
                name.unwrap_or(&current.name),
                color.unwrap_or(&current.color),
                tag_id.as_str(),
                user.as_str()
            ],
        )?;

        query::get_tag(self.conn, user, tag_id)?
            .ok_or_else(|| Error::not_found("tag", tag_id.as_str()))
    }

    /// Delete a tag; garment attachments cascade.
    ///
    /// # Errors
    ///
    /// `NotFound` when the tag is absent or not owned by `user`.
    pub fn delete_tag(&self, user: &UserId, tag_id: &TagId) -> crate::Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM tags WHERE tag_id = ?1 AND user_id = ?2",
            params![tag_id.as_str(), user.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found("tag", tag_id.as_str()));
        }
        Ok(())
    }

    /// Attach a tag (by name) to a garment. Idempotent.
    ///
    /// # Errors
    ///
    /// `NotFound` on an unknown garment or tag name.
    pub fn attach_tag(
        &self,
        user: &UserId,
        garment_id: &GarmentId,
        tag_name: &str,
    ) -> crate::Result<()> {
        self.require_garment(user, garment_id)?;
        self.attach_tag_inner(user, garment_id, tag_name, now_us())
    }

    fn attach_tag_inner(
        &self,
        user: &UserId,
        garment_id: &GarmentId,
        tag_name: &str,
        now: i64,
    ) -> crate::Result<()> {
        let tag = query::find_tag_by_name(self.conn, user, tag_name)?
            .ok_or_else(|| Error::not_found("tag", tag_name))?;

        self.conn.execute(
            "INSERT OR IGNORE INTO garment_tags (garment_id, tag_id, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![garment_id.as_str(), tag.id.as_str(), now],
        )?;
        Ok(())
    }

    /// Detach a tag (by name) from a garment. Idempotent.
    ///
    /// # Errors
    ///
    /// `NotFound` on an unknown garment or tag name.
    pub fn detach_tag(
        &self,
        user: &UserId,
        garment_id: &GarmentId,
        tag_name: &str,
    ) -> crate::Result<()> {
        self.require_garment(user, garment_id)?;
        let tag = query::find_tag_by_name(self.conn, user, tag_name)?
            .ok_or_else(|| Error::not_found("tag", tag_name))?;

        self.conn.execute(
            "DELETE FROM garment_tags WHERE garment_id = ?1 AND tag_id = ?2",
            params![garment_id.as_str(), tag.id.as_str()],
        )?;
        Ok(())
    }

    fn require_garment(&self, user: &UserId, garment_id: &GarmentId) -> crate::Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM garments WHERE garment_id = ?1 AND user_id = ?2)",
            params![garment_id.as_str(), user.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found("garment", garment_id.as_str()))
        }
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    /// Create a collection. Providing rules makes it a smart collection;
    /// the caller is expected to run a refresh afterwards to derive the
    /// initial membership.
    ///
    /// # Errors
    ///
    /// Validation on a bad name; `Internal` on storage failure.
    pub fn create_collection(
        &self,
        user: &UserId,
        input: NewCollection,
    ) -> crate::Result<Collection> {
        validate_name("collection name", &input.name)?;

        let id = CollectionId::generate();
        let now = now_us();
        let is_smart = input.rules.is_some();

        self.in_txn(|| {
            self.conn.execute(
                "INSERT INTO collections (
                    collection_id, user_id, name, description, color, image_url,
                    is_smart, created_at_us, updated_at_us
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id.as_str(),
                    user.as_str(),
                    input.name,
                    input.description,
                    input.color,
                    input.image_url,
                    is_smart,
                    now,
                    now
                ],
            )?;

            if let Some(ref rules) = input.rules {
                self.insert_rules(&id, rules)?;
            }
            Ok(())
        })?;

        tracing::debug!(collection = %id, user = %user, smart = is_smart, "collection created");
        query::get_collection(self.conn, user, &id)?
            .ok_or_else(|| Error::not_found("collection", id.as_str()))
    }

    /// Update a collection's descriptive fields.
    ///
    /// # Errors
    ///
    /// `NotFound` when the collection is absent or not owned by `user`.
    pub fn update_collection(
        &self,
        user: &UserId,
        collection_id: &CollectionId,
        patch: &CollectionPatch,
    ) -> crate::Result<Collection> {
        let current = query::get_collection(self.conn, user, collection_id)?
            .ok_or_else(|| Error::not_found("collection", collection_id.as_str()))?;

        if let Some(ref name) = patch.name {
            validate_name("collection name", name)?;
        }

        self.conn.execute(
            "UPDATE collections
             SET name = ?1, description = ?2, color = ?3, image_url = ?4, updated_at_us = ?5
             WHERE collection_id = ?6 AND user_id = ?7",
            params![
                patch.name.as_ref().unwrap_or(&current.name),
                patch.description.as_ref().or(current.description.as_ref()),
                patch.color.as_ref().or(current.color.as_ref()),
                patch.image_url.as_ref().or(current.image_url.as_ref()),
                now_us(),
                collection_id.as_str(),
                user.as_str()
            ],
        )?;

        query::get_collection(self.conn, user, collection_id)?
            .ok_or_else(|| Error::not_found("collection", collection_id.as_str()))
    }

    /// Delete a collection; rules and membership cascade.
    ///
    /// # Errors
    ///
    /// `NotFound` when the collection is absent or not owned by `user`.
    pub fn delete_collection(
        &self,
        user: &UserId,
        collection_id: &CollectionId,
    ) -> crate::Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM collections WHERE collection_id = ?1 AND user_id = ?2",
            params![collection_id.as_str(), user.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found("collection", collection_id.as_str()));
        }
        Ok(())
    }

    /// Replace a smart collection's rule set.
    ///
    /// The caller is expected to run a refresh afterwards so membership
    /// tracks the new rules (the CLI does this automatically unless
    /// configured off).
    ///
    /// # Errors
    ///
    /// `NotFound` on an unknown collection, `NotSmart` when the collection
    /// is manually curated.
    pub fn replace_rules(
        &self,
        user: &UserId,
        collection_id: &CollectionId,
        rules: &[Rule],
    ) -> crate::Result<()> {
        let collection = query::get_collection(self.conn, user, collection_id)?
            .ok_or_else(|| Error::not_found("collection", collection_id.as_str()))?;
        if !collection.is_smart {
            return Err(Error::NotSmart {
                id: collection_id.as_str().to_string(),
            });
        }

        self.in_txn(|| {
            self.conn.execute(
                "DELETE FROM collection_rules WHERE collection_id = ?1",
                params![collection_id.as_str()],
            )?;
            self.insert_rules(collection_id, rules)?;
            self.conn.execute(
                "UPDATE collections SET updated_at_us = ?1 WHERE collection_id = ?2",
                params![now_us(), collection_id.as_str()],
            )?;
            Ok(())
        })
    }

    fn insert_rules(&self, collection_id: &CollectionId, rules: &[Rule]) -> crate::Result<()> {
        for (position, rule) in (0_i64..).zip(rules) {
            self.conn.execute(
                "INSERT INTO collection_rules (collection_id, position, field, op, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    collection_id.as_str(),
                    position,
                    rule.field.as_str(),
                    rule.op.as_str(),
                    rule.value
                ],
            )?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Manual membership
    // -----------------------------------------------------------------------

    /// Add a garment to a manually curated collection. Idempotent.
    ///
    /// # Errors
    ///
    /// `NotFound` on an unknown collection or garment; Validation when the
    /// collection is smart (its membership is rule-derived).
    pub fn add_member(
        &self,
        user: &UserId,
        collection_id: &CollectionId,
        garment_id: &GarmentId,
    ) -> crate::Result<()> {
        self.require_manual(user, collection_id)?;
        self.require_garment(user, garment_id)?;

        self.conn.execute(
            "INSERT OR IGNORE INTO collection_garments (collection_id, garment_id, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![collection_id.as_str(), garment_id.as_str(), now_us()],
        )?;
        Ok(())
    }

    /// Remove a garment from a manually curated collection. Idempotent.
    ///
    /// # Errors
    ///
    /// `NotFound` on an unknown collection or garment; Validation when the
    /// collection is smart.
    pub fn remove_member(
        &self,
        user: &UserId,
        collection_id: &CollectionId,
        garment_id: &GarmentId,
    ) -> crate::Result<()> {
        self.require_manual(user, collection_id)?;
        self.require_garment(user, garment_id)?;

        self.conn.execute(
            "DELETE FROM collection_garments WHERE collection_id = ?1 AND garment_id = ?2",
            params![collection_id.as_str(), garment_id.as_str()],
        )?;
        Ok(())
    }

    fn require_manual(&self, user: &UserId, collection_id: &CollectionId) -> crate::Result<()> {
        let collection = query::get_collection(self.conn, user, collection_id)?
            .ok_or_else(|| Error::not_found("collection", collection_id.as_str()))?;
        if collection.is_smart {
            return Err(Error::validation(
                "membership",
                format!(
                    "collection {collection_id} is smart; membership is derived from its rules"
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, NewCollection, NewGarment};
    use crate::db::{migrations, query};
    use crate::error::Error;
    use crate::model::UserId;
    use crate::rules::Rule;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        migrations::migrate(&mut conn).expect("migrate");
        conn
    }

    fn user(name: &str) -> UserId {
        UserId::new(name).expect("non-empty user")
    }

    #[test]
    fn create_garment_with_tags_hydrates_names() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        catalog.create_tag(&ana, "Summer", None).expect("tag");
        catalog.create_tag(&ana, "Work", None).expect("tag");

        let mut input = NewGarment::named("Linen Shirt", "Shirts");
        input.tags = vec!["Summer".into(), "Work".into()];
        let garment = catalog.create_garment(&ana, input).expect("garment");

        assert_eq!(garment.tags, vec!["Summer".to_string(), "Work".to_string()]);
    }

    #[test]
    fn create_garment_rejects_unknown_tag_atomically() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        let mut input = NewGarment::named("Linen Shirt", "Shirts");
        input.tags = vec!["NoSuchTag".into()];
        let err = catalog.create_garment(&ana, input).expect_err("unknown tag");
        assert!(matches!(err, Error::NotFound { kind: "tag", .. }));

        // the transaction rolled back: no orphan garment row remains
        let garments =
            query::list_garments(&conn, &ana, &query::GarmentFilter::default()).expect("list");
        assert!(garments.is_empty());
    }

    #[test]
    fn duplicate_tag_name_is_a_conflict_not_validation() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        catalog.create_tag(&ana, "Summer", None).expect("tag");
        let err = catalog.create_tag(&ana, "SUMMER", None).expect_err("dup");
        assert!(matches!(err, Error::Conflict { kind: "tag", .. }));

        // same name for another user is fine
        catalog.create_tag(&user("ben"), "summer", None).expect("other user");
    }

    #[test]
    fn manual_membership_rejected_on_smart_collections() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        let garment = catalog
            .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
            .expect("garment");
        let rules = vec![Rule::parse("category", "equals", "Shirts").expect("rule")];
        let smart = catalog
            .create_collection(&ana, NewCollection::smart("Shirts", rules))
            .expect("collection");

        let err = catalog
            .add_member(&ana, &smart.id, &garment.id)
            .expect_err("manual add on smart");
        assert!(matches!(err, Error::Validation { field: "membership", .. }));
    }

    #[test]
    fn manual_membership_add_remove_round_trip() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        let garment = catalog
            .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
            .expect("garment");
        let favorites = catalog
            .create_collection(&ana, NewCollection::named("Favorites"))
            .expect("collection");

        catalog.add_member(&ana, &favorites.id, &garment.id).expect("add");
        catalog.add_member(&ana, &favorites.id, &garment.id).expect("idempotent add");
        assert_eq!(query::member_ids(&conn, &favorites.id).expect("members").len(), 1);

        catalog.remove_member(&ana, &favorites.id, &garment.id).expect("remove");
        assert!(query::member_ids(&conn, &favorites.id).expect("members").is_empty());
    }

    #[test]
    fn replace_rules_requires_smart_collection() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        let manual = catalog
            .create_collection(&ana, NewCollection::named("Favorites"))
            .expect("collection");
        let rules = vec![Rule::parse("category", "equals", "Shirts").expect("rule")];
        let err = catalog
            .replace_rules(&ana, &manual.id, &rules)
            .expect_err("manual collection");
        assert!(matches!(err, Error::NotSmart { .. }));
    }

    #[test]
    fn rules_persist_in_order() {
        let conn = test_conn();
        let catalog = Catalog::new(&conn);
        let ana = user("ana");

        let rules = vec![
            Rule::parse("category", "equals", "Shirts").expect("rule"),
            Rule::parse("tags", "contains", "summer").expect("rule"),
        ];
        let smart = catalog
            .create_collection(&ana, NewCollection::smart("Summer Shirts", rules.clone()))
            .expect("collection");

        let loaded = query::load_rules(&conn, &smart.id).expect("load rules");
        assert_eq!(loaded, rules);
    }
}

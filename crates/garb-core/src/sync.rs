//! Smart-collection synchronizer.
//!
//! [`refresh`] recomputes one smart collection's membership from its rules
//! and the owner's current garments, then applies the minimal add/remove
//! diff. The whole read-compute-write cycle runs inside a single
//! `BEGIN IMMEDIATE` transaction:
//! - concurrent refreshes of the same collection serialize at the storage
//!   layer, so neither applies a diff computed against a snapshot the other
//!   already invalidated;
//! - a reader observes either the pre-refresh or the fully post-refresh
//!   membership, never a mix;
//! - an interrupted refresh leaves membership untouched.
//!
//! A refresh with an empty diff performs zero writes, so re-running against
//! an unchanged catalog is idempotent.
//!
//! [`refresh_all`] refreshes every smart collection a user owns,
//! isolating failures per collection: a broken rule set in one collection
//! is reported in its outcome and never aborts the others.

use rusqlite::{Connection, params};
use std::collections::BTreeSet;

use crate::db::{now_us, query};
use crate::error::Error;
use crate::model::id::{CollectionId, UserId};
use crate::rules;

/// Outcome of one collection refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RefreshStats {
    /// Membership rows inserted.
    pub added: usize,
    /// Membership rows deleted.
    pub removed: usize,
    /// Member count after the refresh.
    pub members: usize,
}

impl RefreshStats {
    /// True when the refresh changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Per-collection outcome of a bulk refresh.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub collection_id: CollectionId,
    pub name: String,
    pub result: Result<RefreshStats, Error>,
}

/// Result of [`refresh_all`]: one outcome per smart collection, in name
/// order. Failures are carried alongside successes, never instead of them.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<CollectionOutcome>,
}

impl RefreshReport {
    /// Number of collections refreshed successfully.
    #[must_use]
    pub fn refreshed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of collections whose refresh failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.refreshed()
    }
}

/// Recompute and store a smart collection's membership.
///
/// # Errors
///
/// - [`Error::NotFound`] when the collection does not exist or belongs to a
///   different user;
/// - [`Error::NotSmart`] when it is manually curated;
/// - [`Error::Validation`] when a stored rule no longer parses;
/// - [`Error::Internal`] on storage failure.
pub fn refresh(
    conn: &Connection,
    user: &UserId,
    collection_id: &CollectionId,
) -> crate::Result<RefreshStats> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match refresh_in_txn(conn, user, collection_id) {
        Ok(stats) => {
            conn.execute_batch("COMMIT")?;
            if stats.is_noop() {
                tracing::debug!(collection = %collection_id, members = stats.members, "refresh: no change");
            } else {
                tracing::info!(
                    collection = %collection_id,
                    added = stats.added,
                    removed = stats.removed,
                    members = stats.members,
                    "refreshed smart collection"
                );
            }
            Ok(stats)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

fn refresh_in_txn(
    conn: &Connection,
    user: &UserId,
    collection_id: &CollectionId,
) -> crate::Result<RefreshStats> {
    let collection = query::get_collection(conn, user, collection_id)?
        .ok_or_else(|| Error::not_found("collection", collection_id.as_str()))?;
    if !collection.is_smart {
        return Err(Error::NotSmart {
            id: collection_id.as_str().to_string(),
        });
    }

    let rule_set = query::load_rules(conn, collection_id)?;

    // Only the owner's garments are candidates; an empty rule set derives
    // an empty target, clearing any stale membership.
    let garments = query::list_garments(conn, user, &query::GarmentFilter::default())?;
    let target: BTreeSet<String> = garments
        .iter()
        .filter(|g| rules::matches(g, &rule_set))
        .map(|g| g.id.as_str().to_string())
        .collect();

    let current = query::member_ids(conn, collection_id)?;

    let to_add: Vec<&String> = target.difference(&current).collect();
    let to_remove: Vec<&String> = current.difference(&target).collect();

    if to_add.is_empty() && to_remove.is_empty() {
        return Ok(RefreshStats {
            added: 0,
            removed: 0,
            members: current.len(),
        });
    }

    let now = now_us();
    for garment_id in &to_add {
        conn.execute(
            "INSERT INTO collection_garments (collection_id, garment_id, created_at_us)
             VALUES (?1, ?2, ?3)",
            params![collection_id.as_str(), garment_id, now],
        )?;
    }
    for garment_id in &to_remove {
        conn.execute(
            "DELETE FROM collection_garments WHERE collection_id = ?1 AND garment_id = ?2",
            params![collection_id.as_str(), garment_id],
        )?;
    }

    Ok(RefreshStats {
        added: to_add.len(),
        removed: to_remove.len(),
        members: target.len(),
    })
}

/// Refresh every smart collection owned by `user`.
///
/// Collections are independent: each gets its own transaction, and a
/// failure is recorded in that collection's outcome without aborting the
/// rest.
///
/// # Errors
///
/// Returns an error only when the collection listing itself fails;
/// per-collection failures are reported inside the [`RefreshReport`].
pub fn refresh_all(conn: &Connection, user: &UserId) -> crate::Result<RefreshReport> {
    let collections = query::list_collections(conn, user, Some(true))?;

    let mut report = RefreshReport::default();
    for collection in collections {
        let result = refresh(conn, user, &collection.id);
        if let Err(ref e) = result {
            tracing::warn!(
                collection = %collection.id,
                name = %collection.name,
                error = %e,
                "skipping smart collection after refresh failure"
            );
        }
        report.outcomes.push(CollectionOutcome {
            collection_id: collection.id,
            name: collection.name,
            result,
        });
    }

    tracing::info!(
        user = %user,
        refreshed = report.refreshed(),
        failed = report.failed(),
        "bulk refresh finished"
    );
    Ok(report)
}

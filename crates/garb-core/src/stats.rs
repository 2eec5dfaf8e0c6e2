//! Aggregate wardrobe statistics for reporting commands.

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;
use std::collections::HashMap;

use crate::model::id::UserId;

/// Per-collection size row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSize {
    pub collection_id: String,
    pub name: String,
    pub is_smart: bool,
    pub garments: usize,
}

/// Aggregate counters for a user's wardrobe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WardrobeStats {
    /// Total garments in the catalog.
    pub garments: usize,
    /// Garments by category.
    pub by_category: HashMap<String, usize>,
    /// Garments by lifecycle status.
    pub by_status: HashMap<String, usize>,
    /// Garments by brand (unbranded garments are omitted).
    pub by_brand: HashMap<String, usize>,
    /// Sum of known costs, in cents.
    pub total_cost_cents: i64,
    /// Garments with a known cost (the average's denominator).
    pub costed_garments: usize,
    /// Tag name → number of garments carrying it.
    pub tag_usage: HashMap<String, usize>,
    /// Collection sizes, name order.
    pub collections: Vec<CollectionSize>,
}

impl WardrobeStats {
    /// Average cost in cents across garments with a known cost.
    #[must_use]
    pub fn avg_cost_cents(&self) -> Option<i64> {
        if self.costed_garments == 0 {
            None
        } else {
            i64::try_from(self.costed_garments)
                .ok()
                .map(|n| self.total_cost_cents / n)
        }
    }
}

fn count_garments_grouped(
    conn: &Connection,
    user: &UserId,
    column: &str,
) -> Result<HashMap<String, usize>> {
    // column is a compile-time constant from the callers below
    let sql = format!(
        "SELECT {column}, COUNT(*)
         FROM garments
         WHERE user_id = ?1 AND {column} IS NOT NULL
         GROUP BY {column}"
    );
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare grouped count on {column}"))?;

    let rows = stmt
        .query_map(params![user.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .with_context(|| format!("execute grouped count on {column}"))?;

    let mut counts = HashMap::new();
    for row in rows {
        let (key, count) = row.context("read grouped count row")?;
        counts.insert(key, usize::try_from(count).unwrap_or(0));
    }
    Ok(counts)
}

/// Compute the full statistics block for a user's wardrobe.
///
/// # Errors
///
/// Returns an error if any of the underlying queries fail.
pub fn wardrobe_stats(conn: &Connection, user: &UserId) -> Result<WardrobeStats> {
    let mut stats = WardrobeStats {
        by_category: count_garments_grouped(conn, user, "category")?,
        by_status: count_garments_grouped(conn, user, "status")?,
        by_brand: count_garments_grouped(conn, user, "brand")?,
        ..WardrobeStats::default()
    };
    stats.garments = stats.by_category.values().sum();

    let (total, costed): (Option<i64>, i64) = conn
        .query_row(
            "SELECT SUM(cost_cents), COUNT(cost_cents)
             FROM garments
             WHERE user_id = ?1",
            params![user.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .context("query cost totals")?;
    stats.total_cost_cents = total.unwrap_or(0);
    stats.costed_garments = usize::try_from(costed).unwrap_or(0);

    let mut stmt = conn
        .prepare(
            "SELECT t.name, COUNT(gt.garment_id)
             FROM tags t
             LEFT JOIN garment_tags gt ON gt.tag_id = t.tag_id
             WHERE t.user_id = ?1
             GROUP BY t.tag_id",
        )
        .context("prepare tag usage query")?;
    let rows = stmt
        .query_map(params![user.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .context("execute tag usage query")?;
    for row in rows {
        let (name, count) = row.context("read tag usage row")?;
        stats.tag_usage.insert(name, usize::try_from(count).unwrap_or(0));
    }

    let mut stmt = conn
        .prepare(
            "SELECT c.collection_id, c.name, c.is_smart, COUNT(cg.garment_id)
             FROM collections c
             LEFT JOIN collection_garments cg ON cg.collection_id = c.collection_id
             WHERE c.user_id = ?1
             GROUP BY c.collection_id
             ORDER BY c.name COLLATE NOCASE ASC",
        )
        .context("prepare collection sizes query")?;
    let rows = stmt
        .query_map(params![user.as_str()], |row| {
            Ok(CollectionSize {
                collection_id: row.get(0)?,
                name: row.get(1)?,
                is_smart: row.get(2)?,
                garments: usize::try_from(row.get::<_, i64>(3)?).unwrap_or(0),
            })
        })
        .context("execute collection sizes query")?;
    for row in rows {
        stats.collections.push(row.context("read collection size row")?);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::wardrobe_stats;
    use crate::db::catalog::{Catalog, NewGarment};
    use crate::db::migrations;
    use crate::model::{Status, UserId};
    use rusqlite::Connection;

    #[test]
    fn stats_count_by_category_status_and_cost() {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        migrations::migrate(&mut conn).expect("migrate");
        let catalog = Catalog::new(&conn);
        let ana = UserId::new("ana").expect("user");

        let mut shirt = NewGarment::named("Linen Shirt", "Shirts");
        shirt.cost_cents = Some(4999);
        catalog.create_garment(&ana, shirt).expect("garment");

        let mut pants = NewGarment::named("Wool Trousers", "Pants");
        pants.cost_cents = Some(12001);
        pants.status = Status::Stored;
        catalog.create_garment(&ana, pants).expect("garment");

        catalog
            .create_garment(&ana, NewGarment::named("Old Tee", "Shirts"))
            .expect("garment");

        let stats = wardrobe_stats(&conn, &ana).expect("stats");
        assert_eq!(stats.garments, 3);
        assert_eq!(stats.by_category.get("Shirts"), Some(&2));
        assert_eq!(stats.by_category.get("Pants"), Some(&1));
        assert_eq!(stats.by_status.get("active"), Some(&2));
        assert_eq!(stats.by_status.get("stored"), Some(&1));
        assert_eq!(stats.total_cost_cents, 17_000);
        assert_eq!(stats.costed_garments, 2);
        assert_eq!(stats.avg_cost_cents(), Some(8_500));
    }
}

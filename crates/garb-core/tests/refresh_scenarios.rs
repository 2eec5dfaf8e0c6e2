//! End-to-end synchronizer scenarios against a real catalog database.

use garb_core::db::catalog::{Catalog, GarmentPatch, NewCollection, NewGarment};
use garb_core::db::{open_catalog, query};
use garb_core::model::UserId;
use garb_core::model::id::GarmentId;
use garb_core::rules::Rule;
use garb_core::sync;
use rusqlite::Connection;
use tempfile::TempDir;

fn temp_catalog() -> (TempDir, Connection) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let conn = open_catalog(&dir.path().join("garb.db")).expect("open catalog");
    (dir, conn)
}

fn user(name: &str) -> UserId {
    UserId::new(name).expect("non-empty user")
}

fn rule(field: &str, op: &str, value: &str) -> Rule {
    Rule::parse(field, op, value).expect("valid rule")
}

fn total_changes(conn: &Connection) -> i64 {
    conn.query_row("SELECT total_changes()", [], |row| row.get(0))
        .expect("total_changes")
}

fn member_set(conn: &Connection, collection: &garb_core::model::Collection) -> Vec<String> {
    query::member_ids(conn, &collection.id)
        .expect("member ids")
        .into_iter()
        .collect()
}

#[test]
fn category_rule_selects_exactly_the_matching_garments() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    let shirt_a = catalog
        .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
        .expect("garment");
    let shirt_b = catalog
        .create_garment(&ana, NewGarment::named("Oxford Shirt", "Shirts"))
        .expect("garment");
    let _pants = catalog
        .create_garment(&ana, NewGarment::named("Wool Trousers", "Pants"))
        .expect("garment");

    let shirts = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");

    let stats = sync::refresh(&conn, &ana, &shirts.id).expect("refresh");
    assert_eq!(stats.added, 2);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.members, 2);

    let mut expected: Vec<String> = vec![
        shirt_a.id.as_str().to_string(),
        shirt_b.id.as_str().to_string(),
    ];
    expected.sort();
    assert_eq!(member_set(&conn, &shirts), expected);
}

#[test]
fn refresh_is_idempotent_with_zero_writes_on_the_second_pass() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    catalog
        .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
        .expect("garment");
    let shirts = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");

    let first = sync::refresh(&conn, &ana, &shirts.id).expect("first refresh");
    assert_eq!(first.members, 1);
    let members_after_first = member_set(&conn, &shirts);

    let writes_before = total_changes(&conn);
    let second = sync::refresh(&conn, &ana, &shirts.id).expect("second refresh");
    let writes_after = total_changes(&conn);

    assert!(second.is_noop());
    assert_eq!(second.members, 1);
    assert_eq!(member_set(&conn, &shirts), members_after_first);
    assert_eq!(writes_after, writes_before, "second refresh must not write");
}

#[test]
fn category_change_evicts_only_the_changed_garment() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    let keeper = catalog
        .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
        .expect("garment");
    let mover = catalog
        .create_garment(&ana, NewGarment::named("Flannel Shirt", "Shirts"))
        .expect("garment");

    let shirts = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");
    sync::refresh(&conn, &ana, &shirts.id).expect("initial refresh");

    catalog
        .update_garment(
            &ana,
            &mover.id,
            &GarmentPatch {
                category: Some("Pants".into()),
                ..GarmentPatch::default()
            },
        )
        .expect("recategorize");

    let stats = sync::refresh(&conn, &ana, &shirts.id).expect("second refresh");
    assert_eq!(stats.added, 0);
    assert_eq!(stats.removed, 1);
    assert_eq!(member_set(&conn, &shirts), vec![keeper.id.as_str().to_string()]);
}

#[test]
fn tag_rule_matches_case_insensitively() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    catalog.create_tag(&ana, "Summer", None).expect("tag");
    catalog.create_tag(&ana, "Work", None).expect("tag");

    let mut input = NewGarment::named("Linen Shirt", "Shirts");
    input.tags = vec!["Summer".into(), "Work".into()];
    let tagged = catalog.create_garment(&ana, input).expect("garment");

    let _untagged = catalog
        .create_garment(&ana, NewGarment::named("Plain Tee", "Shirts"))
        .expect("garment");

    let summer = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Summer", vec![rule("tags", "contains", "summer")]),
        )
        .expect("collection");

    let stats = sync::refresh(&conn, &ana, &summer.id).expect("refresh");
    assert_eq!(stats.members, 1);
    assert_eq!(member_set(&conn, &summer), vec![tagged.id.as_str().to_string()]);
}

#[test]
fn refresh_never_touches_other_collections_or_other_users() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");
    let ben = user("ben");

    let ana_shirt = catalog
        .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
        .expect("garment");
    let _ben_shirt = catalog
        .create_garment(&ben, NewGarment::named("Ben's Shirt", "Shirts"))
        .expect("garment");

    // Ben has an identically ruled collection; Ana's refresh must not see
    // Ben's garments nor touch Ben's membership rows.
    let ana_shirts = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");
    let ben_shirts = catalog
        .create_collection(
            &ben,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");
    sync::refresh(&conn, &ben, &ben_shirts.id).expect("ben refresh");
    let ben_members = member_set(&conn, &ben_shirts);

    let manual = catalog
        .create_collection(&ana, NewCollection::named("Favorites"))
        .expect("collection");
    catalog
        .add_member(&ana, &manual.id, &ana_shirt.id)
        .expect("manual membership");

    let stats = sync::refresh(&conn, &ana, &ana_shirts.id).expect("ana refresh");
    assert_eq!(stats.members, 1);
    assert_eq!(
        member_set(&conn, &ana_shirts),
        vec![ana_shirt.id.as_str().to_string()]
    );

    assert_eq!(member_set(&conn, &ben_shirts), ben_members);
    assert_eq!(member_set(&conn, &manual), vec![ana_shirt.id.as_str().to_string()]);
}

#[test]
fn refresh_clears_stale_membership_rows() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    let pants = catalog
        .create_garment(&ana, NewGarment::named("Wool Trousers", "Pants"))
        .expect("garment");
    let shirts = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");

    // a row the rules no longer justify (e.g. left over from older rules)
    conn.execute(
        "INSERT INTO collection_garments (collection_id, garment_id, created_at_us)
         VALUES (?1, ?2, 0)",
        rusqlite::params![shirts.id.as_str(), pants.id.as_str()],
    )
    .expect("seed stale row");

    let stats = sync::refresh(&conn, &ana, &shirts.id).expect("refresh");
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.members, 0);
    assert!(member_set(&conn, &shirts).is_empty());
}

#[test]
fn refresh_all_reports_the_broken_collection_without_failing_the_valid_one() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    let shirt = catalog
        .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
        .expect("garment");

    let valid = catalog
        .create_collection(
            &ana,
            NewCollection::smart("Shirts", vec![rule("category", "equals", "Shirts")]),
        )
        .expect("collection");
    let broken = catalog
        .create_collection(&ana, NewCollection::smart("Broken", vec![]))
        .expect("collection");
    conn.execute(
        "INSERT INTO collection_rules (collection_id, position, field, op, value)
         VALUES (?1, 0, 'thread_count', 'equals', '400')",
        rusqlite::params![broken.id.as_str()],
    )
    .expect("seed unknown-field rule");

    let report = sync::refresh_all(&conn, &ana).expect("bulk refresh");
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.refreshed(), 1);
    assert_eq!(report.failed(), 1);

    let valid_outcome = report
        .outcomes
        .iter()
        .find(|o| o.collection_id == valid.id)
        .expect("valid outcome");
    assert!(valid_outcome.result.is_ok());
    assert_eq!(member_set(&conn, &valid), vec![shirt.id.as_str().to_string()]);

    let broken_outcome = report
        .outcomes
        .iter()
        .find(|o| o.collection_id == broken.id)
        .expect("broken outcome");
    assert!(broken_outcome.result.is_err());
}

#[test]
fn parsed_ids_survive_a_round_trip_through_storage() {
    let (_dir, conn) = temp_catalog();
    let catalog = Catalog::new(&conn);
    let ana = user("ana");

    let created = catalog
        .create_garment(&ana, NewGarment::named("Linen Shirt", "Shirts"))
        .expect("garment");
    let reparsed = GarmentId::parse(created.id.as_str()).expect("id parses");
    let fetched = query::get_garment(&conn, &ana, &reparsed)
        .expect("query")
        .expect("present");
    assert_eq!(fetched.name, "Linen Shirt");
}

//! Canonical SQLite schema for the wardrobe catalog.
//!
//! The schema is normalized for queryability:
//! - `garments` keeps the scalar attributes rules may query
//! - edge tables (`garment_tags`, `collection_garments`) model the
//!   many-to-many relations; membership rows are the single representation
//!   for both manual and rule-derived collections
//! - `collection_rules` stores rule triplets as loose strings; the core
//!   re-arms them into closed enums at load time
//! - `catalog_meta` tracks the schema version alongside `user_version`

/// Migration v1: core normalized tables plus catalog metadata.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS garments (
    garment_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    category TEXT NOT NULL CHECK (length(trim(category)) > 0),
    material TEXT,
    color TEXT,
    size TEXT,
    brand TEXT,
    purchased TEXT,
    cost_cents INTEGER CHECK (cost_cents IS NULL OR cost_cents >= 0),
    care TEXT,
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'laundry', 'stored', 'donated', 'discarded')),
    notes TEXT,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (garment_id LIKE 'gm-%')
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    color TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    CHECK (tag_id LIKE 'tg-%')
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_user_name
    ON tags(user_id, name COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS garment_tags (
    garment_id TEXT NOT NULL REFERENCES garments(garment_id) ON DELETE CASCADE,
    tag_id TEXT NOT NULL REFERENCES tags(tag_id) ON DELETE CASCADE,
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (garment_id, tag_id)
);

CREATE TABLE IF NOT EXISTS collections (
    collection_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    color TEXT,
    image_url TEXT,
    is_smart INTEGER NOT NULL DEFAULT 0 CHECK (is_smart IN (0, 1)),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (collection_id LIKE 'cl-%')
);

CREATE TABLE IF NOT EXISTS collection_rules (
    rule_id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection_id TEXT NOT NULL REFERENCES collections(collection_id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    field TEXT NOT NULL CHECK (length(trim(field)) > 0),
    op TEXT NOT NULL CHECK (length(trim(op)) > 0),
    value TEXT NOT NULL CHECK (length(trim(value)) > 0)
);

CREATE TABLE IF NOT EXISTS collection_garments (
    collection_id TEXT NOT NULL REFERENCES collections(collection_id) ON DELETE CASCADE,
    garment_id TEXT NOT NULL REFERENCES garments(garment_id) ON DELETE CASCADE,
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (collection_id, garment_id)
);

CREATE TABLE IF NOT EXISTS catalog_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO catalog_meta (id, schema_version, created_at_us)
VALUES (1, 1, 0);
"#;

/// Migration v2: read-path indexes for list/filter/refresh queries.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_garments_user_updated
    ON garments(user_id, updated_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_garments_user_category
    ON garments(user_id, category);

CREATE INDEX IF NOT EXISTS idx_garments_user_status
    ON garments(user_id, status);

CREATE INDEX IF NOT EXISTS idx_garment_tags_tag
    ON garment_tags(tag_id, garment_id);

CREATE INDEX IF NOT EXISTS idx_collections_user_smart
    ON collections(user_id, is_smart);

CREATE INDEX IF NOT EXISTS idx_collection_rules_collection
    ON collection_rules(collection_id, position);

CREATE INDEX IF NOT EXISTS idx_collection_garments_garment
    ON collection_garments(garment_id, collection_id);

UPDATE catalog_meta
SET schema_version = 2
WHERE id = 1;
";

/// Indexes expected by list/filter/refresh query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_tags_user_name",
    "idx_garments_user_updated",
    "idx_garments_user_category",
    "idx_garments_user_status",
    "idx_garment_tags_tag",
    "idx_collections_user_smart",
    "idx_collection_rules_collection",
    "idx_collection_garments_garment",
];

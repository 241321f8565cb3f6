//! SQL schema for the Kindred SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Current schema revision.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Documents are stored whole as JSON text in `doc`. The timestamp columns
/// duplicate `createdAt` / `updatedAt` from the document for ordering and
/// inspection. Rows are never updated or deleted.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS persons (
    id          TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    updated_at  TEXT NOT NULL,   -- equal to created_at
    doc         TEXT NOT NULL    -- JSON object, camelCase keys
);

CREATE TABLE IF NOT EXISTS families (
    id          TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    doc         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS persons_name_idx
    ON persons(json_extract(doc, '$.firstName'), json_extract(doc, '$.lastName'));
CREATE INDEX IF NOT EXISTS families_name_idx
    ON families(json_extract(doc, '$.name'));

PRAGMA user_version = 1;
";

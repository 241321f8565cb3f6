//! [`SqliteStore`] — the SQLite implementation of [`EntityStore`].

use std::path::Path;

use chrono::Utc;
use kindred_core::store::{
  Document, EntityKind, EntityStore, FieldMatch, Record, stamp,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Error, Result,
  encode::{RawRecord, encode_document, encode_dt, json_path, new_id},
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kindred entity store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found = self.schema_version().await?;
    if found > SCHEMA_VERSION {
      return Err(Error::Rejected(format!(
        "database schema version {found} is newer than supported version {SCHEMA_VERSION}"
      )));
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(version = SCHEMA_VERSION, "schema initialised");
    Ok(())
  }

  /// The `PRAGMA user_version` the schema was stamped with.
  pub async fn schema_version(&self) -> Result<i64> {
    let version: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }

  /// Insert a fully-stamped document under `id`. Returns `false` if the id
  /// is already taken; the existing row is left untouched.
  pub(crate) async fn insert_row(
    &self,
    kind: EntityKind,
    id: String,
    created_at: String,
    doc: String,
  ) -> Result<bool> {
    let sql = format!(
      "INSERT INTO {} (id, created_at, updated_at, doc) VALUES (?1, ?2, ?2, ?3)",
      kind.collection()
    );

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(&sql, rusqlite::params![id, created_at, doc]) {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;
    Ok(inserted)
  }
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, kind: EntityKind, fields: Document) -> Result<String> {
    if fields.keys().any(String::is_empty) {
      return Err(Error::Rejected("empty field name".into()));
    }

    let now = Utc::now();
    let id = new_id();
    let doc = encode_document(&stamp(fields, now))?;

    if !self.insert_row(kind, id.clone(), encode_dt(now), doc).await? {
      return Err(Error::Rejected(format!("{kind} id {id} already exists")));
    }

    debug!(%kind, id = %id, "document inserted");
    Ok(id)
  }

  async fn get_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Record>> {
    let sql = format!("SELECT id, doc FROM {} WHERE id = ?1", kind.collection());
    let id = id.to_owned();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], |row| {
              Ok(RawRecord { id: row.get(0)?, doc: row.get(1)? })
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn find_by_exact_fields(
    &self,
    kind: EntityKind,
    predicate: &FieldMatch,
  ) -> Result<Option<Record>> {
    if let Some(field) = predicate.invalid_field() {
      return Err(Error::Rejected(format!("invalid field name: {field:?}")));
    }

    // Field names are validated identifiers, so only the values need binding.
    let conds: Vec<String> = predicate
      .terms()
      .iter()
      .enumerate()
      .map(|(i, (name, _))| {
        format!("json_extract(doc, '{}') = ?{}", json_path(name), i + 1)
      })
      .collect();
    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT id, doc FROM {} {where_clause} LIMIT 1",
      kind.collection()
    );
    let values: Vec<String> =
      predicate.terms().iter().map(|(_, value)| value.clone()).collect();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(values.iter()), |row| {
              Ok(RawRecord { id: row.get(0)?, doc: row.get(1)? })
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn list_all(&self, kind: EntityKind) -> Result<Vec<Record>> {
    let sql = format!("SELECT id, doc FROM {}", kind.collection());

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| Ok(RawRecord { id: row.get(0)?, doc: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

//! [`MemoryStore`] — a process-local [`EntityStore`].
//!
//! Holds documents in mutex-guarded maps. Nothing survives the process; used
//! by tests and by embedders that do not need durability.

use std::{
  collections::{HashMap, hash_map::Entry},
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::store::{Document, EntityKind, EntityStore, FieldMatch, Record, stamp};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("document rejected: {0}")]
  Rejected(String),
}

type Collections = HashMap<EntityKind, HashMap<String, Document>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: Mutex<Collections>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> Result<MutexGuard<'_, Collections>, MemoryStoreError> {
    self
      .collections
      .lock()
      .map_err(|_| MemoryStoreError::Unavailable("store lock poisoned".into()))
  }

  /// Insert under a caller-chosen id; fails if the id is taken.
  pub fn insert_with_id(
    &self,
    kind: EntityKind,
    id: String,
    fields: Document,
  ) -> Result<(), MemoryStoreError> {
    if fields.keys().any(String::is_empty) {
      return Err(MemoryStoreError::Rejected("empty field name".into()));
    }
    let fields = stamp(fields, Utc::now());
    let mut collections = self.lock()?;
    match collections.entry(kind).or_default().entry(id) {
      Entry::Occupied(e) => Err(MemoryStoreError::Rejected(format!(
        "{kind} id {} already exists",
        e.key()
      ))),
      Entry::Vacant(e) => {
        e.insert(fields);
        Ok(())
      }
    }
  }
}

impl EntityStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn insert(&self, kind: EntityKind, fields: Document) -> Result<String, Self::Error> {
    let id = Uuid::new_v4().hyphenated().to_string();
    self.insert_with_id(kind, id.clone(), fields)?;
    Ok(id)
  }

  async fn get_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, Self::Error> {
    let collections = self.lock()?;
    Ok(
      collections
        .get(&kind)
        .and_then(|docs| docs.get(id))
        .map(|fields| Record { id: id.to_owned(), fields: fields.clone() }),
    )
  }

  async fn find_by_exact_fields(
    &self,
    kind: EntityKind,
    predicate: &FieldMatch,
  ) -> Result<Option<Record>, Self::Error> {
    if let Some(field) = predicate.invalid_field() {
      return Err(MemoryStoreError::Rejected(format!("invalid field name: {field:?}")));
    }
    let collections = self.lock()?;
    Ok(collections.get(&kind).and_then(|docs| {
      docs
        .iter()
        .find(|(_, fields)| predicate.matches(fields))
        .map(|(id, fields)| Record { id: id.clone(), fields: fields.clone() })
    }))
  }

  async fn list_all(&self, kind: EntityKind) -> Result<Vec<Record>, Self::Error> {
    let collections = self.lock()?;
    Ok(
      collections
        .get(&kind)
        .map(|docs| {
          docs
            .iter()
            .map(|(id, fields)| Record { id: id.clone(), fields: fields.clone() })
            .collect()
        })
        .unwrap_or_default(),
    )
  }
}

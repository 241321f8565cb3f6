//! The `EntityStore` trait and the document types it moves.
//!
//! Backends (e.g. `kindred-store-sqlite`, [`crate::memory::MemoryStore`])
//! persist schemaless JSON documents in one collection per [`EntityKind`].
//! Absent optional fields are omitted from documents, never null-filled.
//! Typed access for the rest of the crate goes through [`EntityStoreExt`].

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  Error, Result,
  family::Family,
  person::Person,
};

/// Reserved document keys written by the store, never by callers.
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "createdAt";
pub const UPDATED_AT_KEY: &str = "updatedAt";

// ─── Kinds and documents ─────────────────────────────────────────────────────

/// The two entity kinds the register stores.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Person,
  Family,
}

impl EntityKind {
  /// Name of the collection (table) holding this kind.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Person => "persons",
      Self::Family => "families",
    }
  }
}

/// A schemaless document: a flat JSON object of camelCase keys.
pub type Document = serde_json::Map<String, Value>;

/// A stored document together with its generated id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub id:     String,
  pub fields: Document,
}

impl Record {
  /// Decode into a typed entity. The id is injected under [`ID_KEY`].
  pub fn decode<T: DeserializeOwned>(self, kind: EntityKind) -> Result<T> {
    let Record { id, mut fields } = self;
    fields.insert(ID_KEY.to_owned(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields))
      .map_err(|source| Error::MalformedRecord { kind, id, source })
  }
}

/// Serialise `value` into a [`Document`]. Fails if it is not a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
  match serde_json::to_value(value)? {
    Value::Object(map) => Ok(map),
    other => Err(Error::Serialization(<serde_json::Error as serde::ser::Error>::custom(
      format!("expected a JSON object, got {other}"),
    ))),
  }
}

/// Prepare `fields` for insertion: drop any caller-supplied id and write
/// `createdAt == updatedAt == now`.
pub fn stamp(mut fields: Document, now: DateTime<Utc>) -> Document {
  fields.remove(ID_KEY);
  let at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
  fields.insert(CREATED_AT_KEY.to_owned(), Value::String(at.clone()));
  fields.insert(UPDATED_AT_KEY.to_owned(), Value::String(at));
  fields
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// An AND-combined set of `field == value` string-equality terms, as used by
/// [`EntityStore::find_by_exact_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMatch {
  terms: Vec<(String, String)>,
}

impl FieldMatch {
  pub fn new() -> Self { Self::default() }

  /// Add a term. Later terms for the same field do not replace earlier ones.
  pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.terms.push((name.into(), value.into()));
    self
  }

  pub fn terms(&self) -> &[(String, String)] { &self.terms }

  pub fn is_empty(&self) -> bool { self.terms.is_empty() }

  /// The first term whose field name is not a plain identifier.
  pub fn invalid_field(&self) -> Option<&str> {
    self
      .terms
      .iter()
      .map(|(name, _)| name.as_str())
      .find(|name| !is_valid_field_name(name))
  }

  /// Exact, case-sensitive comparison against string-valued fields. A
  /// missing or non-string field never matches.
  pub fn matches(&self, fields: &Document) -> bool {
    self
      .terms
      .iter()
      .all(|(name, value)| {
        fields.get(name).and_then(Value::as_str) == Some(value.as_str())
      })
  }
}

/// Field names are ASCII identifiers: letters, digits, underscore.
pub fn is_valid_field_name(name: &str) -> bool {
  !name.is_empty()
    && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document store backend.
///
/// Entities are written once and never updated or deleted. Each method is a
/// single remote call; nothing here groups calls into a transaction.
///
/// All methods return `Send` futures so the trait can be used behind
/// `axum` on a multi-threaded runtime.
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist `fields` as a new entity of `kind` and return its generated id.
  ///
  /// The store applies [`stamp`] and must fail rather than overwrite if the
  /// generated id already exists.
  fn insert(
    &self,
    kind: EntityKind,
    fields: Document,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Fetch one entity by id. `None` if absent.
  fn get_by_id<'a>(
    &'a self,
    kind: EntityKind,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// The first entity of `kind` matching every term of `predicate`.
  fn find_by_exact_fields<'a>(
    &'a self,
    kind: EntityKind,
    predicate: &'a FieldMatch,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// Every entity of `kind`, in no particular order.
  fn list_all(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;
}

fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

// ─── Typed reads ─────────────────────────────────────────────────────────────

/// Typed read helpers over any [`EntityStore`].
pub trait EntityStoreExt: EntityStore {
  fn get_person<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + 'a {
    async move {
      self
        .get_by_id(EntityKind::Person, id)
        .await
        .map_err(store_error)?
        .map(|record| record.decode(EntityKind::Person))
        .transpose()
    }
  }

  fn get_family<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Family>>> + Send + 'a {
    async move {
      self
        .get_by_id(EntityKind::Family, id)
        .await
        .map_err(store_error)?
        .map(|record| record.decode(EntityKind::Family))
        .transpose()
    }
  }

  fn list_persons(&self) -> impl Future<Output = Result<Vec<Person>>> + Send + '_ {
    async move {
      self
        .list_all(EntityKind::Person)
        .await
        .map_err(store_error)?
        .into_iter()
        .map(|record| record.decode(EntityKind::Person))
        .collect()
    }
  }

  fn list_families(&self) -> impl Future<Output = Result<Vec<Family>>> + Send + '_ {
    async move {
      self
        .list_all(EntityKind::Family)
        .await
        .map_err(store_error)?
        .into_iter()
        .map(|record| record.decode(EntityKind::Family))
        .collect()
    }
  }

  /// The first person whose `firstName` and `lastName` equal the arguments
  /// exactly.
  fn find_person_by_name<'a>(
    &'a self,
    first_name: &'a str,
    last_name: &'a str,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + 'a {
    async move {
      let predicate = FieldMatch::new()
        .field("firstName", first_name)
        .field("lastName", last_name);
      self
        .find_by_exact_fields(EntityKind::Person, &predicate)
        .await
        .map_err(store_error)?
        .map(|record| record.decode(EntityKind::Person))
        .transpose()
    }
  }
}

impl<S: EntityStore> EntityStoreExt for S {}

//! Error types for `kindred-core`.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use thiserror::Error;

use crate::store::EntityKind;

/// A boxed backend error, carried as the `source` of the service errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Per-field validation messages keyed by the camelCase form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, field: &str, message: impl Into<String>) {
    self.0.insert(field.to_owned(), message.into());
  }

  pub fn get(&self, field: &str) -> Option<&str> {
    self.0.get(field).map(String::as_str)
  }

  pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// `Ok(())` when nothing was recorded, otherwise
  /// [`Error::ValidationFailed`] carrying every message.
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(Error::ValidationFailed(self))
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (field, message)) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {message}")?;
    }
    Ok(())
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was blank or a field did not parse. Nothing was
  /// written.
  #[error("validation failed: {0}")]
  ValidationFailed(FieldErrors),

  /// The family lookup or insert failed; no person was written.
  #[error("family creation failed: {0}")]
  FamilyCreationFailed(#[source] BoxError),

  /// The final person insert failed. A family created earlier in the same
  /// registration is left in place.
  #[error("person persistence failed: {0}")]
  PersistenceFailed(#[source] BoxError),

  /// The stand-alone relative record could not be written.
  #[error("relative link failed: {0}")]
  RelativeLinkFailed(#[source] BoxError),

  /// A read against the store failed.
  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("malformed {kind} record {id}: {source}")]
  MalformedRecord {
    kind:   EntityKind,
    id:     String,
    source: serde_json::Error,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Stable taxonomy name, used by the API layer in error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::ValidationFailed(_) => "validation_failed",
      Self::FamilyCreationFailed(_) => "family_creation_failed",
      Self::PersistenceFailed(_) => "persistence_failed",
      Self::RelativeLinkFailed(_) => "relative_link_failed",
      Self::Store(_) => "store",
      Self::MalformedRecord { .. } => "malformed_record",
      Self::Serialization(_) => "serialization",
    }
  }

  /// The field messages of a [`Error::ValidationFailed`], if that is what
  /// this is.
  pub fn field_errors(&self) -> Option<&FieldErrors> {
    match self {
      Self::ValidationFailed(fields) => Some(fields),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

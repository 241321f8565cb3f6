//! Family — a named grouping persons reference by id — and the resolver that
//! picks or creates one for a new person.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
  Error, Result,
  normalize::non_blank,
  store::{Document, EntityKind, EntityStore, FieldMatch},
};

/// A persisted family. `name` is the surname it was created from; it is not
/// unique across families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
  pub id:         String,
  pub name:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// What to do when a person arrives with a surname but no family id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnMissingFamily {
  /// Always insert a new family, even if one with the same name exists.
  #[default]
  CreateNew,
  /// Reuse the first family whose name matches exactly; insert otherwise.
  FindOrCreateByName,
}

/// Resolves the `familyId` of a person being registered.
pub struct FamilyResolver<S> {
  store:  Arc<S>,
  policy: OnMissingFamily,
}

impl<S: EntityStore> FamilyResolver<S> {
  pub fn new(store: Arc<S>, policy: OnMissingFamily) -> Self {
    Self { store, policy }
  }

  /// Pick the family for a person.
  ///
  /// - A non-blank `family_id` is returned exactly as given, untrimmed and
  ///   without checking that the family exists.
  /// - Otherwise a non-blank `surname` yields a family per the configured
  ///   [`OnMissingFamily`] policy.
  /// - Otherwise the person is family-less and `None` is returned.
  ///
  /// Any store failure is reported as [`Error::FamilyCreationFailed`].
  pub async fn resolve_family(
    &self,
    family_id: Option<&str>,
    surname: Option<&str>,
  ) -> Result<Option<String>> {
    if let Some(id) = family_id.filter(|id| !id.trim().is_empty()) {
      debug!(family_id = id, "using caller-supplied family id");
      return Ok(Some(id.to_owned()));
    }

    let Some(surname) = non_blank(surname) else {
      debug!("no family id or surname; person stays family-less");
      return Ok(None);
    };

    if self.policy == OnMissingFamily::FindOrCreateByName {
      let predicate = FieldMatch::new().field("name", surname);
      let existing = self
        .store
        .find_by_exact_fields(EntityKind::Family, &predicate)
        .await
        .map_err(|e| {
          error!(surname, error = %e, "family lookup failed");
          Error::FamilyCreationFailed(Box::new(e))
        })?;
      if let Some(record) = existing {
        debug!(family_id = %record.id, surname, "reusing family with matching name");
        return Ok(Some(record.id));
      }
    }

    self.create_family(surname).await.map(Some)
  }

  /// Insert a new family named `name` unconditionally.
  pub async fn create_family(&self, name: &str) -> Result<String> {
    let mut fields = Document::new();
    fields.insert("name".to_owned(), Value::String(name.to_owned()));

    let id = self
      .store
      .insert(EntityKind::Family, fields)
      .await
      .map_err(|e| {
        error!(name, error = %e, "family insert failed");
        Error::FamilyCreationFailed(Box::new(e))
      })?;

    info!(family_id = %id, name, "family created");
    Ok(id)
  }
}

//! Relative links — father, mother and spouse references on a person.
//!
//! A link is one-directional and by name: the subject stores the relative's
//! display string. Linking a new relative materialises a bare stand-alone
//! [`Person`] for them, with no family and no back-reference to the subject.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
  Error, FieldErrors, Result,
  person::{Person, PersonProfile},
  store::{EntityKind, EntityStore, EntityStoreExt as _},
};

/// Relation labels offered to people filling in a form. Labels are free text;
/// this list is only a suggestion.
pub const RELATION_SUGGESTIONS: &[&str] = &[
  "Father",
  "Mother",
  "Son",
  "Daughter",
  "Brother",
  "Sister",
  "Husband",
  "Wife",
  "Grandfather",
  "Grandmother",
  "Uncle",
  "Aunt",
  "Cousin",
  "Friend",
  "Other",
];

/// Which relative slot of a person a link fills.
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
pub enum RelativeKind {
  Father,
  Mother,
  Spouse,
}

impl RelativeKind {
  pub const ALL: [Self; 3] = [Self::Father, Self::Mother, Self::Spouse];

  /// Document key holding the display name, e.g. `fatherName`.
  pub fn name_field(self) -> &'static str {
    match self {
      Self::Father => "fatherName",
      Self::Mother => "motherName",
      Self::Spouse => "spouseName",
    }
  }

  /// Document key holding the free-text relation label.
  pub fn relation_field(self) -> &'static str {
    match self {
      Self::Father => "fatherRelation",
      Self::Mother => "motherRelation",
      Self::Spouse => "spouseRelation",
    }
  }

  /// Document key holding the id of the matching person, when known.
  pub fn person_id_field(self) -> &'static str {
    match self {
      Self::Father => "fatherPersonId",
      Self::Mother => "motherPersonId",
      Self::Spouse => "spousePersonId",
    }
  }
}

/// A denormalised reference to a relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeRef {
  pub display_name:   String,
  pub relation_label: Option<String>,
  /// Set when the relative is known to correspond to a stored person.
  pub person_id:      Option<String>,
}

impl RelativeRef {
  /// A reference by display name only.
  pub fn named(display_name: impl Into<String>) -> Self {
    Self {
      display_name:   display_name.into(),
      relation_label: None,
      person_id:      None,
    }
  }

  pub fn with_relation(mut self, label: impl Into<String>) -> Self {
    self.relation_label = Some(label.into());
    self
  }

  pub fn with_person_id(mut self, id: impl Into<String>) -> Self {
    self.person_id = Some(id.into());
    self
  }

  pub fn is_linked(&self) -> bool { self.person_id.is_some() }
}

/// The outcome of [`RelationshipLinker::link_relative`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRelative {
  pub kind:         RelativeKind,
  /// `"first last"`, ready for the subject's `<kind>Name` field.
  pub display_name: String,
  /// Id of the stand-alone person just created.
  pub person_id:    String,
}

impl LinkedRelative {
  /// The reference to attach to the subject's submission.
  pub fn into_ref(self, relation_label: Option<String>) -> RelativeRef {
    RelativeRef {
      display_name: self.display_name,
      relation_label,
      person_id: Some(self.person_id),
    }
  }
}

/// `"first last"`.
pub fn display_name(first_name: &str, last_name: &str) -> String {
  format!("{first_name} {last_name}")
}

/// Creates stand-alone relative records and looks relatives up by name.
pub struct RelationshipLinker<S> {
  store: Arc<S>,
}

impl<S: EntityStore> RelationshipLinker<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Create a bare `Person { firstName, lastName }` for a relative and
  /// return the display name to attach to the subject.
  ///
  /// Both names are trimmed and must be non-blank; otherwise
  /// [`Error::ValidationFailed`] is returned and nothing is written. A store
  /// failure is reported as [`Error::RelativeLinkFailed`].
  pub async fn link_relative(
    &self,
    kind: RelativeKind,
    first_name: &str,
    last_name: &str,
  ) -> Result<LinkedRelative> {
    let first_name = first_name.trim();
    let last_name = last_name.trim();

    let mut errors = FieldErrors::new();
    if first_name.is_empty() {
      errors.insert("firstName", "First name is required");
    }
    if last_name.is_empty() {
      errors.insert("lastName", "Last name is required");
    }
    if let Err(e) = errors.into_result() {
      warn!(%kind, error = %e, "rejected relative");
      return Err(e);
    }

    let profile = PersonProfile {
      last_name: Some(last_name.to_owned()),
      ..PersonProfile::new(first_name)
    };

    let person_id = self
      .store
      .insert(EntityKind::Person, profile.to_document()?)
      .await
      .map_err(|e| {
        error!(%kind, error = %e, "relative insert failed");
        Error::RelativeLinkFailed(Box::new(e))
      })?;

    info!(%kind, person_id = %person_id, "relative person created");
    Ok(LinkedRelative {
      kind,
      display_name: display_name(first_name, last_name),
      person_id,
    })
  }

  /// The first stored person named exactly `first_name last_name`, after
  /// trimming both.
  pub async fn find_relative(
    &self,
    first_name: &str,
    last_name: &str,
  ) -> Result<Option<Person>> {
    self
      .store
      .find_person_by_name(first_name.trim(), last_name.trim())
      .await
  }

  /// Fill in `relative.person_id` from an exact name match, leaving the
  /// reference untouched when it is already linked or nothing matches.
  pub async fn reconcile(
    &self,
    relative: RelativeRef,
    first_name: &str,
    last_name: &str,
  ) -> Result<RelativeRef> {
    if relative.is_linked() {
      return Ok(relative);
    }
    Ok(match self.find_relative(first_name, last_name).await? {
      Some(person) => relative.with_person_id(person.id),
      None => relative,
    })
  }
}

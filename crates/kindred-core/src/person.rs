//! Person — the biographical record at the centre of the register.
//!
//! Relatives are held as denormalised display strings plus a free-text
//! relation label, optionally carrying the id of a matching [`Person`]. They
//! are not foreign keys; nothing keeps them in step with the named record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  relative::{RelativeKind, RelativeRef},
  store::{self, Document},
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Gender {
  Male,
  Female,
  Other,
  PreferNotToSay,
}

/// Everything stored about a person except the store-assigned id and
/// timestamps. This is the document written by
/// [`crate::store::EntityStore::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
  pub first_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub middle_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  /// Reference to a [`crate::family::Family`] by id; not ownership.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub family_id: Option<String>,

  // ── Background ──────────────────────────────────────────────────────────
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place_of_birth: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub city: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub zip_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub religion: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub language: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ethnicity: Option<String>,
  /// Stored as an ISO `YYYY-MM-DD` string.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub birth_date: Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender: Option<Gender>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub marital_status: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub occupation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tell_me_more: Option<String>,

  // ── Relatives ───────────────────────────────────────────────────────────
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub father_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub father_relation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub father_person_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mother_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mother_relation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mother_person_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spouse_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spouse_relation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spouse_person_id: Option<String>,
}

impl PersonProfile {
  /// A profile with only a first name.
  pub fn new(first_name: impl Into<String>) -> Self {
    Self { first_name: first_name.into(), ..Self::default() }
  }

  /// The typed reference for one relative slot. `None` when no display name
  /// is recorded.
  pub fn relative(&self, kind: RelativeKind) -> Option<RelativeRef> {
    let (name, relation, person_id) = match kind {
      RelativeKind::Father => {
        (&self.father_name, &self.father_relation, &self.father_person_id)
      }
      RelativeKind::Mother => {
        (&self.mother_name, &self.mother_relation, &self.mother_person_id)
      }
      RelativeKind::Spouse => {
        (&self.spouse_name, &self.spouse_relation, &self.spouse_person_id)
      }
    };
    name.as_ref().map(|display_name| RelativeRef {
      display_name:   display_name.clone(),
      relation_label: relation.clone(),
      person_id:      person_id.clone(),
    })
  }

  /// Replace one relative slot; `None` clears all three of its fields.
  pub fn set_relative(&mut self, kind: RelativeKind, relative: Option<RelativeRef>) {
    let (name, relation, person_id) = match kind {
      RelativeKind::Father => (
        &mut self.father_name,
        &mut self.father_relation,
        &mut self.father_person_id,
      ),
      RelativeKind::Mother => (
        &mut self.mother_name,
        &mut self.mother_relation,
        &mut self.mother_person_id,
      ),
      RelativeKind::Spouse => (
        &mut self.spouse_name,
        &mut self.spouse_relation,
        &mut self.spouse_person_id,
      ),
    };
    match relative {
      Some(r) => {
        *name = Some(r.display_name);
        *relation = r.relation_label;
        *person_id = r.person_id;
      }
      None => {
        *name = None;
        *relation = None;
        *person_id = None;
      }
    }
  }

  pub fn to_document(&self) -> Result<Document> { store::to_document(self) }
}

/// A persisted person. Never updated after creation, so `updated_at` always
/// equals `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         String,
  #[serde(flatten)]
  pub profile:    PersonProfile,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

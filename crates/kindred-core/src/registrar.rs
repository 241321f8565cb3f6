//! Person registration: validate a submission, resolve its family, persist.
//!
//! # Consistency
//!
//! Registration issues up to two independent writes: the family (when one
//! has to be created) and then the person. They are not atomic as a pair and
//! nothing is compensated. If the person insert fails after a family was
//! created, that family stays behind with no members. Concurrent
//! registrations are not serialised either; two submissions with the same
//! surname under [`OnMissingFamily::CreateNew`] each create their own family.
//!
//! [`OnMissingFamily::CreateNew`]: crate::family::OnMissingFamily::CreateNew

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
  Error, FieldErrors, Result,
  config::RegistryConfig,
  family::FamilyResolver,
  normalize::{clean, non_blank, null_as_empty},
  person::{Gender, PersonProfile},
  relative::{RelativeKind, RelativeRef},
  store::{EntityKind, EntityStore},
};

/// The raw form fields of one submission.
///
/// Immutable input to [`PersonRegistrar::register_person`]; the registrar
/// never modifies it, so a failed registration can be resubmitted as is.
/// Strings are taken verbatim and normalised during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonSubmission {
  #[serde(deserialize_with = "null_as_empty")]
  pub first_name:       String,
  pub last_name:        Option<String>,
  pub middle_name:      Option<String>,
  pub email:            Option<String>,
  pub family_id:        Option<String>,
  pub place_of_birth:   Option<String>,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub state:            Option<String>,
  pub zip_code:         Option<String>,
  pub country:          Option<String>,
  pub religion:         Option<String>,
  pub language:         Option<String>,
  pub ethnicity:        Option<String>,
  /// ISO `YYYY-MM-DD`.
  pub birth_date:       Option<String>,
  /// `male`, `female`, `other` or `prefer-not-to-say`; blank is unset.
  pub gender:           Option<String>,
  pub marital_status:   Option<String>,
  pub occupation:       Option<String>,
  pub tell_me_more:     Option<String>,
  pub father_name:      Option<String>,
  pub father_relation:  Option<String>,
  pub father_person_id: Option<String>,
  pub mother_name:      Option<String>,
  pub mother_relation:  Option<String>,
  pub mother_person_id: Option<String>,
  pub spouse_name:      Option<String>,
  pub spouse_relation:  Option<String>,
  pub spouse_person_id: Option<String>,
}

impl PersonSubmission {
  pub fn new(first_name: impl Into<String>) -> Self {
    Self { first_name: first_name.into(), ..Self::default() }
  }

  pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
    self.last_name = Some(last_name.into());
    self
  }

  pub fn with_family_id(mut self, family_id: impl Into<String>) -> Self {
    self.family_id = Some(family_id.into());
    self
  }

  /// Attach a relative reference, typically from
  /// [`crate::relative::LinkedRelative::into_ref`].
  pub fn with_relative(mut self, kind: RelativeKind, relative: RelativeRef) -> Self {
    let RelativeRef { display_name, relation_label, person_id } = relative;
    let slot = match kind {
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
    *slot.0 = Some(display_name);
    *slot.1 = relation_label;
    *slot.2 = person_id;
    self
  }

  /// The normalised relative in one slot. A slot without a non-blank display
  /// name is empty, whatever its label says.
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
    Some(RelativeRef {
      display_name:   clean(name.as_ref())?,
      relation_label: clean(relation.as_ref()),
      person_id:      clean(person_id.as_ref()),
    })
  }
}

/// Validates and persists persons.
pub struct PersonRegistrar<S> {
  store:    Arc<S>,
  families: FamilyResolver<S>,
  config:   RegistryConfig,
}

impl<S: EntityStore> PersonRegistrar<S> {
  pub fn new(store: Arc<S>, config: RegistryConfig) -> Self {
    let families = FamilyResolver::new(Arc::clone(&store), config.on_missing_family);
    Self { store, families, config }
  }

  pub fn families(&self) -> &FamilyResolver<S> { &self.families }

  /// Check a submission and build the profile it would store, without the
  /// family id. Performs no I/O.
  ///
  /// Every failing field is reported in one [`Error::ValidationFailed`].
  pub fn validate(&self, submission: &PersonSubmission) -> Result<PersonProfile> {
    let mut errors = FieldErrors::new();

    let first_name = submission.first_name.trim();
    if first_name.is_empty() {
      errors.insert("firstName", "First name is required");
    }

    let last_name = clean(submission.last_name.as_ref());
    if self.config.require_last_name && last_name.is_none() {
      errors.insert("lastName", "Last name is required");
    }

    let birth_date = match non_blank(submission.birth_date.as_deref()) {
      None => None,
      Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
          errors.insert("birthDate", "Birth date must be an ISO date (YYYY-MM-DD)");
          None
        }
      },
    };

    let gender = match non_blank(submission.gender.as_deref()) {
      None => None,
      Some(raw) => match raw.parse::<Gender>() {
        Ok(gender) => Some(gender),
        Err(_) => {
          errors.insert(
            "gender",
            "Gender must be one of male, female, other, prefer-not-to-say",
          );
          None
        }
      },
    };

    errors.into_result()?;

    let mut profile = PersonProfile {
      first_name: first_name.to_owned(),
      last_name,
      middle_name: clean(submission.middle_name.as_ref()),
      email: clean(submission.email.as_ref()),
      family_id: None,
      place_of_birth: clean(submission.place_of_birth.as_ref()),
      address: clean(submission.address.as_ref()),
      city: clean(submission.city.as_ref()),
      state: clean(submission.state.as_ref()),
      zip_code: clean(submission.zip_code.as_ref()),
      country: clean(submission.country.as_ref()),
      religion: clean(submission.religion.as_ref()),
      language: clean(submission.language.as_ref()),
      ethnicity: clean(submission.ethnicity.as_ref()),
      birth_date,
      gender,
      marital_status: clean(submission.marital_status.as_ref()),
      occupation: clean(submission.occupation.as_ref()),
      tell_me_more: clean(submission.tell_me_more.as_ref()),
      ..PersonProfile::default()
    };
    for kind in RelativeKind::ALL {
      profile.set_relative(kind, submission.relative(kind));
    }
    Ok(profile)
  }

  /// Register one person and return the new id.
  ///
  /// 1. Validate ([`Self::validate`]); on failure nothing is written.
  /// 2. Resolve the family from `familyId` and `lastName`; on failure the
  ///    registration aborts with [`Error::FamilyCreationFailed`].
  /// 3. Assemble the record with the resolved family id and any relatives
  ///    already attached to the submission.
  /// 4. Insert it; on failure [`Error::PersistenceFailed`] is returned and
  ///    no earlier write is undone.
  ///
  /// There is no idempotence: the same submission twice yields two persons.
  pub async fn register_person(&self, submission: &PersonSubmission) -> Result<String> {
    let mut profile = match self.validate(submission) {
      Ok(profile) => profile,
      Err(e) => {
        warn!(error = %e, "rejected person submission");
        return Err(e);
      }
    };

    profile.family_id = self
      .families
      .resolve_family(submission.family_id.as_deref(), profile.last_name.as_deref())
      .await?;

    let fields = profile.to_document()?;
    let person_id = self
      .store
      .insert(EntityKind::Person, fields)
      .await
      .map_err(|e| {
        error!(
          family_id = ?profile.family_id,
          error = %e,
          "person insert failed; family is not rolled back"
        );
        Error::PersistenceFailed(Box::new(e))
      })?;

    info!(person_id = %person_id, family_id = ?profile.family_id, "person registered");
    Ok(person_id)
  }
}

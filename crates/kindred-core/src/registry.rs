//! [`Registry`] — the single entry point the outer layers hold.

use std::sync::Arc;

use crate::{
  Result,
  config::RegistryConfig,
  family::Family,
  person::Person,
  registrar::{PersonRegistrar, PersonSubmission},
  relative::{LinkedRelative, RelationshipLinker, RelativeKind},
  store::{EntityStore, EntityStoreExt as _},
};

/// Bundles the registrar, family resolver and relationship linker over one
/// shared store.
///
/// Every method is an independent sequence of store calls. The registry
/// holds no state of its own beyond its configuration, takes no locks, and
/// never caches.
pub struct Registry<S> {
  store:     Arc<S>,
  registrar: PersonRegistrar<S>,
  linker:    RelationshipLinker<S>,
  config:    RegistryConfig,
}

impl<S: EntityStore> Registry<S> {
  pub fn new(store: Arc<S>, config: RegistryConfig) -> Self {
    Self {
      registrar: PersonRegistrar::new(Arc::clone(&store), config),
      linker: RelationshipLinker::new(Arc::clone(&store)),
      store,
      config,
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> &RegistryConfig { &self.config }

  pub fn registrar(&self) -> &PersonRegistrar<S> { &self.registrar }

  pub fn linker(&self) -> &RelationshipLinker<S> { &self.linker }

  // ── Writes ────────────────────────────────────────────────────────────

  /// See [`PersonRegistrar::register_person`].
  pub async fn register_person(&self, submission: &PersonSubmission) -> Result<String> {
    self.registrar.register_person(submission).await
  }

  /// See [`crate::family::FamilyResolver::resolve_family`].
  pub async fn resolve_family(
    &self,
    family_id: Option<&str>,
    surname: Option<&str>,
  ) -> Result<Option<String>> {
    self.registrar.families().resolve_family(family_id, surname).await
  }

  /// See [`RelationshipLinker::link_relative`].
  pub async fn link_relative(
    &self,
    kind: RelativeKind,
    first_name: &str,
    last_name: &str,
  ) -> Result<LinkedRelative> {
    self.linker.link_relative(kind, first_name, last_name).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get_person(&self, id: &str) -> Result<Option<Person>> {
    self.store.get_person(id).await
  }

  pub async fn get_family(&self, id: &str) -> Result<Option<Family>> {
    self.store.get_family(id).await
  }

  pub async fn list_persons(&self) -> Result<Vec<Person>> { self.store.list_persons().await }

  pub async fn list_families(&self) -> Result<Vec<Family>> {
    self.store.list_families().await
  }

  /// See [`RelationshipLinker::find_relative`].
  pub async fn find_relative(
    &self,
    first_name: &str,
    last_name: &str,
  ) -> Result<Option<Person>> {
    self.linker.find_relative(first_name, last_name).await
  }
}

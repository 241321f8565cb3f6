//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::DateTime;
use kindred_core::{
  Error as CoreError, Registry,
  config::RegistryConfig,
  family::OnMissingFamily,
  registrar::PersonSubmission,
  relative::RelativeKind,
  store::{
    CREATED_AT_KEY, Document, EntityKind, EntityStore, EntityStoreExt as _,
    FieldMatch, UPDATED_AT_KEY,
  },
};
use serde_json::json;

use crate::{Error, SqliteStore, encode::new_id};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person_fields(first: &str, last: &str) -> Document {
  let mut fields = Document::new();
  fields.insert("firstName".into(), json!(first));
  fields.insert("lastName".into(), json!(last));
  fields
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_is_versioned() {
  let s = store().await;
  assert_eq!(s.schema_version().await.unwrap(), crate::schema::SCHEMA_VERSION);
}

// ─── Insert and get ──────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_by_id() {
  let s = store().await;
  let id = s
    .insert(EntityKind::Person, person_fields("Jane", "Doe"))
    .await
    .unwrap();

  let record = s.get_by_id(EntityKind::Person, &id).await.unwrap().unwrap();
  assert_eq!(record.id, id);
  assert_eq!(record.fields["firstName"], json!("Jane"));
  assert_eq!(record.fields["lastName"], json!("Doe"));
}

#[tokio::test]
async fn insert_sets_equal_rfc3339_timestamps() {
  let s = store().await;
  let id = s
    .insert(EntityKind::Person, person_fields("Jane", "Doe"))
    .await
    .unwrap();

  let record = s.get_by_id(EntityKind::Person, &id).await.unwrap().unwrap();
  let created = record.fields[CREATED_AT_KEY].as_str().unwrap();
  assert_eq!(Some(created), record.fields[UPDATED_AT_KEY].as_str());
  assert!(DateTime::parse_from_rfc3339(created).is_ok());
}

#[tokio::test]
async fn caller_supplied_id_is_ignored() {
  let s = store().await;
  let mut fields = person_fields("Jane", "Doe");
  fields.insert("id".into(), json!("spoofed"));

  let id = s.insert(EntityKind::Person, fields).await.unwrap();
  assert_ne!(id, "spoofed");
  assert!(s.get_by_id(EntityKind::Person, "spoofed").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_row_id_is_rejected_not_overwritten() {
  let s = store().await;
  let id = new_id();
  let first = s
    .insert_row(EntityKind::Family, id.clone(), "t".into(), r#"{"name":"First"}"#.into())
    .await
    .unwrap();
  let second = s
    .insert_row(EntityKind::Family, id.clone(), "t".into(), r#"{"name":"Second"}"#.into())
    .await
    .unwrap();
  assert!(first);
  assert!(!second);

  let record = s.get_by_id(EntityKind::Family, &id).await.unwrap().unwrap();
  assert_eq!(record.fields["name"], json!("First"));
}

#[tokio::test]
async fn empty_field_name_is_rejected() {
  let s = store().await;
  let mut fields = Document::new();
  fields.insert(String::new(), json!("x"));
  let err = s.insert(EntityKind::Family, fields).await.unwrap_err();
  assert!(err.is_rejected());
}

#[tokio::test]
async fn get_by_id_is_scoped_to_kind() {
  let s = store().await;
  let id = s
    .insert(EntityKind::Person, person_fields("Jane", "Doe"))
    .await
    .unwrap();
  assert!(s.get_by_id(EntityKind::Family, &id).await.unwrap().is_none());
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_by_exact_fields_matches_all_terms() {
  let s = store().await;
  s.insert(EntityKind::Person, person_fields("Jane", "Roe")).await.unwrap();
  let target = s
    .insert(EntityKind::Person, person_fields("Jane", "Doe"))
    .await
    .unwrap();
  s.insert(EntityKind::Person, person_fields("John", "Doe")).await.unwrap();

  let predicate = FieldMatch::new().field("firstName", "Jane").field("lastName", "Doe");
  let found = s
    .find_by_exact_fields(EntityKind::Person, &predicate)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.id, target);
}

#[tokio::test]
async fn find_by_exact_fields_is_case_sensitive() {
  let s = store().await;
  s.insert(EntityKind::Person, person_fields("Jane", "Doe")).await.unwrap();

  let predicate = FieldMatch::new().field("firstName", "jane").field("lastName", "Doe");
  assert!(
    s.find_by_exact_fields(EntityKind::Person, &predicate)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn find_by_exact_fields_ignores_non_string_values() {
  let s = store().await;
  let mut fields = Document::new();
  fields.insert("name".into(), json!(7));
  s.insert(EntityKind::Family, fields).await.unwrap();

  let predicate = FieldMatch::new().field("name", "7");
  assert!(
    s.find_by_exact_fields(EntityKind::Family, &predicate)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn find_by_exact_fields_rejects_injection_in_field_names() {
  let s = store().await;
  let predicate = FieldMatch::new().field("name') = 1 OR ('1", "x");
  let err = s
    .find_by_exact_fields(EntityKind::Family, &predicate)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Rejected(_)));
}

#[tokio::test]
async fn list_all_returns_every_record_of_kind() {
  let s = store().await;
  for name in ["Smith", "Smith", "Jones"] {
    let mut fields = Document::new();
    fields.insert("name".into(), json!(name));
    s.insert(EntityKind::Family, fields).await.unwrap();
  }
  s.insert(EntityKind::Person, person_fields("Jane", "Doe")).await.unwrap();

  let mut names: Vec<String> = s
    .list_families()
    .await
    .unwrap()
    .into_iter()
    .map(|f| f.name)
    .collect();
  names.sort();
  assert_eq!(names, ["Jones", "Smith", "Smith"]);
  assert_eq!(s.list_all(EntityKind::Person).await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_document_is_rejected_on_read() {
  let s = store().await;
  let id = new_id();
  s.insert_row(EntityKind::Person, id.clone(), "t".into(), "[1, 2]".into())
    .await
    .unwrap();

  let err = s.get_by_id(EntityKind::Person, &id).await.unwrap_err();
  assert!(err.is_rejected());
}

// ─── Registry over SQLite ────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_registration_with_family() {
  let registry = Registry::new(Arc::new(store().await), RegistryConfig::default());

  let father = registry
    .link_relative(RelativeKind::Father, "Jane", "Doe")
    .await
    .unwrap();
  let submission = PersonSubmission::new("Alice")
    .with_last_name("Smith")
    .with_family_id("")
    .with_relative(RelativeKind::Father, father.into_ref(Some("Father".into())));

  let id = registry.register_person(&submission).await.unwrap();

  let families = registry.list_families().await.unwrap();
  assert_eq!(families.len(), 1);
  assert_eq!(families[0].name, "Smith");

  let person = registry.get_person(&id).await.unwrap().unwrap();
  assert_eq!(person.profile.family_id.as_deref(), Some(families[0].id.as_str()));
  assert_eq!(person.profile.father_name.as_deref(), Some("Jane Doe"));
  assert_eq!(person.created_at, person.updated_at);
  assert_eq!(registry.list_persons().await.unwrap().len(), 2);
}

#[tokio::test]
async fn find_or_create_by_name_reuses_sqlite_family() {
  let registry = Registry::new(
    Arc::new(store().await),
    RegistryConfig {
      on_missing_family: OnMissingFamily::FindOrCreateByName,
      ..RegistryConfig::default()
    },
  );
  let a = registry
    .register_person(&PersonSubmission::new("Alice").with_last_name("Smith"))
    .await
    .unwrap();
  let b = registry
    .register_person(&PersonSubmission::new("Bob").with_last_name("Smith"))
    .await
    .unwrap();

  let a = registry.get_person(&a).await.unwrap().unwrap();
  let b = registry.get_person(&b).await.unwrap().unwrap();
  assert_eq!(a.profile.family_id, b.profile.family_id);
  assert_eq!(registry.list_families().await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_first_name_writes_nothing() {
  let s = Arc::new(store().await);
  let registry = Registry::new(Arc::clone(&s), RegistryConfig::default());

  let err = registry
    .register_person(&PersonSubmission::new("").with_last_name("Smith"))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::ValidationFailed(_)));
  assert!(s.list_all(EntityKind::Person).await.unwrap().is_empty());
  assert!(s.list_all(EntityKind::Family).await.unwrap().is_empty());
}

#[tokio::test]
async fn records_survive_reopen() {
  let path = std::env::temp_dir().join(format!("kindred-test-{}.db", new_id()));

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert(EntityKind::Person, person_fields("Jane", "Doe")).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let person = s.get_person(&id).await.unwrap().unwrap();
  assert_eq!(person.profile.first_name, "Jane");
  drop(s);

  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}

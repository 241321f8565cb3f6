//! Router tests against a `MemoryStore`-backed registry.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use kindred_core::{
  Registry, config::RegistryConfig, memory::MemoryStore, store::EntityStoreExt as _,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

fn registry() -> Arc<Registry<MemoryStore>> {
  Arc::new(Registry::new(Arc::new(MemoryStore::new()), RegistryConfig::default()))
}

async fn send(
  registry: &Arc<Registry<MemoryStore>>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(Arc::clone(registry))
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, value)
}

// ── Submit ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_creates_family_and_person() {
  let registry = registry();
  let (status, body) = send(
    &registry,
    "POST",
    "/persons",
    Some(json!({ "firstName": "Alice", "lastName": "Smith", "familyId": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = body["id"].as_str().unwrap().to_owned();

  let (status, person) = send(&registry, "GET", &format!("/persons/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(person["firstName"], "Alice");
  assert_eq!(person["createdAt"], person["updatedAt"]);

  let (_, families) = send(&registry, "GET", "/families", None).await;
  let families = families.as_array().unwrap();
  assert_eq!(families.len(), 1);
  assert_eq!(families[0]["name"], "Smith");
  assert_eq!(person["familyId"], families[0]["id"]);
}

#[tokio::test]
async fn submit_with_blank_first_name_is_422_with_fields() {
  let registry = registry();
  let (status, body) = send(
    &registry,
    "POST",
    "/persons",
    Some(json!({ "firstName": "  ", "lastName": "Smith" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "validation_failed");
  assert_eq!(body["fields"]["firstName"], "First name is required");

  assert!(registry.store().list_persons().await.unwrap().is_empty());
  assert!(registry.store().list_families().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_person_is_404() {
  let registry = registry();
  let (status, body) = send(&registry, "GET", "/persons/missing", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn submit_with_unselected_gender_is_accepted() {
  let registry = registry();
  let (status, body) = send(
    &registry,
    "POST",
    "/persons",
    Some(json!({ "firstName": "Alice", "lastName": "Smith", "gender": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let id = body["id"].as_str().unwrap();
  let (_, person) = send(&registry, "GET", &format!("/persons/{id}"), None).await;
  assert!(person.get("gender").is_none());
}

#[tokio::test]
async fn submit_with_unknown_gender_is_422_with_fields() {
  let registry = registry();
  let (status, body) = send(
    &registry,
    "POST",
    "/persons",
    Some(json!({ "firstName": "Alice", "gender": "unknown" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "validation_failed");
  assert!(body["fields"]["gender"].is_string());
  assert!(registry.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn submit_with_null_first_name_is_422_with_fields() {
  let registry = registry();
  let (status, body) =
    send(&registry, "POST", "/persons", Some(json!({ "firstName": null }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "validation_failed");
  assert!(body["fields"]["firstName"].is_string());
}

#[tokio::test]
async fn malformed_body_is_classified_json() {
  let registry = registry();
  let (status, body) =
    send(&registry, "POST", "/persons", Some(json!({ "firstName": 42 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "invalid_body");
  assert!(body["error"].is_string());

  let (status, body) = send(&registry, "POST", "/persons", None).await;
  assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert_eq!(body["kind"], "invalid_body");
  assert!(registry.list_persons().await.unwrap().is_empty());
}

// ── Relatives ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_relative_then_submit() {
  let registry = registry();
  let (status, linked) = send(
    &registry,
    "POST",
    "/relatives",
    Some(json!({ "kind": "father", "firstName": "Jane", "lastName": "Doe" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(linked["displayName"], "Jane Doe");
  assert_eq!(linked["kind"], "father");

  let (status, created) = send(
    &registry,
    "POST",
    "/persons",
    Some(json!({
      "firstName": "Alice",
      "fatherName": linked["displayName"],
      "fatherRelation": "Father",
      "fatherPersonId": linked["personId"],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let uri = format!("/persons/{}", created["id"].as_str().unwrap());
  let (_, person) = send(&registry, "GET", &uri, None).await;
  assert_eq!(person["fatherName"], "Jane Doe");
  assert_eq!(person["fatherPersonId"], linked["personId"]);
  assert!(person.get("familyId").is_none());

  let (_, persons) = send(&registry, "GET", "/persons", None).await;
  assert_eq!(persons.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn add_relative_with_blank_name_is_422() {
  let registry = registry();
  let (status, body) = send(
    &registry,
    "POST",
    "/relatives",
    Some(json!({ "kind": "spouse", "firstName": "Sam" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["fields"].get("lastName").is_some());
}

#[tokio::test]
async fn lookup_finds_exact_name() {
  let registry = registry();
  let (_, linked) = send(
    &registry,
    "POST",
    "/relatives",
    Some(json!({ "kind": "mother", "firstName": "Mary", "lastName": "Major" })),
  )
  .await;

  let (status, person) =
    send(&registry, "GET", "/persons/lookup?firstName=Mary&lastName=Major", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(person["id"], linked["personId"]);

  let (status, _) =
    send(&registry, "GET", "/persons/lookup?firstName=Mary&lastName=Minor", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookup_without_last_name_is_invalid_query() {
  let registry = registry();
  let (status, body) =
    send(&registry, "GET", "/persons/lookup?firstName=Mary", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "invalid_query");
}

#[tokio::test]
async fn relation_suggestions_are_listed() {
  let registry = registry();
  let (status, body) = send(&registry, "GET", "/relations", None).await;
  assert_eq!(status, StatusCode::OK);
  let labels: Vec<&str> =
    body.as_array().unwrap().iter().filter_map(Value::as_str).collect();
  assert_eq!(labels.len(), 15);
  assert_eq!(labels.first(), Some(&"Father"));
  assert!(labels.contains(&"Grandmother"));
  assert_eq!(labels.last(), Some(&"Other"));
}

// ── Families ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_family_by_id() {
  let registry = registry();
  let family_id = registry.resolve_family(None, Some("Jones")).await.unwrap().unwrap();

  let (status, family) =
    send(&registry, "GET", &format!("/families/{family_id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(family["name"], "Jones");

  let (status, _) = send(&registry, "GET", "/families/nope", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/persons` | Body: [`PersonSubmission`] form fields; returns 201 + `{"id": ...}` |
//! | `GET`  | `/persons` | All persons, unordered |
//! | `GET`  | `/persons/lookup` | `?firstName=&lastName=`; exact match, 404 if none |
//! | `GET`  | `/persons/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{
  Registry, person::Person, registrar::PersonSubmission, store::EntityStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Created {
  pub id: String,
}

/// `POST /persons` — returns 201 + `{"id": "<person id>"}`.
pub async fn create<S>(
  State(registry): State<Arc<Registry<S>>>,
  ApiJson(body): ApiJson<PersonSubmission>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EntityStore + 'static,
{
  let id = registry.register_person(&body).await?;
  Ok((StatusCode::CREATED, Json(Created { id })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /persons`
pub async fn list<S>(
  State(registry): State<Arc<Registry<S>>>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: EntityStore + 'static,
{
  Ok(Json(registry.list_persons().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(registry): State<Arc<Registry<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: EntityStore + 'static,
{
  let person = registry
    .get_person(&id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Lookup by name ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupParams {
  pub first_name: String,
  pub last_name:  String,
}

/// `GET /persons/lookup?firstName=<first>&lastName=<last>`
pub async fn lookup<S>(
  State(registry): State<Arc<Registry<S>>>,
  ApiQuery(params): ApiQuery<LookupParams>,
) -> Result<Json<Person>, ApiError>
where
  S: EntityStore + 'static,
{
  let person = registry
    .find_relative(&params.first_name, &params.last_name)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no person named {} {}",
        params.first_name.trim(),
        params.last_name.trim()
      ))
    })?;
  Ok(Json(person))
}

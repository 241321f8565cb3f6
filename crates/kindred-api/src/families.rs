//! Handlers for `/families` endpoints. Families are created only as a side
//! effect of registering a person, so there is no `POST`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kindred_core::{Registry, family::Family, store::EntityStore};

use crate::error::ApiError;

/// `GET /families`
pub async fn list<S>(
  State(registry): State<Arc<Registry<S>>>,
) -> Result<Json<Vec<Family>>, ApiError>
where
  S: EntityStore + 'static,
{
  Ok(Json(registry.list_families().await?))
}

/// `GET /families/:id`
pub async fn get_one<S>(
  State(registry): State<Arc<Registry<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Family>, ApiError>
where
  S: EntityStore + 'static,
{
  let family = registry
    .get_family(&id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("family {id} not found")))?;
  Ok(Json(family))
}

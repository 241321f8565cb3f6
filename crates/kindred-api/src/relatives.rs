//! Handlers for `POST /relatives` and `GET /relations`.
//!
//! `POST /relatives` creates the stand-alone person record for a father, mother or spouse the
//! caller chose to "add new", before the main submission. The response's
//! `displayName` (and `personId`) go into the later `POST /persons` body.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kindred_core::{
  Registry,
  relative::{RELATION_SUGGESTIONS, RelativeKind},
  store::EntityStore,
};
use serde::Deserialize;

use crate::{error::ApiError, extract::ApiJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRelativeBody {
  pub kind:       RelativeKind,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
}

/// `POST /relatives` — body: `{"kind":"father","firstName":"Jane","lastName":"Doe"}`;
/// returns 201 + [`kindred_core::relative::LinkedRelative`].
pub async fn create<S>(
  State(registry): State<Arc<Registry<S>>>,
  ApiJson(body): ApiJson<AddRelativeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EntityStore + 'static,
{
  let linked = registry
    .link_relative(body.kind, &body.first_name, &body.last_name)
    .await?;
  Ok((StatusCode::CREATED, Json(linked)))
}

/// `GET /relations` — the suggested relation labels, in picker order.
pub async fn suggestions() -> Json<&'static [&'static str]> { Json(RELATION_SUGGESTIONS) }

//! JSON REST API for Kindred.
//!
//! Exposes an axum [`Router`] backed by a [`Registry`] over any
//! [`EntityStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kindred_api::api_router(registry.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod families;
pub mod persons;
pub mod relatives;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use kindred_core::{Registry, store::EntityStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(registry: Arc<Registry<S>>) -> Router<()>
where
  S: EntityStore + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route("/persons/lookup", get(persons::lookup::<S>))
    .route("/persons/{id}", get(persons::get_one::<S>))
    // Relatives
    .route("/relatives", post(relatives::create::<S>))
    .route("/relations", get(relatives::suggestions))
    // Families
    .route("/families", get(families::list::<S>))
    .route("/families/{id}", get(families::get_one::<S>))
    .with_state(registry)
}

#[cfg(test)]
mod tests;

//! Core types and services for the Kindred family register.
//!
//! A [`person::Person`] is a biographical record that may reference a
//! [`family::Family`] by id and name its father, mother and spouse by free
//! text. This crate owns the write path (validation, family resolution,
//! relative linking) and the [`store::EntityStore`] seam that backends
//! implement. It has no HTTP or database dependencies.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures instead.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod family;
pub mod memory;
pub mod person;
pub mod registrar;
pub mod registry;
pub mod relative;
pub mod store;

mod normalize;

pub use error::{Error, FieldErrors, Result};
pub use registry::Registry;

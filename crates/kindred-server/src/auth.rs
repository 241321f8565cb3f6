//! HTTP Basic-auth write gate.
//!
//! Reads are open. Any other method must carry credentials matching the
//! configured [`AuthConfig`]. With no `AuthConfig` the gate lets everything
//! through.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use crate::error::Error;

/// Credentials accepted as valid for writes on this server instance.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The `user:password` pair of a `Basic` `Authorization` header, if the
/// header is present and well formed.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, encoded) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return None;
  }
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Check the request's Basic credentials against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let (username, password) = basic_credentials(headers).ok_or(Error::Unauthorized)?;
  if username != config.username {
    return Err(Error::Unauthorized);
  }
  PasswordHash::new(&config.password_hash)
    .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
    .map_err(|_| Error::Unauthorized)
}

fn is_read(method: &Method) -> bool {
  matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Middleware: reject unauthenticated writes with 401.
pub async fn write_gate(
  State(auth): State<Option<Arc<AuthConfig>>>,
  req: Request,
  next: Next,
) -> Response {
  if let Some(auth) = auth.as_deref()
    && !is_read(req.method())
    && let Err(e) = verify_auth(req.headers(), auth)
  {
    tracing::warn!(method = %req.method(), uri = %req.uri(), "rejected unauthenticated write");
    return e.into_response();
  }
  next.run(req).await
}

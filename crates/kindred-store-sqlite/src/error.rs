//! Error type for `kindred-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The database could not be reached or the statement failed to run.
  #[error("database unavailable: {0}")]
  Unavailable(#[from] tokio_rusqlite::Error),

  /// The document or query was refused: duplicate id, bad field name,
  /// stored text that is not a JSON object.
  #[error("document rejected: {0}")]
  Rejected(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// `true` for failures caused by the input rather than the database.
  pub fn is_rejected(&self) -> bool { matches!(self, Self::Rejected(_) | Self::Json(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

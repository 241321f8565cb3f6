//! Encoding and decoding between [`Document`]s and the text stored in the
//! `doc` column.
//!
//! Documents are stored as compact JSON objects. Timestamps are RFC 3339
//! strings, both in the document and in the `created_at` / `updated_at`
//! columns. Ids are hyphenated lowercase UUIDs.

use chrono::{DateTime, SecondsFormat, Utc};
use kindred_core::store::{Document, Record};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

pub fn new_id() -> String { Uuid::new_v4().hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn encode_document(fields: &Document) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn decode_document(text: &str) -> Result<Document> {
  match serde_json::from_str(text)? {
    Value::Object(map) => Ok(map),
    other => Err(Error::Rejected(format!(
      "stored document is not a JSON object: {other}"
    ))),
  }
}

/// `$.field` JSON path for `json_extract`. Caller has validated the name.
pub fn json_path(field: &str) -> String { format!("$.{field}") }

/// Raw strings read directly from a `persons` or `families` row.
pub struct RawRecord {
  pub id:  String,
  pub doc: String,
}

impl RawRecord {
  pub fn into_record(self) -> Result<Record> {
    Ok(Record { fields: decode_document(&self.doc)?, id: self.id })
  }
}

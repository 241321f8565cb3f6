//! Behavioural switches for the registry.

use serde::Deserialize;

use crate::family::OnMissingFamily;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
  /// Family handling for persons submitted with a surname but no family id.
  pub on_missing_family: OnMissingFamily,
  /// Also require a non-blank `lastName` on registration.
  pub require_last_name: bool,
}

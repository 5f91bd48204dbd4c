//! # Registry Status
//!
//! Status types for tracking the lifecycle phase of a `Registry`.

use schemars::{Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle stage of a `Registry`
///
/// Phases only ever move forward: Pending -> Running -> Deleting.
/// A persisted value outside that set is kept verbatim in `Unknown` so the
/// object still decodes and the reconciler can refuse to act on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistryPhase {
    /// Children are being created
    #[default]
    Pending,
    /// Children exist, waiting for a delete request
    Running,
    /// Children are being torn down
    Deleting,
    /// Unrecognized persisted value
    Unknown(String),
}

impl RegistryPhase {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RegistryPhase::Pending => "Pending",
            RegistryPhase::Running => "Running",
            RegistryPhase::Deleting => "Deleting",
            RegistryPhase::Unknown(value) => value,
        }
    }
}

impl From<String> for RegistryPhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => RegistryPhase::Pending,
            "Running" => RegistryPhase::Running,
            "Deleting" => RegistryPhase::Deleting,
            _ => RegistryPhase::Unknown(value),
        }
    }
}

impl From<RegistryPhase> for String {
    fn from(phase: RegistryPhase) -> Self {
        match phase {
            RegistryPhase::Unknown(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RegistryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn phase_schema(_gen: &mut SchemaGenerator) -> Schema {
    let schema_value = serde_json::json!({
        "type": "string",
        "enum": ["Pending", "Running", "Deleting"],
        "default": "Pending",
        "description": "Current lifecycle phase of the registry."
    });
    Schema::try_from(schema_value).expect("Failed to create Schema for RegistryPhase")
}

/// Status of the Registry resource
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatus {
    /// Current phase of the registry lifecycle
    #[serde(default)]
    #[schemars(schema_with = "phase_schema")]
    pub phase: RegistryPhase,
}

//! # Registry Spec
//!
//! The `Registry` custom resource and its storage selection.
//!
//! ```yaml
//! apiVersion: registry-operator.dev/v1alpha1
//! kind: Registry
//! metadata:
//!   name: my-registry
//!   namespace: default
//! spec:
//!   storage:
//!     type: inmemory
//! ```

use crate::crd::status::{RegistryPhase, RegistryStatus};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::CustomResourceExt;
use kube::{CustomResource, ResourceExt};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Registry Custom Resource Definition
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, PartialEq, JsonSchema)]
#[kube(
    kind = "Registry",
    group = "registry-operator.dev",
    version = "v1alpha1",
    namespaced,
    status = "RegistryStatus",
    shortname = "reg",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase", "description":"The current phase of the registry"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySpec {
    /// Storage backend for the registry
    #[serde(default)]
    pub storage: Storage,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
pub struct Storage {
    /// Storage driver. Unset until the API server has applied defaults.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_storage_type",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(schema_with = "storage_type_schema")]
    pub storage_type: Option<StorageType>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage_type: Some(StorageType::InMemory),
        }
    }
}

/// Storage driver selector
///
/// Only `inmemory` is supported. Other values are kept so the pod builder can
/// report exactly what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageType {
    InMemory,
    Unsupported(String),
}

impl StorageType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            StorageType::InMemory => "inmemory",
            StorageType::Unsupported(value) => value,
        }
    }
}

impl From<String> for StorageType {
    fn from(value: String) -> Self {
        if value == "inmemory" {
            StorageType::InMemory
        } else {
            StorageType::Unsupported(value)
        }
    }
}

impl From<&str> for StorageType {
    fn from(value: &str) -> Self {
        StorageType::from(value.to_string())
    }
}

impl From<StorageType> for String {
    fn from(storage_type: StorageType) -> Self {
        match storage_type {
            StorageType::InMemory => "inmemory".to_string(),
            StorageType::Unsupported(value) => value,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// An empty string is what a half-defaulted object carries, so it reads as unset.
fn deserialize_storage_type<'de, D>(deserializer: D) -> Result<Option<StorageType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()).map(StorageType::from))
}

fn storage_type_schema(_gen: &mut SchemaGenerator) -> Schema {
    let schema_value = serde_json::json!({
        "type": "string",
        "enum": ["inmemory"],
        "default": "inmemory",
        "description": "Storage driver used by the registry."
    });
    Schema::try_from(schema_value).expect("Failed to create Schema for StorageType")
}

/// Identity of a `Registry`: everything a reconciliation is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey {
    pub namespace: String,
    pub name: String,
}

impl RegistryKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl Registry {
    /// The CRD as installed in the cluster
    ///
    /// A `Registry` applied without `spec`, or without `spec.storage`, is
    /// defaulted by the API server to in-memory storage. The derived schema
    /// marks `spec` required and carries no usable default for `storage`, so
    /// both are patched in here.
    pub fn defaulted_crd() -> Result<CustomResourceDefinition, serde_json::Error> {
        let spec_default = serde_json::to_value(RegistrySpec {
            storage: Storage::in_memory(),
        })?;
        let storage_default = serde_json::to_value(Storage::in_memory())?;

        let mut crd = serde_json::to_value(Registry::crd())?;
        let versions = crd
            .pointer_mut("/spec/versions")
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten();
        for version in versions {
            let Some(root) = version
                .pointer_mut("/schema/openAPIV3Schema")
                .and_then(Value::as_object_mut)
            else {
                continue;
            };

            let required_empty = root
                .get_mut("required")
                .and_then(Value::as_array_mut)
                .is_some_and(|required| {
                    required.retain(|field| field != "spec");
                    required.is_empty()
                });
            if required_empty {
                root.remove("required");
            }

            let spec = root
                .get_mut("properties")
                .and_then(|properties| properties.get_mut("spec"));
            if let Some(spec) = spec.and_then(Value::as_object_mut) {
                spec.insert("default".to_string(), spec_default.clone());
                let storage = spec
                    .get_mut("properties")
                    .and_then(|properties| properties.get_mut("storage"))
                    .and_then(Value::as_object_mut);
                if let Some(storage) = storage {
                    storage.insert("default".to_string(), storage_default.clone());
                }
            }
        }
        serde_json::from_value(crd)
    }

    /// Recorded phase; a registry without status is Pending
    #[must_use]
    pub fn phase(&self) -> RegistryPhase {
        self.status
            .as_ref()
            .map(|status| status.phase.clone())
            .unwrap_or_default()
    }

    pub fn set_phase(&mut self, phase: RegistryPhase) {
        self.status.get_or_insert_with(RegistryStatus::default).phase = phase;
    }

    /// True once the owner has asked for the object to be deleted
    #[must_use]
    pub fn is_deletion_requested(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    #[must_use]
    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.finalizers().iter().any(|f| f == finalizer)
    }

    /// Name and namespace, if both are set
    #[must_use]
    pub fn key(&self) -> Option<RegistryKey> {
        let name = self.metadata.name.as_deref()?;
        let namespace = self.metadata.namespace.as_deref()?;
        Some(RegistryKey::new(namespace, name))
    }
}

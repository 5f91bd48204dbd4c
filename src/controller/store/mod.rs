//! # Object Store
//!
//! The narrow slice of the Kubernetes API the operator depends on.
//!
//! Everything that reads or writes cluster state goes through [`ObjectStore`],
//! so the reconciler can run against the real API server ([`KubeStore`]) or a
//! process-local substitute ([`InMemoryStore`]).

mod kube_store;
mod memory;

pub use kube_store::KubeStore;
pub use memory::{InMemoryStore, StoreCall, Verb};

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use thiserror::Error;

/// A namespaced, serializable Kubernetes object the store can persist
pub trait StoredObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Kind name of a stored object type, e.g. `Pod`
pub fn kind_of<K: StoredObject>() -> String {
    K::kind(&()).into_owned()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },
    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: String,
        namespace: String,
        name: String,
    },
    #[error("conflict writing {kind} {namespace}/{name}: {message}")]
    Conflict {
        kind: String,
        namespace: String,
        name: String,
        message: String,
    },
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },
    #[error("Kubernetes client error: {0}")]
    Kube(#[source] kube::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{kind} is missing metadata.{field}")]
    MissingMetadata { kind: String, field: &'static str },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// The one error callers may treat as "absent" rather than as a failure
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Generic object store
///
/// Operations are keyed by namespace and name. `update` writes metadata and spec,
/// `update_status` writes only the status subresource.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<K, StoreError>;

    async fn list<K: StoredObject>(
        &self,
        namespace: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<K>, StoreError>;

    async fn create<K: StoredObject>(&self, object: &K) -> Result<K, StoreError>;

    async fn update<K: StoredObject>(&self, object: &K) -> Result<K, StoreError>;

    async fn update_status<K: StoredObject>(&self, object: &K) -> Result<K, StoreError>;

    async fn delete<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<(), StoreError>;
}

/// Namespace and name of an object about to be written
pub(crate) fn object_ref<K: StoredObject>(object: &K) -> Result<(String, String), StoreError> {
    let meta = object.meta();
    let namespace = meta
        .namespace
        .clone()
        .ok_or_else(|| StoreError::MissingMetadata {
            kind: kind_of::<K>(),
            field: "namespace",
        })?;
    let name = meta.name.clone().ok_or_else(|| StoreError::MissingMetadata {
        kind: kind_of::<K>(),
        field: "name",
    })?;
    Ok((namespace, name))
}

/// Render a label map as a Kubernetes equality selector
pub(crate) fn label_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

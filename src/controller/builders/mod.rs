//! # Child Resource Builders
//!
//! Pure functions turning a `Registry` into the concrete objects it owns.
//!
//! - `configmap.rs` - the registry configuration file
//! - `pod.rs` - the registry workload

mod configmap;
mod pod;

pub use configmap::build_config_map;
pub use pod::build_pod;

use crate::constants::{APP_LABEL_KEY, APP_LABEL_VALUE, REGISTRY_LABEL_KEY};
use crate::crd::Registry;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("storage type {0} not supported")]
    UnsupportedStorageType(String),
    #[error("storage type is not set")]
    StorageTypeUnset,
}

/// Labels carried by every child of `registry`
#[must_use]
pub fn child_labels(registry: &Registry) -> BTreeMap<String, String> {
    BTreeMap::from([
        (APP_LABEL_KEY.to_string(), APP_LABEL_VALUE.to_string()),
        (REGISTRY_LABEL_KEY.to_string(), registry.name_any()),
    ])
}

/// Children share the registry's name and namespace
fn child_metadata(registry: &Registry) -> ObjectMeta {
    ObjectMeta {
        name: Some(registry.name_any()),
        namespace: registry.namespace(),
        labels: Some(child_labels(registry)),
        ..ObjectMeta::default()
    }
}

//! # Registry Operations
//!
//! Named, idempotent operations on a `Registry` and its children.
//!
//! This is the only place that talks to the [`ObjectStore`]. Every operation is
//! keyed by the registry's namespace and name: children are named after the
//! registry, so "does it exist?" is always a plain lookup.
//!
//! Mutations of the registry itself write the stored copy back into the
//! caller's object so the next write carries the fresh `resourceVersion`.

use crate::constants::REGISTRY_FINALIZER;
use crate::controller::builders::{build_config_map, build_pod, child_labels, BuildError};
use crate::controller::store::{kind_of, ObjectStore, StoreError, StoredObject};
use crate::crd::{Registry, RegistryKey};
use crate::observability::metrics;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::ResourceExt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Names of the children currently labelled as belonging to a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildResources {
    pub pods: Vec<String>,
    pub config_maps: Vec<String>,
}

#[derive(Debug)]
pub struct RegistryOperations<S> {
    store: Arc<S>,
}

impl<S> Clone for RegistryOperations<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ObjectStore> RegistryOperations<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load a registry; `Ok(None)` when it no longer exists
    pub async fn get_registry(&self, key: &RegistryKey) -> Result<Option<Registry>, StoreError> {
        match self.store.get::<Registry>(&key.namespace, &key.name).await {
            Ok(registry) => Ok(Some(registry)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn child_exists<K: StoredObject>(&self, registry: &Registry) -> Result<bool, StoreError> {
        let (namespace, name) = identity(registry);
        info!(
            "Checking if {} exists for registry {}/{}",
            kind_of::<K>(),
            namespace,
            name
        );
        match self.store.get::<K>(&namespace, &name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete a child; one that is already gone counts as deleted
    async fn delete_child<K: StoredObject>(&self, registry: &Registry) -> Result<(), StoreError> {
        let (namespace, name) = identity(registry);
        info!("Deleting {} for registry {}/{}", kind_of::<K>(), namespace, name);
        match self.store.delete::<K>(&namespace, &name).await {
            Ok(()) => {
                metrics::increment_child_operations(&kind_of::<K>(), "delete");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(
                    "{} for registry {}/{} already gone",
                    kind_of::<K>(),
                    namespace,
                    name
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn config_map_exists(&self, registry: &Registry) -> Result<bool, StoreError> {
        self.child_exists::<ConfigMap>(registry).await
    }

    pub async fn create_config_map(&self, registry: &Registry) -> Result<(), StoreError> {
        let (namespace, name) = identity(registry);
        info!("Creating ConfigMap for registry {}/{}", namespace, name);
        self.store.create(&build_config_map(registry)).await?;
        metrics::increment_child_operations("ConfigMap", "create");
        Ok(())
    }

    pub async fn delete_config_map(&self, registry: &Registry) -> Result<(), StoreError> {
        self.delete_child::<ConfigMap>(registry).await
    }

    pub async fn pod_exists(&self, registry: &Registry) -> Result<bool, StoreError> {
        self.child_exists::<Pod>(registry).await
    }

    pub async fn get_pod(&self, registry: &Registry) -> Result<Pod, StoreError> {
        let (namespace, name) = identity(registry);
        self.store.get::<Pod>(&namespace, &name).await
    }

    /// Build and create the registry pod
    ///
    /// Fails with [`BuildError`] before touching the store when the storage
    /// type is not supported.
    pub async fn create_pod(&self, registry: &Registry) -> Result<(), OperationError> {
        let pod = build_pod(registry)?;
        let (namespace, name) = identity(registry);
        info!("Creating pod for registry {}/{}", namespace, name);
        self.store.create(&pod).await?;
        metrics::increment_child_operations("Pod", "create");
        Ok(())
    }

    pub async fn delete_pod(&self, registry: &Registry) -> Result<(), StoreError> {
        self.delete_child::<Pod>(registry).await
    }

    /// Children found by label rather than by name
    pub async fn list_children(&self, registry: &Registry) -> Result<ChildResources, StoreError> {
        let (namespace, _) = identity(registry);
        let labels = child_labels(registry);
        let pods = self.store.list::<Pod>(&namespace, &labels).await?;
        let config_maps = self.store.list::<ConfigMap>(&namespace, &labels).await?;
        Ok(ChildResources {
            pods: pods.iter().map(ResourceExt::name_any).collect(),
            config_maps: config_maps.iter().map(ResourceExt::name_any).collect(),
        })
    }

    #[must_use]
    pub fn has_finalizer(&self, registry: &Registry) -> bool {
        registry.has_finalizer(REGISTRY_FINALIZER)
    }

    /// Add the finalizer; no write when it is already present
    pub async fn add_finalizer(&self, registry: &mut Registry) -> Result<(), StoreError> {
        if self.has_finalizer(registry) {
            return Ok(());
        }
        let (namespace, name) = identity(registry);
        info!("Adding finalizer to registry {}/{}", namespace, name);
        registry
            .finalizers_mut()
            .push(REGISTRY_FINALIZER.to_string());
        *registry = self.store.update(&*registry).await?;
        Ok(())
    }

    /// Remove the finalizer; no write when it is already absent
    pub async fn remove_finalizer(&self, registry: &mut Registry) -> Result<(), StoreError> {
        if !self.has_finalizer(registry) {
            return Ok(());
        }
        let (namespace, name) = identity(registry);
        info!("Removing finalizer from registry {}/{}", namespace, name);
        registry
            .finalizers_mut()
            .retain(|finalizer| finalizer != REGISTRY_FINALIZER);
        *registry = self.store.update(&*registry).await?;
        Ok(())
    }

    pub async fn update_status(&self, registry: &mut Registry) -> Result<(), StoreError> {
        let (namespace, name) = identity(registry);
        info!(
            "Updating status of registry {}/{} (phase {})",
            namespace,
            name,
            registry.phase()
        );
        *registry = self.store.update_status(&*registry).await?;
        Ok(())
    }
}

fn identity(registry: &Registry) -> (String, String) {
    (
        registry.namespace().unwrap_or_default(),
        registry.name_any(),
    )
}

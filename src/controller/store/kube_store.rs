//! # Kubernetes Store
//!
//! [`ObjectStore`] backed by the Kubernetes API server.

use super::{kind_of, label_selector, object_ref, ObjectStore, StoreError, StoredObject};
use crate::constants::CONTROLLER_NAME;
use async_trait::async_trait;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::Client;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: StoredObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Classify an API failure; only 404 becomes `NotFound`
fn map_error<K: StoredObject>(
    error: kube::Error,
    namespace: &str,
    name: &str,
    creating: bool,
) -> StoreError {
    match error {
        kube::Error::Api(api_err) if api_err.code == 404 => StoreError::NotFound {
            kind: kind_of::<K>(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(api_err) if api_err.code == 409 && creating => {
            StoreError::AlreadyExists {
                kind: kind_of::<K>(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            }
        }
        kube::Error::Api(api_err) if api_err.code == 409 => StoreError::Conflict {
            kind: kind_of::<K>(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            message: api_err.message.clone(),
        },
        kube::Error::Api(api_err) => StoreError::Api {
            code: api_err.code,
            message: api_err.message.clone(),
        },
        other => StoreError::Kube(other),
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        debug!("GET {} {}/{}", kind_of::<K>(), namespace, name);
        self.api::<K>(namespace)
            .get(name)
            .await
            .map_err(|e| map_error::<K>(e, namespace, name, false))
    }

    async fn list<K: StoredObject>(
        &self,
        namespace: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<K>, StoreError> {
        let selector = label_selector(labels);
        debug!("LIST {} in {} ({})", kind_of::<K>(), namespace, selector);
        let params = ListParams::default().labels(&selector);
        self.api::<K>(namespace)
            .list(&params)
            .await
            .map(|list| list.items)
            .map_err(|e| map_error::<K>(e, namespace, "", false))
    }

    async fn create<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        debug!("CREATE {} {}/{}", kind_of::<K>(), namespace, name);
        let params = PostParams {
            field_manager: Some(CONTROLLER_NAME.to_string()),
            ..PostParams::default()
        };
        self.api::<K>(&namespace)
            .create(&params, object)
            .await
            .map_err(|e| map_error::<K>(e, &namespace, &name, true))
    }

    async fn update<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        debug!("UPDATE {} {}/{}", kind_of::<K>(), namespace, name);
        let params = PostParams {
            field_manager: Some(CONTROLLER_NAME.to_string()),
            ..PostParams::default()
        };
        self.api::<K>(&namespace)
            .replace(&name, &params, object)
            .await
            .map_err(|e| map_error::<K>(e, &namespace, &name, false))
    }

    async fn update_status<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        debug!("UPDATE STATUS {} {}/{}", kind_of::<K>(), namespace, name);
        let status = serde_json::to_value(object)?
            .get("status")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        let patch = serde_json::json!({ "status": status });
        self.api::<K>(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|e| map_error::<K>(e, &namespace, &name, false))
    }

    async fn delete<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        debug!("DELETE {} {}/{}", kind_of::<K>(), namespace, name);
        self.api::<K>(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| map_error::<K>(e, namespace, name, false))
    }
}

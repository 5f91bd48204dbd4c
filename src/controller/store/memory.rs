//! # In-Memory Store
//!
//! Process-local [`ObjectStore`] used by tests and local experiments.
//!
//! Objects are held as JSON keyed by kind, namespace and name. The store
//! mimics the API-server behaviour the reconciler relies on:
//!
//! - every write bumps `metadata.resourceVersion`; a write carrying a stale
//!   version fails with [`StoreError::Conflict`]
//! - `update` never touches `status`, `update_status` touches nothing else
//! - deleting an object that still has finalizers only stamps
//!   `metadata.deletionTimestamp`
//! - an object marked for deletion disappears once its last finalizer is removed
//!
//! Every call is recorded so tests can assert on what the reconciler did.

use super::{kind_of, object_ref, ObjectStore, StoreError, StoredObject};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    List,
    Create,
    Update,
    UpdateStatus,
    Delete,
}

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub verb: Verb,
    pub kind: String,
    pub namespace: String,
    /// Empty for `List`
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    kind: String,
    namespace: String,
    name: String,
}

#[derive(Debug)]
struct Fault {
    verb: Verb,
    kind: String,
    message: String,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<ObjectKey, Value>,
    calls: Vec<StoreCall>,
    faults: Vec<Fault>,
    resource_version: u64,
}

impl Inner {
    fn next_resource_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }

    fn record(&mut self, verb: Verb, kind: &str, namespace: &str, name: &str) -> Result<(), StoreError> {
        self.calls.push(StoreCall {
            verb,
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        match self
            .faults
            .iter()
            .position(|fault| fault.verb == verb && fault.kind == kind)
        {
            Some(index) => Err(StoreError::Unavailable(self.faults.remove(index).message)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put an object in place without recording a call; returns the stored copy
    pub fn seed<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        let mut inner = self.lock();
        let mut value = serde_json::to_value(object)?;
        set_resource_version(&mut value, &inner.next_resource_version());
        inner.objects.insert(
            ObjectKey {
                kind: kind_of::<K>(),
                namespace,
                name,
            },
            value.clone(),
        );
        Ok(serde_json::from_value(value)?)
    }

    /// Read an object without recording a call
    #[must_use]
    pub fn peek<K: StoredObject>(&self, namespace: &str, name: &str) -> Option<K> {
        let inner = self.lock();
        inner
            .objects
            .get(&ObjectKey {
                kind: kind_of::<K>(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Make the next `verb` on `kind` fail with [`StoreError::Unavailable`]
    pub fn fail_next(&self, verb: Verb, kind: &str, message: &str) {
        self.lock().faults.push(Fault {
            verb,
            kind: kind.to_string(),
            message: message.to_string(),
        });
    }

    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls with this verb on this kind
    #[must_use]
    pub fn count(&self, verb: Verb, kind: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.verb == verb && call.kind == kind)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

fn set_resource_version(value: &mut Value, version: &str) {
    if let Some(metadata) = value.get_mut("metadata").and_then(Value::as_object_mut) {
        metadata.insert("resourceVersion".to_string(), Value::String(version.to_string()));
    }
}

fn resource_version(value: &Value) -> Option<&str> {
    value.pointer("/metadata/resourceVersion").and_then(Value::as_str)
}

fn has_finalizers(value: &Value) -> bool {
    value
        .pointer("/metadata/finalizers")
        .and_then(Value::as_array)
        .is_some_and(|finalizers| !finalizers.is_empty())
}

fn is_marked_for_deletion(value: &Value) -> bool {
    value
        .pointer("/metadata/deletionTimestamp")
        .is_some_and(|ts| !ts.is_null())
}

fn labels_match(value: &Value, selector: &BTreeMap<String, String>) -> bool {
    let labels = value.pointer("/metadata/labels").and_then(Value::as_object);
    selector.iter().all(|(key, expected)| {
        labels
            .and_then(|labels| labels.get(key))
            .and_then(Value::as_str)
            == Some(expected.as_str())
    })
}

fn check_resource_version<K: StoredObject>(
    stored: &Value,
    incoming: &Value,
    key: &ObjectKey,
) -> Result<(), StoreError> {
    match resource_version(incoming) {
        Some(version) if Some(version) != resource_version(stored) => Err(StoreError::Conflict {
            kind: kind_of::<K>(),
            namespace: key.namespace.clone(),
            name: key.name.clone(),
            message: "the object has been modified; please apply your changes to the latest version".to_string(),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        let kind = kind_of::<K>();
        let mut inner = self.lock();
        inner.record(Verb::Get, &kind, namespace, name)?;
        let key = ObjectKey {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        };
        match inner.objects.get(&key) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(StoreError::NotFound {
                kind: key.kind,
                namespace: key.namespace,
                name: key.name,
            }),
        }
    }

    async fn list<K: StoredObject>(
        &self,
        namespace: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<K>, StoreError> {
        let kind = kind_of::<K>();
        let mut inner = self.lock();
        inner.record(Verb::List, &kind, namespace, "")?;
        inner
            .objects
            .iter()
            .filter(|(key, value)| {
                key.kind == kind && key.namespace == namespace && labels_match(value, labels)
            })
            .map(|(_, value)| serde_json::from_value(value.clone()).map_err(StoreError::from))
            .collect()
    }

    async fn create<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        let kind = kind_of::<K>();
        let mut inner = self.lock();
        inner.record(Verb::Create, &kind, &namespace, &name)?;
        let key = ObjectKey {
            kind,
            namespace,
            name,
        };
        if inner.objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: key.kind,
                namespace: key.namespace,
                name: key.name,
            });
        }
        let mut value = serde_json::to_value(object)?;
        let version = inner.next_resource_version();
        set_resource_version(&mut value, &version);
        inner.objects.insert(key, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        let kind = kind_of::<K>();
        let mut inner = self.lock();
        inner.record(Verb::Update, &kind, &namespace, &name)?;
        let key = ObjectKey {
            kind,
            namespace,
            name,
        };
        let Some(stored) = inner.objects.get(&key).cloned() else {
            return Err(StoreError::NotFound {
                kind: key.kind,
                namespace: key.namespace,
                name: key.name,
            });
        };
        let mut value = serde_json::to_value(object)?;
        check_resource_version::<K>(&stored, &value, &key)?;

        if let Some(fields) = value.as_object_mut() {
            // Status belongs to the status subresource
            match stored.get("status") {
                Some(status) => fields.insert("status".to_string(), status.clone()),
                None => fields.remove("status"),
            };
            // Deletion is requested through delete, never through update
            if let Some(metadata) = fields.get_mut("metadata").and_then(Value::as_object_mut) {
                match stored.pointer("/metadata/deletionTimestamp") {
                    Some(ts) => metadata.insert("deletionTimestamp".to_string(), ts.clone()),
                    None => metadata.remove("deletionTimestamp"),
                };
            }
        }
        let version = inner.next_resource_version();
        set_resource_version(&mut value, &version);

        if is_marked_for_deletion(&value) && !has_finalizers(&value) {
            inner.objects.remove(&key);
        } else {
            inner.objects.insert(key, value.clone());
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn update_status<K: StoredObject>(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_ref(object)?;
        let kind = kind_of::<K>();
        let mut inner = self.lock();
        inner.record(Verb::UpdateStatus, &kind, &namespace, &name)?;
        let key = ObjectKey {
            kind,
            namespace,
            name,
        };
        let Some(mut stored) = inner.objects.get(&key).cloned() else {
            return Err(StoreError::NotFound {
                kind: key.kind,
                namespace: key.namespace,
                name: key.name,
            });
        };
        let incoming = serde_json::to_value(object)?;
        check_resource_version::<K>(&stored, &incoming, &key)?;

        if let Some(fields) = stored.as_object_mut() {
            match incoming.get("status") {
                Some(status) => fields.insert("status".to_string(), status.clone()),
                None => fields.remove("status"),
            };
        }
        let version = inner.next_resource_version();
        set_resource_version(&mut stored, &version);
        inner.objects.insert(key, stored.clone());
        Ok(serde_json::from_value(stored)?)
    }

    async fn delete<K: StoredObject>(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let kind = kind_of::<K>();
        let mut inner = self.lock();
        inner.record(Verb::Delete, &kind, namespace, name)?;
        let key = ObjectKey {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        };
        let Some(mut stored) = inner.objects.get(&key).cloned() else {
            return Err(StoreError::NotFound {
                kind: key.kind,
                namespace: key.namespace,
                name: key.name,
            });
        };
        if !has_finalizers(&stored) {
            inner.objects.remove(&key);
            return Ok(());
        }
        if !is_marked_for_deletion(&stored) {
            if let Some(metadata) = stored.get_mut("metadata").and_then(Value::as_object_mut) {
                metadata.insert(
                    "deletionTimestamp".to_string(),
                    Value::String(
                        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                    ),
                );
            }
            let version = inner.next_resource_version();
            set_resource_version(&mut stored, &version);
            inner.objects.insert(key, stored);
        }
        Ok(())
    }
}

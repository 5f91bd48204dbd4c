//! Shared fixtures for the reconciler integration tests
//!
//! Everything runs against `InMemoryStore`, which records each call so tests
//! can assert on exactly what the reconciler did.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use registry_operator::config::ControllerConfig;
use registry_operator::controller::reconciler::Reconciler;
use registry_operator::controller::store::{InMemoryStore, ObjectStore, StoreCall, Verb};
use registry_operator::crd::{Registry, RegistryPhase, RegistrySpec, Storage, StorageType};
use std::sync::Arc;
use std::time::Duration;

pub const NAMESPACE: &str = "default";

/// Delays short enough to tell apart in assertions
pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        defaults_requeue_secs: 5,
        terminating_requeue_secs: 2,
        ..ControllerConfig::default()
    }
}

pub fn defaults_requeue() -> Duration {
    Duration::from_secs(5)
}

pub fn terminating_requeue() -> Duration {
    Duration::from_secs(2)
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub ctx: Arc<Reconciler<InMemoryStore>>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let ctx = Arc::new(Reconciler::new(Arc::clone(&store), Arc::new(test_config())));
        Self { store, ctx }
    }

    pub fn ctx(&self) -> &Reconciler<InMemoryStore> {
        &self.ctx
    }

    pub fn registry(&self, name: &str) -> Option<Registry> {
        self.store.peek::<Registry>(NAMESPACE, name)
    }

    pub fn config_map(&self, name: &str) -> Option<ConfigMap> {
        self.store.peek::<ConfigMap>(NAMESPACE, name)
    }

    pub fn pod(&self, name: &str) -> Option<Pod> {
        self.store.peek::<Pod>(NAMESPACE, name)
    }

    /// Current stored copy, as a handler would receive it
    pub async fn load(&self, name: &str) -> Registry {
        self.store
            .get::<Registry>(NAMESPACE, name)
            .await
            .expect("registry should exist")
    }

    /// Calls other than reads, in order
    pub fn writes(&self) -> Vec<StoreCall> {
        self.store
            .calls()
            .into_iter()
            .filter(|call| !matches!(call.verb, Verb::Get | Verb::List))
            .collect()
    }

    pub fn creates(&self) -> usize {
        self.store.count(Verb::Create, "ConfigMap") + self.store.count(Verb::Create, "Pod")
    }
}

pub fn registry(name: &str, storage_type: Option<StorageType>) -> Registry {
    let mut registry = Registry::new(
        name,
        RegistrySpec {
            storage: Storage { storage_type },
        },
    );
    registry.metadata.namespace = Some(NAMESPACE.to_string());
    registry
}

pub fn in_memory_registry(name: &str) -> Registry {
    registry(name, Some(StorageType::InMemory))
}

pub fn with_phase(mut registry: Registry, phase: RegistryPhase) -> Registry {
    registry.set_phase(phase);
    registry
}

pub fn with_finalizer(mut registry: Registry) -> Registry {
    registry
        .metadata
        .finalizers
        .get_or_insert_with(Vec::new)
        .push(registry_operator::constants::REGISTRY_FINALIZER.to_string());
    registry
}

pub fn call(verb: Verb, kind: &str, name: &str) -> StoreCall {
    StoreCall {
        verb,
        kind: kind.to_string(),
        namespace: NAMESPACE.to_string(),
        name: name.to_string(),
    }
}

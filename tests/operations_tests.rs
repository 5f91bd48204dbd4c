//! # Registry Operations Tests

mod common;

use common::*;
use registry_operator::constants::REGISTRY_FINALIZER;
use registry_operator::controller::operations::{ChildResources, OperationError};
use registry_operator::controller::store::{StoreError, Verb};
use registry_operator::crd::{RegistryKey, RegistryPhase, StorageType};

#[tokio::test]
async fn test_exists_maps_not_found_to_false() {
    let h = Harness::new();
    let registry = in_memory_registry("r1");
    let ops = &h.ctx().operations;

    assert!(!ops.config_map_exists(&registry).await.unwrap());
    assert!(!ops.pod_exists(&registry).await.unwrap());

    ops.create_config_map(&registry).await.unwrap();
    ops.create_pod(&registry).await.unwrap();

    assert!(ops.config_map_exists(&registry).await.unwrap());
    assert!(ops.pod_exists(&registry).await.unwrap());
    assert_eq!(
        ops.get_pod(&registry).await.unwrap().metadata.name.as_deref(),
        Some("r1")
    );
}

#[tokio::test]
async fn test_create_twice_reports_already_exists() {
    let h = Harness::new();
    let registry = in_memory_registry("r1");
    let ops = &h.ctx().operations;

    ops.create_config_map(&registry).await.unwrap();
    let err = ops.create_config_map(&registry).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_create_pod_with_unsupported_storage_never_reaches_store() {
    let h = Harness::new();
    let registry = registry("r1", Some(StorageType::from("gcs")));

    let err = h.ctx().operations.create_pod(&registry).await.unwrap_err();

    assert!(matches!(err, OperationError::Build(_)));
    assert_eq!(err.to_string(), "storage type gcs not supported");
    assert!(h.store.calls().is_empty());
}

#[tokio::test]
async fn test_delete_of_vanished_child_succeeds() {
    let h = Harness::new();
    let registry = in_memory_registry("r1");
    let ops = &h.ctx().operations;

    ops.delete_pod(&registry).await.unwrap();
    ops.delete_config_map(&registry).await.unwrap();

    assert_eq!(h.store.count(Verb::Delete, "Pod"), 1);
    assert_eq!(h.store.count(Verb::Delete, "ConfigMap"), 1);
}

#[tokio::test]
async fn test_delete_failure_other_than_not_found_propagates() {
    let h = Harness::new();
    let registry = in_memory_registry("r1");
    h.ctx().operations.create_pod(&registry).await.unwrap();
    h.store.fail_next(Verb::Delete, "Pod", "apiserver unavailable");

    let err = h.ctx().operations.delete_pod(&registry).await.unwrap_err();

    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(h.pod("r1").is_some());
}

#[tokio::test]
async fn test_finalizer_operations_are_idempotent() {
    let h = Harness::new();
    h.store.seed(&in_memory_registry("r1")).unwrap();
    let ops = &h.ctx().operations;
    let mut registry = h.load("r1").await;

    ops.add_finalizer(&mut registry).await.unwrap();
    ops.add_finalizer(&mut registry).await.unwrap();
    assert!(ops.has_finalizer(&registry));
    assert_eq!(
        h.registry("r1").unwrap().metadata.finalizers,
        Some(vec![REGISTRY_FINALIZER.to_string()])
    );
    assert_eq!(h.store.count(Verb::Update, "Registry"), 1);

    ops.remove_finalizer(&mut registry).await.unwrap();
    ops.remove_finalizer(&mut registry).await.unwrap();
    assert!(!ops.has_finalizer(&registry));
    assert!(!h.registry("r1").unwrap().has_finalizer(REGISTRY_FINALIZER));
    assert_eq!(h.store.count(Verb::Update, "Registry"), 2);
}

#[tokio::test]
async fn test_update_status_only_touches_status() {
    let h = Harness::new();
    h.store.seed(&in_memory_registry("r1")).unwrap();
    let mut registry = h.load("r1").await;

    registry.spec.storage.storage_type = Some(StorageType::from("s3"));
    registry.set_phase(RegistryPhase::Running);
    h.ctx().operations.update_status(&mut registry).await.unwrap();

    let stored = h.registry("r1").unwrap();
    assert_eq!(stored.phase(), RegistryPhase::Running);
    assert_eq!(stored.spec.storage.storage_type, Some(StorageType::InMemory));
}

#[tokio::test]
async fn test_get_registry_missing_is_none() {
    let h = Harness::new();
    let found = h
        .ctx()
        .operations
        .get_registry(&RegistryKey::new(NAMESPACE, "nope"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_children_selects_by_labels() {
    let h = Harness::new();
    let r1 = in_memory_registry("r1");
    let r2 = in_memory_registry("r2");
    let ops = &h.ctx().operations;
    for registry in [&r1, &r2] {
        ops.create_config_map(registry).await.unwrap();
        ops.create_pod(registry).await.unwrap();
    }

    assert_eq!(
        ops.list_children(&r1).await.unwrap(),
        ChildResources {
            pods: vec!["r1".to_string()],
            config_maps: vec!["r1".to_string()],
        }
    );
}

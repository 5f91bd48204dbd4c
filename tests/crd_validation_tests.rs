//! # CRD Validation Tests
//!
//! The generated CustomResourceDefinition and how stored objects decode.

use registry_operator::crd::{Registry, RegistryPhase, StorageType};
use serde_json::{json, Value};

fn crd_json() -> Value {
    serde_json::to_value(Registry::defaulted_crd().expect("CRD builds")).expect("CRD serializes")
}

#[test]
fn test_crd_identity() {
    let crd = crd_json();
    assert_eq!(crd["metadata"]["name"], "registries.registry-operator.dev");
    assert_eq!(crd["spec"]["group"], "registry-operator.dev");
    assert_eq!(crd["spec"]["scope"], "Namespaced");
    assert_eq!(crd["spec"]["names"]["kind"], "Registry");
    assert_eq!(crd["spec"]["names"]["shortNames"], json!(["reg"]));
    assert_eq!(crd["spec"]["versions"][0]["name"], "v1alpha1");
}

#[test]
fn test_crd_has_status_subresource_and_phase_column() {
    let crd = crd_json();
    let version = &crd["spec"]["versions"][0];
    assert!(version["subresources"]["status"].is_object());
    assert_eq!(version["additionalPrinterColumns"][0]["name"], "Phase");
    assert_eq!(
        version["additionalPrinterColumns"][0]["jsonPath"],
        ".status.phase"
    );
}

#[test]
fn test_crd_schema_defaults_storage_and_phase() {
    let crd = crd_json();
    let schema = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"];

    assert_eq!(schema["spec"]["default"], json!({ "storage": { "type": "inmemory" } }));
    assert_eq!(
        schema["spec"]["properties"]["storage"]["default"],
        json!({ "type": "inmemory" })
    );

    let storage_type = &schema["spec"]["properties"]["storage"]["properties"]["type"];
    assert_eq!(storage_type["enum"], json!(["inmemory"]));
    assert_eq!(storage_type["default"], "inmemory");

    let phase = &schema["status"]["properties"]["phase"];
    assert_eq!(phase["enum"], json!(["Pending", "Running", "Deleting"]));
    assert_eq!(phase["default"], "Pending");
}

#[test]
fn test_registry_decodes_from_api_object() {
    let registry: Registry = serde_json::from_value(json!({
        "apiVersion": "registry-operator.dev/v1alpha1",
        "kind": "Registry",
        "metadata": { "name": "r1", "namespace": "default" },
        "spec": { "storage": { "type": "inmemory" } },
        "status": { "phase": "Running" }
    }))
    .unwrap();

    assert_eq!(registry.spec.storage.storage_type, Some(StorageType::InMemory));
    assert_eq!(registry.phase(), RegistryPhase::Running);
}

#[test]
fn test_registry_before_defaulting_decodes_as_unset() {
    for spec in [json!({}), json!({ "storage": {} }), json!({ "storage": { "type": "" } })] {
        let registry: Registry = serde_json::from_value(json!({
            "apiVersion": "registry-operator.dev/v1alpha1",
            "kind": "Registry",
            "metadata": { "name": "r1", "namespace": "default" },
            "spec": spec
        }))
        .unwrap();

        assert_eq!(registry.spec.storage.storage_type, None);
        assert_eq!(registry.phase(), RegistryPhase::Pending);
    }
}

#[test]
fn test_unrecognized_values_survive_decoding() {
    let registry: Registry = serde_json::from_value(json!({
        "apiVersion": "registry-operator.dev/v1alpha1",
        "kind": "Registry",
        "metadata": { "name": "r1", "namespace": "default" },
        "spec": { "storage": { "type": "s3" } },
        "status": { "phase": "Exploded" }
    }))
    .unwrap();

    assert_eq!(
        registry.spec.storage.storage_type,
        Some(StorageType::Unsupported("s3".to_string()))
    );
    assert_eq!(registry.phase(), RegistryPhase::Unknown("Exploded".to_string()));

    // Written back unchanged
    let value = serde_json::to_value(&registry).unwrap();
    assert_eq!(value["spec"]["storage"]["type"], "s3");
    assert_eq!(value["status"]["phase"], "Exploded");
}

#[test]
fn test_crd_accepts_registry_without_spec() {
    let crd = crd_json();
    let root = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"];
    let required = root["required"].as_array().cloned().unwrap_or_default();
    assert!(!required.contains(&json!("spec")));
    assert!(root["properties"]["spec"]["properties"]["storage"].is_object());
}

#[test]
fn test_defaulted_crd_renders_as_yaml() {
    let yaml = serde_yaml::to_string(&Registry::defaulted_crd().unwrap()).unwrap();
    assert!(yaml.contains("registries.registry-operator.dev"));
    assert!(yaml.contains("inmemory"));
}

use super::child_metadata;
use crate::constants::CONFIG_FILE_KEY;
use crate::crd::Registry;
use k8s_openapi::api::core::v1::ConfigMap;
use std::collections::BTreeMap;

/// Render the ConfigMap holding the registry's `config.yml`
#[must_use]
pub fn build_config_map(registry: &Registry) -> ConfigMap {
    let storage = registry
        .spec
        .storage
        .storage_type
        .as_ref()
        .map_or("", |storage_type| storage_type.as_str());

    ConfigMap {
        metadata: child_metadata(registry),
        data: Some(BTreeMap::from([(
            CONFIG_FILE_KEY.to_string(),
            format!("version: 0.1\nstorage:\n\t{storage}:\n"),
        )])),
        ..ConfigMap::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{RegistrySpec, Storage};

    #[test]
    fn test_config_map_embeds_storage_type() {
        let mut registry = Registry::new(
            "docker",
            RegistrySpec {
                storage: Storage::in_memory(),
            },
        );
        registry.metadata.namespace = Some("infra".to_string());

        let config_map = build_config_map(&registry);

        assert_eq!(config_map.metadata.name.as_deref(), Some("docker"));
        assert_eq!(config_map.metadata.namespace.as_deref(), Some("infra"));
        let labels = config_map.metadata.labels.unwrap();
        assert_eq!(labels.get("app").map(String::as_str), Some("registry"));
        assert_eq!(labels.get("registry").map(String::as_str), Some("docker"));
        let data = config_map.data.unwrap();
        assert_eq!(
            data.get("config.yml").map(String::as_str),
            Some("version: 0.1\nstorage:\n\tinmemory:\n")
        );
    }
}

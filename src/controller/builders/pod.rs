use super::{child_metadata, BuildError};
use crate::constants::{CONFIG_MOUNT_PATH, CONFIG_VOLUME_NAME, REGISTRY_IMAGE};
use crate::crd::{Registry, StorageType};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, Pod, PodSpec, Volume, VolumeMount,
};
use kube::ResourceExt;

/// Build the registry pod for the selected storage type
///
/// Each supported storage type is one match arm; anything else is rejected.
pub fn build_pod(registry: &Registry) -> Result<Pod, BuildError> {
    match &registry.spec.storage.storage_type {
        Some(StorageType::InMemory) => Ok(in_memory_pod(registry)),
        Some(StorageType::Unsupported(value)) => {
            Err(BuildError::UnsupportedStorageType(value.clone()))
        }
        None => Err(BuildError::StorageTypeUnset),
    }
}

// In-memory storage needs nothing beyond the configuration mount.
fn in_memory_pod(registry: &Registry) -> Pod {
    Pod {
        metadata: child_metadata(registry),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: registry.name_any(),
                image: Some(REGISTRY_IMAGE.to_string()),
                volume_mounts: Some(vec![VolumeMount {
                    name: CONFIG_VOLUME_NAME.to_string(),
                    mount_path: CONFIG_MOUNT_PATH.to_string(),
                    ..VolumeMount::default()
                }]),
                ..Container::default()
            }],
            volumes: Some(vec![Volume {
                name: CONFIG_VOLUME_NAME.to_string(),
                config_map: Some(ConfigMapVolumeSource {
                    name: registry.name_any().into(),
                    ..ConfigMapVolumeSource::default()
                }),
                ..Volume::default()
            }]),
            ..PodSpec::default()
        }),
        ..Pod::default()
    }
}

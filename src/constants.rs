//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Finalizer guarding removal of a `Registry` until its children are gone
pub const REGISTRY_FINALIZER: &str = "registry-operator.dev/finalizer";

/// Field manager / component name reported to the API server and in logs
pub const CONTROLLER_NAME: &str = "registry-operator";

/// Label key and value marking every child resource
pub const APP_LABEL_KEY: &str = "app";
pub const APP_LABEL_VALUE: &str = "registry";

/// Label key carrying the owning `Registry` name
pub const REGISTRY_LABEL_KEY: &str = "registry";

/// Container image run for every registry
pub const REGISTRY_IMAGE: &str = "registry:2";

/// Key of the configuration entry in the child ConfigMap
pub const CONFIG_FILE_KEY: &str = "config.yml";

/// Volume name and mount path of the configuration inside the registry container
pub const CONFIG_VOLUME_NAME: &str = "config";
pub const CONFIG_MOUNT_PATH: &str = "/etc/distribution";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default requeue delay while the storage type has not been defaulted yet (seconds)
pub const DEFAULT_DEFAULTS_REQUEUE_SECS: u64 = 5;

/// Default requeue delay while deleted children are still terminating (seconds)
pub const DEFAULT_TERMINATING_REQUEUE_SECS: u64 = 2;

/// Default error backoff floor (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 1;

/// Default error backoff ceiling (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default maximum number of registries reconciled in parallel
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

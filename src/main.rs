//! # Registry Operator
//!
//! A Kubernetes operator that runs a container image registry for every
//! `Registry` custom resource.
//!
//! ## Lifecycle
//!
//! - **Pending**: the config map and pod are created and the finalizer added
//! - **Running**: the registry is serving; a deletion request moves it on
//! - **Deleting**: the pod and config map are removed, then the finalizer
//!
//! ## Configuration
//!
//! Environment variables: `METRICS_PORT`, `WATCH_NAMESPACE`,
//! `MAX_CONCURRENT_RECONCILIATIONS`, `DEFAULTS_REQUEUE_SECS`,
//! `TERMINATING_REQUEUE_SECS`, `BACKOFF_MIN_SECS`, `BACKOFF_MAX_SECS`,
//! `LOG_FORMAT` and `RUST_LOG`.

use anyhow::Result;
use registry_operator::config::ControllerConfig;
use registry_operator::runtime::{initialize, run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ControllerConfig::from_env();
    let init = initialize(config).await?;

    run_watch_loop(
        init.registries,
        init.reconciler,
        init.server_state,
        init.config.max_concurrent_reconciliations,
        init.shutdown,
    )
    .await
}

//! # Watch Loop
//!
//! Watches `Registry` resources and reconciles them as they change.

use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::controller::store::KubeStore;
use crate::crd::Registry;
use crate::runtime::error_policy::handle_reconciliation_error;
use futures::StreamExt;
use kube::api::Api;
use kube_runtime::{controller, watcher, Controller};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run the controller until SIGINT/SIGTERM
///
/// The controller serializes reconciliations per registry and runs distinct
/// registries in parallel, up to `max_concurrent_reconciliations`.
pub async fn run_watch_loop(
    registries: Api<Registry>,
    reconciler: Arc<Reconciler<KubeStore>>,
    server_state: Arc<ServerState>,
    max_concurrent_reconciliations: u16,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let shutdown_server_state = Arc::clone(&server_state);
    let shutdown_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
        shutdown_server_state.is_ready.store(false, Ordering::Relaxed);
        shutdown_token.cancel();
        info!("Marked server as not ready, waiting for in-flight reconciliations to complete...");
    });

    let controller_config =
        controller::Config::default().concurrency(max_concurrent_reconciliations);

    info!("Starting controller watch loop...");
    server_state.is_ready.store(true, Ordering::Relaxed);

    Controller::new(registries, watcher::Config::default().any_semantic())
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(
            reconcile::<KubeStore>,
            handle_reconciliation_error::<KubeStore>,
            reconciler,
        )
        .for_each(|result| {
            match result {
                Ok((object, action)) => debug!("Reconciled {:?}: {:?}", object, action),
                Err(e) => warn!("Controller stream error: {}", e),
            }
            futures::future::ready(())
        })
        .await;

    // The stream can also end on its own; make sure nothing keeps running
    shutdown.cancel();
    server_state.is_ready.store(false, Ordering::Relaxed);
    info!("Controller stopped gracefully");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

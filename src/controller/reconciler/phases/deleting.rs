//! # Deleting
//!
//! Remove the pod, then the config map, then the finalizer. The finalizer is
//! only released once both children are confirmed gone.

use crate::controller::reconciler::types::{PhaseOutcome, Reconciler, ReconcilerError};
use crate::controller::store::ObjectStore;
use crate::crd::Registry;
use crate::observability::metrics;
use kube::ResourceExt;
use tracing::info;

pub async fn handle<S: ObjectStore>(
    ctx: &Reconciler<S>,
    registry: &mut Registry,
) -> Result<PhaseOutcome, ReconcilerError> {
    let namespace = registry.namespace().unwrap_or_default();
    let name = registry.name_any();

    if !ctx.operations.has_finalizer(registry) {
        info!("Registry {}/{} already cleaned up", namespace, name);
        return Ok(PhaseOutcome::Complete);
    }

    if ctx.operations.pod_exists(registry).await? {
        ctx.checkpoint()?;
        ctx.operations.delete_pod(registry).await?;
    }

    // Checked even when the pod was already gone, so a config map left by an
    // earlier partial pass is not orphaned
    if ctx.operations.config_map_exists(registry).await? {
        ctx.checkpoint()?;
        ctx.operations.delete_config_map(registry).await?;
    }

    let pod_remaining = ctx.operations.pod_exists(registry).await?;
    let config_map_remaining = ctx.operations.config_map_exists(registry).await?;
    if pod_remaining || config_map_remaining {
        info!(
            "Registry {}/{} children still terminating (pod: {}, config map: {}), requeueing",
            namespace, name, pod_remaining, config_map_remaining
        );
        metrics::increment_requeues_total("children_terminating");
        return Ok(PhaseOutcome::RequeueAfter(
            ctx.config.terminating_requeue_duration(),
        ));
    }

    ctx.checkpoint()?;
    ctx.operations.remove_finalizer(registry).await?;
    info!("Registry {}/{} released", namespace, name);
    Ok(PhaseOutcome::Complete)
}

//! # Pending
//!
//! Bring up the registry's children, then mark it Running.

use crate::controller::builders::build_pod;
use crate::controller::reconciler::phases::transition;
use crate::controller::reconciler::types::{PhaseOutcome, Reconciler, ReconcilerError};
use crate::controller::store::ObjectStore;
use crate::crd::{Registry, RegistryPhase};
use crate::observability::metrics;
use kube::ResourceExt;
use tracing::{info, warn};

pub async fn handle<S: ObjectStore>(
    ctx: &Reconciler<S>,
    registry: &mut Registry,
) -> Result<PhaseOutcome, ReconcilerError> {
    let namespace = registry.namespace().unwrap_or_default();
    let name = registry.name_any();

    // Observed before defaulting filled in the storage type
    if registry.spec.storage.storage_type.is_none() {
        info!(
            "Registry {}/{} has no storage type yet, requeueing",
            namespace, name
        );
        metrics::increment_requeues_total("storage_type_unset");
        return Ok(PhaseOutcome::RequeueAfter(
            ctx.config.defaults_requeue_duration(),
        ));
    }

    if registry.is_deletion_requested() {
        if !ctx.operations.has_finalizer(registry) {
            // Nothing was ever created for it
            return Ok(PhaseOutcome::Complete);
        }
        transition(ctx, registry, RegistryPhase::Running).await?;
        return Ok(PhaseOutcome::Complete);
    }

    // Reject unsupported storage before anything is written
    if let Err(e) = build_pod(registry) {
        warn!("Registry {}/{} cannot be deployed: {}", namespace, name, e);
        return Err(e.into());
    }

    if !ctx.operations.config_map_exists(registry).await? {
        ctx.checkpoint()?;
        ctx.operations.create_config_map(registry).await?;
    }

    if !ctx.operations.pod_exists(registry).await? {
        ctx.checkpoint()?;
        ctx.operations.create_pod(registry).await?;
    }

    if !ctx.operations.has_finalizer(registry) {
        ctx.checkpoint()?;
        ctx.operations.add_finalizer(registry).await?;
    }

    transition(ctx, registry, RegistryPhase::Running).await?;
    Ok(PhaseOutcome::Complete)
}

//! # Reconciliation Logic
//!
//! Load a `Registry` by identity and hand it to the handler for its phase.

use crate::controller::reconciler::phases::{deleting, pending, running};
use crate::controller::reconciler::types::{PhaseOutcome, Reconciler, ReconcilerError};
use crate::controller::store::ObjectStore;
use crate::crd::{Registry, RegistryKey, RegistryPhase};
use crate::observability::metrics;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, Instrument};

/// Controller entry point
///
/// Errors are left to the error policy, which owns retry backoff.
pub async fn reconcile<S: ObjectStore>(
    registry: Arc<Registry>,
    ctx: Arc<Reconciler<S>>,
) -> Result<Action, ReconcilerError> {
    let key = registry
        .key()
        .ok_or(ReconcilerError::MissingMetadata("namespace"))?;

    let span = info_span!(
        "reconcile",
        resource.name = %key.name,
        resource.namespace = %key.namespace
    );

    async move {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let result = reconcile_registry(&*ctx, &key).await;
        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        let outcome = result?;
        if ctx.reset_backoff(&key) {
            debug!("Backoff reset for registry {}", key);
        }
        Ok(outcome.into_action())
    }
    .instrument(span)
    .await
}

/// One reconciliation pass for a single registry
pub async fn reconcile_registry<S: ObjectStore>(
    ctx: &Reconciler<S>,
    key: &RegistryKey,
) -> Result<PhaseOutcome, ReconcilerError> {
    let Some(mut registry) = ctx.operations.get_registry(key).await? else {
        info!("Registry {} not found, nothing to do", key);
        ctx.forget_backoff(key);
        return Ok(PhaseOutcome::Complete);
    };

    match registry.phase() {
        RegistryPhase::Pending => pending::handle(ctx, &mut registry).await,
        RegistryPhase::Running => running::handle(ctx, &mut registry).await,
        RegistryPhase::Deleting => deleting::handle(ctx, &mut registry).await,
        RegistryPhase::Unknown(phase) => {
            // Requeueing cannot repair a corrupted status
            error!(
                "Registry {} has unrecognized phase {:?}, dropping",
                key, phase
            );
            Ok(PhaseOutcome::Complete)
        }
    }
}

//! # Running
//!
//! Steady state. Only a deletion request moves the registry on; child cleanup
//! belongs to the Deleting handler.

use crate::controller::reconciler::phases::transition;
use crate::controller::reconciler::types::{PhaseOutcome, Reconciler, ReconcilerError};
use crate::controller::store::ObjectStore;
use crate::crd::{Registry, RegistryPhase};
use kube::ResourceExt;
use tracing::debug;

pub async fn handle<S: ObjectStore>(
    ctx: &Reconciler<S>,
    registry: &mut Registry,
) -> Result<PhaseOutcome, ReconcilerError> {
    if !registry.is_deletion_requested() {
        debug!(
            "Registry {}/{} is running",
            registry.namespace().unwrap_or_default(),
            registry.name_any()
        );
        return Ok(PhaseOutcome::Complete);
    }

    transition(ctx, registry, RegistryPhase::Deleting).await?;
    Ok(PhaseOutcome::Complete)
}

//! # Phase Handlers
//!
//! One handler per [`RegistryPhase`](crate::crd::RegistryPhase). Each handler is
//! re-entrant: every step checks current state before acting, so a pass that
//! fails halfway resumes cleanly on the next delivery.

pub mod deleting;
pub mod pending;
pub mod running;

use crate::controller::reconciler::types::{Reconciler, ReconcilerError};
use crate::controller::store::ObjectStore;
use crate::crd::{Registry, RegistryPhase};
use crate::observability::metrics;
use kube::ResourceExt;
use tracing::info;

/// Persist a new phase through the status subresource
pub(crate) async fn transition<S: ObjectStore>(
    ctx: &Reconciler<S>,
    registry: &mut Registry,
    to: RegistryPhase,
) -> Result<(), ReconcilerError> {
    let from = registry.phase();
    ctx.checkpoint()?;
    registry.set_phase(to.clone());
    ctx.operations.update_status(registry).await?;
    info!(
        "Registry {}/{} moved from {} to {}",
        registry.namespace().unwrap_or_default(),
        registry.name_any(),
        from,
        to
    );
    metrics::increment_phase_transitions(from.as_str(), to.as_str());
    Ok(())
}

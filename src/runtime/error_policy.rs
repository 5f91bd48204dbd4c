//! # Error Policy
//!
//! Retry scheduling for failed reconciliations. Handlers never retry
//! internally; every error they return lands here.

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::controller::store::ObjectStore;
use crate::crd::{Registry, RegistryKey};
use crate::observability::metrics;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Requeue a failed registry with Fibonacci backoff
///
/// Backoff state is tracked per registry so one failing object does not slow
/// down retries of another.
pub fn handle_reconciliation_error<S: ObjectStore>(
    registry: Arc<Registry>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler<S>>,
) -> Action {
    let key = registry.key().unwrap_or_else(|| {
        RegistryKey::new(
            registry.namespace().unwrap_or_else(|| "default".to_string()),
            registry.name_any(),
        )
    });

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    if matches!(error, ReconcilerError::Cancelled) {
        info!("Reconciliation of {} cancelled by shutdown", key);
        return Action::await_change();
    }

    error!("Reconciliation error for {}: {:?}", key, error);
    metrics::increment_reconciliation_errors();

    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states
                .entry(key.clone())
                .or_insert_with(|| BackoffState::new(&ctx.config));
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff_states: {}, using maximum backoff", e);
            (ctx.config.backoff_max_secs, 0)
        }
    };

    let next_trigger_time = chrono::Utc::now()
        + chrono::Duration::seconds(i64::try_from(backoff_seconds).unwrap_or(i64::MAX));
    info!(
        "Retrying {} in {}s (error count: {}, next attempt at {})",
        key,
        backoff_seconds,
        error_count,
        next_trigger_time.to_rfc3339()
    );

    metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::builders::BuildError;
use crate::controller::operations::{OperationError, RegistryOperations};
use crate::controller::store::{KubeStore, ObjectStore, StoreError};
use crate::crd::RegistryKey;
use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid registry spec: {0}")]
    Build(#[from] BuildError),
    #[error("Reconciliation cancelled")]
    Cancelled,
    #[error("Registry is missing metadata.{0}")]
    MissingMetadata(&'static str),
}

impl From<OperationError> for ReconcilerError {
    fn from(error: OperationError) -> Self {
        match error {
            OperationError::Store(e) => ReconcilerError::Store(e),
            OperationError::Build(e) => ReconcilerError::Build(e),
        }
    }
}

/// What a phase handler asks of the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Nothing left to do until the object changes
    Complete,
    /// Run again after the delay without counting this pass as failed
    RequeueAfter(Duration),
}

impl PhaseOutcome {
    #[must_use]
    pub fn into_action(self) -> Action {
        match self {
            PhaseOutcome::Complete => Action::await_change(),
            PhaseOutcome::RequeueAfter(delay) => Action::requeue(delay),
        }
    }
}

/// Backoff state for a specific registry
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            backoff: FibonacciBackoff::new(config.backoff_min_secs, config.backoff_max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

/// Reconciliation context shared by every pass
///
/// Holds no per-registry state other than error backoff, which only the error
/// policy reads.
pub struct Reconciler<S = KubeStore> {
    pub operations: RegistryOperations<S>,
    pub config: Arc<ControllerConfig>,
    /// Fires on shutdown; handlers stop before their next write
    pub shutdown: CancellationToken,
    // Backoff state per registry (identified by namespace/name)
    pub backoff_states: Arc<Mutex<HashMap<RegistryKey, BackoffState>>>,
}

impl<S> std::fmt::Debug for Reconciler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<S: ObjectStore> Reconciler<S> {
    pub fn new(store: Arc<S>, config: Arc<ControllerConfig>) -> Self {
        Self {
            operations: RegistryOperations::new(store),
            config,
            shutdown: CancellationToken::new(),
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Fail with [`ReconcilerError::Cancelled`] once shutdown has been requested
    pub fn checkpoint(&self) -> Result<(), ReconcilerError> {
        if self.shutdown.is_cancelled() {
            Err(ReconcilerError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drop the backoff entry of a registry that no longer exists
    pub fn forget_backoff(&self, key: &RegistryKey) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(key);
        }
    }

    /// Forget accumulated errors for a registry after a clean pass
    pub fn reset_backoff(&self, key: &RegistryKey) -> bool {
        match self.backoff_states.lock() {
            Ok(mut states) => states.remove(key).is_some_and(|state| state.error_count > 0),
            Err(_) => false,
        }
    }
}

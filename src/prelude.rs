//! # Prelude
//!
//! Commonly used types, importable with `use registry_operator::prelude::*;`.

pub use crate::crd::*;

pub use crate::controller::operations::{OperationError, RegistryOperations};
pub use crate::controller::reconciler::{
    reconcile, reconcile_registry, PhaseOutcome, Reconciler, ReconcilerError,
};
pub use crate::controller::store::{InMemoryStore, KubeStore, ObjectStore, StoreError};

pub use crate::config::ControllerConfig;

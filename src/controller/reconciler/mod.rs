//! # Reconciler
//!
//! Drives a `Registry` through its lifecycle.
//!
//! ## Phases
//!
//! 1. **Pending**: create the config map and pod, add the finalizer, move to Running
//! 2. **Running**: wait for a deletion request, then move to Deleting
//! 3. **Deleting**: delete the pod and config map, then remove the finalizer
//!
//! Every step checks before it acts, so a pass can be repeated or resumed at
//! any point.

pub mod phases;
pub mod reconcile;
pub mod types;

pub use reconcile::{reconcile, reconcile_registry};
pub use types::{BackoffState, PhaseOutcome, Reconciler, ReconcilerError};

//! # Custom Resource Definitions
//!
//! CRD types for the Registry Operator.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `Registry` resource, storage selection and identity helpers
//! - `status.rs` - Lifecycle phase recorded in status

mod spec;
mod status;

// Re-export all public types
pub use spec::{Registry, RegistryKey, RegistrySpec, Storage, StorageType};
pub use status::{RegistryPhase, RegistryStatus};

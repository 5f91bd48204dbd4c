//! # Controller
//!
//! - `backoff`: Fibonacci backoff for failed reconciliations
//! - `builders`: desired state of the registry's children
//! - `operations`: idempotent operations on a registry and its children
//! - `reconciler`: phase handlers and dispatch
//! - `server`: HTTP server for metrics and health checks
//! - `store`: object store abstraction over the Kubernetes API

pub mod backoff;
pub mod builders;
pub mod operations;
pub mod reconciler;
pub mod server;
pub mod store;

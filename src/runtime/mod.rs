//! # Runtime
//!
//! Process bootstrap and the watch loop that feeds the reconciler.
//!
//! - `initialization`: rustls, tracing, metrics, HTTP server and Kubernetes client
//! - `watch_loop`: `kube_runtime::Controller` over `Registry` objects
//! - `error_policy`: per-registry retry backoff for failed reconciliations

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use initialization::{initialize, InitializationResult};
pub use watch_loop::run_watch_loop;

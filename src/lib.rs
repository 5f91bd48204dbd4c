//! Registry Operator Library
//!
//! Runs container image registries declared as `Registry` custom resources.
//! Each `Registry` gets a config map holding the registry configuration and a
//! pod running `registry:2` against it; both are removed before the
//! `Registry` itself is allowed to go away.
//!
//! ## Quick Start
//!
//! ```rust
//! use registry_operator::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod runtime;

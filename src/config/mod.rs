//! # Configuration
//!
//! Operator-level settings.

mod controller;

pub use controller::{ControllerConfig, LogFormat};

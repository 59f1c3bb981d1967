//! Run configuration
//!
//! Defaults are compiled in and can be overridden through `PYINIT_*` environment variables.

pub mod settings;

pub use settings::{LinkFailureSignatures, Settings, DEFAULT_LINK_FAILURE_SIGNATURES};

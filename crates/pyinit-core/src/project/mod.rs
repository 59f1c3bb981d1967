//! The generated project: package name, build backend, file tree, completion marker
//!
//! This module provides:
//! - Folder name sanitizing into a Python package name
//! - The two supported build backends
//! - The src-layout file generator
//! - The completion marker that guards re-runs

pub mod backend;
pub mod marker;
pub mod name;
pub mod scaffold;

pub use backend::Backend;
pub use marker::{CompletionMarker, COMPLETION_MARKER, MARKER_TOKEN};
pub use name::{sanitize, PackageName};
pub use scaffold::generate;

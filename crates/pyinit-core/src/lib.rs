//! pyinit Core - Shared library for bootstrapping Python projects
//!
//! This library provides the bootstrap workflow that turns an empty folder into a
//! src-layout Python package with its own virtual environment. The `pyinit` binary
//! is a thin wrapper around it.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Tool detection, command execution, name sanitizing,
//!   environment creation, file generation, editable install, git initialization
//! - **Layer 2: Workflow Orchestration** - [`Bootstrap`] sequences the operations, owns the
//!   completion marker and rolls back on failure. Progress goes through the [`Reporter`] trait
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based output (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based terminal front end
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use pyinit_core::{Bootstrap, BootstrapOptions, CancelToken, Settings, SilentReporter};
//! use pyinit_core::runtime::{SystemDetector, SystemRunner};
//!
//! let options = BootstrapOptions::new("my-project");
//! let runner = SystemRunner::new(CancelToken::new());
//! let report = Bootstrap::new(options, Settings::from_env(), runner, SilentReporter)
//!     .run(&SystemDetector)
//!     .await?;
//! println!("created {}", report.root.display());
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod project;
pub mod python;
pub mod report;
pub mod runtime;
pub mod vcs;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use bootstrap::{Bootstrap, BootstrapOptions, BootstrapReport};
pub use config::Settings;
pub use error::{BootstrapError, CommandError};
pub use project::{sanitize, Backend, COMPLETION_MARKER};
pub use report::{Reporter, SilentReporter};
pub use runtime::{CancelToken, CommandRunner, ToolAvailability};

#[cfg(feature = "tui")]
pub use tui::{run, CreateArgs};

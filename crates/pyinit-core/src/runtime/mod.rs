//! Host tools and external command execution
//!
//! This module provides:
//! - Tool detection for the Python interpreter, uv and git
//! - A timeout-bounded command runner with cooperative cancellation

pub mod cancel;
pub mod command;
pub mod tool;

pub use cancel::CancelToken;
pub use command::{CommandOutput, CommandRunner, CommandSpec, OutputMode, SystemRunner};
pub use tool::{
    find_python, python_candidates, SystemDetector, ToolAvailability, ToolDetector,
};

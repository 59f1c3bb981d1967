//! Error types for the bootstrap workflow
//!
//! Components below the orchestrator never terminate the process. They return one of
//! these errors and the orchestrator decides whether to roll back.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single external command
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program could not be started at all
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Waiting for the child failed
    #[error("Failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The program exited with a non-zero status
    #[error("`{command}` failed with exit code {}{}", display_code(.code), display_output(.output))]
    Failed {
        command: String,
        code: Option<i32>,
        /// Captured stdout and stderr (empty unless the output was captured)
        output: String,
    },

    /// The program did not finish in time and was killed
    #[error("`{command}` timed out after {} seconds", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    /// The user pressed Ctrl+C while the program was running
    #[error("Interrupted by user")]
    Interrupted,
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown (terminated by signal)".to_string(), |c| c.to_string())
}

fn display_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

/// Any failure of the bootstrap workflow
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("'{name}' is not a valid package name (avoid leading digits, symbols and Python keywords)")]
    InvalidName { name: String },

    #[error("'{}' exists and is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("Folder '{}' is not empty.\nUse --force to overwrite it.", .path.display())]
    NotEmpty { path: PathBuf },

    #[error("Project in '{}' was already created. Use --force to regenerate it.", .path.display())]
    AlreadyCompleted { path: PathBuf },

    #[error("Python not found on PATH (tried: {})", .candidates.join(", "))]
    InterpreterNotFound { candidates: Vec<&'static str> },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Command(CommandError),

    #[error("Cancelled by user")]
    Interrupted,
}

impl BootstrapError {
    /// Wrap an I/O error with a short description of what was being done
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error comes from a user interruption
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl From<CommandError> for BootstrapError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Interrupted => Self::Interrupted,
            other => Self::Command(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_command_maps_to_interrupted_bootstrap() {
        let err: BootstrapError = CommandError::Interrupted.into();
        assert!(err.is_interrupted());
    }

    #[test]
    fn test_failed_command_includes_output() {
        let err = CommandError::Failed {
            command: "uv venv .venv".to_string(),
            code: Some(2),
            output: "error: boom\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 2"));
        assert!(msg.ends_with("error: boom"));
    }

    #[test]
    fn test_not_empty_mentions_force() {
        let err = BootstrapError::NotEmpty {
            path: PathBuf::from("demo"),
        };
        assert!(err.to_string().contains("--force"));
    }
}

//! Detection of the Python interpreter, uv and git on PATH

use crate::error::BootstrapError;
use std::path::{Path, PathBuf};

/// Interpreter names tried in order on Windows
const WINDOWS_PYTHON_CANDIDATES: &[&str] = &["python3", "python", "py"];

/// Interpreter names tried in order everywhere else
const UNIX_PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Interpreter names to try on the current platform, in order
pub fn python_candidates() -> &'static [&'static str] {
    if cfg!(windows) {
        WINDOWS_PYTHON_CANDIDATES
    } else {
        UNIX_PYTHON_CANDIDATES
    }
}

/// Tools available for one run
///
/// Computed once before any mutation and passed to every component that needs it.
/// A missing `uv` or `git` is not an error; it selects the fallback path instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAvailability {
    /// Interpreter used for `-m venv` and as the default uv interpreter
    pub python: PathBuf,
    /// The uv environment/package manager, when installed
    pub uv: Option<PathBuf>,
    /// The git binary, when installed
    pub git: Option<PathBuf>,
}

impl ToolAvailability {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            uv: None,
            git: None,
        }
    }

    pub fn with_uv(mut self, uv: impl Into<PathBuf>) -> Self {
        self.uv = Some(uv.into());
        self
    }

    pub fn with_git(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = Some(git.into());
        self
    }

    pub fn uv(&self) -> Option<&Path> {
        self.uv.as_deref()
    }

    pub fn git(&self) -> Option<&Path> {
        self.git.as_deref()
    }
}

/// Source of [`ToolAvailability`]
///
/// The orchestrator asks for tools only after its input checks pass.
pub trait ToolDetector {
    fn detect(&self) -> Result<ToolAvailability, BootstrapError>;
}

/// A fixed availability is its own detector
impl ToolDetector for ToolAvailability {
    fn detect(&self) -> Result<ToolAvailability, BootstrapError> {
        Ok(self.clone())
    }
}

/// Detector that searches the process PATH
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDetector;

impl ToolDetector for SystemDetector {
    fn detect(&self) -> Result<ToolAvailability, BootstrapError> {
        let lookup = |name: &str| which::which(name).ok();

        let python = find_python(python_candidates(), lookup)?;
        let uv = lookup("uv");
        let git = lookup("git");

        tracing::debug!(python = %python.display(), ?uv, ?git, "Detected tools");

        Ok(ToolAvailability { python, uv, git })
    }
}

/// Return the first candidate that resolves, or fail when none does
pub fn find_python<F>(candidates: &[&'static str], lookup: F) -> Result<PathBuf, BootstrapError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    candidates
        .iter()
        .find_map(|name| lookup(name))
        .ok_or_else(|| BootstrapError::InterpreterNotFound {
            candidates: candidates.to_vec(),
        })
}

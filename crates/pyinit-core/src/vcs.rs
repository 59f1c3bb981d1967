//! Best-effort git repository initialization

use crate::config::Settings;
use crate::error::BootstrapError;
use crate::report::Reporter;
use crate::runtime::{CommandRunner, CommandSpec, OutputMode, ToolAvailability};
use std::path::Path;

/// Branch created by `git init`
pub const DEFAULT_BRANCH: &str = "main";

/// Message of the first commit
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Result of [`init_vcs`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsOutcome {
    Initialized,
    /// git is not installed
    Unavailable,
    /// A git command failed; the run continues
    Failed,
}

/// Initialize a repository in `root` and commit everything.
///
/// Only an interruption is returned as an error. Any other failure (no git identity,
/// an existing repository, an old git without `-b`) is reported as a warning.
pub async fn init_vcs<R, P>(
    runner: &R,
    reporter: &P,
    root: &Path,
    tools: &ToolAvailability,
    settings: &Settings,
    verbose: bool,
) -> Result<VcsOutcome, BootstrapError>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    let Some(git) = tools.git() else {
        tracing::debug!("git not found, skipping repository initialization");
        return Ok(VcsOutcome::Unavailable);
    };

    reporter.step("Initializing git repository...");

    let steps: [&[&str]; 3] = [
        &["init", "-b", DEFAULT_BRANCH],
        &["add", "."],
        &["commit", "-m", INITIAL_COMMIT_MESSAGE],
    ];

    for args in steps {
        let spec = CommandSpec::new(git, settings.git_timeout)
            .args(args)
            .current_dir(root)
            .output(OutputMode::quiet_unless(verbose));

        if let Err(err) = runner.run(spec).await {
            let err = BootstrapError::from(err);
            if err.is_interrupted() {
                return Err(err);
            }
            tracing::warn!(error = %err, "git initialization failed");
            reporter.warn("Git identity incomplete or repository already exists. Continuing...");
            return Ok(VcsOutcome::Failed);
        }
    }

    reporter.success(&format!("Git repository initialized on branch '{}'", DEFAULT_BRANCH));
    Ok(VcsOutcome::Initialized)
}

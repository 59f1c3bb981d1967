//! Editable install of the generated project into its own environment

use super::environment::{BuiltEnvironment, UV_LINK_MODE_ENV, VENV_DIR};
use crate::config::Settings;
use crate::error::BootstrapError;
use crate::report::Reporter;
use crate::runtime::{CommandRunner, CommandSpec, OutputMode, ToolAvailability};
use std::path::{Path, PathBuf};

/// What [`install`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Installed with `uv pip install -e .`
    Uv,
    /// Installed with the environment's own pip
    Pip,
    /// Nothing usable to install with
    Skipped,
}

/// Interpreter inside the project's environment
pub fn venv_python(root: &Path) -> PathBuf {
    let venv = root.join(VENV_DIR);
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

/// Install the project at `root` in editable mode.
///
/// Missing tooling is a warning, not an error. Command failures are returned.
pub async fn install<R, P>(
    runner: &R,
    reporter: &P,
    root: &Path,
    tools: &ToolAvailability,
    env: &BuiltEnvironment,
    settings: &Settings,
    verbose: bool,
) -> Result<InstallOutcome, BootstrapError>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    let output = OutputMode::quiet_unless(verbose);

    if let Some(uv) = tools.uv() {
        reporter.step("Installing project in editable mode with uv...");
        let mut spec = CommandSpec::new(uv, settings.install_timeout)
            .args(["pip", "install", "-e", "."])
            .current_dir(root)
            .output(output);
        // Same staging strategy the environment needed
        if env.link_mode.is_copy() {
            spec = spec.env(UV_LINK_MODE_ENV, "copy");
        }
        runner.run(spec).await?;
        return Ok(InstallOutcome::Uv);
    }

    let python = venv_python(root);
    if !python.is_file() {
        reporter.warn(&format!(
            "Environment interpreter not found at {}. Skipping install",
            python.display()
        ));
        tracing::warn!(path = %python.display(), "Skipping editable install");
        return Ok(InstallOutcome::Skipped);
    }

    reporter.step("Installing project in editable mode with pip...");
    let spec = CommandSpec::new(python, settings.install_timeout)
        .args(["-m", "pip", "install", "-e", "."])
        .current_dir(root)
        .output(output);
    runner.run(spec).await?;

    Ok(InstallOutcome::Pip)
}

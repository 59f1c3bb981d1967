//! cliclack output for the bootstrap workflow

use crate::bootstrap::{Bootstrap, BootstrapOptions, BootstrapReport};
use crate::config::Settings;
use crate::error::BootstrapError;
use crate::project::Backend;
use crate::python::InstallOutcome;
use crate::report::Reporter;
use crate::runtime::{CancelToken, SystemDetector, SystemRunner};
use crate::vcs::VcsOutcome;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// CLI arguments for the create command
#[derive(Debug, Clone)]
pub struct CreateArgs {
    /// Project folder to create
    pub folder: PathBuf,

    /// Build backend for pyproject.toml
    pub backend: Backend,

    /// Python version for uv
    pub python: Option<String>,

    /// Overwrite a non-empty folder and clear the completion marker
    pub force: bool,

    /// Initialize a git repository
    pub git: bool,

    /// Install the project in editable mode
    pub run: bool,

    /// Show output of external commands
    pub verbose: bool,
}

impl From<CreateArgs> for BootstrapOptions {
    fn from(args: CreateArgs) -> Self {
        BootstrapOptions {
            folder: args.folder,
            backend: args.backend,
            python_version: args.python,
            force: args.force,
            git: args.git,
            install: args.run,
            verbose: args.verbose,
        }
    }
}

/// Reporter printing through cliclack's log functions
#[derive(Debug, Clone, Copy, Default)]
pub struct ClackReporter;

impl Reporter for ClackReporter {
    fn step(&self, message: &str) {
        let _ = cliclack::log::step(message);
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn warn(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn success(&self, message: &str) {
        let _ = cliclack::log::success(message);
    }
}

/// Run the bootstrap workflow with terminal output
///
/// Returns the workflow error unchanged (wrapped in anyhow) so the caller can pick the
/// exit code.
pub async fn run(args: CreateArgs, cancel: CancelToken) -> Result<()> {
    crate::logging::init(args.verbose);
    cliclack::intro(" pyinit ".on_cyan().black().to_string())?;

    let settings = Settings::from_env();
    let runner = SystemRunner::new(cancel.clone());
    let bootstrap = Bootstrap::new(args.into(), settings, runner, ClackReporter).with_cancel(cancel);

    match bootstrap.run(&SystemDetector).await {
        Ok(report) => {
            print_summary(&report)?;
            print_next_steps(&report)?;
            Ok(())
        }
        Err(err) => {
            print_failure(&err)?;
            Err(err.into())
        }
    }
}

fn print_summary(report: &BootstrapReport) -> Result<()> {
    match report.install {
        Some(InstallOutcome::Uv) | Some(InstallOutcome::Pip) => {
            cliclack::log::success("Project installed in editable mode")?
        }
        Some(InstallOutcome::Skipped) => cliclack::log::warning("Editable install skipped")?,
        None => {}
    }
    if report.vcs == Some(VcsOutcome::Unavailable) {
        cliclack::log::warning("git not found, repository not initialized")?;
    }
    cliclack::log::success(format!(
        "Project created: {} ({} backend)",
        report.root.display(),
        report.backend
    ))?;
    Ok(())
}

fn print_next_steps(report: &BootstrapReport) -> Result<()> {
    let steps = report.next_steps();

    println!();
    println!("  {}", "Next steps".bold());
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }
    println!();

    cliclack::outro("Happy coding!")?;

    Ok(())
}

fn print_failure(err: &BootstrapError) -> Result<()> {
    if err.is_interrupted() {
        cliclack::outro_cancel("Cancelled by user.")?;
    } else {
        cliclack::log::error(err.to_string())?;
        cliclack::outro_cancel("Project was not created.")?;
    }
    Ok(())
}

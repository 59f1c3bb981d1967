//! Bootstrap workflow orchestration
//!
//! [`Bootstrap::run`] is the only place that decides about cleanup. It validates the
//! input, checks the target folder, detects tools and then walks through the stages:
//!
//! ```text
//! START -> VALIDATED -> ROOT_READY -> ENV_READY -> SCAFFOLDED -> (INSTALLED) -> (VCS_READY) -> COMPLETE
//! ```
//!
//! Any error after the root is created rolls back: the root is deleted if this run
//! created it and left alone otherwise. The completion marker is written last.

use crate::config::Settings;
use crate::error::BootstrapError;
use crate::project::{self, Backend, CompletionMarker, PackageName, COMPLETION_MARKER};
use crate::python::{self, BuiltEnvironment, InstallOutcome};
use crate::report::Reporter;
use crate::runtime::{CancelToken, CommandRunner, ToolAvailability, ToolDetector};
use crate::vcs::{self, VcsOutcome};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Workflow stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Validated,
    RootReady,
    EnvReady,
    Scaffolded,
    Installed,
    VcsReady,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Validated => "validation",
            Stage::RootReady => "project folder creation",
            Stage::EnvReady => "environment creation",
            Stage::Scaffolded => "file generation",
            Stage::Installed => "editable install",
            Stage::VcsReady => "git initialization",
            Stage::Complete => "completion",
        };
        f.write_str(name)
    }
}

/// User choices for one run
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Target folder as given by the user
    pub folder: PathBuf,
    pub backend: Backend,
    /// Interpreter version for uv, e.g. `3.12`
    pub python_version: Option<String>,
    /// Allow a non-empty folder and clear a previous completion marker
    pub force: bool,
    /// Run `git init` and commit
    pub git: bool,
    /// Install the project in editable mode
    pub install: bool,
    /// Show child process output
    pub verbose: bool,
}

impl BootstrapOptions {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            backend: Backend::default(),
            python_version: None,
            force: false,
            git: false,
            install: false,
            verbose: false,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    /// Folder as given by the user
    pub folder: PathBuf,
    /// Absolute project root
    pub root: PathBuf,
    pub package: PackageName,
    pub backend: Backend,
    pub environment: BuiltEnvironment,
    /// Generated files, relative to `root`
    pub files: Vec<PathBuf>,
    pub install: Option<InstallOutcome>,
    pub vcs: Option<VcsOutcome>,
}

impl BootstrapReport {
    /// Commands the user runs next
    pub fn next_steps(&self) -> Vec<String> {
        let mut steps = vec![
            format!("cd {}", self.folder.display()),
            python::activate_command(),
        ];

        let installed = matches!(self.install, Some(InstallOutcome::Uv | InstallOutcome::Pip));
        if !installed {
            let hint = if self.environment.used_hardlinks() {
                "uv pip install -e ."
            } else if self.environment.accelerated {
                "uv pip install -e . --link-mode=copy"
            } else {
                "pip install -e ."
            };
            steps.push(hint.to_string());
        }

        steps.push(self.package.to_string());
        steps
    }
}

/// Input checks passed; nothing has been created yet
#[derive(Debug)]
struct Plan {
    root: PathBuf,
    package: PackageName,
    marker: CompletionMarker,
}

/// One bootstrap run
pub struct Bootstrap<R, P> {
    options: BootstrapOptions,
    settings: Settings,
    runner: R,
    reporter: P,
    cancel: CancelToken,
}

impl<R: CommandRunner, P: Reporter> Bootstrap<R, P> {
    pub fn new(options: BootstrapOptions, settings: Settings, runner: R, reporter: P) -> Self {
        Self {
            options,
            settings,
            runner,
            reporter,
            cancel: CancelToken::new(),
        }
    }

    /// Check this token between stages
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the whole workflow
    pub async fn run<D>(&self, detector: &D) -> Result<BootstrapReport, BootstrapError>
    where
        D: ToolDetector + ?Sized,
    {
        let mut stage = Stage::Start;
        tracing::debug!(%stage, folder = %self.options.folder.display(), "Starting bootstrap");

        let package = package_name(&self.options.folder)?;
        let root = absolute(&self.options.folder)?;
        // Decides rollback; must be computed before anything is touched
        let owns_root = !root.exists();

        let plan = Plan {
            marker: CompletionMarker::in_root(&root),
            root,
            package,
        };
        self.preflight(&plan)?;

        let tools = detector.detect()?;
        self.reporter
            .info(&format!("Python found: {}", tools.python.display()));

        stage = Stage::Validated;
        match self.execute(&plan, &tools, &mut stage).await {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::debug!(%stage, error = %err, "Bootstrap failed after stage");
                if owns_root {
                    self.rollback(&plan.root);
                } else if plan.root.exists() {
                    self.reporter.info(&format!(
                        "{} existed before this run and was left as is",
                        plan.root.display()
                    ));
                }
                Err(err)
            }
        }
    }

    /// The folder must be missing or empty, apart from the completion marker, unless forced.
    /// A present marker fails the run unless forced, in which case it is removed.
    fn preflight(&self, plan: &Plan) -> Result<(), BootstrapError> {
        let root = &plan.root;
        let force = self.options.force;

        if root.exists() && !root.is_dir() {
            return Err(BootstrapError::NotADirectory { path: root.clone() });
        }

        if plan.marker.exists() && !force {
            return Err(BootstrapError::AlreadyCompleted { path: root.clone() });
        }

        if root.exists() && !force {
            let read_error =
                |e: io::Error| BootstrapError::io(format!("Failed to read {}", root.display()), e);
            let mut foreign = 0;
            for entry in fs::read_dir(root).map_err(read_error)? {
                if entry.map_err(read_error)?.file_name() != COMPLETION_MARKER {
                    foreign += 1;
                }
            }
            if foreign > 0 {
                return Err(BootstrapError::NotEmpty { path: root.clone() });
            }
        }

        if plan.marker.exists() {
            plan.marker.remove()?;
            self.reporter.info("Cleared previous completion marker (--force)");
        }

        Ok(())
    }

    async fn execute(
        &self,
        plan: &Plan,
        tools: &ToolAvailability,
        stage: &mut Stage,
    ) -> Result<BootstrapReport, BootstrapError> {
        let options = &self.options;
        let root = plan.root.as_path();

        self.reporter.step(&format!(
            "Creating project '{}' with backend '{}'",
            plan.package, options.backend
        ));

        // Parents are not created, so rollback of `root` leaves nothing behind
        match fs::create_dir(root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && root.is_dir() => {}
            Err(e) => {
                return Err(BootstrapError::io(
                    format!("Failed to create {}", root.display()),
                    e,
                ));
            }
        }
        self.advance(stage, Stage::RootReady)?;

        let environment = python::build(
            &self.runner,
            &self.reporter,
            root,
            tools,
            options.python_version.as_deref(),
            &self.settings,
            options.verbose,
        )
        .await?;
        self.advance(stage, Stage::EnvReady)?;

        let files = project::generate(root, &plan.package, options.backend).await?;
        self.reporter
            .success(&format!("Created {} files in {}", files.len(), root.display()));
        self.advance(stage, Stage::Scaffolded)?;

        let install = if options.install {
            let outcome = python::install(
                &self.runner,
                &self.reporter,
                root,
                tools,
                &environment,
                &self.settings,
                options.verbose,
            )
            .await?;
            self.advance(stage, Stage::Installed)?;
            Some(outcome)
        } else {
            None
        };

        let vcs = if options.git {
            let outcome = vcs::init_vcs(
                &self.runner,
                &self.reporter,
                root,
                tools,
                &self.settings,
                options.verbose,
            )
            .await?;
            self.advance(stage, Stage::VcsReady)?;
            Some(outcome)
        } else {
            None
        };

        plan.marker.write()?;
        *stage = Stage::Complete;

        Ok(BootstrapReport {
            folder: options.folder.clone(),
            root: plan.root.clone(),
            package: plan.package.clone(),
            backend: options.backend,
            environment,
            files,
            install,
            vcs,
        })
    }

    fn advance(&self, stage: &mut Stage, next: Stage) -> Result<(), BootstrapError> {
        if self.cancel.is_cancelled() {
            return Err(BootstrapError::Interrupted);
        }
        tracing::debug!(from = %stage, to = %next, "Stage complete");
        *stage = next;
        Ok(())
    }

    /// Delete a root this run created. Failure is reported, never raised.
    fn rollback(&self, root: &Path) {
        if !root.exists() {
            return;
        }
        self.reporter.info("Cleaning up incomplete project...");
        if let Err(e) = fs::remove_dir_all(root) {
            tracing::warn!(path = %root.display(), error = %e, "Rollback failed");
            self.reporter.warn(&format!(
                "Could not delete {}: {}. Please remove it manually.",
                root.display(),
                e
            ));
        }
    }
}

/// Package name from the last component of the folder path
fn package_name(folder: &Path) -> Result<PackageName, BootstrapError> {
    let name = folder
        .file_name()
        .ok_or_else(|| BootstrapError::InvalidName {
            name: folder.display().to_string(),
        })?;
    project::sanitize(&name.to_string_lossy())
}

fn absolute(folder: &Path) -> Result<PathBuf, BootstrapError> {
    if folder.is_absolute() {
        return Ok(folder.to_path_buf());
    }
    let current_dir = std::env::current_dir()
        .map_err(|e| BootstrapError::io("Failed to read the current directory", e))?;
    Ok(current_dir.join(folder))
}

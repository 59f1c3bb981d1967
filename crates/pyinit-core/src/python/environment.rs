//! Virtual environment creation

use crate::config::Settings;
use crate::error::{BootstrapError, CommandError};
use crate::report::Reporter;
use crate::runtime::{CommandRunner, CommandSpec, OutputMode, ToolAvailability};
use std::path::Path;

/// Environment directory, relative to the project root
pub const VENV_DIR: &str = ".venv";

/// Variable uv reads to choose how it populates environments
pub const UV_LINK_MODE_ENV: &str = "UV_LINK_MODE";

/// How uv staged files into the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// uv's default (hardlinks where possible)
    Default,
    /// `UV_LINK_MODE=copy`, needed on cloud-synced folders and across devices
    Copy,
}

impl LinkMode {
    pub fn is_copy(&self) -> bool {
        matches!(self, LinkMode::Copy)
    }
}

/// Result of [`build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltEnvironment {
    /// Whether uv created the environment
    pub accelerated: bool,
    pub link_mode: LinkMode,
}

impl BuiltEnvironment {
    /// uv succeeded with its default hardlink strategy
    pub fn used_hardlinks(&self) -> bool {
        self.accelerated && self.link_mode == LinkMode::Default
    }
}

/// Create `<root>/.venv`.
///
/// Without uv the interpreter's `venv` module is used and `python_version` is ignored.
/// With uv, a failure whose output matches the link-failure signatures is retried once
/// with `UV_LINK_MODE=copy`; any other failure is returned.
pub async fn build<R, P>(
    runner: &R,
    reporter: &P,
    root: &Path,
    tools: &ToolAvailability,
    python_version: Option<&str>,
    settings: &Settings,
    verbose: bool,
) -> Result<BuiltEnvironment, BootstrapError>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    let Some(uv) = tools.uv() else {
        reporter.step("Creating virtual environment with the standard venv module...");
        if let Some(version) = python_version {
            reporter.warn(&format!(
                "--python {} requires uv. Ignoring it and using {}",
                version,
                tools.python.display()
            ));
        }

        let spec = CommandSpec::new(&tools.python, settings.venv_timeout)
            .args(["-m", "venv", VENV_DIR])
            .current_dir(root)
            .output(OutputMode::quiet_unless(verbose));
        runner.run(spec).await?;

        return Ok(BuiltEnvironment {
            accelerated: false,
            link_mode: LinkMode::Default,
        });
    };

    match python_version {
        Some(version) => reporter.step(&format!(
            "Creating virtual environment with uv (Python {})...",
            version
        )),
        None => reporter.step("Creating virtual environment with uv..."),
    }

    let interpreter = python_version
        .map(str::to_string)
        .unwrap_or_else(|| tools.python.to_string_lossy().into_owned());
    let spec = CommandSpec::new(uv, settings.venv_timeout)
        .args(["venv", VENV_DIR, "--python"])
        .arg(&interpreter)
        .current_dir(root)
        .output(OutputMode::Capture);

    // Try the fast path first
    let failure_output = match runner.run(spec.clone()).await {
        Ok(output) => {
            echo_if_verbose(reporter, &output.combined(), verbose);
            return Ok(BuiltEnvironment {
                accelerated: true,
                link_mode: LinkMode::Default,
            });
        }
        Err(CommandError::Failed { output, .. })
            if settings.link_failure_signatures.matches(&output) =>
        {
            output
        }
        Err(err) => return Err(err.into()),
    };

    echo_if_verbose(reporter, &failure_output, verbose);
    tracing::debug!(output = %failure_output.trim(), "uv venv failed with a link error");
    reporter.info("Hardlink problem detected (OneDrive, Dropbox or cross-drive folder)");
    reporter.info("Retrying with copy mode...");

    let retry = spec
        .env(UV_LINK_MODE_ENV, "copy")
        .output(OutputMode::quiet_unless(verbose));
    runner.run(retry).await?;

    Ok(BuiltEnvironment {
        accelerated: true,
        link_mode: LinkMode::Copy,
    })
}

/// Captured uv output is only shown when verbose
fn echo_if_verbose<P: Reporter + ?Sized>(reporter: &P, output: &str, verbose: bool) {
    if verbose && !output.trim().is_empty() {
        reporter.info(output.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{RecordingReporter, SilentReporter};
    use crate::runtime::CommandOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays one scripted outcome per call and records every spec
    struct ScriptedRunner {
        outcomes: Mutex<Vec<Result<CommandOutput, CommandError>>>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedRunner {
        fn new(outcomes: Vec<Result<CommandOutput, CommandError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError> {
            self.calls.lock().unwrap().push(spec);
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn failed(output: &str) -> Result<CommandOutput, CommandError> {
        Err(CommandError::Failed {
            command: "uv venv .venv".to_string(),
            code: Some(2),
            output: output.to_string(),
        })
    }

    fn with_uv() -> ToolAvailability {
        ToolAvailability::new("/usr/bin/python3").with_uv("/usr/bin/uv")
    }

    fn args(spec: &CommandSpec) -> Vec<String> {
        spec.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_standard_venv_without_uv() {
        let runner = ScriptedRunner::new(vec![Ok(CommandOutput::default())]);
        let tools = ToolAvailability::new("/usr/bin/python3");
        let root = Path::new("/tmp/project");
        let reporter = RecordingReporter::default();

        let built = build(
            &runner,
            &reporter,
            root,
            &tools,
            Some("3.12"),
            &Settings::default(),
            false,
        )
        .await
        .unwrap();

        assert!(!built.accelerated);
        let warnings = reporter.at("warn");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("--python 3.12 requires uv"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, Path::new("/usr/bin/python3"));
        assert_eq!(args(&calls[0]), ["-m", "venv", ".venv"]);
        assert_eq!(calls[0].cwd(), Some(root));
        assert_eq!(calls[0].output, OutputMode::Suppress);
    }

    #[tokio::test]
    async fn test_uv_pins_requested_version() {
        let runner = ScriptedRunner::new(vec![Ok(CommandOutput::default())]);

        let built = build(
            &runner,
            &SilentReporter,
            Path::new("/tmp/project"),
            &with_uv(),
            Some("3.11"),
            &Settings::default(),
            false,
        )
        .await
        .unwrap();

        assert!(built.used_hardlinks());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(args(&calls[0]), ["venv", ".venv", "--python", "3.11"]);
        assert_eq!(calls[0].env_value(UV_LINK_MODE_ENV), None);
    }

    #[tokio::test]
    async fn test_uv_defaults_to_detected_interpreter() {
        let runner = ScriptedRunner::new(vec![Ok(CommandOutput::default())]);

        build(
            &runner,
            &SilentReporter,
            Path::new("/tmp/project"),
            &with_uv(),
            None,
            &Settings::default(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(
            args(&runner.calls()[0]),
            ["venv", ".venv", "--python", "/usr/bin/python3"]
        );
    }

    #[tokio::test]
    async fn test_link_failure_retries_once_with_copy_mode() {
        let runner = ScriptedRunner::new(vec![
            failed("error: failed to hardlink file (os error 396)"),
            Ok(CommandOutput::default()),
        ]);

        let built = build(
            &runner,
            &SilentReporter,
            Path::new("/tmp/project"),
            &with_uv(),
            None,
            &Settings::default(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(built.link_mode, LinkMode::Copy);
        assert!(!built.used_hardlinks());
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].env_value(UV_LINK_MODE_ENV), None);
        assert_eq!(calls[1].env_value(UV_LINK_MODE_ENV), Some("copy"));
        assert_eq!(args(&calls[0]), args(&calls[1]));
    }

    #[tokio::test]
    async fn test_copy_retry_failure_propagates() {
        let runner = ScriptedRunner::new(vec![
            failed("Invalid cross-device link (os error 18)"),
            failed("disk full"),
        ]);

        let err = build(
            &runner,
            &SilentReporter,
            Path::new("/tmp/project"),
            &with_uv(),
            None,
            &Settings::default(),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BootstrapError::Command(CommandError::Failed { .. })));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unrelated_failure_is_not_retried() {
        let runner = ScriptedRunner::new(vec![failed(
            "error: No interpreter found for Python 3.99 in managed installations",
        )]);

        let err = build(
            &runner,
            &SilentReporter,
            Path::new("/tmp/project"),
            &with_uv(),
            Some("3.99"),
            &Settings::default(),
            false,
        )
        .await
        .unwrap_err();

        match err {
            BootstrapError::Command(CommandError::Failed { output, .. }) => {
                assert!(output.contains("3.99"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let runner = ScriptedRunner::new(vec![Err(CommandError::TimedOut {
            command: "uv venv .venv".to_string(),
            timeout: std::time::Duration::from_secs(1),
        })]);

        let err = build(
            &runner,
            &SilentReporter,
            Path::new("/tmp/project"),
            &with_uv(),
            None,
            &Settings::default(),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BootstrapError::Command(CommandError::TimedOut { .. })));
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_verbose_echoes_captured_output_through_reporter() {
        let runner = ScriptedRunner::new(vec![Ok(CommandOutput {
            stdout: String::new(),
            stderr: "Using CPython 3.12.1\nCreating virtual environment at: .venv\n".to_string(),
        })]);
        let reporter = RecordingReporter::default();

        build(
            &runner,
            &reporter,
            Path::new("/tmp/project"),
            &with_uv(),
            None,
            &Settings::default(),
            true,
        )
        .await
        .unwrap();

        assert!(reporter
            .at("info")
            .contains(&"Using CPython 3.12.1\nCreating virtual environment at: .venv".to_string()));
    }
}

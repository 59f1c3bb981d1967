//! External command execution with timeout and cancellation

use super::cancel::CancelToken;
use crate::error::CommandError;
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// What happens to the child's stdout and stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Shared with this process's terminal
    Inherit,
    /// Discarded
    Suppress,
    /// Collected and returned in [`CommandOutput`] (or in [`CommandError::Failed`])
    Capture,
}

impl OutputMode {
    /// Inherit when verbose, discard otherwise
    pub fn quiet_unless(verbose: bool) -> Self {
        if verbose {
            Self::Inherit
        } else {
            Self::Suppress
        }
    }
}

/// A single external command invocation
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// Variables set for this child only
    pub env: Vec<(String, String)>,
    pub output: OutputMode,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            output: OutputMode::Inherit,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// File name of the program without its directory, e.g. `uv`
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Human-readable command line, e.g. `uv venv .venv`
    pub fn display(&self) -> String {
        std::iter::once(self.program_name())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Look up an env override set on this spec
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

/// Output of a successful command. Empty unless [`OutputMode::Capture`] was used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stderr followed by stdout, as one string
    pub fn combined(&self) -> String {
        let mut combined = self.stderr.clone();
        if !combined.is_empty() && !self.stdout.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&self.stdout);
        combined
    }
}

/// Runs external commands: one attempt each, no retries
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    ///
    /// Non-zero exit, timeout and interruption are all errors.
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// Runner that spawns real processes with tokio
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    cancel: CancelToken,
}

impl SystemRunner {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError> {
        let command_line = spec.display();
        tracing::debug!(
            command = %command_line,
            cwd = ?spec.cwd,
            env = ?spec.env,
            timeout_secs = spec.timeout.as_secs(),
            "Running command"
        );

        if self.cancel.is_cancelled() {
            return Err(CommandError::Interrupted);
        }

        let mut command = TokioCommand::new(&spec.program);
        command.args(&spec.args).stdin(Stdio::null()).kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        match spec.output {
            OutputMode::Inherit => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Suppress => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
            }
            OutputMode::Capture => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        // Drain pipes concurrently so a chatty child cannot block on a full pipe
        let stdout_task = child.stdout.take().map(|out| tokio::spawn(read_to_string(out)));
        let stderr_task = child.stderr.take().map(|err| tokio::spawn(read_to_string(err)));

        let status = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                let _ = child.kill().await;
                return Err(CommandError::Interrupted);
            }
            waited = timeout(spec.timeout, child.wait()) => match waited {
                Ok(Ok(status)) => status,
                Ok(Err(source)) => {
                    return Err(CommandError::Wait {
                        command: command_line,
                        source,
                    });
                }
                Err(_) => {
                    // Kill the process on timeout
                    let _ = child.kill().await;
                    return Err(CommandError::TimedOut {
                        command: command_line,
                        timeout: spec.timeout,
                    });
                }
            },
        };

        // A Ctrl+C reaches the child too; report the interruption, not the child's exit code
        if self.cancel.is_cancelled() {
            return Err(CommandError::Interrupted);
        }

        let output = CommandOutput {
            stdout: collect(stdout_task).await,
            stderr: collect(stderr_task).await,
        };

        if status.success() {
            Ok(output)
        } else {
            Err(CommandError::Failed {
                command: command_line,
                code: status.code(),
                output: output.combined(),
            })
        }
    }
}

async fn read_to_string<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

async fn collect(task: Option<JoinHandle<String>>) -> String {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_program_name() {
        let spec = CommandSpec::new("/usr/local/bin/uv", Duration::from_secs(1))
            .args(["venv", ".venv"])
            .env("UV_LINK_MODE", "copy");
        assert_eq!(spec.display(), "uv venv .venv");
        assert_eq!(spec.env_value("UV_LINK_MODE"), Some("copy"));
        assert_eq!(spec.env_value("PATH"), None);
    }

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "err\nout");
        assert_eq!(CommandOutput::default().combined(), "");
    }

    #[test]
    fn test_quiet_unless_verbose() {
        assert_eq!(OutputMode::quiet_unless(true), OutputMode::Inherit);
        assert_eq!(OutputMode::quiet_unless(false), OutputMode::Suppress);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = SystemRunner::default();
        let spec = CommandSpec::new("pyinit-definitely-not-a-real-binary", Duration::from_secs(5));
        let err = runner.run(spec).await.unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let runner = SystemRunner::new(cancel);
        let spec = CommandSpec::new("pyinit-definitely-not-a-real-binary", Duration::from_secs(5));
        let err = runner.run(spec).await.unwrap_err();
        assert!(matches!(err, CommandError::Interrupted));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn sh(script: &str, secs: u64) -> CommandSpec {
            CommandSpec::new("sh", Duration::from_secs(secs)).args(["-c", script])
        }

        #[tokio::test]
        async fn test_captures_output() {
            let runner = SystemRunner::default();
            let output = runner
                .run(sh("echo hello; echo oops >&2", 10).output(OutputMode::Capture))
                .await
                .unwrap();
            assert_eq!(output.stdout.trim(), "hello");
            assert_eq!(output.stderr.trim(), "oops");
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_failure_with_output() {
            let runner = SystemRunner::default();
            let err = runner
                .run(sh("echo broken link >&2; exit 3", 10).output(OutputMode::Capture))
                .await
                .unwrap_err();
            match err {
                CommandError::Failed { code, output, .. } => {
                    assert_eq!(code, Some(3));
                    assert!(output.contains("broken link"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_suppressed_failure_has_no_output() {
            let runner = SystemRunner::default();
            let err = runner
                .run(sh("echo noisy; exit 1", 10).output(OutputMode::Suppress))
                .await
                .unwrap_err();
            match err {
                CommandError::Failed { output, .. } => assert!(output.is_empty()),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_env_and_cwd_are_applied() {
            let dir = tempfile::tempdir().unwrap();
            let runner = SystemRunner::default();
            let output = runner
                .run(
                    sh("printf '%s' \"$PYINIT_TEST_VALUE\" > value.txt", 10)
                        .current_dir(dir.path())
                        .env("PYINIT_TEST_VALUE", "copy")
                        .output(OutputMode::Capture),
                )
                .await;
            assert!(output.is_ok());
            let written = std::fs::read_to_string(dir.path().join("value.txt")).unwrap();
            assert_eq!(written, "copy");
        }

        #[tokio::test]
        async fn test_timeout_kills_child() {
            let runner = SystemRunner::default();
            let spec = CommandSpec::new("sleep", Duration::from_millis(200))
                .arg("5")
                .output(OutputMode::Suppress);
            let started = std::time::Instant::now();
            let err = runner.run(spec).await.unwrap_err();
            assert!(matches!(err, CommandError::TimedOut { .. }));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[tokio::test]
        async fn test_cancel_interrupts_running_child() {
            let cancel = CancelToken::new();
            let runner = SystemRunner::new(cancel.clone());
            let trip = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            });
            let spec = CommandSpec::new("sleep", Duration::from_secs(30))
                .arg("5")
                .output(OutputMode::Suppress);
            let err = runner.run(spec).await.unwrap_err();
            trip.await.unwrap();
            assert!(matches!(err, CommandError::Interrupted));
        }
    }
}

//! Running external programs with captured output.
//!
//! Every collaborator of a run (`git`, `kustomize`, `diff`) is driven through
//! [`ProcessRunner`]. A runner is bound to a working directory and a set of
//! environment overrides layered on top of the inherited environment. A run
//! that fails to start or exits unsuccessfully becomes an
//! [`Error::Command`] carrying the original cause and both output streams.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

use log::{debug, trace};

use crate::error::{CommandFailure, Error, Result};

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs programs in a fixed working directory with environment overrides.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ProcessRunner {
    /// A runner that executes in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            env: BTreeMap::new(),
        }
    }

    /// A runner that executes in the current directory of this process.
    pub fn inherit() -> Self {
        Self::default()
    }

    /// Overlay an environment variable on the inherited environment.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run `program` with `args` and wait for it to exit.
    ///
    /// Returns the captured streams on a zero exit status. Any other outcome
    /// is an [`Error::Command`]; use [`Error::exit_code`] to tell an
    /// unsuccessful exit apart from a failure to start.
    pub fn run<I, S>(&self, program: impl AsRef<OsStr>, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let args: Vec<S> = args.into_iter().collect();
        let rendered = render_command_line(program, &args);

        let mut command = Command::new(program);
        command.args(&args).envs(&self.env);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        debug!("Running `{}`", rendered);
        let output = command.output().map_err(|e| Error::Command {
            command: rendered.clone(),
            cause: CommandFailure::Spawn(e),
            stdout: String::new(),
            stderr: String::new(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(
            "`{}` exited with {} ({} bytes stdout, {} bytes stderr)",
            rendered,
            output.status,
            stdout.len(),
            stderr.len()
        );

        if !output.status.success() {
            return Err(Error::Command {
                command: rendered,
                cause: CommandFailure::Exit(output.status),
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

fn render_command_line<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut line = program.to_string_lossy().into_owned();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_captures_stdout_and_stderr() {
        let output = ProcessRunner::inherit()
            .run("sh", ["-c", "echo out; echo err >&2"])
            .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[test]
    fn test_run_uses_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("marker.txt"), "here").unwrap();

        let output = ProcessRunner::new(temp_dir.path())
            .run("cat", ["marker.txt"])
            .unwrap();
        assert_eq!(output.stdout, "here");
    }

    #[test]
    fn test_run_overlays_environment() {
        let output = ProcessRunner::inherit()
            .with_env("KUSTOMIZE_DIFF_TEST_VALUE", "overlay")
            .run("sh", ["-c", "printf %s \"$KUSTOMIZE_DIFF_TEST_VALUE\""])
            .unwrap();
        assert_eq!(output.stdout, "overlay");
    }

    #[test]
    fn test_run_inherits_parent_environment() {
        let output = ProcessRunner::inherit()
            .run("sh", ["-c", "printf %s \"$PATH\""])
            .unwrap();
        assert!(!output.stdout.is_empty());
    }

    #[test]
    fn test_non_zero_exit_keeps_streams_and_code() {
        let err = ProcessRunner::inherit()
            .run("sh", ["-c", "echo partial; echo broken >&2; exit 3"])
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
        match &err {
            Error::Command {
                command,
                stdout,
                stderr,
                ..
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "broken\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("[stderr]\nbroken"));
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let err = ProcessRunner::inherit()
            .run("kustomize-diff-no-such-program", Vec::<&str>::new())
            .unwrap_err();
        assert_eq!(err.exit_code(), None);
        assert!(matches!(
            err,
            Error::Command {
                cause: CommandFailure::Spawn(_),
                ..
            }
        ));
    }
}

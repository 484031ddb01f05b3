//! Unified diffs through an external `diff` utility.
//!
//! `diff -u` exits with 0 when the inputs are identical and 1 when they
//! differ; both are successful outcomes here. Anything else, including a
//! program that cannot be started, is an [`Error::DiffUtility`].

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::defaults::{DEFAULT_DIFF_PROGRAM, DIFF_SCRATCH_PREFIX};
use crate::error::{Error, Result};
use crate::process::ProcessRunner;

/// Exit code of `diff` when the inputs differ.
const DIFFERENCES_FOUND: i32 = 1;

/// A line-diff utility compatible with `diff -u`.
#[derive(Debug, Clone)]
pub struct DiffTool {
    program: PathBuf,
}

impl DiffTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Unified diff of `old` against `new` with three lines of context.
    ///
    /// The two-line `---`/`+++` file header is stripped, so the result starts
    /// at the first hunk header. An empty string means no differences.
    pub fn unified(&self, old: &str, new: &str) -> Result<String> {
        let old_file = scratch_file(old)?;
        let new_file = scratch_file(new)?;

        let stdout = match self.run_diff(old_file.path(), new_file.path()) {
            Ok(stdout) => stdout,
            Err(e) if e.exit_code() == Some(DIFFERENCES_FOUND) => match e {
                Error::Command { stdout, .. } => stdout,
                other => return Err(Error::DiffUtility { cause: Box::new(other) }),
            },
            Err(e) => return Err(Error::DiffUtility { cause: Box::new(e) }),
        };

        Ok(strip_header(&stdout))
    }

    fn run_diff(&self, old: &Path, new: &Path) -> Result<String> {
        ProcessRunner::inherit()
            .run(
                &self.program,
                [OsStr::new("-u"), old.as_os_str(), new.as_os_str()],
            )
            .map(|output| output.stdout)
    }
}

impl Default for DiffTool {
    fn default() -> Self {
        Self::new(DEFAULT_DIFF_PROGRAM)
    }
}

/// Unified diff of `old` against `new` through the `diff` on the search path.
pub fn unified(old: &str, new: &str) -> Result<String> {
    DiffTool::default().unified(old, new)
}

fn scratch_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(DIFF_SCRATCH_PREFIX)
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

fn strip_header(output: &str) -> String {
    let lines: Vec<&str> = output.split('\n').collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[2..].join("\n")
}

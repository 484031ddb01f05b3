//! # Error Handling
//!
//! This module defines the error type shared by every stage of a
//! `kustomize-diff` run. It uses the `thiserror` library to build a single
//! `Error` enum whose variants line up with the failure policy of the run:
//!
//! - **Fatal, pre-discovery**: `Resolution` (a commit-ish cannot be
//!   resolved) and `Workspace` (clone, fetch, checkout, merge, apply or
//!   configuration copy failed). These abort the run and no report is
//!   produced.
//! - **Per-unit**: `Render`, `Kustomization`, `DiffUtility` and `Io`. These
//!   are captured into the unit's failure outcome and never escape the unit.
//!
//! Every error that comes out of an external process carries the full
//! captured stdout and stderr of that process (see [`Error::Command`]), and
//! the wrapping variants print their cause as part of their own message, so
//! `to_string()` on any error is self-contained.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Why an external command did not succeed.
#[derive(Error, Debug)]
pub enum CommandFailure {
    /// The program could not be started at all.
    #[error("failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    /// The program ran and exited unsuccessfully.
    #[error("{0}")]
    Exit(ExitStatus),
}

/// Main error type for kustomize-diff operations
#[derive(Error, Debug)]
pub enum Error {
    /// An external command failed to start or exited with a non-zero status.
    ///
    /// Both output streams are kept in full so that the message can be
    /// understood without re-running the command.
    #[error("`{command}` {cause}\n\n[stdout]\n{stdout}\n\n[stderr]\n{stderr}")]
    Command {
        command: String,
        #[source]
        cause: CommandFailure,
        stdout: String,
        stderr: String,
    },

    /// A commit-ish could not be resolved to a commit.
    #[error("Cannot resolve {reference:?} to a commit: {cause}")]
    Resolution {
        reference: String,
        #[source]
        cause: Box<Error>,
    },

    /// A version-control step on a workspace failed.
    #[error("Workspace {operation} failed in {}: {cause}{}", dir.display(), hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Workspace {
        operation: String,
        dir: PathBuf,
        #[source]
        cause: Box<Error>,
        /// Optional hint for how to resolve the failure
        hint: Option<String>,
    },

    /// Rendering a configuration unit failed.
    #[error("Render of {} failed: {cause}", dir.display())]
    Render {
        dir: PathBuf,
        #[source]
        cause: Box<Error>,
    },

    /// The built-in renderer rejected a kustomization.
    #[error("{message} ({})", path.display())]
    Kustomization { path: PathBuf, message: String },

    /// The line-diff utility failed for a reason other than "files differ".
    #[error("Diff utility failed: {cause}")]
    DiffUtility {
        #[source]
        cause: Box<Error>,
    },

    /// A load restrictor value that is not one of the known policies.
    #[error("Unknown load restrictor {value:?}; expected one of LoadRestrictionsUnknown, LoadRestrictionsRootOnly, LoadRestrictionsNone")]
    InvalidLoadRestrictor { value: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Exit code of the innermost failed command, if this error came from a
    /// command that ran to completion.
    ///
    /// Wrapping variants are unwrapped until a [`Error::Command`] is found.
    /// Returns `None` for spawn failures, signals and non-process errors.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Command {
                cause: CommandFailure::Exit(status),
                ..
            } => status.code(),
            Error::Resolution { cause, .. }
            | Error::Workspace { cause, .. }
            | Error::Render { cause, .. }
            | Error::DiffUtility { cause } => cause.exit_code(),
            _ => None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

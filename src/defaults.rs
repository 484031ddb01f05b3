//! Default values for kustomize-diff runs.
//!
//! This module provides centralized default values used by the library and
//! the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Commit-ish used as the base when none is given.
pub const DEFAULT_BASE: &str = "origin/main";

/// Commit-ish used as the target when the current branch is detached.
pub const DETACHED_TARGET: &str = "HEAD";

/// Descriptor file names that make a directory a configuration unit.
///
/// The first entry is the name written when a unit is synthesized.
pub const DESCRIPTOR_FILENAMES: [&str; 2] = ["kustomization.yaml", "kustomization.yml"];

/// Identity used for merge commits inside temporary workspaces.
pub const ANONYMOUS_EMAIL: &str = "anonymous@example.com";
pub const ANONYMOUS_NAME: &str = "anonymous";

/// Prefixes of the temporary workspace directories.
pub const BASE_SCRATCH_PREFIX: &str = "kustomize-diff-base-";
pub const TARGET_SCRATCH_PREFIX: &str = "kustomize-diff-target-";
pub const DIFF_SCRATCH_PREFIX: &str = "kustomize-diff-diff-";

/// Line-diff utility used when none is given.
pub const DEFAULT_DIFF_PROGRAM: &str = "diff";

/// Returns the default version-control binary.
///
/// A bare program name, so the executable search path decides which `git`
/// runs. Overridden by `--git-path` or `KUSTOMIZE_DIFF_GIT_PATH`.
pub fn default_git_path() -> PathBuf {
    PathBuf::from("git")
}

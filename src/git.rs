//! Git workspaces.
//!
//! A [`GitDir`] is a directory inside a git work tree, bound to the `git`
//! binary that manages it. It keeps both the work tree root and the
//! directory the caller asked for, so that a clone can be scoped to the same
//! relative subdirectory as the original.
//!
//! This uses the system git command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Any authentication configured in ~/.gitconfig

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::defaults::{ANONYMOUS_EMAIL, ANONYMOUS_NAME};
use crate::error::{Error, Result};
use crate::process::{CommandOutput, ProcessRunner};

/// A directory inside a git work tree.
#[derive(Debug, Clone)]
pub struct GitDir {
    git: PathBuf,
    root: PathBuf,
    dir: PathBuf,
}

impl GitDir {
    /// Open the work tree containing `dir`.
    ///
    /// Fails with [`Error::Workspace`] if `dir` is not inside a git work tree
    /// or `git` cannot be run.
    pub fn open(dir: &Path, git: &Path) -> Result<Self> {
        let git = program_path(git);
        let toplevel = ProcessRunner::new(dir)
            .run(&git, ["rev-parse", "--show-toplevel"])
            .map_err(|e| workspace_error("open", dir, e))?;
        let root = PathBuf::from(toplevel.stdout.trim_end_matches('\n'));
        let dir = match fs::canonicalize(dir) {
            Ok(dir) => dir,
            Err(_) => dir.to_path_buf(),
        };
        debug!("Opened work tree {} at {}", root.display(), dir.display());
        Ok(Self { git, root, dir })
    }

    /// The directory this handle is scoped to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The root of the work tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git_in(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput> {
        // Never block on a credential prompt; there is no terminal to answer it.
        ProcessRunner::new(dir)
            .with_env("GIT_TERMINAL_PROMPT", "0")
            .run(&self.git, args)
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        self.git_in(&self.dir, args)
    }

    /// Resolve a commit-ish to its short commit hash.
    pub fn resolve_commit(&self, reference: &str) -> Result<String> {
        let output = self
            .git(&["rev-parse", "--verify", "--short", reference])
            .map_err(|e| Error::Resolution {
                reference: reference.to_string(),
                cause: Box::new(e),
            })?;
        Ok(output.stdout.trim_end_matches('\n').to_string())
    }

    /// Name of the checked out branch, empty when HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        let output = self
            .git(&["branch", "--show-current"])
            .map_err(|e| workspace_error("branch", &self.dir, e))?;
        Ok(output.stdout.trim_end_matches('\n').to_string())
    }

    /// Uncommitted changes of the work tree against `reference`, as a patch.
    ///
    /// An empty string means the tree is clean relative to `reference`.
    pub fn capture_patch(&self, reference: &str) -> Result<String> {
        let output = self
            .git_in(
                &self.root,
                &["diff", "--no-color", "--no-ext-diff", "--binary", reference],
            )
            .map_err(|e| workspace_error("diff", &self.root, e))?;
        Ok(output.stdout)
    }

    /// Clone the whole work tree root into `dst`.
    ///
    /// The returned handle is scoped to the same relative subdirectory of
    /// the clone as `self` is of the original.
    pub fn clone_to(&self, dst: &Path) -> Result<GitDir> {
        let src = self.root.to_string_lossy().into_owned();
        let target = dst.to_string_lossy().into_owned();
        self.git_in(&self.root, &["clone", src.as_str(), target.as_str()])
            .map_err(|e| workspace_error("clone", dst, e))?;

        let relative = self.dir.strip_prefix(&self.root).unwrap_or(Path::new(""));
        Ok(GitDir {
            git: self.git.clone(),
            root: dst.to_path_buf(),
            dir: dst.join(relative),
        })
    }

    /// Copy remote and credential configuration into `other`.
    ///
    /// A no-op when both handles share the same work tree root.
    pub fn copy_config(&self, other: &GitDir) -> Result<()> {
        if self.root == other.root {
            debug!("Skipping config copy, {} is shared", self.root.display());
            return Ok(());
        }
        let src = self.config_path()?;
        let dst = other.config_path()?;
        debug!("Copying {} to {}", src.display(), dst.display());
        fs::copy(&src, &dst)
            .map_err(|e| workspace_error("config copy", &other.root, e.into()))?;
        Ok(())
    }

    /// The repository configuration file.
    ///
    /// Asked from git, since `.git` is a file rather than a directory in
    /// linked worktrees and submodules.
    fn config_path(&self) -> Result<PathBuf> {
        let output = self
            .git_in(&self.root, &["rev-parse", "--git-path", "config"])
            .map_err(|e| workspace_error("config copy", &self.root, e))?;
        let path = PathBuf::from(output.stdout.trim_end_matches('\n'));
        Ok(self.root.join(path))
    }

    /// Set a fixed anonymous commit identity so merges need no prompt.
    pub fn set_identity(&self) -> Result<()> {
        self.git(&["config", "user.email", ANONYMOUS_EMAIL])
            .map_err(|e| workspace_error("config", &self.dir, e))?;
        self.git(&["config", "user.name", ANONYMOUS_NAME])
            .map_err(|e| workspace_error("config", &self.dir, e))?;
        Ok(())
    }

    /// Fetch every configured remote.
    pub fn fetch(&self) -> Result<()> {
        self.git(&["fetch", "--all"])
            .map_err(|e| workspace_error("fetch", &self.dir, e))?;
        Ok(())
    }

    /// Check out `commit`.
    pub fn checkout(&self, commit: &str) -> Result<()> {
        self.git(&["checkout", commit])
            .map_err(|e| workspace_error("checkout", &self.dir, e))?;
        Ok(())
    }

    /// Merge `commit` into the checked out commit, always creating a merge
    /// commit. Fails on conflict.
    pub fn merge(&self, commit: &str) -> Result<()> {
        self.git(&["merge", "--no-ff", "--no-edit", commit])
            .map_err(|e| workspace_error("merge", &self.dir, e))?;
        Ok(())
    }

    /// Apply `patch` to the work tree. Fails if it does not apply cleanly.
    ///
    /// The patch is staged in a temporary file that is removed afterwards.
    pub fn apply(&self, patch: &str) -> Result<()> {
        let mut file =
            NamedTempFile::new().map_err(|e| workspace_error("apply", &self.root, e.into()))?;
        file.write_all(patch.as_bytes())
            .map_err(|e| workspace_error("apply", &self.root, e.into()))?;
        let patch_path = file.path().to_string_lossy().into_owned();
        self.git_in(&self.root, &["apply", patch_path.as_str()])
            .map_err(|e| Error::Workspace {
                operation: "apply".to_string(),
                dir: self.root.clone(),
                cause: Box::new(e),
                hint: Some(
                    "the uncommitted changes may overlap changes brought in by the merge; \
                     commit them or rebase onto the base first"
                        .to_string(),
                ),
            })?;
        Ok(())
    }

    /// Clone into `dst`, carry over remote configuration, set the merge
    /// identity, fetch and check out `commit`.
    ///
    /// Stops at the first failing step.
    pub fn clone_and_checkout(&self, dst: &Path, commit: &str) -> Result<GitDir> {
        info!("Cloning {} into {}", self.root.display(), dst.display());
        let cloned = self.clone_to(dst)?;
        self.copy_config(&cloned)?;
        cloned.set_identity()?;
        cloned.fetch()?;
        cloned.checkout(commit)?;
        Ok(cloned)
    }
}

/// A `git` given as a relative path is resolved against the current
/// directory now, since commands later run inside the workspaces. A bare
/// program name is left to the executable search path.
fn program_path(program: &Path) -> PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        if let Ok(absolute) = fs::canonicalize(program) {
            return absolute;
        }
    }
    program.to_path_buf()
}

fn workspace_error(operation: &str, dir: &Path, cause: Error) -> Error {
    Error::Workspace {
        operation: operation.to_string(),
        dir: dir.to_path_buf(),
        cause: Box::new(cause),
        hint: None,
    }
}

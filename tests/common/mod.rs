//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a git fixture, kustomization snippets, and helper
//! functions to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = GitFixture::new().with_units(&["sub1"]);
//!     fixture.start_branch("feature");
//!     // ... test code
//! }
//! ```
//!
//! A [`GitFixture`] holds two repositories in one temporary directory:
//! `origin`, standing in for the remote, and `work`, a clone of it in
//! which `origin/main` resolves. Tests run kustomize-diff against `work`.

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::kustomizations;
    pub use super::GitFixture;
}

/// Kustomization and manifest snippets.
#[allow(dead_code)]
pub mod kustomizations {
    /// Descriptor rendering `pod.yaml`.
    pub const POD_UNIT: &str = "resources:\n- pod.yaml\n";

    /// Descriptor pointing at a resource that does not exist.
    pub const BROKEN_UNIT: &str = "resources:\n- missing.yaml\n";

    /// A pod named `sub1` whose container is named `container`.
    pub fn pod(container: &str) -> String {
        format!(
            "apiVersion: v1\nkind: Pod\nmetadata:\n  name: sub1\nspec:\n  containers:\n  - image: nginx:latest\n    name: {container}\n"
        )
    }

    /// Diff of the `sub1` pod after renaming its container.
    pub const SUB1_RENAMED_DIFF: &str = "@@ -5,4 +5,4 @@\n spec:\n   containers:\n   - image: nginx:latest\n-    name: sub1\n+    name: sub1-modified\n";
}

/// Run `git` in `dir`, panicking with its stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// An origin repository and a working clone of it.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
    origin: PathBuf,
    work: PathBuf,
}

impl GitFixture {
    /// Create `origin` with one commit on `main` and clone it to `work`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let origin = temp_dir.child("origin");
        origin.create_dir_all().expect("Failed to create origin");
        git(origin.path(), &["init", "-b", "main"]);
        configure_identity(origin.path());
        origin
            .child("README.md")
            .write_str("# fixture\n")
            .expect("Failed to write README");
        git(origin.path(), &["add", "."]);
        git(origin.path(), &["commit", "-m", "initial"]);

        git(temp_dir.path(), &["clone", "origin", "work"]);
        configure_identity(&temp_dir.path().join("work"));
        temp_dir
            .child("scratch")
            .create_dir_all()
            .expect("Failed to create scratch dir");

        let origin = temp_dir.path().join("origin");
        let work = temp_dir.path().join("work");
        Self {
            temp_dir,
            origin,
            work,
        }
    }

    /// Commit one `pod.yaml` unit per name to `origin/main` and pull it
    /// into `work`.
    pub fn with_units(self, units: &[&str]) -> Self {
        for unit in units {
            self.write_origin(
                &format!("{unit}/kustomization.yaml"),
                kustomizations::POD_UNIT,
            );
            self.write_origin(&format!("{unit}/pod.yaml"), &kustomizations::pod("sub1"));
        }
        self.commit_origin("add units");
        git(self.work(), &["pull", "--ff-only", "origin", "main"]);
        self
    }

    /// The working clone.
    pub fn work(&self) -> &Path {
        &self.work
    }

    /// The repository standing in for the remote.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// An empty directory tests can use for scratch workspaces.
    pub fn scratch(&self) -> PathBuf {
        self.temp_dir.path().join("scratch")
    }

    /// Write a file in `work`.
    pub fn write(&self, path: &str, content: &str) {
        write_file(self.work(), path, content);
    }

    /// Write a file in `origin`.
    pub fn write_origin(&self, path: &str, content: &str) {
        write_file(self.origin(), path, content);
    }

    /// Remove a file or directory in `work`.
    #[allow(dead_code)]
    pub fn remove(&self, path: &str) {
        let full = self.work().join(path);
        if full.is_dir() {
            std::fs::remove_dir_all(full).expect("Failed to remove directory");
        } else {
            std::fs::remove_file(full).expect("Failed to remove file");
        }
    }

    /// Create and check out `branch` in `work`.
    pub fn start_branch(&self, branch: &str) {
        git(self.work(), &["checkout", "-b", branch]);
    }

    /// Commit everything in `work`.
    pub fn commit(&self, message: &str) {
        git(self.work(), &["add", "-A"]);
        git(self.work(), &["commit", "-m", message]);
    }

    /// Commit everything in `origin` and fetch it into `work`.
    pub fn commit_origin(&self, message: &str) {
        git(self.origin(), &["add", "-A"]);
        git(self.origin(), &["commit", "-m", message]);
        git(self.work(), &["fetch", "origin"]);
    }

    /// Short hash of `reference` in `work`.
    pub fn short_hash(&self, reference: &str) -> String {
        git(self.work(), &["rev-parse", "--short", reference])
    }

    /// Entries left in the scratch directory.
    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch())
            .expect("Failed to read scratch dir")
            .map(|entry| entry.expect("Failed to read entry").path())
            .collect()
    }

    /// A kustomize-diff command running in `work` with its scratch
    /// workspaces under [`GitFixture::scratch`].
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kustomize-diff");
        cmd.current_dir(self.work())
            .env("KUSTOMIZE_DIFF_TMP_DIR", self.scratch())
            .env_remove("KUSTOMIZE_DIFF_KUSTOMIZE_PATH")
            .env_remove("KUSTOMIZE_DIFF_GIT_PATH")
            .env_remove("KUSTOMIZE_DIFF_DIFF_PATH")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "test-user"]);
    git(dir, &["config", "user.email", "test@example.com"]);
}

fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(full, content).expect("Failed to write file");
}

//! # Kustomize Diff Library
//!
//! This library compares the *rendered* output of kustomize configuration
//! units between two revisions of a git work tree. It is designed to be used
//! by the `kustomize-diff` command-line tool, for example to preview the
//! effect of a pull request on generated manifests before merging it.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//! use kustomize_diff::phases::orchestrator::{run, RunOptions};
//!
//! let options = RunOptions {
//!     base: Some("main".to_string()),
//!     ..Default::default()
//! };
//! let result = run(Path::new("."), &options).unwrap();
//! for (unit, outcome) in result.diff_map.iter() {
//!     println!("{unit}: {}", outcome.as_text());
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration units (`kustomize`)**: Directories holding a
//!   `kustomization.yaml` (or `.yml`), rendered through the [`kustomize::Renderer`]
//!   seam by an external `kustomize` binary or the built-in renderer.
//! - **Workspaces (`git`)**: Isolated clones of the work tree in which the
//!   base is checked out and the target is merged.
//! - **Outcomes (`result`)**: One [`result::DiffOutcome`] per unit, either
//!   diff content or the error that prevented it.
//! - **Phases (`phases`)**: The run itself, from commit resolution to the
//!   per-unit comparison.
//!
//! ## Execution Flow
//!
//! The main entry point is [`phases::orchestrator::run`], which executes
//! the following high-level steps:
//!
//! 1.  **Resolution**: Resolve the base and target commit-ish.
//! 2.  **Workspace Setup**: Clone the base, clone the base again and merge
//!     the target into it, optionally applying uncommitted changes.
//! 3.  **Discovery**: Find the units of both workspaces.
//! 4.  **Comparison**: Render and diff each unit, isolating failures.
//!
//! Steps 1 and 2 fail fast. Steps 3 and 4 record failures per unit.

pub mod defaults;
pub mod diff;
pub mod error;
pub mod git;
pub mod kustomize;
pub mod phases;
pub mod process;
pub mod report;
pub mod result;
pub mod suggestions;

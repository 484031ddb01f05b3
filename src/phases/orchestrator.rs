//! Orchestrator for a complete run
//!
//! This module drives a run through its states:
//!
//! `Idle → CommitsResolved → [DirtyPatchCaptured] → BaseCloned →
//! TargetCloned → TargetMerged → [PatchApplied] → Discovered → Diffed`
//!
//! Every step before discovery short-circuits on its first error through
//! `?`, so a failed run produces no report. Both commits are resolved
//! before any workspace is created. The two scratch workspaces live until
//! the end of [`run`] and are removed on every exit path unless
//! [`RunOptions::debug`] retains them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{error, info};

use super::compare;
use super::discovery::{self, UnitFilter};
use super::scratch::ScratchDir;
use crate::defaults::{
    default_git_path, BASE_SCRATCH_PREFIX, DEFAULT_BASE, DETACHED_TARGET, TARGET_SCRATCH_PREFIX,
};
use crate::diff::DiffTool;
use crate::error::Result;
use crate::git::GitDir;
use crate::kustomize::RendererOptions;
use crate::result::DiffMap;

/// Options of a run. Every field has a default.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Base commit-ish, `origin/main` when unset.
    pub base: Option<String>,
    /// Target commit-ish, the current branch when unset.
    pub target: Option<String>,
    pub filter: UnitFilter,
    pub renderer: RendererOptions,
    /// `git` binary, resolved through the executable search path when unset.
    pub git_path: Option<PathBuf>,
    /// Line-diff utility, `diff` on the executable search path when unset.
    pub diff_path: Option<PathBuf>,
    /// Directory holding the scratch workspaces, the system temporary
    /// directory when unset.
    pub scratch_root: Option<PathBuf>,
    /// Keep the scratch workspaces after the run.
    pub debug: bool,
    /// Carry uncommitted changes into the target workspace.
    pub allow_dirty: bool,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunResult {
    pub base_commit: String,
    pub target_commit: String,
    pub diff_map: DiffMap,
    /// Workspaces left on disk because of [`RunOptions::debug`].
    pub retained_workspaces: Vec<PathBuf>,
}

/// Compare the rendered units of `dir` between the base and the target.
pub fn run(dir: &Path, options: &RunOptions) -> Result<RunResult> {
    info!("Starting run in {}", dir.display());
    let git = options.git_path.clone().unwrap_or_else(default_git_path);
    let source = GitDir::open(dir, &git)?;

    let base_ref = options.base.as_deref().unwrap_or(DEFAULT_BASE);
    let target_ref = match &options.target {
        Some(target) => target.clone(),
        None => default_target(&source)?,
    };
    let base_commit = source.resolve_commit(base_ref)?;
    let target_commit = source.resolve_commit(&target_ref)?;
    info!(
        "Resolved {} to {} and {} to {}",
        base_ref, base_commit, target_ref, target_commit
    );

    let dirty_patch = if options.allow_dirty {
        info!("Capturing uncommitted changes against {}", target_commit);
        source.capture_patch(&target_commit)?
    } else {
        String::new()
    };

    let scratch_root = options.scratch_root.as_deref();
    let base_scratch = ScratchDir::create(scratch_root, BASE_SCRATCH_PREFIX, options.debug)?;
    let target_scratch = ScratchDir::create(scratch_root, TARGET_SCRATCH_PREFIX, options.debug)
        .inspect_err(|_| report_retained(&[&base_scratch]))?;
    let scratches = [&base_scratch, &target_scratch];

    let (base, target) = prepare_workspaces(
        &source,
        &base_scratch,
        &target_scratch,
        &base_commit,
        &target_commit,
        &dirty_patch,
    )
    .inspect_err(|_| report_retained(&scratches))?;

    let units = discover_union(base.dir(), target.dir(), &options.filter)
        .inspect_err(|_| report_retained(&scratches))?;
    info!("Discovered {} units", units.len());

    let renderer = options.renderer.build();
    let diff_tool = options
        .diff_path
        .as_ref()
        .map(DiffTool::new)
        .unwrap_or_default();
    let diff_map = compare::execute(
        base.dir(),
        target.dir(),
        &units,
        renderer.as_ref(),
        &diff_tool,
    );
    info!("Compared {} units", diff_map.len());

    let retained_workspaces = scratches
        .iter()
        .filter_map(|scratch| scratch.retained_path().map(Path::to_path_buf))
        .collect();

    Ok(RunResult {
        base_commit,
        target_commit,
        diff_map,
        retained_workspaces,
    })
}

/// Check out the base in both workspaces, then merge the target and apply
/// the uncommitted changes on the target side.
fn prepare_workspaces(
    source: &GitDir,
    base_scratch: &ScratchDir,
    target_scratch: &ScratchDir,
    base_commit: &str,
    target_commit: &str,
    dirty_patch: &str,
) -> Result<(GitDir, GitDir)> {
    info!("Checking out base {} in {}", base_commit, base_scratch.path().display());
    let base = source.clone_and_checkout(base_scratch.path(), base_commit)?;

    info!("Checking out base {} in {}", base_commit, target_scratch.path().display());
    let target = source.clone_and_checkout(target_scratch.path(), base_commit)?;
    info!("Merging target {} into {}", target_commit, target_scratch.path().display());
    target.merge(target_commit)?;

    if !dirty_patch.is_empty() {
        info!("Applying uncommitted changes");
        target.apply(dirty_patch)?;
    }
    Ok((base, target))
}

/// A failed run returns no result, so retained workspaces are named here.
fn report_retained(scratches: &[&ScratchDir]) {
    for path in scratches.iter().filter_map(|scratch| scratch.retained_path()) {
        error!("Kept workspace of the failed run: {}", path.display());
    }
}

/// The current branch, or `HEAD` when detached.
fn default_target(source: &GitDir) -> Result<String> {
    let branch = source.current_branch()?;
    if branch.is_empty() {
        info!("HEAD is detached, using {} as the target", DETACHED_TARGET);
        Ok(DETACHED_TARGET.to_string())
    } else {
        Ok(branch)
    }
}

fn discover_union(base: &Path, target: &Path, filter: &UnitFilter) -> Result<BTreeSet<String>> {
    let mut units = discovery::execute(base, filter)?;
    units.extend(discovery::execute(target, filter)?);
    Ok(units)
}

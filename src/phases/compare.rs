//! Phase 4: Comparison
//!
//! Renders and diffs every configuration unit of the union discovered in
//! the base and target workspaces.
//!
//! ## Process
//!
//! For each unit, independently:
//!
//! 1.  **Synthesis**: A side that has no descriptor for the unit gets an
//!     empty one, so the diff shows a full addition or removal instead of
//!     skipping the unit.
//!
//! 2.  **Render**: Both sides are rendered through the [`Renderer`].
//!
//! 3.  **Diff**: The two renders are diffed by the [`DiffTool`] with three
//!     lines of context.
//!     An empty diff is recorded as unchanged content, not an error.
//!
//! Any failure in these steps becomes that unit's failure outcome and the
//! next unit is processed. The batch itself never fails.

use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, info};

use crate::diff::DiffTool;
use crate::error::Result;
use crate::kustomize::{is_unit_dir, make_empty_unit, Renderer};
use crate::result::{DiffMap, DiffOutcome};

/// Executes Phase 4 over `units`.
pub fn execute(
    base_root: &Path,
    target_root: &Path,
    units: &BTreeSet<String>,
    renderer: &dyn Renderer,
    diff_tool: &DiffTool,
) -> DiffMap {
    let mut diff_map = DiffMap::new();
    for unit in units {
        let outcome =
            DiffOutcome::from(diff_unit(base_root, target_root, unit, renderer, diff_tool));
        if let DiffOutcome::Failure(err) = &outcome {
            info!("Unit {} failed: {}", unit, err);
        }
        diff_map.record(unit.as_str(), outcome);
    }
    diff_map
}

/// Unified diff of the base render of `unit` against its target render.
pub fn diff_unit(
    base_root: &Path,
    target_root: &Path,
    unit: &str,
    renderer: &dyn Renderer,
    diff_tool: &DiffTool,
) -> Result<String> {
    let base_dir = base_root.join(unit);
    let target_dir = target_root.join(unit);
    ensure_unit(&base_dir)?;
    ensure_unit(&target_dir)?;

    let base = renderer.render(&base_dir)?;
    let target = renderer.render(&target_dir)?;
    diff_tool.unified(&base, &target)
}

fn ensure_unit(dir: &Path) -> Result<()> {
    if !is_unit_dir(dir) {
        debug!("Synthesizing an empty unit at {}", dir.display());
        make_empty_unit(dir)?;
    }
    Ok(())
}

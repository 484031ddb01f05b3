//! Phase 3: Discovery
//!
//! Finds the configuration units of a workspace.
//!
//! ## Process
//!
//! 1.  **Walk**: Every directory under the root is visited, the root
//!     included. Version-control metadata (`.git`) is skipped.
//!
//! 2.  **Qualify**: A directory is a unit iff it holds a descriptor file
//!     (`kustomization.yaml` or `kustomization.yml`). Nested units are found
//!     by the same walk; a unit does not hide the units below it.
//!
//! 3.  **Filter**: The path relative to the root (`.` for the root itself,
//!     `/`-separated) is kept iff the include pattern is absent or matches,
//!     and the exclude pattern is absent or does not match.
//!
//! The result is a sorted set, so repeated discovery of an unchanged tree
//! always yields the same units regardless of traversal order.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::Result;
use crate::kustomize::is_unit_dir;

/// Optional include and exclude patterns for unit paths.
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
}

impl UnitFilter {
    /// Compile a filter from optional pattern strings.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(Regex::new).transpose()?,
            exclude: exclude.map(Regex::new).transpose()?,
        })
    }

    /// Whether the unit at `path` is kept.
    pub fn matches(&self, path: &str) -> bool {
        let included = self.include.as_ref().is_none_or(|re| re.is_match(path));
        let excluded = self.exclude.as_ref().is_some_and(|re| re.is_match(path));
        included && !excluded
    }
}

/// Executes Phase 3 for one workspace root.
///
/// A missing root has no units.
pub fn execute(root: &Path, filter: &UnitFilter) -> Result<BTreeSet<String>> {
    let mut units = BTreeSet::new();
    if !root.is_dir() {
        debug!("{} does not exist, no units", root.display());
        return Ok(units);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() || !is_unit_dir(entry.path()) {
            continue;
        }
        let relative = relative_unit_path(root, entry.path());
        if filter.matches(&relative) {
            units.insert(relative);
        } else {
            debug!("Filtered out {}", relative);
        }
    }

    debug!("Units under {}: {:?}", root.display(), units);
    Ok(units)
}

/// The `/`-separated path of `dir` relative to `root`, `.` for the root.
fn relative_unit_path(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

//! # Rendering configuration units
//!
//! A configuration unit is a directory holding a kustomization descriptor.
//! This module defines the [`Renderer`] seam that turns such a directory
//! into flat manifest text, and its two implementations:
//!
//! - **[`ExternalRenderer`]**: runs `kustomize build` from a given binary.
//! - **[`BuiltinRenderer`]**: an in-process build of the commonly used
//!   subset of kustomization fields, used when no binary is configured.
//!
//! Both honour a [`LoadRestrictor`], which is validated when it is parsed:
//! an unknown value is rejected instead of falling back to a default.
//!
//! The descriptor helpers at the bottom decide whether a directory is a unit
//! and synthesize an empty one when a unit exists only on one side.

mod builtin;

pub use builtin::BuiltinRenderer;

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::defaults::DESCRIPTOR_FILENAMES;
use crate::error::{Error, Result};
use crate::process::ProcessRunner;

/// How freely a build may read files outside the unit's own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadRestrictor {
    /// Leave the choice to the renderer.
    #[default]
    ProviderDefault,
    /// `LoadRestrictionsUnknown`
    Unknown,
    /// `LoadRestrictionsRootOnly`
    RootOnly,
    /// `LoadRestrictionsNone`
    Unrestricted,
}

impl LoadRestrictor {
    /// The value passed to `kustomize build --load-restrictor`, if any.
    pub fn as_flag(&self) -> Option<&'static str> {
        match self {
            LoadRestrictor::ProviderDefault => None,
            LoadRestrictor::Unknown => Some("LoadRestrictionsUnknown"),
            LoadRestrictor::RootOnly => Some("LoadRestrictionsRootOnly"),
            LoadRestrictor::Unrestricted => Some("LoadRestrictionsNone"),
        }
    }

    /// Whether resource files must live inside the unit's directory.
    ///
    /// Only `LoadRestrictionsNone` lifts the restriction; the unknown and
    /// default policies behave like root-only, as kustomize does.
    pub fn restricts_to_root(&self) -> bool {
        !matches!(self, LoadRestrictor::Unrestricted)
    }
}

impl FromStr for LoadRestrictor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(LoadRestrictor::ProviderDefault),
            "LoadRestrictionsUnknown" => Ok(LoadRestrictor::Unknown),
            "LoadRestrictionsRootOnly" => Ok(LoadRestrictor::RootOnly),
            "LoadRestrictionsNone" => Ok(LoadRestrictor::Unrestricted),
            other => Err(Error::InvalidLoadRestrictor {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LoadRestrictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag().unwrap_or(""))
    }
}

/// Turns a configuration unit directory into manifest text.
pub trait Renderer {
    /// Render the unit at `dir`.
    ///
    /// Failures are reported as [`Error::Render`] naming `dir`.
    fn render(&self, dir: &Path) -> Result<String>;
}

/// Renders by running `kustomize build` from a configured binary.
#[derive(Debug, Clone)]
pub struct ExternalRenderer {
    program: PathBuf,
    load_restrictor: LoadRestrictor,
}

impl ExternalRenderer {
    pub fn new(program: impl Into<PathBuf>, load_restrictor: LoadRestrictor) -> Self {
        Self {
            program: program.into(),
            load_restrictor,
        }
    }

    fn build_args(&self, dir: &Path) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        if let Some(flag) = self.load_restrictor.as_flag() {
            args.push("--load-restrictor".to_string());
            args.push(flag.to_string());
        }
        args.push(dir.to_string_lossy().into_owned());
        args
    }
}

impl Renderer for ExternalRenderer {
    fn render(&self, dir: &Path) -> Result<String> {
        let output = ProcessRunner::inherit()
            .run(&self.program, self.build_args(dir))
            .map_err(|e| Error::Render {
                dir: dir.to_path_buf(),
                cause: Box::new(e),
            })?;
        Ok(output.stdout)
    }
}

/// Which renderer a run uses.
#[derive(Debug, Clone, Default)]
pub struct RendererOptions {
    /// Path of a kustomize binary; the built-in renderer is used when unset.
    pub kustomize_path: Option<PathBuf>,
    pub load_restrictor: LoadRestrictor,
}

impl RendererOptions {
    /// Build the configured renderer.
    pub fn build(&self) -> Box<dyn Renderer> {
        match &self.kustomize_path {
            Some(path) => Box::new(ExternalRenderer::new(path, self.load_restrictor)),
            None => Box::new(BuiltinRenderer::new(self.load_restrictor)),
        }
    }
}

/// The descriptor file of `dir`, if it has one.
pub fn descriptor_path(dir: &Path) -> Option<PathBuf> {
    DESCRIPTOR_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Whether `dir` is a configuration unit.
pub fn is_unit_dir(dir: &Path) -> bool {
    descriptor_path(dir).is_some()
}

/// Create `dir` (and parents) holding an empty descriptor.
///
/// Fails if a descriptor already exists there, so an existing unit is never
/// overwritten.
pub fn make_empty_unit(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(DESCRIPTOR_FILENAMES[0]);
    OpenOptions::new().write(true).create_new(true).open(&path)?;
    Ok(())
}

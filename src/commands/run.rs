//! Run command implementation
//!
//! The run command resolves the base and target commits, builds the two
//! workspaces, diffs every discovered kustomization and prints the report
//! to stdout. A failure before the comparison starts prints no report.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use regex::Regex;

use kustomize_diff::error::Error;
use kustomize_diff::kustomize::{LoadRestrictor, RendererOptions};
use kustomize_diff::phases::discovery::UnitFilter;
use kustomize_diff::phases::orchestrator::{self, RunOptions};
use kustomize_diff::{report, suggestions};

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory to diff (defaults to the current directory)
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Base commitish (defaults to origin/main)
    #[arg(long, value_name = "COMMITISH")]
    pub base: Option<String>,

    /// Target commitish (defaults to the current branch)
    #[arg(long, value_name = "COMMITISH")]
    pub target: Option<String>,

    /// Only diff kustomizations whose relative path matches this regex
    #[arg(long, value_name = "REGEX")]
    pub include: Option<String>,

    /// Skip kustomizations whose relative path matches this regex
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Path of a kustomize binary (defaults to the built-in renderer)
    #[arg(long, value_name = "PATH", env = "KUSTOMIZE_DIFF_KUSTOMIZE_PATH")]
    pub kustomize_path: Option<PathBuf>,

    /// Kustomize load restrictor (LoadRestrictionsUnknown, LoadRestrictionsRootOnly, LoadRestrictionsNone)
    #[arg(long, value_name = "RESTRICTOR")]
    pub kustomize_load_restrictor: Option<String>,

    /// Path of a git binary (defaults to git on PATH)
    #[arg(long, value_name = "PATH", env = "KUSTOMIZE_DIFF_GIT_PATH")]
    pub git_path: Option<PathBuf>,

    /// Path of a diff binary (defaults to diff on PATH)
    #[arg(long, value_name = "PATH", env = "KUSTOMIZE_DIFF_DIFF_PATH")]
    pub diff_path: Option<PathBuf>,

    /// Directory for the temporary workspaces (defaults to the system temp dir)
    #[arg(long, value_name = "PATH", env = "KUSTOMIZE_DIFF_TMP_DIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Keep the temporary workspaces for inspection
    #[arg(long)]
    pub debug: bool,

    /// Carry uncommitted changes into the target
    #[arg(long)]
    pub allow_dirty: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    let options = build_options(&args)?;

    let result = orchestrator::run(&args.dir, &options).map_err(|err| explain(&args, err))?;

    for path in &result.retained_workspaces {
        eprintln!("Kept workspace: {}", path.display());
    }

    let output = match args.format {
        OutputFormat::Markdown => report::markdown(&args.dir.to_string_lossy(), &options, &result),
        OutputFormat::Json => report::json(&result)?,
    };
    print!("{}", output);
    Ok(())
}

/// Turn parsed arguments into run options, validating patterns and the
/// load restrictor before any work starts.
fn build_options(args: &RunArgs) -> Result<RunOptions> {
    let include = compile("--include", args.include.as_deref())?;
    let exclude = compile("--exclude", args.exclude.as_deref())?;

    let load_restrictor = match args.kustomize_load_restrictor.as_deref() {
        Some(value) => value
            .parse::<LoadRestrictor>()
            .map_err(|_| suggestions::unknown_load_restrictor(value))?,
        None => LoadRestrictor::default(),
    };

    Ok(RunOptions {
        base: non_empty(args.base.as_deref()),
        target: non_empty(args.target.as_deref()),
        filter: UnitFilter { include, exclude },
        renderer: RendererOptions {
            kustomize_path: args.kustomize_path.clone().filter(|p| !p.as_os_str().is_empty()),
            load_restrictor,
        },
        git_path: args.git_path.clone().filter(|p| !p.as_os_str().is_empty()),
        diff_path: args.diff_path.clone().filter(|p| !p.as_os_str().is_empty()),
        scratch_root: args.tmp_dir.clone(),
        debug: args.debug,
        allow_dirty: args.allow_dirty,
    })
}

/// An empty pattern means no pattern.
fn compile(option: &str, pattern: Option<&str>) -> Result<Option<Regex>> {
    match non_empty(pattern) {
        Some(pattern) => Regex::new(&pattern)
            .map(Some)
            .map_err(|e| suggestions::invalid_regex(option, &pattern, &e)),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn explain(args: &RunArgs, err: Error) -> anyhow::Error {
    let hinted = match &err {
        Error::Resolution { reference, .. } => {
            Some(suggestions::unresolved_reference(reference, &err))
        }
        Error::Workspace { operation, .. } if operation == "open" => {
            Some(suggestions::not_a_repository(&args.dir, &err))
        }
        _ => None,
    };
    hinted.unwrap_or_else(|| err.into())
}

//! Version command implementation

use anyhow::Result;
use clap::Args;

/// Arguments for the version command
#[derive(Args, Debug)]
pub struct VersionArgs {}

/// Execute the version command
pub fn execute(_args: VersionArgs) -> Result<()> {
    println!("{}", version_line());
    Ok(())
}

/// `kustomize-diff <version> (revision: <revision>)`
///
/// The revision is taken from `KUSTOMIZE_DIFF_REVISION` at build time.
pub fn version_line() -> String {
    format!(
        "kustomize-diff {} (revision: {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("KUSTOMIZE_DIFF_REVISION").unwrap_or("unknown")
    )
}

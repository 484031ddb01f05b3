//! CLI argument parsing, logging setup and command dispatch

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::commands;

/// Kustomize Diff - Preview the rendered effect of a change on kustomizations
#[derive(Parser, Debug)]
#[command(name = "kustomize-diff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Verbose mode (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Set log level, overriding -v
    #[arg(long, global = true, value_name = "LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diff the rendered kustomizations of a directory between two commits
    Run(commands::run::RunArgs),

    /// Print the version number of kustomize-diff
    Version(commands::version::VersionArgs),
}

/// Log levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.level());

        match self.command {
            Commands::Run(args) => commands::run::execute(args),
            Commands::Version(args) => commands::version::execute(args),
        }
    }

    /// The log level for this invocation.
    fn level(&self) -> LevelFilter {
        match self.log_level {
            Some(level) => level.into(),
            None => verbosity_level(self.verbose),
        }
    }
}

fn verbosity_level(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the logger. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
    if result.is_err() {
        log::debug!("Logger already installed");
    }
}

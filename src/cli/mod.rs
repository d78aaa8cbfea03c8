//! The KATS command-line interface.
//!
//! Resolves the configuration, runs the suite against the real subject
//! binary, and turns the outcome into a process exit status:
//! 0 when every case passed, 1 when any case failed, 2 when the harness
//! itself could not complete (see [`crate::KatsError`]).

use std::path::Path;
use std::process;

use clap::Parser;
use termcolor::StandardStream;
use tracing::debug;

use crate::cli::args::KatsArgs;
use crate::config::{ConfigLayer, HarnessConfig, DEFAULT_CONFIG_FILE};
use crate::runner::Subject;
use crate::test::RunSummary;
use crate::test_harness::Harness;
use crate::KatsError;

pub mod args;
pub mod output;

/// Exit status used when the harness aborts on a fatal error.
pub const EXIT_HARNESS_ERROR: i32 = 2;

/// The main entry point for the CLI.
pub fn run() {
    let args = KatsArgs::parse();

    match execute(&args) {
        Ok(summary) => process::exit(summary.exit_code()),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            process::exit(EXIT_HARNESS_ERROR);
        }
    }
}

/// Runs the suite described by `args` and returns the aggregated verdicts.
pub fn execute(args: &KatsArgs) -> Result<RunSummary, KatsError> {
    let config = resolve_config(args)?;
    debug!(?config, "resolved configuration");

    let mut subject = Subject::new(&config.subject);
    if let Some(limit) = config.timeout {
        subject = subject.with_timeout(limit);
    }
    let out = StandardStream::stdout(args.color.choice());
    Harness::new(config, subject, out).run()
}

/// Defaults, then the config file, then command-line flags.
pub fn resolve_config(args: &KatsArgs) -> Result<HarnessConfig, KatsError> {
    let file = match &args.config {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::load_optional(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    Ok(HarnessConfig::default()
        .layered(file)
        .layered(args.overrides()))
}

//! Defines the command-line arguments for the `kats` binary.
//!
//! Every flag is optional: a bare `kats` run from the repository root uses the
//! built-in layout, possibly adjusted by `kats.yaml`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::config::ConfigLayer;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "kats",
    version,
    about = "Kestrel Automated Test Suite: checks the compiler's diagnostics against fixture transcripts and documentation snippets."
)]
pub struct KatsArgs {
    /// Path to the subject (compiler) binary.
    #[arg(long)]
    pub subject: Option<PathBuf>,

    /// Directory that fixture input file names are relative to.
    #[arg(long)]
    pub tests_dir: Option<PathBuf>,

    /// The fixture document.
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Directory scanned for fenced code snippets.
    #[arg(long)]
    pub docs_dir: Option<PathBuf>,

    /// Scratch file each snippet is written to before it runs.
    #[arg(long)]
    pub scratch: Option<PathBuf>,

    /// Kill the subject after this many seconds and fail the case.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// YAML config file. Defaults to `kats.yaml` if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// When to color the report.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

impl KatsArgs {
    /// The configuration overrides given on the command line.
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            subject: self.subject.clone(),
            tests_dir: self.tests_dir.clone(),
            fixtures: self.fixtures.clone(),
            docs_dir: self.docs_dir.clone(),
            scratch: self.scratch.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolves to a termcolor choice. `auto` only colors a terminal.
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_overrides_nothing() {
        let args = KatsArgs::parse_from(["kats"]);
        assert_eq!(args.overrides(), ConfigLayer::default());
        assert_eq!(args.color, ColorMode::Auto);
        assert_eq!(args.config, None);
    }

    #[test]
    fn flags_become_overrides() {
        let args = KatsArgs::parse_from([
            "kats",
            "--subject",
            "target/debug/kestrel",
            "--docs-dir",
            "book",
            "--timeout",
            "10",
            "--color",
            "never",
        ]);
        let layer = args.overrides();
        assert_eq!(layer.subject, Some(PathBuf::from("target/debug/kestrel")));
        assert_eq!(layer.docs_dir, Some(PathBuf::from("book")));
        assert_eq!(layer.timeout_secs, Some(10));
        assert_eq!(args.color.choice(), ColorChoice::Never);
    }
}

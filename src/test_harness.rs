//! KATS Test Harness
//!
//! Drives a whole suite run. Cases are executed strictly one after another in
//! a fixed order:
//! 1. **Fixture cases**, in document order.
//! 2. **Snippet cases**, grouped by documentation file (sorted by name) and in
//!    extraction order within a file.
//!
//! Each case is run through the [`SubjectRunner`], compared, and reported
//! immediately. A mismatch never stops the run; only fatal
//! [`KatsError`]s (bad fixture, missing file, subject that cannot be
//! launched) do.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use kats::config::HarnessConfig;
//! use kats::runner::Subject;
//! use kats::test_harness::Harness;
//! use termcolor::{ColorChoice, StandardStream};
//!
//! let config = HarnessConfig::default();
//! let subject = Subject::new(&config.subject);
//! let out = StandardStream::stdout(ColorChoice::Auto);
//! let summary = Harness::new(config, subject, out).run().unwrap();
//! std::process::exit(summary.exit_code());
//! ```

use std::fs;
use std::path::Path;

use termcolor::WriteColor;
use tracing::debug;

use crate::cli::output;
use crate::compare::Comparison;
use crate::config::HarnessConfig;
use crate::discovery::{read_source, TestDiscoverer};
use crate::runner::SubjectRunner;
use crate::snippet::SnippetCases;
use crate::test::{RunResult, RunSummary, TestCase};
use crate::KatsError;

/// Reporter and aggregator for one run.
pub struct Harness<R, W> {
    config: HarnessConfig,
    runner: R,
    out: W,
}

impl<R: SubjectRunner, W: WriteColor> Harness<R, W> {
    pub fn new(config: HarnessConfig, runner: R, out: W) -> Self {
        Self {
            config,
            runner,
            out,
        }
    }

    /// Consumes the harness and returns the report sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs every fixture case, then every documentation snippet, and returns
    /// the aggregated verdicts.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<RunSummary, KatsError> {
        let mut summary = RunSummary::default();
        output::print_banner(&mut self.out)?;

        let cases = TestDiscoverer::fixture_cases(&self.config)?;
        output::print_loaded(&mut self.out, cases.len())?;
        for case in cases {
            let result = self.check(case)?;
            summary.record(&result);
        }

        output::print_doc_header(&mut self.out)?;
        self.run_doc_snippets(&mut summary)?;

        output::print_summary(&mut self.out, &summary)?;
        self.out.flush()?;
        Ok(summary)
    }

    fn run_doc_snippets(&mut self, summary: &mut RunSummary) -> Result<(), KatsError> {
        let scratch = self.config.scratch.clone();
        let _cleanup = ScratchGuard(&scratch);
        for doc in TestDiscoverer::doc_files(&self.config.docs_dir)? {
            let text = read_source(&doc)?;
            let file_name = doc
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| doc.display().to_string());
            for case in SnippetCases::new(&file_name, &text, &scratch) {
                let result = self.check(case?)?;
                summary.record(&result);
            }
        }
        Ok(())
    }

    /// Runs a single case and reports it.
    pub fn check(&mut self, case: TestCase) -> Result<RunResult, KatsError> {
        if !case.input_path().is_file() {
            return Err(KatsError::MissingInput {
                title: case.title().to_owned(),
                path: case.input_path().to_path_buf(),
            });
        }

        let capture = self.runner.run(case.input_path())?;
        let comparison = Comparison::new(case.expected(), &capture.stderr);
        let result = RunResult::new(case, comparison, capture.timed_out);

        output::print_verdict(&mut self.out, &result)?;
        output::print_rule(&mut self.out)?;
        Ok(result)
    }
}

/// Removes the snippet scratch file when the doc phase ends, however it ends.
struct ScratchGuard<'a>(&'a Path);

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        if self.0.is_file() && fs::remove_file(self.0).is_ok() {
            debug!(path = %self.0.display(), "removed snippet scratch file");
        }
    }
}

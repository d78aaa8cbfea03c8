//! Unified, `miette`-based error type for the harness.
//!
//! Every fatal condition the harness can hit is a [`KatsError`] variant. An
//! output mismatch is *not* an error: it is a failed case and lives in
//! [`crate::test::RunResult`]. Anything that ends up here aborts the run.

use std::io;
use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Fatal harness errors, rendered through miette's report handler by the CLI.
#[derive(Debug, Error, Diagnostic)]
pub enum KatsError {
    #[error("fixture case #{case} has {found} non-blank line(s), expected a title and an input file")]
    #[diagnostic(
        code(kats::fixture::malformed),
        help("every `=-=` block starts with a title line followed by the input file name")
    )]
    MalformedFixture {
        case: usize,
        found: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("this case")]
        span: SourceSpan,
    },

    #[error("failed to read '{}'", path.display())]
    #[diagnostic(code(kats::io::read))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list documentation directory '{}'", path.display())]
    #[diagnostic(code(kats::io::docs))]
    ListDocs {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("input file '{}' for case \"{title}\" does not exist", path.display())]
    #[diagnostic(
        code(kats::fixture::missing_input),
        help("input file names are resolved relative to the fixtures directory")
    )]
    MissingInput { title: String, path: PathBuf },

    #[error("failed to write snippet scratch file '{}'", path.display())]
    #[diagnostic(code(kats::snippet::scratch))]
    WriteScratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch subject '{}'", subject.display())]
    #[diagnostic(
        code(kats::subject::launch),
        help("build the subject binary first, or point `--subject` at it")
    )]
    SubjectLaunch {
        subject: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for the subject on '{}'", input.display())]
    #[diagnostic(code(kats::subject::wait))]
    SubjectWait {
        input: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration file '{}'", path.display())]
    #[diagnostic(code(kats::config))]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write the test report")]
    #[diagnostic(code(kats::report))]
    Report(#[from] io::Error),
}

impl KatsError {
    /// Builds a [`KatsError::ReadFile`] for `path`.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        KatsError::ReadFile {
            path: path.into(),
            source,
        }
    }
}

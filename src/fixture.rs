//! # Fixture Parsing
//!
//! A fixture document bundles many cases into one plain-text file:
//!
//! ```text
//! Greeting test
//! hello.ke
//! Hello, world!
//! =-=
//! Error test
//! bad.ke
//! parse error: unexpected token
//! ```
//!
//! Blocks are separated by `=-=`. Inside a block blank lines are dropped; the
//! first remaining line is the title, the second the input file (relative to
//! the fixtures directory) and everything after it the expected transcript.
//! Because blank lines are dropped, a transcript cannot contain one.

use std::collections::HashSet;
use std::path::Path;

use miette::NamedSource;
use tracing::{debug, warn};

use crate::compare::unescape_newlines;
use crate::test::TestCase;
use crate::KatsError;

/// Token separating cases in a fixture document.
pub const SEPARATOR: &str = "=-=";

/// Parses a whole fixture document into cases, in document order.
///
/// `name` is only used to label diagnostics. A block with fewer than two
/// non-blank lines aborts parsing: cases are reported by position, so
/// skipping one would silently shift every later case.
#[tracing::instrument(skip(source, tests_dir), fields(len = source.len()))]
pub fn parse_fixture(
    source: &str,
    name: &str,
    tests_dir: &Path,
) -> Result<Vec<TestCase>, KatsError> {
    let mut cases = Vec::new();
    let mut titles = HashSet::new();
    let mut offset = 0;

    for raw in source.split(SEPARATOR) {
        let start = offset;
        offset += raw.len() + SEPARATOR.len();

        if raw.trim().is_empty() {
            continue;
        }

        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
        let number = cases.len() + 1;
        let [title, input, transcript @ ..] = lines.as_slice() else {
            let lead = raw.len() - raw.trim_start().len();
            return Err(KatsError::MalformedFixture {
                case: number,
                found: lines.len(),
                src: NamedSource::new(name, source.to_owned()),
                span: (start + lead, raw.trim().len()).into(),
            });
        };

        let title = title.trim_end();
        if !titles.insert(title.to_owned()) {
            warn!(title, case = number, "duplicate fixture title");
        }
        let dropped = interior_blank_lines(raw);
        if dropped > 0 {
            warn!(title, dropped, "blank line dropped from expected transcript");
        }

        cases.push(TestCase::new(
            title,
            tests_dir.join(input.trim()),
            normalize_transcript(transcript.iter().copied()),
        ));
    }

    debug!(count = cases.len(), "parsed fixture document");
    Ok(cases)
}

/// Canonical form of an expected transcript: every line stripped of trailing
/// whitespace, lines joined with `\n`, the whole trimmed (so the first line
/// loses its indentation), exactly one trailing newline, escaped newlines
/// expanded.
pub fn normalize_transcript<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let joined = lines
        .into_iter()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let mut transcript = joined.trim().to_owned();
    transcript.push('\n');
    unescape_newlines(&transcript)
}

/// Counts blank lines that sit between two transcript lines of a block.
/// Those are lost by parsing, so the transcript can no longer match output
/// that contains them.
fn interior_blank_lines(block: &str) -> usize {
    let mut seen = 0;
    let mut pending = 0;
    let mut dropped = 0;
    for line in block.lines() {
        if line.trim().is_empty() {
            if seen >= 3 {
                pending += 1;
            }
        } else {
            seen += 1;
            dropped += pending;
            pending = 0;
        }
    }
    dropped
}

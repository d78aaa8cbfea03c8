//! Handles all user-facing report output.
//!
//! Every function writes to a [`WriteColor`] sink so the same code drives a
//! colored terminal and an in-memory buffer in tests.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::test::{RunResult, RunSummary};

// ============================================================================
// LAYOUT CONSTANTS
// ============================================================================

pub const BANNER: &str = "Kestrel Automated Test Suite (KATS)";
pub const PASS_GLYPH: &str = "✔️";
pub const FAIL_GLYPH: &str = "❌";
const RULE: &str = "========================================";

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

pub fn print_banner<W: WriteColor>(out: &mut W) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "{BANNER}")?;
    out.reset()
}

pub fn print_loaded<W: WriteColor>(out: &mut W, count: usize) -> io::Result<()> {
    writeln!(out, "\n\n{count} test(s) have been loaded, running...")?;
    print_rule(out)
}

pub fn print_doc_header<W: WriteColor>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n\nRunning doc tests...\n")
}

pub fn print_rule<W: WriteColor>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n{RULE}\n")
}

/// Prints the one-line verdict for a case and, on failure, the framed
/// expected and actual transcripts followed by a line diff.
pub fn print_verdict<W: WriteColor>(out: &mut W, result: &RunResult) -> io::Result<()> {
    let title = result.case.title();
    if result.passed {
        write!(out, "{title}: ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(out, "{PASS_GLYPH}")?;
        return out.reset();
    }

    write!(out, "{title}: ")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    writeln!(out, "{FAIL_GLYPH}")?;
    out.reset()?;

    if result.timed_out {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(out, "(subject timed out and was killed)")?;
        out.reset()?;
    }

    let expected = result.case.expected();
    writeln!(out, "Expected:\n'{expected}'\n\nGot:\n'{}'", result.actual)?;
    writeln!(out, "\nDiff:")?;
    let changeset = Changeset::new(expected, &result.actual, "\n");
    print_diff(out, &changeset.diffs)
}

pub fn print_summary<W: WriteColor>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    write!(out, "\nTest summary: total {}, ", summary.total())?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "passed {}", summary.passed)?;
    out.reset()?;
    write!(out, ", ")?;
    let failed_color = if summary.failed > 0 { Color::Red } else { Color::Green };
    out.set_color(ColorSpec::new().set_fg(Some(failed_color)))?;
    writeln!(out, "failed {}", summary.failed)?;
    out.reset()
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                print_lines(out, ' ', x)?;
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                print_lines(out, '-', x)?;
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                print_lines(out, '+', x)?;
            }
        }
    }
    out.reset()
}

// A changeset chunk may span several lines; each gets its own marker.
fn print_lines<W: Write>(out: &mut W, marker: char, chunk: &str) -> io::Result<()> {
    for line in chunk.split('\n') {
        writeln!(out, "{marker}{line}")?;
    }
    Ok(())
}

//! # Documentation Snippets
//!
//! Every fenced code block in the documentation doubles as a test case: the
//! subject must compile it without printing a single diagnostic.
//!
//! Blocks are materialized one at a time into a shared scratch file. That is
//! only sound because cases run strictly one after another: the file is
//! written right before the subject reads it, and the next write happens after
//! the subject has exited.

use std::fs;
use std::iter::Enumerate;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

use crate::test::TestCase;
use crate::KatsError;

/// An opening fence (three backticks and an optional language tag) through to
/// the next line starting with three backticks. The body is group 1.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^```(?:\w+)?\s*\n(.*?)^```").expect("fence pattern is valid"));

/// Lazy iterator over the bodies of fenced code blocks, in document order.
pub struct CodeBlocks<'a> {
    matches: CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for CodeBlocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let captures = self.matches.next()?;
        Some(captures.get(1).map_or("", |body| body.as_str()))
    }
}

/// Scans `text` for fenced code blocks. Bodies are returned verbatim.
pub fn code_blocks(text: &str) -> CodeBlocks<'_> {
    CodeBlocks {
        matches: FENCE.captures_iter(text),
    }
}

/// Title used for the `index`th snippet of a documentation file.
pub fn snippet_title(index: usize, file_name: &str) -> String {
    format!("Code snippet #{index} in {file_name}")
}

/// Turns the code blocks of one documentation file into test cases.
///
/// Each call to `next` overwrites the scratch file with the next block, so a
/// case must be run before the following one is pulled.
pub struct SnippetCases<'a> {
    file_name: &'a str,
    scratch: &'a Path,
    blocks: Enumerate<CodeBlocks<'a>>,
}

impl<'a> SnippetCases<'a> {
    pub fn new(file_name: &'a str, text: &'a str, scratch: &'a Path) -> Self {
        Self {
            file_name,
            scratch,
            blocks: code_blocks(text).enumerate(),
        }
    }
}

impl Iterator for SnippetCases<'_> {
    type Item = Result<TestCase, KatsError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, body) = self.blocks.next()?;
        let written = fs::write(self.scratch, body).map_err(|source| KatsError::WriteScratch {
            path: self.scratch.to_path_buf(),
            source,
        });
        Some(written.map(|()| {
            TestCase::new(snippet_title(index, self.file_name), self.scratch, String::new())
        }))
    }
}

//! KATS, the Kestrel automated test suite.
//!
//! Runs a compiler binary (the *subject*) over a corpus of fixture inputs and
//! documentation snippets, and checks that what it prints on its error stream
//! matches the expected transcripts.

pub use crate::diagnostics::KatsError;
pub use crate::test::{RunResult, RunSummary, TestCase};

pub mod cli;
pub mod compare;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod fixture;
pub mod runner;
pub mod snippet;
pub mod test_harness;

//! Output normalization and comparison.
//!
//! Fixture authors may write a literal `\n` (backslash, `n`) to stand for a
//! line break. Both sides of a comparison get that escape turned into a real
//! newline: the expected side once, when the fixture is parsed, and the actual
//! side here, before decoding. Equality is exact after that.

/// The two-character escape fixture authors use for an embedded newline.
pub const ESCAPED_NEWLINE: &str = "\\n";

/// Replaces every literal `\n` in `text` with a newline character.
pub fn unescape_newlines(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, "\n")
}

/// Byte-level [`unescape_newlines`], applied to raw subject output before it
/// is decoded.
pub fn unescape_newline_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'n') {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// A verdict plus the normalized actual text it was computed from, kept for
/// diff display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    actual: String,
    passed: bool,
}

impl Comparison {
    /// Compares an already-normalized expectation with raw stderr bytes.
    ///
    /// Output that is not valid UTF-8 is decoded lossily for display and never
    /// passes.
    pub fn new(expected: &str, actual: &[u8]) -> Self {
        let (actual, decoded) = match String::from_utf8(unescape_newline_bytes(actual)) {
            Ok(text) => (text, true),
            Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), false),
        };
        let passed = decoded && actual == expected;
        Self { actual, passed }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }

    pub fn into_actual(self) -> String {
        self.actual
    }
}

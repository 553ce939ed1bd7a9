//! Assembler errors, rendered with a source-context window.
//!
//! The reference's `die()` prints four lines of source before and after
//! the failing position with a `HERE>>>` marker; this is the same
//! rendering, structured as a `Display` impl instead of a direct
//! `eprintln!`-then-`exit`, so callers can decide what to do with it.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct AssembleError {
    pub message: String,
    pub pos: usize,
}

impl AssembleError {
    pub fn new(message: impl Into<String>, pos: usize) -> AssembleError {
        AssembleError {
            message: message.into(),
            pos,
        }
    }

    /// Render the four-line-before/four-line-after context window around
    /// `self.pos` in `source`, with the failing byte marked.
    pub fn render_context(&self, source: &str) -> String {
        let bytes = source.as_bytes();
        let here = self.pos.min(bytes.len());

        let mut start = here;
        let mut lines_back = 0;
        while start > 0 && lines_back < 4 {
            start -= 1;
            if bytes[start] == b'\n' {
                lines_back += 1;
            }
        }

        let mut end = here;
        let mut lines_fwd = 0;
        while end < bytes.len() && lines_fwd < 4 {
            if bytes[end] == b'\n' {
                lines_fwd += 1;
            }
            end += 1;
        }

        let mut out = String::from("Context: ");
        out.push_str(&String::from_utf8_lossy(&bytes[start..here]));
        out.push_str(" HERE>>> ");
        out.push_str(&String::from_utf8_lossy(&bytes[here..end]));
        out
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AssembleError {}

//! Nested-formatting validator for `**bold**`, `*italic*`, `~~strike~~` and
//! brackets.
//!
//! Bracket problems are recorded and scanning goes on; the only early return
//! is `**` while an italic frame is on top. Every finding overwrites the
//! report message, so with several findings the message describes the last
//! one while `errors` keeps every span.

use std::fmt;

use tracing::debug;

use super::stack::{is_closer, is_opener, opener_for, FrameKind, FrameStack};

pub const BOLD_INSIDE_ITALIC: &str = "Invalid nesting: bold (**) cannot be inside italic (*)";
pub const MISMATCHED_CLOSER: &str = "Mismatch closing bracket";
pub const BRACKET_TYPE_MISMATCH: &str = "Bracket type mismatch";
pub const UNCLOSED_BOLD: &str = "Unclosed bold formatting (**)";
pub const UNCLOSED_ITALIC: &str = "Unclosed italic formatting (*)";
pub const UNCLOSED_STRIKETHROUGH: &str = "Unclosed strikethrough formatting (~~)";
pub const UNCLOSED_BRACKET: &str = "Unclosed bracket";
pub const VALID_STRUCTURE: &str = "Valid formatting structure";

/// Inclusive byte span `[start, end]` of a finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattingReport {
    pub valid: bool,
    pub errors: Vec<Span>,
    pub message: String,
}

#[derive(Default)]
struct Findings {
    errors: Vec<Span>,
    message: String,
}

impl Findings {
    fn record(&mut self, span: Span, message: &str) {
        debug!(%span, detail = message, "formatting finding");
        self.errors.push(span);
        self.message = message.to_string();
    }

    fn into_report(self) -> FormattingReport {
        let valid = self.errors.is_empty();
        FormattingReport {
            valid,
            errors: self.errors,
            message: if valid {
                VALID_STRUCTURE.to_string()
            } else {
                self.message
            },
        }
    }
}

pub fn validate_formatting(input: &str) -> FormattingReport {
    let bytes = input.as_bytes();
    let mut stack = FrameStack::new();
    let mut findings = Findings::default();

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let doubled = bytes.get(i + 1) == Some(&c);

        match c {
            b'*' if doubled => {
                match stack.top_kind() {
                    FrameKind::Italic => {
                        findings.record(Span::new(i, i + 1), BOLD_INSIDE_ITALIC);
                        return findings.into_report();
                    }
                    FrameKind::Bold => {
                        stack.pop();
                    }
                    _ => stack.push(FrameKind::Bold, i),
                }
                i += 2;
                continue;
            }
            b'~' if doubled => {
                if stack.top_kind() == FrameKind::Strikethrough {
                    stack.pop();
                } else {
                    stack.push(FrameKind::Strikethrough, i);
                }
                i += 2;
                continue;
            }
            b'*' => {
                // Opens inside bold, toggles elsewhere
                if stack.top_kind() == FrameKind::Italic {
                    stack.pop();
                } else {
                    stack.push(FrameKind::Italic, i);
                }
            }
            c if is_opener(c) => stack.push(FrameKind::Bracket(c), i),
            c if is_closer(c) => {
                let top = *stack.top();
                match top.kind {
                    FrameKind::Bracket(open) => {
                        if Some(open) != opener_for(c) {
                            findings.record(Span::new(top.position, i), BRACKET_TYPE_MISMATCH);
                        }
                        stack.pop();
                    }
                    _ => findings.record(Span::new(i, i), MISMATCHED_CLOSER),
                }
            }
            _ => {}
        }
        i += 1;
    }

    while let Some(frame) = stack.pop() {
        let p = frame.position;
        match frame.kind {
            FrameKind::Bold => findings.record(Span::new(p, p + 1), UNCLOSED_BOLD),
            FrameKind::Italic => findings.record(Span::new(p, p), UNCLOSED_ITALIC),
            FrameKind::Strikethrough => {
                findings.record(Span::new(p, p + 1), UNCLOSED_STRIKETHROUGH)
            }
            FrameKind::Bracket(_) => findings.record(Span::new(p, p), UNCLOSED_BRACKET),
            FrameKind::Bottom => {}
        }
    }

    findings.into_report()
}

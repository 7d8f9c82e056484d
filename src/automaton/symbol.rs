//! Input symbols and transition labels shared by the automata.

use std::fmt;

/// An input symbol an NFA edge can consume.
///
/// `Wildcard` matches any byte. It is a separate variant rather than a
/// reserved byte value, so no input byte can ever collide with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Byte(u8),
    Wildcard,
}

impl Symbol {
    /// Whether this symbol consumes the given input byte.
    #[inline]
    pub fn matches(self, byte: u8) -> bool {
        match self {
            Symbol::Byte(b) => b == byte,
            Symbol::Wildcard => true,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Byte(b) => write!(f, "{}", escape_byte(*b)),
            Symbol::Wildcard => write!(f, "."),
        }
    }
}

/// Label of an enumerated transition.
///
/// Epsilon edges get their own variant so consumers (diagram exporters in
/// particular) can always tell them apart from real symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Symbol(Symbol),
    Epsilon,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Symbol(s) => s.fmt(f),
            Label::Epsilon => write!(f, "ε"),
        }
    }
}

/// Render a byte for a DOT edge label.
pub(crate) fn escape_byte(b: u8) -> String {
    match b {
        b'"' => "\\\"".to_string(),
        b'\\' => "\\\\".to_string(),
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b' ' => "␣".to_string(),
        0x21..=0x7E => (b as char).to_string(),
        _ => format!("0x{:02X}", b),
    }
}

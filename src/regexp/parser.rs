//! Regex tokenization and infix-to-postfix conversion.
//!
//! Supported syntax:
//! - literals (any byte that is not an operator)
//! - `.` matches any byte
//! - `|` alternation
//! - `(...)` grouping
//! - `*`, `+`, `?` postfix quantifiers
//!
//! There is no escape character and no character classes. Concatenation is
//! implicit in the source and made explicit as `Token::Concat` before the
//! shunting-yard pass, so it can never be confused with a literal byte.

use std::fmt;

/// A regex token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Wildcard,
    Concat,
    Alternate,
    Star,
    Plus,
    Optional,
    LeftParen,
    RightParen,
}

impl Token {
    /// Binding strength of an operator: unary > concatenation > alternation.
    pub fn precedence(self) -> u8 {
        match self {
            Token::Star | Token::Plus | Token::Optional => 4,
            Token::Concat => 3,
            Token::Alternate => 1,
            _ => 0,
        }
    }

    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Token::Concat | Token::Alternate | Token::Star | Token::Plus | Token::Optional
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Token::Star | Token::Plus | Token::Optional)
    }

    /// Tokens that can end an operand.
    fn ends_operand(self) -> bool {
        matches!(
            self,
            Token::Literal(_)
                | Token::Wildcard
                | Token::RightParen
                | Token::Star
                | Token::Plus
                | Token::Optional
        )
    }

    /// Tokens that can begin an operand.
    fn begins_operand(self) -> bool {
        matches!(self, Token::Literal(_) | Token::Wildcard | Token::LeftParen)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(b) => write!(f, "{}", *b as char),
            Token::Wildcard => write!(f, "."),
            Token::Concat => write!(f, "·"),
            Token::Alternate => write!(f, "|"),
            Token::Star => write!(f, "*"),
            Token::Plus => write!(f, "+"),
            Token::Optional => write!(f, "?"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// Split a pattern into tokens. Every byte is either an operator or a literal.
pub fn tokenize(pattern: &str) -> Vec<Token> {
    pattern
        .bytes()
        .map(|b| match b {
            b'.' => Token::Wildcard,
            b'|' => Token::Alternate,
            b'*' => Token::Star,
            b'+' => Token::Plus,
            b'?' => Token::Optional,
            b'(' => Token::LeftParen,
            b')' => Token::RightParen,
            _ => Token::Literal(b),
        })
        .collect()
}

/// Insert explicit `Concat` tokens wherever an operand ends and the next
/// begins.
pub fn insert_concat(tokens: &[Token]) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for (i, &tok) in tokens.iter().enumerate() {
        out.push(tok);
        if let Some(&next) = tokens.get(i + 1) {
            if tok.ends_operand() && next.begins_operand() {
                out.push(Token::Concat);
            }
        }
    }
    out
}

/// Shunting-yard conversion of an infix token stream (with explicit
/// concatenation) to postfix.
///
/// Unbalanced parentheses never fail: an unmatched `)` flushes the operator
/// stack, and a `(` still open at the end is dropped.
pub fn to_postfix(infix: &[Token]) -> Vec<Token> {
    let mut out = Vec::with_capacity(infix.len());
    let mut ops: Vec<Token> = Vec::new();

    for &tok in infix {
        match tok {
            Token::Literal(_) | Token::Wildcard => out.push(tok),
            Token::LeftParen => ops.push(tok),
            Token::RightParen => {
                while let Some(top) = ops.pop() {
                    if top == Token::LeftParen {
                        break;
                    }
                    out.push(top);
                }
            }
            op => {
                while let Some(&top) = ops.last() {
                    if top == Token::LeftParen {
                        break;
                    }
                    let (p_top, p_op) = (top.precedence(), op.precedence());
                    // Unary operators also pop their own precedence level
                    if p_top > p_op || (p_top == p_op && op.is_unary()) {
                        out.push(top);
                        ops.pop();
                    } else {
                        break;
                    }
                }
                ops.push(op);
            }
        }
    }

    while let Some(top) = ops.pop() {
        if top != Token::LeftParen {
            out.push(top);
        }
    }

    out
}

/// Tokenize, add concatenation and convert to postfix in one go.
pub fn parse_postfix(pattern: &str) -> Vec<Token> {
    to_postfix(&insert_concat(&tokenize(pattern)))
}

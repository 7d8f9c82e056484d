//! Regex compilation to an NFA.
//!
//! The pipeline is tokenization, explicit concatenation, shunting-yard
//! conversion to postfix and Thompson's construction over the postfix stream.
//! Compilation is lenient: unbalanced parentheses and operators without
//! operands are tolerated, so every pattern yields an automaton.

mod nfa;
mod parser;

use tracing::debug;

use crate::automaton::nfa::Nfa;

pub use nfa::build_from_postfix;
pub use parser::{insert_concat, parse_postfix, to_postfix, tokenize, Token};

/// Compile a pattern into an NFA with exactly one final node (or, for a pattern
/// that yields no fragments, the single-node empty-string acceptor).
pub fn compile_regex(pattern: &str) -> Nfa {
    let postfix = parse_postfix(pattern);
    let nfa = build_from_postfix(&postfix);
    debug!(
        pattern,
        postfix_len = postfix.len(),
        states = nfa.len(),
        "compiled regex"
    );
    nfa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_examples() {
        let nfa = compile_regex("a(b|c)*");
        for s in ["a", "ab", "acbcb"] {
            assert!(nfa.simulate(s), "{}", s);
        }
        assert!(!nfa.simulate(""));
        assert!(!nfa.simulate("abd"));
    }

    #[test]
    fn test_moderation_style_patterns() {
        let nfa = compile_regex("id(i|1)ot");
        assert!(nfa.simulate("idiot"));
        assert!(nfa.simulate("id1ot"));
        assert!(!nfa.simulate("idot"));

        let nfa = compile_regex("st.p.d");
        assert!(nfa.simulate("stupid"));
        assert!(nfa.simulate("st0p1d"));
    }

    #[test]
    fn test_empty_pattern_accepts_only_empty_string() {
        let nfa = compile_regex("");
        assert!(nfa.simulate(""));
        assert!(!nfa.simulate("a"));
        assert!(!nfa.simulate(" "));
    }

    #[test]
    fn test_unbalanced_parentheses_are_lenient() {
        let nfa = compile_regex("(ab");
        assert!(nfa.simulate("ab"));

        let nfa = compile_regex("ab)");
        assert!(nfa.simulate("ab"));

        // Only parentheses: no fragments at all
        let nfa = compile_regex("()");
        assert!(nfa.simulate(""));
    }

    #[test]
    fn test_operator_bytes_are_never_literals() {
        let nfa = compile_regex("a+");
        assert!(!nfa.simulate("a+"));
        assert!(nfa.simulate("aaa"));
    }
}

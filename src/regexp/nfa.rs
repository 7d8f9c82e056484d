//! Thompson's construction: postfix tokens to an NFA.
//!
//! Every sub-expression becomes a fragment with a single start and a single
//! accept node. Fragments are combined on an explicit stack while the postfix
//! stream is read left to right; only the accept node of the final fragment is
//! marked final.

use crate::automaton::arena::StateId;
use crate::automaton::nfa::Nfa;
use crate::automaton::symbol::Symbol;

use super::parser::Token;

/// A partially built sub-automaton.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

/// Build an NFA from postfix tokens.
///
/// Operators lacking operands are skipped. Fragments left over at the end are
/// concatenated left to right. An empty token stream yields the automaton
/// accepting only the empty string.
pub fn build_from_postfix(postfix: &[Token]) -> Nfa {
    let mut nfa = Nfa::blank();
    let mut stack: Vec<Fragment> = Vec::new();

    for &tok in postfix {
        match tok {
            Token::Literal(b) => stack.push(symbol_fragment(&mut nfa, Symbol::Byte(b))),
            Token::Wildcard => stack.push(symbol_fragment(&mut nfa, Symbol::Wildcard)),
            Token::Concat => {
                let Some((left, right)) = pop_two(&mut stack) else {
                    continue;
                };
                stack.push(concat(&mut nfa, left, right));
            }
            Token::Alternate => {
                let Some((left, right)) = pop_two(&mut stack) else {
                    continue;
                };
                let start = nfa.add_node(false);
                let accept = nfa.add_node(false);
                nfa.link_epsilon(start, left.start);
                nfa.link_epsilon(start, right.start);
                nfa.link_epsilon(left.accept, accept);
                nfa.link_epsilon(right.accept, accept);
                stack.push(Fragment { start, accept });
            }
            Token::Star => {
                let Some(inner) = stack.pop() else {
                    continue;
                };
                let start = nfa.add_node(false);
                let accept = nfa.add_node(false);
                nfa.link_epsilon(start, inner.start);
                nfa.link_epsilon(start, accept);
                nfa.link_epsilon(inner.accept, inner.start);
                nfa.link_epsilon(inner.accept, accept);
                stack.push(Fragment { start, accept });
            }
            Token::Plus => {
                let Some(inner) = stack.pop() else {
                    continue;
                };
                // The inner start is the entry point, so at least one pass is required
                let accept = nfa.add_node(false);
                nfa.link_epsilon(inner.accept, inner.start);
                nfa.link_epsilon(inner.accept, accept);
                stack.push(Fragment {
                    start: inner.start,
                    accept,
                });
            }
            Token::Optional => {
                let Some(inner) = stack.pop() else {
                    continue;
                };
                let start = nfa.add_node(false);
                let accept = nfa.add_node(false);
                nfa.link_epsilon(start, inner.start);
                nfa.link_epsilon(start, accept);
                nfa.link_epsilon(inner.accept, accept);
                stack.push(Fragment { start, accept });
            }
            // Parentheses never reach the postfix stream
            Token::LeftParen | Token::RightParen => {}
        }
    }

    let mut fragments = stack.into_iter();
    let Some(first) = fragments.next() else {
        return Nfa::empty_string();
    };
    let whole = fragments.fold(first, |acc, next| concat(&mut nfa, acc, next));

    nfa.mark_start(whole.start);
    nfa.mark_final(whole.accept);
    nfa
}

fn symbol_fragment(nfa: &mut Nfa, symbol: Symbol) -> Fragment {
    let start = nfa.add_node(false);
    let accept = nfa.add_node(false);
    nfa.link(start, accept, symbol);
    Fragment { start, accept }
}

fn concat(nfa: &mut Nfa, left: Fragment, right: Fragment) -> Fragment {
    nfa.link_epsilon(left.accept, right.start);
    Fragment {
        start: left.start,
        accept: right.accept,
    }
}

/// Pop the two top fragments as `(left, right)`. When fewer than two are
/// present nothing is popped.
fn pop_two(stack: &mut Vec<Fragment>) -> Option<(Fragment, Fragment)> {
    if stack.len() < 2 {
        return None;
    }
    let right = stack.pop()?;
    let left = stack.pop()?;
    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regexp::parser::parse_postfix;

    fn build(pattern: &str) -> Nfa {
        build_from_postfix(&parse_postfix(pattern))
    }

    #[test]
    fn test_leftover_fragments_concatenate_in_order() {
        // No concat operator between the literals, so two fragments remain
        let nfa = build_from_postfix(&[Token::Literal(b'a'), Token::Literal(b'b')]);
        assert!(nfa.simulate("ab"));
        assert!(!nfa.simulate("a"));
        assert!(!nfa.simulate("b"));
        assert!(!nfa.simulate("ba"));

        let nfa = build_from_postfix(&[
            Token::Literal(b'x'),
            Token::Literal(b'y'),
            Token::Star,
            Token::Literal(b'z'),
        ]);
        assert!(nfa.simulate("xz"));
        assert!(nfa.simulate("xyyz"));
        assert!(!nfa.simulate("yxz"));
    }

    #[test]
    fn test_literal_fragment_shape() {
        let nfa = build("a");
        assert_eq!(nfa.len(), 2);
        assert_eq!(nfa.finals().count(), 1);
        assert!(nfa.simulate("a"));
        assert!(!nfa.simulate(""));
        assert!(!nfa.simulate("aa"));
    }

    #[test]
    fn test_concat_and_alternation() {
        let nfa = build("ab|cd");
        assert!(nfa.simulate("ab"));
        assert!(nfa.simulate("cd"));
        assert!(!nfa.simulate("ad"));
        assert!(!nfa.simulate("abcd"));
    }

    #[test]
    fn test_quantifiers() {
        let star = build("ab*");
        for s in ["a", "ab", "abbb"] {
            assert!(star.simulate(s), "{}", s);
        }
        assert!(!star.simulate("b"));

        let plus = build("ab+");
        assert!(!plus.simulate("a"));
        assert!(plus.simulate("ab"));
        assert!(plus.simulate("abbbb"));

        let opt = build("colou?r");
        assert!(opt.simulate("color"));
        assert!(opt.simulate("colour"));
        assert!(!opt.simulate("colouur"));
    }

    #[test]
    fn test_plus_reuses_inner_start() {
        // a+ adds exactly one node to the literal fragment
        assert_eq!(build("a+").len(), 3);
        // a* adds two
        assert_eq!(build("a*").len(), 4);
    }

    #[test]
    fn test_group_with_star() {
        let nfa = build("(ab)*c");
        for s in ["c", "abc", "ababc"] {
            assert!(nfa.simulate(s), "{}", s);
        }
        for s in ["", "ac", "abab"] {
            assert!(!nfa.simulate(s), "{}", s);
        }
    }

    #[test]
    fn test_wildcard() {
        let nfa = build("h.t");
        assert!(nfa.simulate("hat"));
        assert!(nfa.simulate("h t"));
        assert!(nfa.simulate("h?t"));
        assert!(!nfa.simulate("ht"));
    }

    #[test]
    fn test_operators_without_operands_are_skipped() {
        // Leading star has nothing to repeat
        let nfa = build("*a");
        assert!(nfa.simulate("a"));

        // Alternation with a single operand
        let nfa = build("|a");
        assert!(nfa.simulate("a"));
        assert!(!nfa.simulate(""));
    }

    #[test]
    fn test_empty_postfix() {
        let nfa = build_from_postfix(&[]);
        assert_eq!(nfa.len(), 1);
        assert!(nfa.simulate(""));
        assert!(!nfa.simulate("a"));
    }

    #[test]
    fn test_single_final_node() {
        for pattern in ["a", "a|b", "(a|b)*c", "x?y+"] {
            assert_eq!(build(pattern).finals().count(), 1, "{}", pattern);
        }
    }
}

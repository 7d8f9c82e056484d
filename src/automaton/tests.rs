use super::*;
use crate::regexp::compile_regex;
use proptest::prelude::*;

fn assert_equivalent(pattern: &str, inputs: &[&str]) {
    let nfa = compile_regex(pattern);
    let dfa = Dfa::from_nfa(&nfa);
    for input in inputs {
        assert_eq!(
            nfa.simulate(input),
            dfa.simulate(input),
            "pattern {:?} disagrees on {:?}",
            pattern,
            input
        );
    }
}

#[test]
fn test_regex_to_dfa_pipeline() {
    let nfa = compile_regex("a(b|c)*");
    let dfa = Dfa::from_nfa(&nfa);

    for s in ["a", "ab", "acbcb"] {
        assert!(dfa.simulate(s), "{}", s);
    }
    assert!(!dfa.simulate(""));
    assert!(!dfa.simulate("abd"));
}

#[test]
fn test_empty_pattern_nfa_and_dfa() {
    let nfa = compile_regex("");
    let dfa = Dfa::from_nfa(&nfa);

    assert!(nfa.simulate(""));
    assert!(dfa.simulate(""));
    for s in ["a", " ", "0"] {
        assert!(!nfa.simulate(s));
        assert!(!dfa.simulate(s));
    }
}

#[test]
fn test_equivalence_on_samples() {
    let inputs = ["", "a", "b", "ab", "ba", "abab", "aab", "abb", "xyz", "a b"];
    for pattern in ["a", "ab", "a|b", "(ab)*", "a+b?", ".b", "(a|.)*b", "a.+", "((a"] {
        assert_equivalent(pattern, &inputs);
    }
}

#[test]
fn test_dfa_has_one_edge_per_symbol() {
    let dfa = Dfa::from_nfa(&compile_regex("(a|ab)(c|bcd)"));
    for state in dfa.states() {
        // BTreeMap keys are unique, so totality over the alphabet is the check
        assert_eq!(state.transitions().len(), dfa.alphabet().len());
    }
    assert!(dfa.simulate("abcd"));
    assert!(dfa.simulate("ac"));
    assert!(dfa.simulate("abc"));
    assert!(!dfa.simulate("ab"));
}

#[test]
fn test_dot_exports_label_epsilon_and_wildcard() {
    let nfa = compile_regex("a.*");
    let dot = nfa.to_dot();
    assert!(dot.contains("label=\"ε\""));
    assert!(dot.contains("label=\".\""));

    let dfa = Dfa::from_nfa(&nfa);
    assert!(dfa.to_dot().contains("style=dashed"));
}

proptest! {
    #[test]
    fn prop_nfa_dfa_equivalent(
        pattern in "[ab.|*+?()]{0,8}",
        inputs in prop::collection::vec("[abc]{0,6}", 1..8),
    ) {
        let nfa = compile_regex(&pattern);
        let dfa = Dfa::from_nfa(&nfa);
        for input in &inputs {
            prop_assert_eq!(nfa.simulate(input), dfa.simulate(input));
        }
    }

    #[test]
    fn prop_closure_idempotent(pattern in "[ab|*+?()]{0,8}") {
        let nfa = compile_regex(&pattern);
        let once = nfa.epsilon_closure([nfa.start()]);
        let twice = nfa.epsilon_closure(once.iter().copied());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_scan_agrees_across_automata(
        pattern in "[ab.|*+]{1,5}",
        message in "[ab ]{0,10}",
    ) {
        let nfa = compile_regex(&pattern);
        let dfa = Dfa::from_nfa(&nfa);
        prop_assert_eq!(
            scan_substrings(&nfa, &message, None),
            scan_substrings(&dfa, &message, None)
        );
    }
}

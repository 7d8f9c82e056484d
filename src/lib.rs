//! moderation-automata: finite and pushdown automata for chat moderation
//!
//! ```
//! use moderation_automata::{compile_regex, nfa_to_dfa, dfa_simulate, pda_balanced};
//!
//! let nfa = compile_regex("id(i|1)ot");
//! let dfa = nfa_to_dfa(&nfa);
//! assert!(dfa_simulate(&dfa, "id1ot"));
//! assert!(pda_balanced("(a [b] c)"));
//! ```

pub mod approximate;
pub mod automaton;
pub mod config;
pub mod pda;
pub mod regexp;

use std::fmt;

pub use approximate::{ApproximateMatcher, MatchResult};
pub use automaton::{
    scan_substrings, scan_with_config, Acceptor, CompiledPattern, Dfa, Label, Nfa, PatternCache, StateId,
    SubsetConfig, Symbol,
};
pub use config::EngineConfig;
pub use pda::{FormattingReport, InjectionReport, Pda, Span, ToxicityScan};
pub use regexp::compile_regex;

/// Errors returned by checked builders and configuration loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomataError {
    UnknownState(StateId),
    InvalidConfig(String),
}

impl fmt::Display for AutomataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomataError::UnknownState(id) => write!(f, "unknown state: {}", id),
            AutomataError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for AutomataError {}

/// Run an NFA over the whole input.
pub fn nfa_simulate(nfa: &Nfa, input: &str) -> bool {
    nfa.simulate(input)
}

/// Run a DFA over the whole input.
pub fn dfa_simulate(dfa: &Dfa, input: &str) -> bool {
    dfa.simulate(input)
}

/// Subset construction with the default alphabet.
pub fn nfa_to_dfa(nfa: &Nfa) -> Dfa {
    Dfa::from_nfa(nfa)
}

pub fn pda_balanced(input: &str) -> bool {
    pda::is_balanced(input)
}

pub fn pda_validate_formatting(input: &str) -> FormattingReport {
    pda::validate_formatting(input)
}

pub fn pda_detect_injection(input: &str) -> InjectionReport {
    pda::detect_injection(input)
}

pub fn pda_scan_toxicity<S: AsRef<str>>(input: &str, patterns: &[S], max_edits: usize) -> ToxicityScan {
    pda::scan_toxicity(input, patterns, max_edits)
}

pub fn approx_find_matches(message: &str, pattern: &str, max_edits: usize) -> Vec<MatchResult> {
    approximate::find_matches(message, pattern, max_edits)
}

//! Finite automata: NFA simulation, subset construction and scanning.
//!
//! # Module Organization
//!
//! - `arena`: `StateId` and the arena owning automaton nodes
//! - `sparse_set`: O(1)-clear state sets used by NFA simulation
//! - `symbol`: input symbols (`Byte`, `Wildcard`) and transition labels
//! - `nfa`: the NFA, epsilon closure and simulation
//! - `dfa`: subset construction and DFA simulation
//! - `scan`: the `Acceptor` trait and substring scanning
//! - `cache`: thread-safe cache of compiled patterns

pub mod arena;
mod cache;
pub mod dfa;
pub mod nfa;
mod scan;
pub mod sparse_set;
pub mod symbol;

pub use arena::StateId;
pub use cache::{CompiledPattern, PatternCache};
pub use dfa::{Dfa, DfaState, SubsetConfig, DEFAULT_ALPHABET};
pub use nfa::{Nfa, NfaNode};
pub use scan::{scan_substrings, scan_with_config, Acceptor};
pub use symbol::{Label, Symbol};

#[cfg(test)]
mod tests;

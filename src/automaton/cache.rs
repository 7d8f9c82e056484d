//! Thread-safe cache of compiled patterns.
//!
//! Lookups read an immutable snapshot through `ArcSwap` and never block.
//! Compilation of a missing pattern is serialized behind a mutex: the builder
//! re-checks the snapshot under the lock, compiles, and publishes a new
//! snapshot with the added entry.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::dfa::{Dfa, SubsetConfig};
use super::nfa::Nfa;
use super::scan::Acceptor;
use crate::regexp::compile_regex;

/// A pattern compiled to both automata.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    pattern: String,
    nfa: Nfa,
    dfa: Dfa,
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        Self::compile_with(pattern, &SubsetConfig::default())
    }

    pub fn compile_with(pattern: &str, config: &SubsetConfig) -> Self {
        let nfa = compile_regex(pattern);
        let dfa = Dfa::from_nfa_with(&nfa, config);
        Self {
            pattern: pattern.to_string(),
            nfa,
            dfa,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }
}

impl Acceptor for CompiledPattern {
    /// Runs the DFA, which takes one edge per byte.
    fn accepts(&self, input: &str) -> bool {
        self.dfa.simulate(input)
    }
}

type Snapshot = FxHashMap<String, Arc<CompiledPattern>>;

/// Compiles each pattern once and shares the result across threads.
///
/// `PatternCache` is `Send + Sync`.
pub struct PatternCache {
    /// Published entries - atomically swappable, lock-free reads
    entries: ArcSwap<Snapshot>,
    /// Serializes compilation and publication
    build_lock: Mutex<SubsetConfig>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternCache {
    pub fn new() -> Self {
        Self::with_config(SubsetConfig::default())
    }

    pub fn with_config(config: SubsetConfig) -> Self {
        Self {
            entries: ArcSwap::from_pointee(FxHashMap::default()),
            build_lock: Mutex::new(config),
        }
    }

    /// Already-compiled pattern, if any. Never blocks.
    pub fn get(&self, pattern: &str) -> Option<Arc<CompiledPattern>> {
        self.entries.load().get(pattern).cloned()
    }

    /// Return the compiled pattern, compiling it on first use.
    pub fn get_or_compile(&self, pattern: &str) -> Arc<CompiledPattern> {
        if let Some(hit) = self.get(pattern) {
            return hit;
        }

        let config = self.build_lock.lock();

        // Another thread may have published it while we waited
        let current = self.entries.load_full();
        if let Some(hit) = current.get(pattern) {
            return Arc::clone(hit);
        }

        let compiled = Arc::new(CompiledPattern::compile_with(pattern, &config));
        let mut next: Snapshot = (*current).clone();
        next.insert(pattern.to_string(), Arc::clone(&compiled));
        self.entries.store(Arc::new(next));

        debug!(
            pattern,
            nfa_states = compiled.nfa.len(),
            dfa_states = compiled.dfa.len(),
            cached = self.len(),
            "pattern cached"
        );
        compiled
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let _guard = self.build_lock.lock();
        self.entries.store(Arc::new(FxHashMap::default()));
    }
}

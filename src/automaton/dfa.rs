//! Deterministic finite automaton and the subset construction producing it.
//!
//! `Dfa::from_nfa` runs the powerset construction: every DFA state stands for
//! the epsilon-closed set of NFA states reachable on the same input, keyed by
//! the sorted id list of that set. Missing edges are completed with one shared
//! dead state so the result is total over its alphabet.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::{self, Write};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::arena::{StateArena, StateId};
use super::nfa::Nfa;
use super::symbol::{escape_byte, Symbol};

/// Alphabet used when the NFA has no byte-labeled edges at all: ASCII letters,
/// digits and space.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

/// Options for the subset construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubsetConfig {
    /// Symbols to transition on when the NFA has no byte-labeled edges (for
    /// instance a pattern made only of `.` wildcards).
    pub default_alphabet: Vec<u8>,
}

impl Default for SubsetConfig {
    fn default() -> Self {
        Self {
            default_alphabet: DEFAULT_ALPHABET.bytes().collect(),
        }
    }
}

impl SubsetConfig {
    pub fn with_alphabet(alphabet: impl AsRef<[u8]>) -> Self {
        Self {
            default_alphabet: alphabet.as_ref().to_vec(),
        }
    }
}

/// A state of the DFA.
#[derive(Clone, Debug, PartialEq)]
pub struct DfaState {
    id: StateId,
    is_final: bool,
    transitions: BTreeMap<u8, StateId>,
    /// Edge taken by bytes outside the alphabet. Only present when the source
    /// NFA had wildcard edges.
    fallback: Option<StateId>,
}

impl DfaState {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn transitions(&self) -> &BTreeMap<u8, StateId> {
        &self.transitions
    }

    pub fn fallback(&self) -> Option<StateId> {
        self.fallback
    }

    /// The unique successor on `byte`, if any.
    #[inline]
    pub fn next(&self, byte: u8) -> Option<StateId> {
        self.transitions.get(&byte).copied().or(self.fallback)
    }
}

/// A deterministic finite automaton.
#[derive(Clone, Debug, PartialEq)]
pub struct Dfa {
    states: StateArena<DfaState>,
    start: StateId,
    alphabet: Vec<u8>,
    dead: Option<StateId>,
}

impl Dfa {
    /// Subset construction with the default configuration.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        Self::from_nfa_with(nfa, &SubsetConfig::default())
    }

    /// Produces a DFA equivalent to `nfa` using the powerset construction.
    pub fn from_nfa_with(nfa: &Nfa, config: &SubsetConfig) -> Self {
        let used = nfa.used_bytes();
        let alphabet: Vec<u8> = if used.is_empty() {
            config
                .default_alphabet
                .iter()
                .copied()
                .collect::<BTreeSet<u8>>()
                .into_iter()
                .collect()
        } else {
            used.into_iter().collect()
        };
        let wildcard = nfa.has_wildcard();

        let mut builder = SubsetBuilder {
            nfa,
            states: StateArena::new(),
            index: FxHashMap::default(),
            subsets: Vec::new(),
            queue: VecDeque::new(),
        };

        let start = builder.intern(nfa.epsilon_closure([nfa.start()]));

        while let Some(current) = builder.queue.pop_front() {
            let members = builder.subsets[current.index()].clone();

            let wildcard_dests: Vec<StateId> = members
                .iter()
                .flat_map(|&s| nfa.targets(s, Symbol::Wildcard))
                .copied()
                .collect();

            for &byte in &alphabet {
                // Exact and wildcard destinations are unioned before closing.
                let mut raw = wildcard_dests.clone();
                for &s in &members {
                    raw.extend_from_slice(nfa.targets(s, Symbol::Byte(byte)));
                }

                let closed = nfa.epsilon_closure(raw);
                if closed.is_empty() {
                    continue;
                }
                let to = builder.intern(closed);
                builder.states[current].transitions.insert(byte, to);
            }

            if !wildcard_dests.is_empty() {
                let closed = nfa.epsilon_closure(wildcard_dests);
                let to = builder.intern(closed);
                builder.states[current].fallback = Some(to);
            }
        }

        let mut states = builder.states;
        let dead = complete_with_dead_state(&mut states, &alphabet, wildcard);

        debug!(
            nfa_states = nfa.len(),
            dfa_states = states.len(),
            alphabet = alphabet.len(),
            wildcard,
            dead_state = dead.is_some(),
            "subset construction finished"
        );

        Dfa {
            states,
            start,
            alphabet,
            dead,
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.states.get(id)
    }

    pub fn states(&self) -> impl Iterator<Item = &DfaState> + '_ {
        self.states.iter().map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The symbols the construction transitioned on, sorted.
    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    pub fn dead_state(&self) -> Option<StateId> {
        self.dead
    }

    pub fn is_dead_state(&self, id: StateId) -> bool {
        self.dead == Some(id)
    }

    /// Walks the unique edge per byte. A byte without an edge rejects.
    pub fn simulate(&self, input: &str) -> bool {
        let Some(mut current) = self.states.get(self.start).map(|s| s.id) else {
            return false;
        };

        for byte in input.bytes() {
            match self.states[current].next(byte) {
                Some(next) if self.dead != Some(next) => current = next,
                _ => return false,
            }
        }

        self.states[current].is_final
    }

    /// Graphviz description of the automaton.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        match self.write_dot(&mut out, &FxHashSet::default(), &FxHashSet::default()) {
            Ok(()) => out,
            Err(_) => String::new(),
        }
    }

    /// Graphviz description highlighting the path taken by `input`.
    pub fn to_dot_with_input(&self, input: &str) -> String {
        let mut visited = FxHashSet::default();
        let mut used = FxHashSet::default();

        if let Some(mut current) = self.states.get(self.start).map(|s| s.id) {
            visited.insert(current);
            for byte in input.bytes() {
                let Some(next) = self.states[current].next(byte) else {
                    break;
                };
                used.insert((current, byte, next));
                visited.insert(next);
                current = next;
            }
        }

        let mut out = String::new();
        match self.write_dot(&mut out, &visited, &used) {
            Ok(()) => out,
            Err(_) => String::new(),
        }
    }

    fn write_dot<W: Write>(
        &self,
        w: &mut W,
        visited: &FxHashSet<StateId>,
        used: &FxHashSet<(StateId, u8, StateId)>,
    ) -> fmt::Result {
        writeln!(w, "digraph DFA {{")?;
        writeln!(w, "  rankdir=LR;")?;
        writeln!(w, "  node [shape=circle];")?;
        writeln!(w, "  start [shape=point];")?;
        writeln!(w, "  start -> {};", self.start)?;
        writeln!(w)?;

        for (id, state) in self.states.iter() {
            let seen = visited.contains(&id);
            match (state.is_final, seen) {
                (true, true) => writeln!(w, "  {} [peripheries=2, style=filled, fillcolor=orange];", id)?,
                (true, false) => writeln!(w, "  {} [peripheries=2];", id)?,
                (false, true) => writeln!(w, "  {} [style=filled, fillcolor=yellow];", id)?,
                (false, false) => writeln!(w, "  {};", id)?,
            }
        }
        writeln!(w)?;

        for (id, state) in self.states.iter() {
            for (&byte, &to) in &state.transitions {
                write!(w, "  {} -> {} [label=\"{}\"", id, to, escape_byte(byte))?;
                if used.contains(&(id, byte, to)) {
                    write!(w, ", color=red, penwidth=2")?;
                }
                writeln!(w, "];")?;
            }
            if let Some(to) = state.fallback {
                let taken = used
                    .iter()
                    .any(|&(f, b, t)| f == id && t == to && !state.transitions.contains_key(&b));
                write!(w, "  {} -> {} [label=\".\", style=dashed", id, to)?;
                if taken {
                    write!(w, ", color=red, penwidth=2")?;
                }
                writeln!(w, "];")?;
            }
        }

        writeln!(w, "}}")
    }
}

/// Work state of one subset construction run.
struct SubsetBuilder<'a> {
    nfa: &'a Nfa,
    states: StateArena<DfaState>,
    /// Canonical key (sorted NFA ids) -> DFA state
    index: FxHashMap<Vec<StateId>, StateId>,
    /// NFA ids behind each DFA state, by DFA index
    subsets: Vec<Vec<StateId>>,
    /// DFA states whose edges are not computed yet
    queue: VecDeque<StateId>,
}

impl SubsetBuilder<'_> {
    /// Get or create the DFA state for a closed NFA-state set.
    fn intern(&mut self, set: BTreeSet<StateId>) -> StateId {
        // BTreeSet iteration is sorted and duplicate-free: the canonical key.
        let key: Vec<StateId> = set.into_iter().collect();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }

        let is_final = key.iter().any(|&s| self.nfa.is_final(s));
        let id = self.states.alloc_with(|id| DfaState {
            id,
            is_final,
            transitions: BTreeMap::new(),
            fallback: None,
        });
        self.subsets.push(key.clone());
        self.index.insert(key, id);
        self.queue.push_back(id);
        id
    }
}

/// Backfill missing edges to one shared, non-final dead state. Returns the dead
/// state when one was needed.
fn complete_with_dead_state(
    states: &mut StateArena<DfaState>,
    alphabet: &[u8],
    wildcard: bool,
) -> Option<StateId> {
    let incomplete = states.iter().any(|(_, s)| {
        alphabet.iter().any(|b| !s.transitions.contains_key(b)) || (wildcard && s.fallback.is_none())
    });
    if !incomplete {
        return None;
    }

    let dead = states.alloc_with(|id| DfaState {
        id,
        is_final: false,
        transitions: alphabet.iter().map(|&b| (b, id)).collect(),
        fallback: wildcard.then_some(id),
    });

    for (id, state) in states.iter_mut() {
        if id == dead {
            continue;
        }
        for &b in alphabet {
            state.transitions.entry(b).or_insert(dead);
        }
        if wildcard && state.fallback.is_none() {
            state.fallback = Some(dead);
        }
    }

    Some(dead)
}

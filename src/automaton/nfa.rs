//! Nondeterministic finite automaton with epsilon transitions.
//!
//! This module contains the NFA representation and its direct simulation:
//! - `epsilon_closure`: breadth-first expansion along epsilon edges
//! - `simulate`: set-of-states simulation with wildcard edges
//! - `transitions` / `edges`: enumeration with a distinct epsilon label
//!
//! Nodes live in a `StateArena`; every edge is a plain `StateId`, so the
//! loops produced by Thompson's construction need no shared ownership.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

use smallvec::SmallVec;

use super::arena::{StateArena, StateId};
use super::sparse_set::{SparseSet, StepSets};
use super::symbol::{Label, Symbol};
use crate::AutomataError;

/// Destination list of one edge label. Thompson fragments rarely fan out to
/// more than two states, so two ids are stored inline.
pub type Targets = SmallVec<[StateId; 2]>;

/// A node of the NFA.
#[derive(Clone, Debug, PartialEq)]
pub struct NfaNode {
    id: StateId,
    is_final: bool,
    transitions: BTreeMap<Symbol, Targets>,
    epsilons: Targets,
}

impl NfaNode {
    fn new(id: StateId, is_final: bool) -> Self {
        Self {
            id,
            is_final,
            transitions: BTreeMap::new(),
            epsilons: Targets::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Symbol-labeled edges, ordered by symbol.
    pub fn transitions(&self) -> &BTreeMap<Symbol, Targets> {
        &self.transitions
    }

    /// Destinations reachable without consuming input.
    pub fn epsilons(&self) -> &[StateId] {
        &self.epsilons
    }

    /// Destinations of the edges labeled exactly `symbol`.
    ///
    /// Wildcard edges are only returned when `symbol` is `Symbol::Wildcard`.
    pub fn targets(&self, symbol: Symbol) -> &[StateId] {
        self.transitions
            .get(&symbol)
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }
}

/// A nondeterministic finite automaton.
#[derive(Clone, Debug, PartialEq)]
pub struct Nfa {
    nodes: StateArena<NfaNode>,
    start: StateId,
    finals: BTreeSet<StateId>,
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Nfa {
    /// Create an NFA with a single non-final start node. It accepts nothing.
    pub fn new() -> Self {
        let mut nfa = Self::blank();
        let start = nfa.add_node(false);
        nfa.start = start;
        nfa
    }

    /// Create an NFA whose only state is both start and final, so it accepts
    /// exactly the empty string.
    pub fn empty_string() -> Self {
        let mut nfa = Self::blank();
        let s = nfa.add_node(true);
        nfa.start = s;
        nfa
    }

    /// An NFA with no nodes at all; the builder must set a start before use.
    pub(crate) fn blank() -> Self {
        Self {
            nodes: StateArena::new(),
            start: StateId::NONE,
            finals: BTreeSet::new(),
        }
    }

    /// Creates and adds a new node, returning its id.
    pub fn add_node(&mut self, is_final: bool) -> StateId {
        let id = self.nodes.alloc_with(|id| NfaNode::new(id, is_final));
        if is_final {
            self.finals.insert(id);
        }
        id
    }

    /// Add an edge consuming `symbol`.
    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        symbol: Symbol,
    ) -> Result<(), AutomataError> {
        self.check(from)?;
        self.check(to)?;
        self.link(from, to, symbol);
        Ok(())
    }

    /// Add an edge consuming no input.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) -> Result<(), AutomataError> {
        self.check(from)?;
        self.check(to)?;
        self.link_epsilon(from, to);
        Ok(())
    }

    pub fn set_start(&mut self, id: StateId) -> Result<(), AutomataError> {
        self.check(id)?;
        self.start = id;
        Ok(())
    }

    pub fn set_final(&mut self, id: StateId) -> Result<(), AutomataError> {
        self.check(id)?;
        self.mark_final(id);
        Ok(())
    }

    fn check(&self, id: StateId) -> Result<(), AutomataError> {
        if self.nodes.contains(id) {
            Ok(())
        } else {
            Err(AutomataError::UnknownState(id))
        }
    }

    // Unchecked builders for the regex compiler, which only links ids it
    // allocated itself.

    pub(crate) fn link(&mut self, from: StateId, to: StateId, symbol: Symbol) {
        self.nodes[from]
            .transitions
            .entry(symbol)
            .or_default()
            .push(to);
    }

    pub(crate) fn link_epsilon(&mut self, from: StateId, to: StateId) {
        self.nodes[from].epsilons.push(to);
    }

    pub(crate) fn mark_start(&mut self, id: StateId) {
        self.start = id;
    }

    pub(crate) fn mark_final(&mut self, id: StateId) {
        self.nodes[id].is_final = true;
        self.finals.insert(id);
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn finals(&self) -> impl Iterator<Item = StateId> + '_ {
        self.finals.iter().copied()
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self.finals.contains(&id)
    }

    pub fn node(&self, id: StateId) -> Option<&NfaNode> {
        self.nodes.get(id)
    }

    /// Destinations of the `symbol` edges leaving `id`; empty for unknown ids.
    pub fn targets(&self, id: StateId, symbol: Symbol) -> &[StateId] {
        self.nodes
            .get(id)
            .map(|n| n.targets(symbol))
            .unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NfaNode> + '_ {
        self.nodes.iter().map(|(_, n)| n)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every concrete byte used by a symbol-labeled edge.
    pub fn used_bytes(&self) -> BTreeSet<u8> {
        self.nodes()
            .flat_map(|n| n.transitions.keys())
            .filter_map(|s| match s {
                Symbol::Byte(b) => Some(*b),
                Symbol::Wildcard => None,
            })
            .collect()
    }

    pub fn has_wildcard(&self) -> bool {
        self.nodes()
            .any(|n| n.transitions.contains_key(&Symbol::Wildcard))
    }

    /// All states reachable from `seeds` through zero or more epsilon edges.
    ///
    /// Ids that are not part of this NFA are ignored.
    pub fn epsilon_closure<I>(&self, seeds: I) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut set = SparseSet::new(self.nodes.len());
        for id in seeds {
            if self.nodes.contains(id) {
                set.insert(id);
            }
        }
        self.close_in_place(&mut set);
        set.iter().collect()
    }

    /// Expand `set` to its epsilon closure. The dense part of the sparse set
    /// is in insertion order, so walking it by position is a BFS queue.
    fn close_in_place(&self, set: &mut SparseSet) {
        let mut pos = 0;
        while let Some(id) = set.get(pos) {
            for &next in &self.nodes[id].epsilons {
                set.insert(next);
            }
            pos += 1;
        }
    }

    /// Collect every state reached from `current` by consuming `byte`, through
    /// exact-byte edges and wildcard edges alike.
    fn step_into(&self, current: &SparseSet, byte: u8, next: &mut SparseSet) {
        for id in current.iter() {
            for (symbol, targets) in &self.nodes[id].transitions {
                if symbol.matches(byte) {
                    for &to in targets {
                        next.insert(to);
                    }
                }
            }
        }
    }

    /// Consume one byte: fill `next` from `current`, close it, and make it
    /// the active set.
    fn step(&self, sets: &mut StepSets, byte: u8) {
        let StepSets { current, next } = sets;
        self.step_into(current, byte, next);
        self.close_in_place(next);
        sets.advance();
    }

    /// Checks if the whole input is accepted by this automaton.
    pub fn simulate(&self, input: &str) -> bool {
        if !self.nodes.contains(self.start) {
            return false;
        }

        let mut sets = StepSets::new(self.nodes.len());
        sets.current.insert(self.start);
        self.close_in_place(&mut sets.current);

        for byte in input.bytes() {
            self.step(&mut sets, byte);
            if sets.current.is_empty() {
                return false;
            }
        }

        let accepted = sets.current.iter().any(|id| self.nodes[id].is_final);
        accepted
    }

    /// Outgoing edges of one node as `(target, label)` pairs, symbol edges
    /// first and epsilon edges last.
    pub fn transitions(&self, id: StateId) -> Vec<(StateId, Label)> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        for (symbol, targets) in &node.transitions {
            for &to in targets {
                result.push((to, Label::Symbol(*symbol)));
            }
        }
        for &to in &node.epsilons {
            result.push((to, Label::Epsilon));
        }
        result
    }

    /// Every edge of the automaton as `(from, label, to)`.
    pub fn edges(&self) -> Vec<(StateId, Label, StateId)> {
        self.nodes
            .iter()
            .flat_map(|(id, _)| {
                self.transitions(id)
                    .into_iter()
                    .map(move |(to, label)| (id, label, to))
            })
            .collect()
    }

    /// States that are active at some point while running `input`.
    fn visited_states(&self, input: &str) -> BTreeSet<StateId> {
        let mut visited = BTreeSet::new();
        if !self.nodes.contains(self.start) {
            return visited;
        }

        let mut sets = StepSets::new(self.nodes.len());
        sets.current.insert(self.start);
        self.close_in_place(&mut sets.current);
        visited.extend(sets.current.iter());

        for byte in input.bytes() {
            self.step(&mut sets, byte);
            if sets.current.is_empty() {
                break;
            }
            visited.extend(sets.current.iter());
        }
        visited
    }

    /// Graphviz description of the automaton.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        match self.write_dot(&mut out, None) {
            Ok(()) => out,
            Err(_) => String::new(),
        }
    }

    /// Graphviz description with the states visited by `input` filled and
    /// edges between visited states drawn in red.
    pub fn to_dot_with_input(&self, input: &str) -> String {
        let visited = self.visited_states(input);
        let mut out = String::new();
        match self.write_dot(&mut out, Some(&visited)) {
            Ok(()) => out,
            Err(_) => String::new(),
        }
    }

    fn write_dot<W: Write>(&self, w: &mut W, visited: Option<&BTreeSet<StateId>>) -> fmt::Result {
        let is_visited = |id: &StateId| visited.is_some_and(|v| v.contains(id));

        writeln!(w, "digraph NFA {{")?;
        writeln!(w, "  rankdir=LR;")?;
        writeln!(w, "  node [shape=circle];")?;
        writeln!(w, "  start [shape=point];")?;
        if !self.start.is_none() {
            writeln!(w, "  start -> {};", self.start)?;
        }

        for (id, node) in self.nodes.iter() {
            let mut attrs = Vec::new();
            if node.is_final {
                attrs.push("peripheries=2");
            }
            if is_visited(&id) {
                attrs.push("style=filled, fillcolor=yellow");
            }
            if attrs.is_empty() {
                writeln!(w, "  {};", id)?;
            } else {
                writeln!(w, "  {} [{}];", id, attrs.join(", "))?;
            }
        }

        for (from, label, to) in self.edges() {
            write!(w, "  {} -> {} [label=\"{}\"", from, to, label)?;
            if is_visited(&from) && is_visited(&to) {
                write!(w, ", color=red, penwidth=2")?;
            }
            writeln!(w, "];")?;
        }

        writeln!(w, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a(b|c)* built by hand.
    fn hand_built() -> (Nfa, [StateId; 4]) {
        let mut nfa = Nfa::new();
        let s0 = nfa.start();
        let s1 = nfa.add_node(true);
        let s2 = nfa.add_node(false);
        let s3 = nfa.add_node(false);

        nfa.add_transition(s0, s1, Symbol::Byte(b'a')).unwrap();
        nfa.add_epsilon(s1, s2).unwrap();
        nfa.add_transition(s2, s3, Symbol::Byte(b'b')).unwrap();
        nfa.add_transition(s2, s3, Symbol::Byte(b'c')).unwrap();
        nfa.add_epsilon(s3, s1).unwrap();
        (nfa, [s0, s1, s2, s3])
    }

    #[test]
    fn test_new_nfa_accepts_nothing() {
        let nfa = Nfa::new();
        assert_eq!(nfa.len(), 1);
        assert!(!nfa.simulate(""));
        assert!(!nfa.simulate("a"));
    }

    #[test]
    fn test_empty_string_nfa() {
        let nfa = Nfa::empty_string();
        assert!(nfa.simulate(""));
        assert!(!nfa.simulate("a"));
        assert!(nfa.is_final(nfa.start()));
    }

    #[test]
    fn test_hand_built_simulation() {
        let (nfa, _) = hand_built();
        assert!(nfa.simulate("a"));
        assert!(nfa.simulate("ab"));
        assert!(nfa.simulate("acbcb"));
        assert!(!nfa.simulate(""));
        assert!(!nfa.simulate("b"));
        assert!(!nfa.simulate("abd"));
    }

    #[test]
    fn test_epsilon_closure_follows_cycles() {
        let (nfa, [s0, s1, s2, s3]) = hand_built();

        let closure = nfa.epsilon_closure([s3]);
        assert_eq!(closure, BTreeSet::from([s1, s2, s3]));

        let start_closure = nfa.epsilon_closure([s0]);
        assert_eq!(start_closure, BTreeSet::from([s0]));
    }

    #[test]
    fn test_epsilon_closure_idempotent() {
        let (nfa, [_, s1, _, s3]) = hand_built();
        let once = nfa.epsilon_closure([s1, s3]);
        let twice = nfa.epsilon_closure(once.iter().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_epsilon_closure_ignores_unknown_ids() {
        let (nfa, _) = hand_built();
        assert!(nfa
            .epsilon_closure([StateId::from_index(99), StateId::NONE])
            .is_empty());
    }

    #[test]
    fn test_wildcard_edge() {
        let mut nfa = Nfa::new();
        let s0 = nfa.start();
        let s1 = nfa.add_node(true);
        nfa.add_transition(s0, s1, Symbol::Wildcard).unwrap();

        assert!(nfa.simulate("x"));
        assert!(nfa.simulate("\u{7f}"));
        assert!(!nfa.simulate(""));
        assert!(!nfa.simulate("xy"));
        assert!(nfa.has_wildcard());
        assert!(nfa.used_bytes().is_empty());
    }

    #[test]
    fn test_byte_and_wildcard_edges_both_followed() {
        let mut nfa = Nfa::new();
        let s0 = nfa.start();
        let on_a = nfa.add_node(false);
        let on_any = nfa.add_node(false);
        let done = nfa.add_node(true);
        nfa.add_transition(s0, on_a, Symbol::Byte(b'a')).unwrap();
        nfa.add_transition(s0, on_any, Symbol::Wildcard).unwrap();
        nfa.add_transition(on_a, done, Symbol::Byte(b'x')).unwrap();
        nfa.add_transition(on_any, done, Symbol::Byte(b'y')).unwrap();

        assert!(nfa.simulate("ax"));
        assert!(nfa.simulate("ay"));
        assert!(nfa.simulate("zy"));
        assert!(!nfa.simulate("zx"));
    }

    #[test]
    fn test_checked_builders_reject_unknown_ids() {
        let mut nfa = Nfa::new();
        let bogus = StateId::from_index(7);

        assert!(matches!(
            nfa.add_transition(nfa.start(), bogus, Symbol::Byte(b'a')),
            Err(AutomataError::UnknownState(id)) if id == bogus
        ));
        assert!(nfa.add_epsilon(bogus, nfa.start()).is_err());
        assert!(nfa.set_start(bogus).is_err());
        assert!(nfa.set_final(StateId::NONE).is_err());
    }

    #[test]
    fn test_transitions_report_epsilon_label() {
        let (nfa, [s0, s1, _, s3]) = hand_built();

        assert_eq!(
            nfa.transitions(s0),
            vec![(s1, Label::Symbol(Symbol::Byte(b'a')))]
        );
        let from_s3 = nfa.transitions(s3);
        assert_eq!(from_s3, vec![(s1, Label::Epsilon)]);
        assert!(nfa.transitions(StateId::from_index(42)).is_empty());
        assert_eq!(nfa.edges().len(), 5);
    }

    #[test]
    fn test_finals_in_sync_with_flags() {
        let (mut nfa, [s0, s1, _, _]) = hand_built();
        nfa.set_final(s0).unwrap();

        let finals: Vec<_> = nfa.finals().collect();
        assert_eq!(finals, vec![s0, s1]);
        for node in nfa.nodes() {
            assert_eq!(node.is_final(), nfa.is_final(node.id()));
        }
    }

    #[test]
    fn test_to_dot() {
        let (nfa, _) = hand_built();
        let dot = nfa.to_dot();
        assert!(dot.starts_with("digraph NFA {"));
        assert!(dot.contains("start -> q0;"));
        assert!(dot.contains("q1 [peripheries=2];"));
        assert!(dot.contains("q0 -> q1 [label=\"a\"];"));
        assert!(dot.contains("q3 -> q1 [label=\"ε\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_to_dot_with_input_highlights_path() {
        let (nfa, _) = hand_built();
        let dot = nfa.to_dot_with_input("ab");
        assert!(dot.contains("q0 [style=filled, fillcolor=yellow];"));
        assert!(dot.contains("q1 [peripheries=2, style=filled, fillcolor=yellow];"));
        assert!(dot.contains("q0 -> q1 [label=\"a\", color=red, penwidth=2];"));
    }
}

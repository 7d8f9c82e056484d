//! Pushdown automata for context-free properties of chat text.
//!
//! Two styles live here:
//!
//! - `Pda`, a generic transition-table automaton over a byte stack, with
//!   factories for balanced brackets, nested formatting and bracketed text
//! - direct simulators (`is_balanced`, `validate_formatting`,
//!   `detect_injection`, `scan_toxicity`) that walk the input once with an
//!   explicit stack and report findings as values
//!
//! A transition `(input, pop, push, to)` is offered only when its pop
//! requirement is absent or equals the current top. Firing it consumes one
//! input byte unless `input` is epsilon, pops one symbol if `pop` is set, and
//! pushes `push` one byte at a time, so the last byte ends on top.

mod balanced;
mod formatting;
mod injection;
mod stack;
mod toxicity;

use std::collections::{BTreeSet, VecDeque};
use std::fmt::{self, Write};

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::automaton::arena::{StateArena, StateId};
use crate::automaton::symbol::escape_byte;
use crate::AutomataError;

pub use balanced::is_balanced;
pub use formatting::{
    validate_formatting, FormattingReport, Span, BOLD_INSIDE_ITALIC, BRACKET_TYPE_MISMATCH,
    MISMATCHED_CLOSER, UNCLOSED_BOLD, UNCLOSED_BRACKET, UNCLOSED_ITALIC, UNCLOSED_STRIKETHROUGH,
    VALID_STRUCTURE,
};
pub use injection::{detect_injection, InjectionReport, InjectionScanner};
pub use stack::{Frame, FrameKind, FrameStack, CLOSERS, OPENERS};
pub use toxicity::{scan_toxicity, ToxicityScan};

/// Symbol the stack starts with.
pub const BOTTOM: u8 = b'$';

/// One edge of the transition table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdaTransition {
    /// `None` is epsilon: no input consumed.
    pub input: Option<u8>,
    /// `None` leaves the stack untouched before pushing.
    pub pop: Option<u8>,
    pub push: Vec<u8>,
    pub to: StateId,
}

impl fmt::Display for PdaTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.input {
            Some(b) => write!(f, "{}", escape_byte(b))?,
            None => write!(f, "ε")?,
        }
        write!(f, " / ")?;
        match self.pop {
            Some(b) => write!(f, "{}", escape_byte(b))?,
            None => write!(f, "ε")?,
        }
        write!(f, " → ")?;
        if self.push.is_empty() {
            write!(f, "ε")
        } else {
            for &b in &self.push {
                write!(f, "{}", escape_byte(b))?;
            }
            Ok(())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdaNode {
    id: StateId,
    is_final: bool,
    transitions: Vec<PdaTransition>,
}

impl PdaNode {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn transitions(&self) -> &[PdaTransition] {
        &self.transitions
    }
}

/// A nondeterministic pushdown automaton accepting by final node once all
/// input has been consumed.
#[derive(Clone, Debug, PartialEq)]
pub struct Pda {
    nodes: StateArena<PdaNode>,
    start: StateId,
    finals: BTreeSet<StateId>,
}

impl Default for Pda {
    fn default() -> Self {
        Self::new()
    }
}

impl Pda {
    /// A PDA with one non-final start node.
    pub fn new() -> Self {
        let mut pda = Pda {
            nodes: StateArena::new(),
            start: StateId::NONE,
            finals: BTreeSet::new(),
        };
        pda.start = pda.add_node(false);
        pda
    }

    pub fn add_node(&mut self, is_final: bool) -> StateId {
        let id = self.nodes.alloc_with(|id| PdaNode {
            id,
            is_final,
            transitions: Vec::new(),
        });
        if is_final {
            self.finals.insert(id);
        }
        id
    }

    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        input: Option<u8>,
        pop: Option<u8>,
        push: impl AsRef<[u8]>,
    ) -> Result<(), AutomataError> {
        self.check(to)?;
        let node = self
            .nodes
            .get_mut(from)
            .ok_or(AutomataError::UnknownState(from))?;
        node.transitions.push(PdaTransition {
            input,
            pop,
            push: push.as_ref().to_vec(),
            to,
        });
        Ok(())
    }

    pub fn set_start(&mut self, id: StateId) -> Result<(), AutomataError> {
        self.check(id)?;
        self.start = id;
        Ok(())
    }

    pub fn set_final(&mut self, id: StateId) -> Result<(), AutomataError> {
        self.check(id)?;
        self.nodes[id].is_final = true;
        self.finals.insert(id);
        Ok(())
    }

    fn check(&self, id: StateId) -> Result<(), AutomataError> {
        if self.nodes.contains(id) {
            Ok(())
        } else {
            Err(AutomataError::UnknownState(id))
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn is_final(&self, id: StateId) -> bool {
        self.finals.contains(&id)
    }

    pub fn finals(&self) -> impl Iterator<Item = StateId> + '_ {
        self.finals.iter().copied()
    }

    pub fn node(&self, id: StateId) -> Option<&PdaNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All transitions leaving `id`; empty for unknown ids.
    pub fn transitions_from(&self, id: StateId) -> &[PdaTransition] {
        self.nodes
            .get(id)
            .map(|n| n.transitions.as_slice())
            .unwrap_or(&[])
    }

    /// Transitions leaving `id` whose pop requirement is satisfied by `top`.
    pub fn offered(
        &self,
        id: StateId,
        top: Option<u8>,
    ) -> impl Iterator<Item = &PdaTransition> + '_ {
        self.transitions_from(id)
            .iter()
            .filter(move |t| t.pop.is_none() || t.pop == top)
    }

    fn longest_push(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|(_, n)| n.transitions.iter())
            .map(|t| t.push.len())
            .max()
            .unwrap_or(0)
    }

    /// Breadth-first search over `(node, position, stack)` configurations.
    ///
    /// Accepts when some configuration has consumed the whole input in a final
    /// node. Configurations whose stack outgrows what the input could need are
    /// dropped, so epsilon cycles that keep pushing terminate.
    pub fn simulate(&self, input: &str) -> bool {
        let bytes = input.as_bytes();
        if !self.nodes.contains(self.start) {
            return false;
        }

        let stack_limit = (bytes.len() + 1) * self.longest_push().max(1) + 1;

        let initial = (self.start, 0usize, vec![BOTTOM]);
        let mut seen: FxHashSet<(StateId, usize, Vec<u8>)> = FxHashSet::default();
        seen.insert(initial.clone());
        let mut queue = VecDeque::from([initial]);

        while let Some((node, pos, stack)) = queue.pop_front() {
            if pos == bytes.len() && self.is_final(node) {
                return true;
            }

            let top = stack.last().copied();
            for t in self.offered(node, top) {
                let next_pos = match t.input {
                    Some(b) if bytes.get(pos) == Some(&b) => pos + 1,
                    Some(_) => continue,
                    None => pos,
                };

                let mut next_stack = stack.clone();
                if t.pop.is_some() {
                    next_stack.pop();
                }
                next_stack.extend_from_slice(&t.push);
                if next_stack.len() > stack_limit {
                    continue;
                }

                let config = (t.to, next_pos, next_stack);
                if seen.insert(config.clone()) {
                    queue.push_back(config);
                }
            }
        }

        debug!(
            input_len = bytes.len(),
            configurations = seen.len(),
            "pda rejected input"
        );
        false
    }

    /// Graphviz description of the automaton. Edges that push bracket or
    /// formatting symbols are orange and edges that pop them are red.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        match self.write_dot(&mut out) {
            Ok(()) => out,
            Err(_) => String::new(),
        }
    }

    fn write_dot<W: Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(w, "digraph PDA {{")?;
        writeln!(w, "  rankdir=LR;")?;
        writeln!(w, "  node [shape=circle];")?;
        writeln!(w, "  start [shape=point];")?;
        writeln!(w, "  start -> {};", self.start)?;
        writeln!(w)?;

        for (id, node) in self.nodes.iter() {
            if node.is_final {
                writeln!(w, "  {} [peripheries=2];", id)?;
            } else {
                writeln!(w, "  {};", id)?;
            }
        }
        writeln!(w)?;

        for (id, node) in self.nodes.iter() {
            for t in &node.transitions {
                let grows = t.push.len() > usize::from(t.pop.is_some());
                let color = if grows && t.push.iter().any(|&b| b != BOTTOM) {
                    "orange"
                } else if t.pop.is_some_and(|p| p != BOTTOM) {
                    "red"
                } else {
                    "black"
                };
                writeln!(w, "  {} -> {} [label=\"{}\", color={}];", id, t.to, t, color)?;
            }
        }

        writeln!(w, "}}")
    }
}

// ============================================================================
// Factories
// ============================================================================

/// Printable ASCII bytes that are plain text for every factory.
fn text_bytes() -> impl Iterator<Item = u8> {
    (0x20u8..=0x7E).filter(|b| !OPENERS.contains(b) && !CLOSERS.contains(b))
}

/// Balanced `( [ { <` over printable ASCII text.
pub fn balanced_brackets() -> Pda {
    let mut pda = Pda::new();
    let scan = pda.start();
    let accept = pda.add_node(true);

    for (&open, &close) in OPENERS.iter().zip(CLOSERS.iter()) {
        pda.link(scan, scan, Some(open), None, &[open]);
        pda.link(scan, scan, Some(close), Some(open), &[]);
    }
    for b in text_bytes() {
        pda.link(scan, scan, Some(b), None, &[]);
    }
    pda.link(scan, accept, None, Some(BOTTOM), &[]);
    pda
}

/// Bold `**`, italic `*`, strikethrough `~~` and brackets, properly nested.
///
/// Stack symbols are `B`, `I`, `S` and the opening bracket itself. `**` may
/// not open on top of `I`. A lone `~` is text.
pub fn nested_formatting() -> Pda {
    const BOLD: u8 = b'B';
    const ITALIC: u8 = b'I';
    const STRIKE: u8 = b'S';

    let mut pda = Pda::new();
    let scan = pda.start();
    let star = pda.add_node(false);
    let after_italic = pda.add_node(false);
    let tilde = pda.add_node(false);
    let after_tilde = pda.add_node(false);
    let accept = pda.add_node(true);

    let mut tops: Vec<u8> = vec![BOTTOM, BOLD, ITALIC, STRIKE];
    tops.extend_from_slice(&OPENERS);

    // Plain scanning; `after_*` nodes may not start the marker they just ended
    for (from, skip) in [(scan, None), (after_italic, Some(b'*')), (after_tilde, Some(b'~'))] {
        for b in text_bytes().filter(|&b| b != b'*' && b != b'~') {
            pda.link(from, scan, Some(b), None, &[]);
        }
        if skip != Some(b'*') {
            pda.link(from, star, Some(b'*'), None, &[]);
        }
        if skip != Some(b'~') {
            pda.link(from, tilde, Some(b'~'), None, &[]);
        }
        for (&open, &close) in OPENERS.iter().zip(CLOSERS.iter()) {
            pda.link(from, scan, Some(open), None, &[open]);
            pda.link(from, scan, Some(close), Some(open), &[]);
        }
        pda.link(from, accept, None, Some(BOTTOM), &[]);
    }

    // `**`: close bold, or open it on anything but italic
    pda.link(star, scan, Some(b'*'), Some(BOLD), &[]);
    for &top in tops.iter().filter(|&&t| t != BOLD && t != ITALIC) {
        pda.link(star, scan, Some(b'*'), Some(top), &[top, BOLD]);
    }

    // Single `*`: toggle italic
    pda.link(star, after_italic, None, Some(ITALIC), &[]);
    for &top in tops.iter().filter(|&&t| t != ITALIC) {
        pda.link(star, after_italic, None, Some(top), &[top, ITALIC]);
    }

    // `~~`: toggle strikethrough
    pda.link(tilde, scan, Some(b'~'), Some(STRIKE), &[]);
    for &top in tops.iter().filter(|&&t| t != STRIKE) {
        pda.link(tilde, scan, Some(b'~'), Some(top), &[top, STRIKE]);
    }
    pda.link(tilde, after_tilde, None, None, &[]);

    pda
}

/// Bracket tracking for toxicity scanning: `outside` while no bracket is open,
/// `inside` otherwise. Accepts balanced input.
pub fn toxic_brackets() -> Pda {
    let mut pda = Pda::new();
    let outside = pda.start();
    let inside = pda.add_node(false);
    let accept = pda.add_node(true);

    for (&open, &close) in OPENERS.iter().zip(CLOSERS.iter()) {
        pda.link(outside, inside, Some(open), Some(BOTTOM), &[BOTTOM, open]);
        pda.link(inside, inside, Some(open), None, &[open]);
        pda.link(inside, inside, Some(close), Some(open), &[]);
    }
    // Back outside once the outermost pair is closed
    pda.link(inside, outside, None, Some(BOTTOM), &[BOTTOM]);

    for b in text_bytes() {
        pda.link(outside, outside, Some(b), None, &[]);
        pda.link(inside, inside, Some(b), None, &[]);
    }
    pda.link(outside, accept, None, Some(BOTTOM), &[]);
    pda
}

impl Pda {
    /// Unchecked edge insertion for factories, which only link their own nodes.
    fn link(&mut self, from: StateId, to: StateId, input: Option<u8>, pop: Option<u8>, push: &[u8]) {
        self.nodes[from].transitions.push(PdaTransition {
            input,
            pop,
            push: push.to_vec(),
            to,
        });
    }
}

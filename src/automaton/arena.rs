//! Arena-based state allocation for cyclic automaton graphs.
//!
//! Automata built from regular expressions are full of cycles (`*` and `+`
//! loops, epsilon back-edges). Every automaton owns its nodes in a single
//! growable arena and refers to them through `StateId`, which is just an index,
//! so nodes can point at each other cyclically without ownership issues.
//!
//! ```text
//! start --ε--> inner --a--> inner_accept --ε--> accept
//!                ^               |
//!                +------ε--------+
//! ```

use std::fmt;

/// Index of a state in a [`StateArena`]. Edges store ids rather than
/// references, so automata may contain cycles.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Sentinel for "no state".
    pub const NONE: StateId = StateId(u32::MAX);

    /// Build an id from an arena index.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "arena index overflow: {}", index);
        StateId(index as u32)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "q-")
        } else {
            write!(f, "q{}", self.0)
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Arena owning the nodes of one automaton.
///
/// Nodes are allocated contiguously and referenced by `StateId`. The arena is
/// never shrunk, so an id handed out once stays valid for the arena's lifetime.
#[derive(Clone, PartialEq)]
pub struct StateArena<T> {
    states: Vec<T>,
}

impl<T> Default for StateArena<T> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<T> fmt::Debug for StateArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateArena")
            .field("len", &self.states.len())
            .finish()
    }
}

impl<T> StateArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node built from its future id, returning that id.
    pub fn alloc_with(&mut self, make: impl FnOnce(StateId) -> T) -> StateId {
        let id = StateId::from_index(self.states.len());
        self.states.push(make(id));
        id
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: StateId) -> Option<&T> {
        if id.is_none() {
            None
        } else {
            self.states.get(id.index())
        }
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: StateId) -> Option<&mut T> {
        if id.is_none() {
            None
        } else {
            self.states.get_mut(id.index())
        }
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        !id.is_none() && id.index() < self.states.len()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate over `(id, node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &T)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId::from_index(i), s))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (StateId, &mut T)> + '_ {
        self.states
            .iter_mut()
            .enumerate()
            .map(|(i, s)| (StateId::from_index(i), s))
    }
}

impl<T> std::ops::Index<StateId> for StateArena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}

impl<T> std::ops::IndexMut<StateId> for StateArena<T> {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        &mut self.states[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Node {
        id: Option<StateId>,
        next: Vec<StateId>,
    }

    #[test]
    fn test_state_id_none() {
        assert!(StateId::NONE.is_none());
        assert!(!StateId::from_index(0).is_none());
        assert!(!StateId::from_index(100).is_none());
    }

    #[test]
    fn test_arena_alloc() {
        let mut arena: StateArena<Node> = StateArena::new();
        let id1 = arena.alloc_with(|id| Node {
            id: Some(id),
            ..Default::default()
        });
        let id2 = arena.alloc_with(|_| Node::default());

        assert_eq!(id1.index(), 0);
        assert_eq!(id2.index(), 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[id1].id, Some(id1));
    }

    #[test]
    fn test_cycles_through_ids() {
        let mut arena: StateArena<Node> = StateArena::new();

        let state_a = arena.alloc_with(|_| Node::default());
        let state_b = arena.alloc_with(|_| Node::default());

        arena[state_a].next.push(state_b);
        arena[state_b].next.push(state_a);

        assert_eq!(arena[state_a].next[0], state_b);
        assert_eq!(arena[state_b].next[0], state_a);
    }

    #[test]
    fn test_arena_lookup_out_of_range() {
        let mut arena: StateArena<Node> = StateArena::new();
        let id = arena.alloc_with(|_| Node::default());

        assert!(arena.contains(id));
        assert!(!arena.contains(StateId::from_index(5)));
        assert!(!arena.contains(StateId::NONE));
        assert!(arena.get(StateId::NONE).is_none());
        assert!(arena.get_mut(StateId::from_index(5)).is_none());
    }

    #[test]
    fn test_state_id_display() {
        assert_eq!(StateId::from_index(3).to_string(), "q3");
        assert_eq!(format!("{:?}", StateId::NONE), "q-");
    }
}

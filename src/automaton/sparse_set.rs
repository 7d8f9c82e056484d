//! State sets for NFA simulation, after https://research.swtch.com/sparse.
//!
//! Members are kept in insertion order, so walking the dense array by
//! position doubles as a BFS queue during epsilon closure. Clearing is O(1).
//! Capacity is the node count of the automaton being simulated; ids outside
//! it are never members.

use super::arena::StateId;

#[derive(Clone, Debug)]
pub struct SparseSet {
    len: usize,
    /// Members in insertion order; only `dense[..len]` is meaningful.
    dense: Vec<StateId>,
    /// `id` is a member iff `sparse[id] < len && dense[sparse[id]] == id`.
    sparse: Vec<usize>,
}

impl SparseSet {
    pub fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            dense: vec![StateId::NONE; capacity],
            sparse: vec![0; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add `id`, returning false when it was already present or lies outside
    /// the capacity.
    #[inline]
    pub fn insert(&mut self, id: StateId) -> bool {
        if id.index() >= self.capacity() || self.contains(id) {
            return false;
        }
        self.dense[self.len] = id;
        self.sparse[id.index()] = self.len;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        match self.sparse.get(id.index()) {
            Some(&slot) => slot < self.len && self.dense[slot] == id,
            None => false,
        }
    }

    /// Member inserted at position `pos`.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<StateId> {
        self.dense[..self.len].get(pos).copied()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.dense[..self.len].iter().copied()
    }
}

/// Active states of a running NFA plus the set being filled for the next
/// input byte.
#[derive(Clone, Debug)]
pub struct StepSets {
    pub current: SparseSet,
    pub next: SparseSet,
}

impl StepSets {
    pub fn new(capacity: usize) -> Self {
        StepSets {
            current: SparseSet::new(capacity),
            next: SparseSet::new(capacity),
        }
    }

    /// Make `next` the active set and empty the other one for the following
    /// step.
    #[inline]
    pub fn advance(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: usize) -> StateId {
        StateId::from_index(i)
    }

    #[test]
    fn test_insert_and_membership() {
        let mut set = SparseSet::new(8);
        assert!(set.is_empty());
        assert!(set.insert(q(4)));
        assert!(set.insert(q(0)));
        assert!(!set.insert(q(4)));

        assert_eq!(set.len(), 2);
        assert!(set.contains(q(0)));
        assert!(!set.contains(q(7)));
    }

    #[test]
    fn test_out_of_range_ids_are_rejected() {
        let mut set = SparseSet::new(3);
        assert!(!set.insert(q(3)));
        assert!(!set.insert(StateId::NONE));
        assert!(!set.contains(q(100)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insertion_order_is_queue_order() {
        let mut set = SparseSet::new(10);
        for i in [6, 2, 9] {
            set.insert(q(i));
        }
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![q(6), q(2), q(9)]);
        assert_eq!(set.get(1), Some(q(2)));
        assert_eq!(set.get(3), None);

        // Growing the set while walking it by position, as closure does
        let mut pos = 0;
        while let Some(id) = set.get(pos) {
            if id == q(2) {
                set.insert(q(1));
            }
            pos += 1;
        }
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_clear_reuses_storage() {
        let mut set = SparseSet::new(4);
        set.insert(q(1));
        set.insert(q(3));
        set.clear();
        assert!(!set.contains(q(1)));
        assert!(set.insert(q(3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_advance() {
        let mut sets = StepSets::new(5);
        sets.current.insert(q(0));
        sets.next.insert(q(2));
        sets.next.insert(q(4));

        sets.advance();

        assert_eq!(sets.current.iter().collect::<Vec<_>>(), vec![q(2), q(4)]);
        assert!(sets.next.is_empty());
    }
}

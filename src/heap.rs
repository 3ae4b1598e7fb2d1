//! Array-backed binary heap over `(priority, payload)` pairs.
//!
//! The heap is either min- or max-ordered, chosen at construction. Entries are
//! compared as whole `(priority, payload)` pairs, so the payload breaks ties
//! between equal priorities. The root of the tree lives at index 0; the children
//! of index `i` live at `2i + 1` and `2i + 2`. There is no decrease-key: the same
//! payload may be inserted several times with different priorities, and callers
//! discard stale entries when they pop them.
use std::fmt;

/// Which end of the priority range the root holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeapOrder {
    /// The root has the smallest priority.
    #[default]
    Min,
    /// The root has the largest priority.
    Max,
}

/// Error returned when reading the root of an empty heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapError {
    Empty,
}

impl std::error::Error for HeapError {}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Empty => write!(f, "Cannot access the root of an empty priority queue"),
        }
    }
}

/// A binary heap of `(priority, payload)` pairs ordered lexicographically.
///
/// Equal priorities fall back to comparing payloads. When no two entries are
/// equal as pairs, the pop order depends only on which entries are present, not
/// on the order they were inserted in.
///
/// # Examples
/// ```
/// use rush_hour_solver::heap::{HeapOrder, PriorityQueue};
///
/// let mut queue = PriorityQueue::new(HeapOrder::Min);
/// queue.insert(3.5, "c");
/// queue.insert(1.0, "a");
/// queue.insert(2.0, "b");
/// assert_eq!(queue.pop_root(), Ok((1.0, "a")));
/// assert_eq!(queue.peek_root(), Ok((&2.0, &"b")));
/// assert_eq!(queue.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct PriorityQueue<P, T> {
    entries: Vec<(P, T)>,
    order: HeapOrder,
}

impl<P: PartialOrd, T: PartialOrd> PriorityQueue<P, T> {
    /// Creates an empty heap with the given ordering.
    pub fn new(order: HeapOrder) -> Self {
        PriorityQueue {
            entries: Vec::new(),
            order,
        }
    }

    /// Builds a heap from unordered entries by sifting down every internal node,
    /// starting from the last one.
    pub fn from_vec(order: HeapOrder, entries: Vec<(P, T)>) -> Self {
        let mut heap = PriorityQueue { entries, order };
        for i in (0..heap.entries.len() / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub fn order(&self) -> HeapOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry and sifts it toward the root.
    pub fn insert(&mut self, priority: P, payload: T) {
        self.entries.push((priority, payload));
        self.sift_up(self.entries.len() - 1);
    }

    /// Removes and returns the root entry.
    ///
    /// The root is swapped with the last entry, the heap shrinks by one, and the
    /// new root is sifted down until heap order is restored.
    ///
    /// # Errors
    /// `HeapError::Empty` if the heap holds no entries.
    pub fn pop_root(&mut self) -> Result<(P, T), HeapError> {
        if self.entries.is_empty() {
            return Err(HeapError::Empty);
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let root = self.entries.pop().ok_or(HeapError::Empty)?;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Ok(root)
    }

    /// Returns the root entry without removing it.
    ///
    /// # Errors
    /// `HeapError::Empty` if the heap holds no entries.
    pub fn peek_root(&self) -> Result<(&P, &T), HeapError> {
        self.entries
            .first()
            .map(|(priority, payload)| (priority, payload))
            .ok_or(HeapError::Empty)
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }

    /// True if the entry at `a` belongs strictly above the entry at `b`.
    fn outranks(&self, a: usize, b: usize) -> bool {
        let (ea, eb) = (&self.entries[a], &self.entries[b]);
        match self.order {
            HeapOrder::Min => ea < eb,
            HeapOrder::Max => ea > eb,
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = Self::parent(i);
            if !self.outranks(i, parent) {
                break;
            }
            self.entries.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, i: usize) {
        let len = self.entries.len();
        let (left, right) = (Self::left(i), Self::right(i));
        let mut top = i;
        if left < len && self.outranks(left, top) {
            top = left;
        }
        if right < len && self.outranks(right, top) {
            top = right;
        }
        if top != i {
            self.entries.swap(i, top);
            self.sift_down(top);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn assert_heap_order<T: PartialOrd>(heap: &PriorityQueue<f64, T>) {
        let n = heap.entries.len();
        for i in 0..n {
            for child in [2 * i + 1, 2 * i + 2] {
                if child < n {
                    assert!(
                        !heap.outranks(child, i),
                        "child {} outranks parent {}",
                        child,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn test_empty_heap_errors() {
        let mut heap: PriorityQueue<f64, ()> = PriorityQueue::new(HeapOrder::Min);
        assert!(heap.is_empty());
        assert_eq!(heap.pop_root(), Err(HeapError::Empty));
        assert_eq!(heap.peek_root(), Err(HeapError::Empty));

        heap.insert(1.0, ());
        assert!(heap.pop_root().is_ok());
        assert_eq!(heap.pop_root(), Err(HeapError::Empty));
    }

    #[test]
    fn test_min_heap_pops_ascending() {
        let mut heap = PriorityQueue::new(HeapOrder::Min);
        for (p, name) in [(5.0, "e"), (1.0, "a"), (4.0, "d"), (2.0, "b"), (3.0, "c")] {
            heap.insert(p, name);
        }
        let popped: Vec<&str> = std::iter::from_fn(|| heap.pop_root().ok())
            .map(|(_, name)| name)
            .collect();
        assert_eq!(popped, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_max_heap_pops_descending() {
        let mut heap = PriorityQueue::new(HeapOrder::Max);
        for p in [3, 9, 1, 7, 5] {
            heap.insert(p, p * 10);
        }
        assert_eq!(heap.order(), HeapOrder::Max);
        assert_eq!(heap.peek_root(), Ok((&9, &90)));
        let popped: Vec<i32> = std::iter::from_fn(|| heap.pop_root().ok())
            .map(|(p, _)| p)
            .collect();
        assert_eq!(popped, vec![9, 7, 5, 3, 1]);
    }

    #[test]
    fn test_duplicate_payloads_are_kept() {
        let mut heap = PriorityQueue::new(HeapOrder::Min);
        heap.insert(4.0, "state");
        heap.insert(2.0, "state");
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.pop_root(), Ok((2.0, "state")));
        assert_eq!(heap.pop_root(), Ok((4.0, "state")));
    }

    #[test]
    fn test_equal_priorities_pop_in_payload_order() {
        let mut heap = PriorityQueue::new(HeapOrder::Min);
        heap.insert(1.0, "b");
        heap.insert(1.0, "a");
        heap.insert(0.5, "z");
        heap.insert(1.0, "c");
        assert_eq!(heap.pop_root(), Ok((0.5, "z")));
        // Moving the last entry to the root must not reorder the tie.
        assert_eq!(heap.pop_root(), Ok((1.0, "a")));
        assert_eq!(heap.pop_root(), Ok((1.0, "b")));
        assert_eq!(heap.pop_root(), Ok((1.0, "c")));

        let mut max_heap = PriorityQueue::new(HeapOrder::Max);
        max_heap.insert(2, 'x');
        max_heap.insert(2, 'y');
        assert_eq!(max_heap.pop_root(), Ok((2, 'y')));
    }

    #[test]
    fn test_pop_order_ignores_insertion_order() {
        let entries = [(3.0, 7), (1.0, 4), (3.0, 2), (1.0, 9), (2.0, 5), (3.0, 1)];
        let mut forward = PriorityQueue::new(HeapOrder::Min);
        let mut backward = PriorityQueue::new(HeapOrder::Min);
        for &(p, t) in entries.iter() {
            forward.insert(p, t);
        }
        for &(p, t) in entries.iter().rev() {
            backward.insert(p, t);
        }
        let drain = |heap: &mut PriorityQueue<f64, i32>| {
            std::iter::from_fn(|| heap.pop_root().ok()).collect::<Vec<_>>()
        };
        let expected = vec![(1.0, 4), (1.0, 9), (2.0, 5), (3.0, 1), (3.0, 2), (3.0, 7)];
        assert_eq!(drain(&mut forward), expected);
        assert_eq!(drain(&mut backward), expected);
    }

    #[test]
    fn test_from_vec_heapifies() {
        let entries: Vec<(f64, usize)> = (0..10).map(|i| (i as f64, i)).collect();
        let heap = PriorityQueue::from_vec(HeapOrder::Max, entries);
        assert_heap_order(&heap);
        assert_eq!(heap.peek_root(), Ok((&9.0, &9)));
    }

    #[test]
    fn test_heap_order_invariant_under_interleaved_operations() {
        for order in [HeapOrder::Min, HeapOrder::Max] {
            let mut rng = SmallRng::seed_from_u64(514514);
            let mut heap = PriorityQueue::new(order);
            let mut last_popped: Option<f64> = None;
            for step in 0..2000 {
                if rng.gen_bool(0.6) || heap.is_empty() {
                    let priority = rng.gen_range(0..50u32) as f64 / 2.0;
                    heap.insert(priority, step);
                    last_popped = None;
                } else {
                    let (priority, _) = heap.pop_root().unwrap();
                    // Consecutive pops come out in heap order.
                    if let Some(prev) = last_popped {
                        match order {
                            HeapOrder::Min => assert!(prev <= priority),
                            HeapOrder::Max => assert!(prev >= priority),
                        }
                    }
                    last_popped = Some(priority);
                }
                assert_heap_order(&heap);
            }
        }
    }
}

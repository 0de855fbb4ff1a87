//! The two priority queues driving the branch-and-bound searches: an
//! unbounded min-queue of pending subtrees and a bounded max-queue of
//! evaluated candidates.
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use crate::Scalar;

/// A heap entry ordered by its key alone; the item is never compared.
struct HeapElem<F: Scalar, T> {
    key: F,
    item: T,
}

impl<F: Scalar, T> HeapElem<F, T> {
    fn new(key: F, item: T) -> Self {
        HeapElem { key, item }
    }
}

impl<F: Scalar, T> PartialOrd for HeapElem<F, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Scalar, T> PartialEq for HeapElem<F, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<F: Scalar, T> Eq for HeapElem<F, T> {}

impl<F: Scalar, T> Ord for HeapElem<F, T> {
    // Keys come from finite coordinates, so NaN only shows up with a broken
    // distance function; treat it as a tie rather than panicking.
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.partial_cmp(&other.key).unwrap_or(Ordering::Equal)
    }
}

/// Min-ordered queue with no size limit.
pub struct MinHeap<F: Scalar, T> {
    heap: BinaryHeap<Reverse<HeapElem<F, T>>>,
}

impl<F: Scalar, T> MinHeap<F, T> {
    pub fn new() -> Self {
        MinHeap { heap: BinaryHeap::new() }
    }

    pub fn offer(&mut self, key: F, item: T) {
        self.heap.push(Reverse(HeapElem::new(key, item)));
    }

    pub fn peek_min_key(&self) -> Option<F> {
        self.heap.peek().map(|e| e.0.key)
    }

    pub fn pop(&mut self) -> Option<(F, T)> {
        self.heap.pop().map(|Reverse(e)| (e.key, e.item))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<F: Scalar, T> Default for MinHeap<F, T> {
    fn default() -> Self {
        MinHeap::new()
    }
}

impl<F: Scalar, T> fmt::Debug for MinHeap<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinHeap")
            .field("len", &self.len())
            .field("min_key", &self.peek_min_key())
            .finish()
    }
}

/// Max-ordered queue holding at most `capacity` entries.
///
/// Popping drains entries in descending key order; use
/// [`MaxHeap::into_sorted_vec`] for ascending order.
pub struct MaxHeap<F: Scalar, T> {
    heap: BinaryHeap<HeapElem<F, T>>,
    capacity: usize,
}

impl<F: Scalar, T> MaxHeap<F, T> {
    pub fn with_capacity(capacity: usize) -> Self {
        MaxHeap { heap: BinaryHeap::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    pub fn peek_max_key(&self) -> Option<F> {
        self.heap.peek().map(|e| e.key)
    }

    /// True if an entry at `key` would be kept by [`MaxHeap::offer`].
    pub fn accepts(&self, key: F) -> bool {
        match self.peek_max_key() {
            Some(max) if self.is_full() => key < max,
            _ => self.capacity > 0,
        }
    }

    /// Insert while below capacity; once full, replace the current maximum
    /// only if `key` is strictly smaller. Returns whether the entry was kept.
    pub fn offer(&mut self, key: F, item: T) -> bool {
        if !self.is_full() {
            self.heap.push(HeapElem::new(key, item));
            return true;
        }
        self.replace_max(key, item)
    }

    /// Replace the maximum if `key` is strictly smaller than it.
    pub fn replace_max(&mut self, key: F, item: T) -> bool {
        match self.heap.peek_mut() {
            Some(mut top) if key < top.key => {
                *top = HeapElem::new(key, item);
                true
            }
            _ => false,
        }
    }

    pub fn pop(&mut self) -> Option<(F, T)> {
        self.heap.pop().map(|e| (e.key, e.item))
    }

    /// Entries in ascending key order.
    pub fn into_sorted_vec(self) -> Vec<(F, T)> {
        self.heap.into_sorted_vec().into_iter().map(|e| (e.key, e.item)).collect()
    }
}

impl<F: Scalar, T> fmt::Debug for MaxHeap<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxHeap")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("max_key", &self.peek_max_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{MaxHeap, MinHeap};

    #[test]
    fn test_min_heap_order() {
        let mut h = MinHeap::new();
        for (k, v) in [(3.0, 'c'), (1.0, 'a'), (2.0, 'b')].iter() {
            h.offer(*k, *v);
        }
        assert_eq!(h.peek_min_key(), Some(1.0));
        assert_eq!(h.pop(), Some((1.0, 'a')));
        assert_eq!(h.pop(), Some((2.0, 'b')));
        assert_eq!(h.pop(), Some((3.0, 'c')));
        assert!(h.pop().is_none());
    }

    #[test]
    fn test_max_heap_bounded() {
        let mut h = MaxHeap::with_capacity(2);
        assert!(h.offer(5.0, 5));
        assert!(h.offer(3.0, 3));
        assert!(h.is_full());
        // not strictly smaller than the max
        assert!(!h.offer(5.0, 6));
        assert!(!h.accepts(5.0));
        assert!(h.offer(1.0, 1));
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek_max_key(), Some(3.0));
        assert_eq!(h.into_sorted_vec(), vec![(1.0, 1), (3.0, 3)]);
    }

    #[test]
    fn test_max_heap_drains_descending() {
        let mut h = MaxHeap::with_capacity(4);
        for k in &[2.0, 4.0, 1.0, 3.0] {
            h.offer(*k, ());
        }
        let keys: Vec<f64> = std::iter::from_fn(|| h.pop().map(|(k, _)| k)).collect();
        assert_eq!(keys, vec![4.0, 3.0, 2.0, 1.0]);
    }
}

use std::fmt;
use std::iter::FusedIterator;

use crate::distance::DistanceFunction;
use crate::heap::{MaxHeap, MinHeap};
use crate::kdtree::KdTree;
use crate::node::{Node, NodeKind};
use crate::Scalar;

/// Entries of a tree in order of increasing distance from a search point,
/// produced on demand.
///
/// Each call to `next` expands pending subtrees only until no unexplored
/// subtree can hold anything closer than the best evaluated entry, so
/// stopping early skips the rest of the search. Subtrees and entries that
/// cannot be among the `max_points_returned` closest are dropped. Created by
/// [`KdTree::nearest_neighbor_iter`].
pub struct NearestNeighborIter<'a, F: Scalar, V, D: ?Sized> {
    point: Vec<F>,
    distance: &'a D,
    pending: MinHeap<F, &'a Node<F, V>>,
    evaluated: MinHeap<F, &'a V>,
    /// Smallest distances seen so far, emitted or not; its maximum bounds
    /// what can still be returned.
    nearest: MaxHeap<F, ()>,
    remaining: usize,
}

impl<'a, F: Scalar, V, D> NearestNeighborIter<'a, F, V, D>
    where D: DistanceFunction<F> + ?Sized {
    pub(crate) fn new(tree: &'a KdTree<F, V>, point: Vec<F>, max_points_returned: usize,
                      distance: &'a D) -> Self {
        let mut pending = MinHeap::new();
        if max_points_returned > 0 {
            pending.offer(F::zero(), tree.root());
        }
        NearestNeighborIter {
            point,
            distance,
            pending,
            evaluated: MinHeap::new(),
            nearest: MaxHeap::with_capacity(max_points_returned),
            remaining: max_points_returned,
        }
    }

    /// Expand the most promising pending subtree down to a leaf.
    fn step(&mut self) {
        let node = match self.pending.pop() {
            Some((bound, node)) if self.nearest.accepts(bound) => node,
            _ => return,
        };
        let nearest = &self.nearest;
        let leaf = node.descend_to_leaf(&self.point, self.distance, &mut self.pending,
                                        |bound| nearest.accepts(bound));
        let bucket = match leaf.kind {
            NodeKind::Leaf(ref bucket) => bucket,
            NodeKind::Split { .. } => return,
        };

        if bucket.single_point {
            let d = match bucket.points.first() {
                Some(p) => self.distance.distance(p, &self.point),
                None => return,
            };
            for v in &bucket.values {
                if !self.nearest.offer(d, ()) {
                    break;
                }
                self.evaluated.offer(d, v);
            }
        } else {
            for (p, v) in bucket.points.iter().zip(&bucket.values) {
                let d = self.distance.distance(p, &self.point);
                if self.nearest.offer(d, ()) {
                    self.evaluated.offer(d, v);
                }
            }
        }
    }
}

impl<'a, F: Scalar, V, D> Iterator for NearestNeighborIter<'a, F, V, D>
    where D: DistanceFunction<F> + ?Sized {
    type Item = (F, &'a V);

    fn next(&mut self) -> Option<(F, &'a V)> {
        if self.remaining == 0 {
            return None;
        }

        while let Some(pending_key) = self.pending.peek_min_key() {
            match self.evaluated.peek_min_key() {
                Some(best) if pending_key > best => break,
                _ => self.step(),
            }
        }

        let next = self.evaluated.pop();
        if next.is_some() {
            self.remaining -= 1;
        } else {
            self.remaining = 0;
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, F: Scalar, V, D> FusedIterator for NearestNeighborIter<'a, F, V, D>
    where D: DistanceFunction<F> + ?Sized {}

impl<'a, F: Scalar, V, D: ?Sized> fmt::Debug for NearestNeighborIter<'a, F, V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearestNeighborIter")
            .field("point", &self.point)
            .field("pending", &self.pending)
            .field("evaluated", &self.evaluated)
            .field("nearest", &self.nearest)
            .field("remaining", &self.remaining)
            .finish()
    }
}

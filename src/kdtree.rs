//! Bucketed k-d trees for nearest-neighbor and range searches over
//! fixed-dimensional points.
use std::collections::VecDeque;

use log::debug;

use crate::config::TreeConfig;
use crate::distance::DistanceFunction;
use crate::error::{KdTreeError, Result};
use crate::heap::{MaxHeap, MinHeap};
use crate::iter::NearestNeighborIter;
use crate::node::{Dump, Node, NodeKind};
use crate::Scalar;

fn overlaps<F: Scalar>(min_a: F, max_a: F, min_b: F, max_b: F) -> bool {
    min_a <= max_b && min_b <= max_a
}

fn in_bounds<F: Scalar>(min: &[F], max: &[F], point: &[F]) -> bool {
    point.iter().zip(min.iter().zip(max)).all(|(x, (lo, hi))| lo <= x && x <= hi)
}

/// A k-d tree mapping points to values.
///
/// Leaves hold up to `bucket_capacity` entries before splitting, and every
/// node keeps the tight bounding box of its subtree. The tree never looks
/// at the values.
///
/// ```
/// use kdtree_bucket::{KdTree, SquaredEuclidean};
///
/// let mut tree = KdTree::with_bucket_capacity(2, 2).unwrap();
/// tree.insert(&[0.0, 0.0], "a").unwrap();
/// tree.insert(&[1.0, 0.0], "b").unwrap();
/// tree.insert(&[5.0, 5.0], "d").unwrap();
///
/// let nearest = tree.find_nearest_neighbors(&[0.1, 0.0], 2, &SquaredEuclidean).unwrap();
/// let values: Vec<_> = nearest.into_sorted_vec().into_iter().map(|(_, v)| *v).collect();
/// assert_eq!(values, vec!["a", "b"]);
/// ```
pub struct KdTree<F: Scalar, V> {
    config: TreeConfig,
    root: Node<F, V>,
}

impl<F: Scalar, V> KdTree<F, V> {
    /// Construct an empty tree with the default bucket capacity.
    pub fn new(dimensions: usize) -> Result<KdTree<F, V>> {
        KdTree::from_config(TreeConfig::new(dimensions))
    }

    pub fn with_bucket_capacity(dimensions: usize, bucket_capacity: usize) -> Result<KdTree<F, V>> {
        KdTree::from_config(TreeConfig::new(dimensions).with_bucket_capacity(bucket_capacity))
    }

    pub fn from_config(config: TreeConfig) -> Result<KdTree<F, V>> {
        config.validate()?;
        Ok(KdTree { config, root: Node::empty(config.dimensions) })
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    pub fn bucket_capacity(&self) -> usize {
        self.config.bucket_capacity
    }

    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.root.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.size == 0
    }

    /// The tight bounding box of every inserted point, as `(min, max)`.
    pub fn bounds(&self) -> Option<(&[F], &[F])> {
        if self.is_empty() {
            None
        } else {
            Some((self.root.min_bound.as_slice(), self.root.max_bound.as_slice()))
        }
    }

    pub(crate) fn root(&self) -> &Node<F, V> {
        &self.root
    }

    pub(crate) fn check_point(&self, point: &[F]) -> Result<()> {
        if point.len() != self.dimensions() {
            return Err(KdTreeError::DimensionMismatch { expected: self.dimensions(), found: point.len() });
        }
        if !point.iter().all(|x| x.is_finite()) {
            return Err(KdTreeError::NonFiniteCoordinate);
        }
        Ok(())
    }

    /// Like `check_point`, but infinite coordinates are allowed so a box can
    /// be open on some axes.
    fn check_bound(&self, bound: &[F]) -> Result<()> {
        if bound.len() != self.dimensions() {
            return Err(KdTreeError::DimensionMismatch { expected: self.dimensions(), found: bound.len() });
        }
        if bound.iter().any(|x| x.is_nan()) {
            return Err(KdTreeError::NonFiniteCoordinate);
        }
        Ok(())
    }

    /// Insert `value` at `point`.
    pub fn insert(&mut self, point: &[F], value: V) -> Result<()> {
        self.check_point(point)?;
        let capacity = self.bucket_capacity();
        self.root.insert(point.to_vec(), value, capacity);
        Ok(())
    }

    /// Insert every `(point, value)` pair, stopping at the first invalid
    /// point. Entries before it remain inserted.
    pub fn insert_all<I, P>(&mut self, entries: I) -> Result<()>
        where I: IntoIterator<Item = (P, V)>, P: AsRef<[F]> {
        for (point, value) in entries {
            self.insert(point.as_ref(), value)?;
        }
        Ok(())
    }

    /// Find the `k` entries closest to `point`.
    ///
    /// `k` is clamped to the size of the tree. The result is a bounded
    /// max-heap: popping it yields the furthest entry first, and
    /// [`MaxHeap::into_sorted_vec`] gives nearest-first order.
    pub fn find_nearest_neighbors<D>(&self, point: &[F], k: usize, distance: &D) -> Result<MaxHeap<F, &V>>
        where D: DistanceFunction<F> + ?Sized {
        self.check_point(point)?;
        if self.is_empty() {
            return Ok(MaxHeap::with_capacity(0));
        }
        if k == 0 {
            return Err(KdTreeError::ZeroNeighbors);
        }

        let k = k.min(self.len());
        let mut pending = MinHeap::new();
        let mut evaluated = MaxHeap::with_capacity(k);
        let mut leaves = 0;
        pending.offer(F::zero(), &self.root);

        while let Some(min_key) = pending.peek_min_key() {
            let can_improve = match evaluated.peek_max_key() {
                Some(max_key) if evaluated.is_full() => min_key < max_key,
                _ => true,
            };
            if !can_improve {
                break;
            }
            nearest_neighbor_step(point, distance, &mut pending, &mut evaluated);
            leaves += 1;
        }

        debug!("nearest neighbor search visited {} leaves, {} subtrees left pending",
               leaves, pending.len());
        Ok(evaluated)
    }

    /// Find the single entry closest to `point`, or `None` on an empty tree.
    pub fn nearest_neighbor<D>(&self, point: &[F], distance: &D) -> Result<Option<(F, &V)>>
        where D: DistanceFunction<F> + ?Sized {
        let mut heap = self.find_nearest_neighbors(point, 1, distance)?;
        Ok(heap.pop())
    }

    /// Lazily iterate over at most `max_points_returned` entries in order of
    /// increasing distance from `point`.
    ///
    /// ```
    /// use kdtree_bucket::{KdTree, Manhattan};
    ///
    /// let mut tree = KdTree::new(1).unwrap();
    /// for i in 0..100 {
    ///     tree.insert(&[i as f64], i).unwrap();
    /// }
    /// let first: Vec<_> = tree.nearest_neighbor_iter(&[41.6], 3, &Manhattan).unwrap()
    ///     .map(|(_, v)| *v)
    ///     .collect();
    /// assert_eq!(first, vec![42, 41, 43]);
    /// ```
    pub fn nearest_neighbor_iter<'a, D>(&'a self, point: &[F], max_points_returned: usize,
                                        distance: &'a D) -> Result<NearestNeighborIter<'a, F, V, D>>
        where D: DistanceFunction<F> + ?Sized {
        self.check_point(point)?;
        if !self.is_empty() && max_points_returned == 0 {
            return Err(KdTreeError::ZeroNeighbors);
        }
        Ok(NearestNeighborIter::new(self, point.to_vec(), max_points_returned.min(self.len()), distance))
    }

    /// Every value whose point lies in the closed box `[min_bound, max_bound]`,
    /// in no particular order.
    pub fn find_in_bounds(&self, min_bound: &[F], max_bound: &[F]) -> Result<Vec<&V>> {
        self.check_bound(min_bound)?;
        self.check_bound(max_bound)?;
        if let Some(axis) = min_bound.iter().zip(max_bound).position(|(lo, hi)| lo > hi) {
            return Err(KdTreeError::InvertedBounds { axis });
        }

        let box_overlaps = |node: &Node<F, V>| {
            (0..self.dimensions()).all(|i| {
                overlaps(node.min_bound[i], node.max_bound[i], min_bound[i], max_bound[i])
            })
        };

        let mut results = Vec::new();
        let mut queue = VecDeque::new();
        if box_overlaps(&self.root) {
            queue.push_back(&self.root);
        }

        while let Some(node) = queue.pop_front() {
            match node.kind {
                NodeKind::Leaf(ref bucket) => {
                    for (p, v) in bucket.points.iter().zip(&bucket.values) {
                        if in_bounds(min_bound, max_bound, p) {
                            results.push(v);
                        }
                    }
                }
                NodeKind::Split { dimension, value, ref left, ref right } => {
                    let d = dimension;
                    if overlaps(node.min_bound[d], value, min_bound[d], max_bound[d]) && box_overlaps(&**left) {
                        queue.push_back(&**left);
                    }
                    if overlaps(value, node.max_bound[d], min_bound[d], max_bound[d]) && box_overlaps(&**right) {
                        queue.push_back(&**right);
                    }
                }
            }
        }

        Ok(results)
    }

    /// Render the node structure, one node per line.
    pub fn dump(&self) -> String {
        Dump(&self.root).to_string()
    }

    /// Verify the structural invariants: every box is the tight box of its
    /// subtree, every split separates its children, sizes add up, and only
    /// single-point leaves exceed the bucket capacity.
    pub fn check_invariants(&self) -> bool {
        self.root.check_invariants(self.bucket_capacity())
    }
}

/// Pop the most promising pending subtree, descend to its nearest leaf and
/// offer that leaf's entries to the bounded candidate set.
fn nearest_neighbor_step<'a, F, V, D>(point: &[F], distance: &D,
                                      pending: &mut MinHeap<F, &'a Node<F, V>>,
                                      evaluated: &mut MaxHeap<F, &'a V>)
    where F: Scalar, D: DistanceFunction<F> + ?Sized {
    let node = match pending.pop() {
        Some((_, node)) => node,
        None => return,
    };

    // Only remember the far side if it could still hold a better candidate.
    let leaf = node.descend_to_leaf(point, distance, pending, |bound| evaluated.accepts(bound));

    let bucket = match leaf.kind {
        NodeKind::Leaf(ref bucket) => bucket,
        NodeKind::Split { .. } => return,
    };

    if bucket.single_point {
        let d = match bucket.points.first() {
            Some(p) => distance.distance(p, point),
            None => return,
        };
        for v in &bucket.values {
            if !evaluated.offer(d, v) {
                break;
            }
        }
    } else {
        for (p, v) in bucket.points.iter().zip(&bucket.values) {
            let d = distance.distance(p, point);
            evaluated.offer(d, v);
        }
    }
}

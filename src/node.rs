use std::fmt;
use std::mem;

use log::trace;

use crate::distance::DistanceFunction;
use crate::heap::MinHeap;
use crate::median;
use crate::Scalar;

/// Entries stored directly in a leaf.
pub(crate) struct Bucket<F: Scalar, V> {
    pub(crate) points: Vec<Vec<F>>,
    pub(crate) values: Vec<V>,
    /// All entries share the same coordinates.
    pub(crate) single_point: bool,
}

impl<F: Scalar, V> Bucket<F, V> {
    fn empty() -> Self {
        Bucket { points: Vec::new(), values: Vec::new(), single_point: false }
    }
}

pub(crate) enum NodeKind<F: Scalar, V> {
    Leaf(Bucket<F, V>),
    /// Points with `point[dimension] <= value` live on the left.
    Split {
        dimension: usize,
        value: F,
        left: Box<Node<F, V>>,
        right: Box<Node<F, V>>,
    },
}

/// A subtree together with the tight bounding box of every point in it.
pub(crate) struct Node<F: Scalar, V> {
    pub(crate) min_bound: Vec<F>,
    pub(crate) max_bound: Vec<F>,
    pub(crate) size: usize,
    pub(crate) kind: NodeKind<F, V>,
}

impl<F: Scalar, V> Node<F, V> {
    /// An empty leaf. Its box is inverted (`+inf..-inf`) until the first
    /// point arrives.
    pub(crate) fn empty(dimensions: usize) -> Self {
        Node {
            min_bound: vec![F::infinity(); dimensions],
            max_bound: vec![F::neg_infinity(); dimensions],
            size: 0,
            kind: NodeKind::Leaf(Bucket::empty()),
        }
    }

    /// A leaf holding exactly `points`/`values`, with a tight box.
    fn leaf(dimensions: usize, points: Vec<Vec<F>>, values: Vec<V>) -> Self {
        let mut node = Node::empty(dimensions);
        for p in &points {
            node.extend_bounds(p);
        }
        node.size = points.len();
        let single_point = node.size > 0 && node.is_degenerate();
        node.kind = NodeKind::Leaf(Bucket { points, values, single_point });
        node
    }

    #[cfg(test)]
    pub(crate) fn is_leaf(&self) -> bool {
        match self.kind {
            NodeKind::Leaf(_) => true,
            NodeKind::Split { .. } => false,
        }
    }

    fn extend_bounds(&mut self, point: &[F]) {
        let min = self.min_bound.iter_mut();
        let max = self.max_bound.iter_mut();
        for ((lo, hi), &v) in min.zip(max).zip(point) {
            if v < *lo {
                *lo = v;
            }
            if v > *hi {
                *hi = v;
            }
        }
    }

    /// True when the box has zero extent on every axis.
    fn is_degenerate(&self) -> bool {
        self.min_bound.iter().zip(&self.max_bound).all(|(lo, hi)| lo == hi)
    }

    /// Axis with the largest spread, first one on ties.
    fn widest_dimension(&self) -> usize {
        let mut best = 0;
        let mut best_spread = F::neg_infinity();
        for (i, (&lo, &hi)) in self.min_bound.iter().zip(&self.max_bound).enumerate() {
            let spread = hi - lo;
            if spread > best_spread {
                best = i;
                best_spread = spread;
            }
        }
        best
    }

    /// Insert an entry below this node, widening every box on the way down
    /// and splitting the receiving leaf if it overflows.
    pub(crate) fn insert(&mut self, point: Vec<F>, value: V, bucket_capacity: usize) {
        let mut cursor = self;
        loop {
            cursor.extend_bounds(&point);
            cursor.size += 1;
            cursor = match cursor.kind {
                NodeKind::Leaf(_) => break,
                NodeKind::Split { dimension, value: split, ref mut left, ref mut right } => {
                    if point[dimension] <= split { &mut **left } else { &mut **right }
                }
            };
        }
        cursor.add_to_bucket(point, value, bucket_capacity);
    }

    /// Append to a leaf whose box already covers `point`.
    fn add_to_bucket(&mut self, point: Vec<F>, value: V, bucket_capacity: usize) {
        let degenerate = self.is_degenerate();
        let overflow = match self.kind {
            NodeKind::Leaf(ref mut bucket) => {
                bucket.points.push(point);
                bucket.values.push(value);
                if degenerate && !bucket.single_point {
                    trace!("leaf of {} entries holds a single point", bucket.points.len());
                }
                bucket.single_point = degenerate;
                bucket.points.len() > bucket_capacity && !degenerate
            }
            NodeKind::Split { .. } => false,
        };

        if overflow {
            self.split();
        }
    }

    /// Replace this leaf with a split node over two new leaves.
    fn split(&mut self) {
        let dimensions = self.min_bound.len();
        let dimension = self.widest_dimension();

        let bucket = match mem::replace(&mut self.kind, NodeKind::Leaf(Bucket::empty())) {
            NodeKind::Leaf(bucket) => bucket,
            split => {
                self.kind = split;
                return;
            }
        };

        let mut coords: Vec<F> = bucket.points.iter().map(|p| p[dimension]).collect();
        let split_value = match median::split_value(&mut coords) {
            Some(v) => v,
            None => {
                // unreachable for a non-degenerate box, keep the leaf as is
                self.kind = NodeKind::Leaf(bucket);
                return;
            }
        };

        let n = bucket.points.len();
        let (mut left_points, mut left_values) = (Vec::with_capacity(n), Vec::with_capacity(n));
        let (mut right_points, mut right_values) = (Vec::with_capacity(n), Vec::with_capacity(n));
        for (p, v) in bucket.points.into_iter().zip(bucket.values) {
            if p[dimension] <= split_value {
                left_points.push(p);
                left_values.push(v);
            } else {
                right_points.push(p);
                right_values.push(v);
            }
        }

        trace!("split leaf on dimension {} at {}: {} left, {} right",
               dimension, split_value, left_points.len(), right_points.len());

        self.kind = NodeKind::Split {
            dimension,
            value: split_value,
            left: Box::new(Node::leaf(dimensions, left_points, left_values)),
            right: Box::new(Node::leaf(dimensions, right_points, right_values)),
        };
    }

    /// Walk from this node to the leaf containing `point`, offering each
    /// sibling not taken to `pending` (keyed by its box distance) when
    /// `keep` accepts that distance.
    pub(crate) fn descend_to_leaf<'a, D, P>(&'a self, point: &[F], distance: &D,
                                            pending: &mut MinHeap<F, &'a Node<F, V>>,
                                            mut keep: P) -> &'a Node<F, V>
        where D: DistanceFunction<F> + ?Sized, P: FnMut(F) -> bool {
        let mut cursor = self;
        while let NodeKind::Split { dimension, value, left, right } = &cursor.kind {
            let (near, far) = if point[*dimension] <= *value { (left, right) } else { (right, left) };
            let bound = distance.distance_to_rect(point, &far.min_bound, &far.max_bound);
            if keep(bound) {
                pending.offer(bound, &**far);
            }
            cursor = &**near;
        }
        cursor
    }

    /// Check the bound, partition, size, capacity and single-point
    /// invariants of the whole subtree, including tightness of every box.
    pub(crate) fn check_invariants(&self, bucket_capacity: usize) -> bool {
        let inside = |lo: &[F], hi: &[F], p: &[F]| {
            p.iter().zip(lo.iter().zip(hi)).all(|(x, (l, h))| l <= x && x <= h)
        };

        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.kind {
                NodeKind::Leaf(ref bucket) => {
                    if bucket.points.len() != node.size || bucket.values.len() != node.size {
                        return false;
                    }
                    if !bucket.single_point && node.size > bucket_capacity {
                        return false;
                    }
                    let (lo, hi) = (node.min_bound.as_slice(), node.max_bound.as_slice());
                    if !bucket.points.iter().all(|p| inside(lo, hi, p.as_slice())) {
                        return false;
                    }
                    let mut tight = Node::<F, ()>::empty(node.min_bound.len());
                    for p in &bucket.points {
                        tight.extend_bounds(p);
                    }
                    let expect_single = node.size > 0 && tight.is_degenerate();
                    if tight.min_bound != node.min_bound || tight.max_bound != node.max_bound
                        || bucket.single_point != expect_single {
                        return false;
                    }
                }
                NodeKind::Split { dimension, value, ref left, ref right } => {
                    if left.size + right.size != node.size || left.size == 0 || right.size == 0 {
                        return false;
                    }
                    if left.max_bound[dimension] > value || right.min_bound[dimension] <= value {
                        return false;
                    }
                    let tight = node.min_bound.iter().enumerate().all(|(i, lo)| {
                        let l = if left.min_bound[i] < right.min_bound[i] { left.min_bound[i] } else { right.min_bound[i] };
                        *lo == l
                    }) && node.max_bound.iter().enumerate().all(|(i, hi)| {
                        let h = if left.max_bound[i] > right.max_bound[i] { left.max_bound[i] } else { right.max_bound[i] };
                        *hi == h
                    });
                    if !tight {
                        return false;
                    }
                    stack.push(&**left);
                    stack.push(&**right);
                }
            }
        }
        true
    }
}

// Deep trees come from skewed insertion order, so children are torn down
// from an explicit stack instead of recursively.
impl<F: Scalar, V> Drop for Node<F, V> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let NodeKind::Split { left, right, .. } = mem::replace(&mut self.kind, NodeKind::Leaf(Bucket::empty())) {
            stack.push(left);
            stack.push(right);
        }
        while let Some(mut node) = stack.pop() {
            if let NodeKind::Split { left, right, .. } = mem::replace(&mut node.kind, NodeKind::Leaf(Bucket::empty())) {
                stack.push(left);
                stack.push(right);
            }
        }
    }
}

/// Indented rendering of a subtree, one node per line.
pub(crate) struct Dump<'a, F: Scalar, V>(pub(crate) &'a Node<F, V>);

impl<'a, F: Scalar, V> fmt::Display for Dump<'a, F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.0, 0)];
        while let Some((node, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node.kind {
                NodeKind::Leaf(ref bucket) => {
                    writeln!(f, "{}leaf size={}{} min={:?} max={:?}", indent, node.size,
                             if bucket.single_point { " single" } else { "" },
                             node.min_bound, node.max_bound)?;
                }
                NodeKind::Split { dimension, value, ref left, ref right } => {
                    writeln!(f, "{}split dim={} value={} size={}", indent, dimension, value, node.size)?;
                    stack.push((&**right, depth + 1));
                    stack.push((&**left, depth + 1));
                }
            }
        }
        Ok(())
    }
}

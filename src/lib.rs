//! A bucketed k-d tree: exact bounded k-nearest-neighbor search, an
//! incremental nearest-neighbor iterator, and axis-aligned range queries
//! over points in a fixed number of dimensions.
//!
//! Build once, query many times: insertion is supported at any point, but
//! deletion and rebalancing are not.
use std::fmt::{Debug, Display};

pub use num::Float;

mod config;
mod distance;
mod error;
mod heap;
mod iter;
mod kdtree;
mod median;
mod node;

pub use config::{TreeConfig, DEFAULT_BUCKET_CAPACITY};
pub use distance::{DistanceFunction, Euclidean, Manhattan, SquaredEuclidean};
pub use error::{KdTreeError, Result};
pub use heap::{MaxHeap, MinHeap};
pub use iter::NearestNeighborIter;
pub use kdtree::KdTree;
pub use median::{lower_median, split_value};

/// Coordinate type of a tree.
pub trait Scalar: Float + Debug + Display {}
impl<T: Float + Debug + Display> Scalar for T {}

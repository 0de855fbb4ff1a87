use crate::error::{KdTreeError, Result};

/// Leaf capacity used when none is given.
pub const DEFAULT_BUCKET_CAPACITY: usize = 24;

/// Shape of a tree, fixed for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    pub dimensions: usize,
    pub bucket_capacity: usize,
}

impl TreeConfig {
    /// Configuration for `dimensions`-dimensional points with the
    /// default bucket capacity.
    pub fn new(dimensions: usize) -> Self {
        TreeConfig { dimensions, bucket_capacity: DEFAULT_BUCKET_CAPACITY }
    }

    /// Number of entries a leaf holds before it is split.
    pub fn with_bucket_capacity(mut self, bucket_capacity: usize) -> Self {
        self.bucket_capacity = bucket_capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(KdTreeError::ZeroDimensions);
        }
        if self.bucket_capacity == 0 {
            return Err(KdTreeError::ZeroBucketCapacity);
        }
        Ok(())
    }
}

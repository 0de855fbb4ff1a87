//! Distance functions consumed by the nearest-neighbor searches.
use crate::Scalar;

/// A distance between points, paired with a lower bound on the
/// distance from a point to anything inside an axis-aligned box.
///
/// Both must be non-negative, and `distance_to_rect(p, lo, hi)` must never
/// exceed `distance(p, q)` for any `q` inside `[lo, hi]`. Searches prune
/// subtrees using the box bound, so an inconsistent pair returns wrong
/// neighbors.
pub trait DistanceFunction<F: Scalar> {
    fn distance(&self, a: &[F], b: &[F]) -> F;

    fn distance_to_rect(&self, point: &[F], min: &[F], max: &[F]) -> F;
}

/// Gap between `x` and the interval `[lo, hi]`, zero when inside.
fn axis_gap<F: Scalar>(x: F, lo: F, hi: F) -> F {
    if x < lo {
        lo - x
    } else if x > hi {
        x - hi
    } else {
        F::zero()
    }
}

/// Squared Euclidean distance. Avoids the square root, so it is the
/// usual choice for searches; take roots of the final results if needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl<F: Scalar> DistanceFunction<F> for SquaredEuclidean {
    fn distance(&self, a: &[F], b: &[F]) -> F {
        a.iter().zip(b).fold(F::zero(), |acc, (&x, &y)| {
            let d = x - y;
            acc + d * d
        })
    }

    fn distance_to_rect(&self, point: &[F], min: &[F], max: &[F]) -> F {
        point.iter().zip(min.iter().zip(max)).fold(F::zero(), |acc, (&x, (&lo, &hi))| {
            let d = axis_gap(x, lo, hi);
            acc + d * d
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl<F: Scalar> DistanceFunction<F> for Euclidean {
    fn distance(&self, a: &[F], b: &[F]) -> F {
        SquaredEuclidean.distance(a, b).sqrt()
    }

    fn distance_to_rect(&self, point: &[F], min: &[F], max: &[F]) -> F {
        SquaredEuclidean.distance_to_rect(point, min, max).sqrt()
    }
}

/// Sum of absolute coordinate differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl<F: Scalar> DistanceFunction<F> for Manhattan {
    fn distance(&self, a: &[F], b: &[F]) -> F {
        a.iter().zip(b).fold(F::zero(), |acc, (&x, &y)| acc + (x - y).abs())
    }

    fn distance_to_rect(&self, point: &[F], min: &[F], max: &[F]) -> F {
        point.iter().zip(min.iter().zip(max))
            .fold(F::zero(), |acc, (&x, (&lo, &hi))| acc + axis_gap(x, lo, hi))
    }
}

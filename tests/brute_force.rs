extern crate kdtree_bucket;
extern crate rand;

use std::collections::HashSet;

use kdtree_bucket::{DistanceFunction, KdTree, Manhattan, SquaredEuclidean};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 24;

fn random_points(rng: &mut StdRng, n: usize, dims: usize) -> Vec<Vec<f64>> {
    (0..n).map(|_| (0..dims).map(|_| rng.gen_range(-100.0..100.0)).collect()).collect()
}

/// Points on a coarse integer grid, so duplicates and distance ties are common.
fn grid_points(rng: &mut StdRng, n: usize, dims: usize) -> Vec<Vec<f64>> {
    (0..n).map(|_| (0..dims).map(|_| rng.gen_range(0..4) as f64).collect()).collect()
}

fn build(points: &[Vec<f64>], capacity: usize) -> KdTree<f64, usize> {
    let mut tree = KdTree::with_bucket_capacity(points.first().map_or(1, |p| p.len()), capacity).unwrap();
    for (i, p) in points.iter().enumerate() {
        tree.insert(p, i).unwrap();
    }
    tree
}

/// Distances of every point to `q`, ascending, paired with the point index.
fn brute_force<D: DistanceFunction<f64>>(points: &[Vec<f64>], q: &[f64], dist: &D) -> Vec<(f64, usize)> {
    let mut all: Vec<(f64, usize)> = points.iter().enumerate().map(|(i, p)| (dist.distance(p, q), i)).collect();
    all.sort_by(|a, b| a.partial_cmp(b).unwrap());
    all
}

fn check_knn<D: DistanceFunction<f64>>(points: &[Vec<f64>], tree: &KdTree<f64, usize>, q: &[f64], k: usize, dist: &D) {
    let expected = brute_force(points, q, dist);
    let found = tree.find_nearest_neighbors(q, k, dist).unwrap().into_sorted_vec();

    let kk = k.min(points.len());
    assert_eq!(found.len(), kk);

    // same distances as the exact answer; ties may pick different points
    let found_dists: Vec<f64> = found.iter().map(|&(d, _)| d).collect();
    let expected_dists: Vec<f64> = expected.iter().take(kk).map(|&(d, _)| d).collect();
    assert_eq!(found_dists, expected_dists);

    let ids: HashSet<usize> = found.iter().map(|&(_, &i)| i).collect();
    assert_eq!(ids.len(), kk, "duplicate entries returned");
    for &(d, &i) in &found {
        assert_eq!(d, dist.distance(&points[i], q));
    }

    // the lazy cursor agrees with the bounded search
    let iterated: Vec<(f64, usize)> = tree.nearest_neighbor_iter(q, k, dist).unwrap()
        .map(|(d, &i)| (d, i))
        .collect();
    assert_eq!(iterated.len(), kk);
    for w in iterated.windows(2) {
        assert!(w[0].0 <= w[1].0, "cursor out of order");
    }
    let iterated_dists: Vec<f64> = iterated.iter().map(|&(d, _)| d).collect();
    assert_eq!(iterated_dists, expected_dists);

    let unambiguous = kk == 0 || kk == expected.len() || expected[kk - 1].0 < expected[kk].0;
    if unambiguous {
        let iterated_ids: HashSet<usize> = iterated.iter().map(|&(_, i)| i).collect();
        assert_eq!(iterated_ids, ids);
        let expected_ids: HashSet<usize> = expected.iter().take(kk).map(|&(_, i)| i).collect();
        assert_eq!(ids, expected_ids);
    }
}

fn check_range(points: &[Vec<f64>], tree: &KdTree<f64, usize>, lo: &[f64], hi: &[f64]) {
    let mut found: Vec<usize> = tree.find_in_bounds(lo, hi).unwrap().into_iter().cloned().collect();
    found.sort();
    let n = found.len();
    found.dedup();
    assert_eq!(found.len(), n, "duplicate entries returned");

    let expected: Vec<usize> = points.iter().enumerate()
        .filter(|&(_, p)| p.iter().zip(lo.iter().zip(hi)).all(|(x, (l, h))| l <= x && x <= h))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(found, expected);
}

fn random_box(rng: &mut StdRng, dims: usize, low: f64, high: f64) -> (Vec<f64>, Vec<f64>) {
    let mut lo = Vec::with_capacity(dims);
    let mut hi = Vec::with_capacity(dims);
    for _ in 0..dims {
        let a: f64 = rng.gen_range(low..high);
        let b: f64 = rng.gen_range(low..high);
        lo.push(a.min(b));
        hi.push(a.max(b));
    }
    (lo, hi)
}

#[test]
fn knn_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for &dims in &[1, 2, 8] {
        for &n in &[1, CAPACITY - 1, CAPACITY + 1, 500] {
            let points = random_points(&mut rng, n, dims);
            let tree = build(&points, CAPACITY);
            assert!(tree.check_invariants());
            assert_eq!(tree.len(), n);
            for &k in &[1, 3, 10, n, n + 5] {
                let q: Vec<f64> = (0..dims).map(|_| rng.gen_range(-120.0..120.0)).collect();
                check_knn(&points, &tree, &q, k, &SquaredEuclidean);
                check_knn(&points, &tree, &q, k, &Manhattan);
            }
        }
    }
}

#[test]
fn knn_matches_brute_force_large() {
    let mut rng = StdRng::seed_from_u64(42);
    for &dims in &[1, 2, 8] {
        let points = random_points(&mut rng, 10_000, dims);
        let tree = build(&points, CAPACITY);
        assert!(tree.check_invariants());
        for _ in 0..10 {
            let q: Vec<f64> = (0..dims).map(|_| rng.gen_range(-100.0..100.0)).collect();
            let k = rng.gen_range(1..40);
            check_knn(&points, &tree, &q, k, &SquaredEuclidean);
        }
    }
}

#[test]
fn knn_with_ties_and_duplicates() {
    let mut rng = StdRng::seed_from_u64(7);
    for &dims in &[1, 2, 3] {
        for &capacity in &[1, 2, 5] {
            let points = grid_points(&mut rng, 300, dims);
            let tree = build(&points, capacity);
            assert!(tree.check_invariants(), "\n{}", tree.dump());
            for &k in &[1, 7, 40, 300] {
                let q: Vec<f64> = (0..dims).map(|_| rng.gen_range(0..4) as f64).collect();
                check_knn(&points, &tree, &q, k, &SquaredEuclidean);
            }
        }
    }
}

#[test]
fn range_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(99);
    for &dims in &[1, 2, 8] {
        for &n in &[1, CAPACITY - 1, CAPACITY + 1, 2_000] {
            let points = random_points(&mut rng, n, dims);
            let tree = build(&points, CAPACITY);
            for _ in 0..20 {
                let (lo, hi) = random_box(&mut rng, dims, -110.0, 110.0);
                check_range(&points, &tree, &lo, &hi);
            }
            // a box around the whole set returns everything
            let (lo, hi) = tree.bounds().unwrap();
            let (lo, hi) = (lo.to_vec(), hi.to_vec());
            check_range(&points, &tree, &lo, &hi);
            assert_eq!(tree.find_in_bounds(&lo, &hi).unwrap().len(), n);
        }
    }
}

#[test]
fn range_on_grid_boundaries() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = grid_points(&mut rng, 400, 2);
    let tree = build(&points, 3);
    for _ in 0..50 {
        let a = [rng.gen_range(0..4) as f64, rng.gen_range(0..4) as f64];
        let b = [rng.gen_range(0..4) as f64, rng.gen_range(0..4) as f64];
        let lo = [a[0].min(b[0]), a[1].min(b[1])];
        let hi = [a[0].max(b[0]), a[1].max(b[1])];
        check_range(&points, &tree, &lo, &hi);
    }
}

#[test]
fn bounds_are_exact() {
    let mut rng = StdRng::seed_from_u64(11);
    let points = random_points(&mut rng, 1_000, 3);
    let tree = build(&points, 6);
    let (lo, hi) = tree.bounds().unwrap();
    for i in 0..3 {
        let min = points.iter().map(|p| p[i]).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p[i]).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(lo[i], min);
        assert_eq!(hi[i], max);
    }
}

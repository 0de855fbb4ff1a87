extern crate kdtree_bucket;

use kdtree_bucket::{DistanceFunction, Euclidean, KdTree, SquaredEuclidean};

struct Point {
    x: f32,
    y: f32
}

fn lattice_points(n: usize) -> Vec<Point> {
    (0..n).flat_map( |i| {
        (0..n).map(move |j| {
            Point { x: i as f32, y: j as f32 }
        })
    }).collect()
}

fn lattice_tree(n: usize, capacity: usize) -> KdTree<f32, Point> {
    let mut tree = KdTree::with_bucket_capacity(2, capacity).unwrap();
    for p in lattice_points(n) {
        let coords = [p.x, p.y];
        tree.insert(&coords, p).unwrap();
    }
    tree
}

#[test]
fn point_check() {
    assert_eq!(Euclidean.distance(&[0.0f32, 0.0], &[1.0, 0.0]), 1.0);
}

#[test]
fn lattice_knn() {
    let tree = lattice_tree(20, 8);
    assert_eq!(tree.len(), 400);
    assert!(tree.check_invariants());

    let ps = tree.find_nearest_neighbors(&[4.46, 4.4], 4, &SquaredEuclidean).unwrap().into_sorted_vec();
    assert_eq!(ps.len(), 4);
    assert_eq!((ps[0].1.x, ps[0].1.y), (4.0, 4.0));
    assert_eq!((ps[1].1.x, ps[1].1.y), (5.0, 4.0));
    assert_eq!((ps[2].1.x, ps[2].1.y), (4.0, 5.0));
    assert_eq!((ps[3].1.x, ps[3].1.y), (5.0, 5.0));
}

#[test]
fn lattice_iter() {
    let tree = lattice_tree(20, 8);

    let ps: Vec<_> = tree.nearest_neighbor_iter(&[4.46, 4.4], 4, &SquaredEuclidean).unwrap().collect();
    let coords: Vec<(f32, f32)> = ps.iter().map(|&(_, p)| (p.x, p.y)).collect();
    assert_eq!(coords, vec![(4.0, 4.0), (5.0, 4.0), (4.0, 5.0), (5.0, 5.0)]);
}

#[test]
fn lattice_range() {
    let tree = lattice_tree(20, 8);

    let found = tree.find_in_bounds(&[2.5, 3.0], &[5.0, 4.5]).unwrap();
    let mut coords: Vec<(f32, f32)> = found.iter().map(|p| (p.x, p.y)).collect();
    coords.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(coords, vec![(3.0, 3.0), (3.0, 4.0), (4.0, 3.0), (4.0, 4.0), (5.0, 3.0), (5.0, 4.0)]);
}

use spatial_index::{polygon, BspTree, LineSegment, Point3D};

fn square(z: f64) -> spatial_index::Polygon<f64> {
    polygon(vec![
        Point3D::new(0.0, 0.0, z),
        Point3D::new(1.0, 0.0, z),
        Point3D::new(1.0, 1.0, z),
        Point3D::new(0.0, 1.0, z),
    ])
    .unwrap()
}

#[test]
fn nearest_collision_favors_the_closer_of_two_stacked_squares() {
    let mut tree = BspTree::new();
    tree.insert(square(0.0));
    tree.insert(square(5.0));

    let probe = LineSegment::new(Point3D::new(0.5, 0.5, -10.0), Point3D::new(0.5, 0.5, 10.0));
    let hit = tree.detect_collision(&probe).unwrap();
    assert!(hit.vertices().iter().all(|v| (v.z - 0.0).abs() < 1e-9));
}

#[test]
fn a_polygon_rejected_for_too_few_vertices_never_reaches_the_tree() {
    let bad = polygon(vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.0)]);
    assert!(bad.is_err());
}

#[test]
fn splitting_a_crossing_polygon_preserves_total_area_membership() {
    let mut tree = BspTree::new();
    tree.insert(square(0.0));

    let crossing = polygon(vec![
        Point3D::new(0.5, -1.0, -1.0),
        Point3D::new(0.5, 1.0, -1.0),
        Point3D::new(0.5, 1.0, 1.0),
        Point3D::new(0.5, -1.0, 1.0),
    ])
    .unwrap();
    tree.insert(crossing);

    assert_eq!(tree.polygon_count(), 3);
    let root = tree.root().unwrap();
    assert!(root.front().is_some());
    assert!(root.back().is_some());
}

use spatial_index::{Particle, Point2D, QuadTree, Rect, Vector2D};

fn world() -> Rect<f64> {
    Rect::new(Point2D::new(0.0, 0.0), Point2D::new(100.0, 100.0))
}

/// A larger population, brute-force k-NN should agree with the tree for
/// any query point.
#[test]
fn knn_agrees_with_brute_force_over_a_scattered_population() {
    let mut tree = QuadTree::new(world(), 4).unwrap();
    let mut positions = Vec::new();
    let mut seed = 7u64;
    for _ in 0..200 {
        // A small deterministic LCG keeps this test seed-free and
        // dependency-free while still scattering points across the world.
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let x = ((seed >> 33) % 10000) as f64 / 100.0;
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let y = ((seed >> 33) % 10000) as f64 / 100.0;
        positions.push((x, y));
        tree.insert_one(Particle::handle(Point2D::new(x, y), Vector2D::new(0.0, 0.0)));
    }

    let query = Point2D::new(42.0, 58.0);
    let got = tree.knn(query, 5);
    assert_eq!(got.len(), 5);

    let mut brute: Vec<f64> = positions
        .iter()
        .map(|&(x, y)| query.distance(Point2D::new(x, y)))
        .collect();
    brute.sort_by(|a, b| a.partial_cmp(b).unwrap());

    for (got_particle, expected_dist) in got.iter().zip(brute.iter().take(5)) {
        let got_dist = query.distance(got_particle.borrow().position());
        assert!((got_dist - expected_dist).abs() < 1e-9);
    }
}

#[test]
fn particles_bounce_off_the_world_boundary_on_advance() {
    let boundary = world();
    let mut particle = spatial_index::Particle::new(Point2D::new(99.0, 50.0), Vector2D::new(5.0, 0.0));
    particle.advance(&boundary);
    assert!(particle.velocity().x < 0.0);
}

#[test]
fn rejects_a_degenerate_world_boundary() {
    let inverted = Rect::new(Point2D::new(10.0, 10.0), Point2D::new(0.0, 0.0));
    assert!(QuadTree::new(inverted, 4).is_err());
    assert!(QuadTree::new(world(), 0).is_err());
}

//! Binary space partitioning tree over 3D convex polygons.
//!
//! Each node owns a partition plane, the polygons coincident with it, and
//! up to two child subtrees. Insertion routes a polygon to front/back/both
//! depending on its relation to the partition, splitting it across planes
//! it straddles (spec.md §4.2).

use crate::error::Error;
use crate::geometry::{LineSegment, Plane, Polygon, Relation};
use crate::scalar::Scalar;
use log::{debug, trace};

/// A node in the BSP tree. Owns its `front`/`back` subtrees exclusively;
/// dropping a node recursively drops its subtree.
#[derive(Clone, Debug)]
pub struct BspNode<S: Scalar> {
    partition: Plane<S>,
    coincident: Vec<Polygon<S>>,
    front: Option<Box<BspNode<S>>>,
    back: Option<Box<BspNode<S>>>,
}

impl<S: Scalar> BspNode<S> {
    fn new(partition: Plane<S>) -> Self {
        BspNode {
            partition,
            coincident: Vec::new(),
            front: None,
            back: None,
        }
    }

    pub fn partition(&self) -> &Plane<S> {
        &self.partition
    }

    pub fn coincident_polygons(&self) -> &[Polygon<S>] {
        &self.coincident
    }

    pub fn front(&self) -> Option<&BspNode<S>> {
        self.front.as_deref()
    }

    pub fn back(&self) -> Option<&BspNode<S>> {
        self.back.as_deref()
    }

    /// Number of polygons stored in this node's subtree (including
    /// itself), used to check the "non-empty nodes" invariant externally.
    pub fn polygon_count(&self) -> usize {
        self.coincident.len()
            + self.front.as_ref().map_or(0, |n| n.polygon_count())
            + self.back.as_ref().map_or(0, |n| n.polygon_count())
    }

    /// Inserts `polygon` into this subtree, creating child nodes as
    /// needed. A newly created child's partition is always the *inserted*
    /// polygon's own support plane, never a heuristic pivot.
    fn insert(&mut self, polygon: Polygon<S>) {
        match polygon.relation_with_plane(&self.partition) {
            Relation::Coincident => {
                trace!("polygon coincident with node partition, appending");
                self.coincident.push(polygon);
            }
            Relation::InFront => {
                trace!("polygon in front of node partition, recursing");
                Self::insert_into(&mut self.front, polygon);
            }
            Relation::Behind => {
                trace!("polygon behind node partition, recursing");
                Self::insert_into(&mut self.back, polygon);
            }
            Relation::Split => {
                debug!("polygon straddles node partition, splitting");
                let (front_half, back_half) = polygon.split(&self.partition);
                if let Some(half) = front_half {
                    Self::insert_into(&mut self.front, half);
                }
                if let Some(half) = back_half {
                    Self::insert_into(&mut self.back, half);
                }
            }
        }
    }

    fn insert_into(side: &mut Option<Box<BspNode<S>>>, polygon: Polygon<S>) {
        let node = side.get_or_insert_with(|| Box::new(BspNode::new(*polygon.plane())));
        node.insert(polygon);
    }

    /// Tests the line segment against this node's coincident polygons,
    /// then recurses toward `A` first.
    fn detect_collision(&self, segment: &LineSegment<S>) -> Option<Polygon<S>> {
        for polygon in &self.coincident {
            if let Some((_, point)) = segment.intersect_plane(polygon.plane()) {
                if polygon.contains_point(&point) {
                    return Some(polygon.clone());
                }
            }
        }

        let da = self.partition.signed_distance(&segment.a);
        let db = self.partition.signed_distance(&segment.b);

        if da >= S::zero() && db >= S::zero() {
            return self.front.as_deref().and_then(|n| n.detect_collision(segment));
        }
        if da <= S::zero() && db <= S::zero() {
            return self.back.as_deref().and_then(|n| n.detect_collision(segment));
        }

        // Straddling: split at the intersection and check the side
        // containing `A` first, so the first hit is nearest to `A`.
        let (_, mid) = segment
            .intersect_plane(&self.partition)
            .expect("a straddling segment must cross its node's partition");

        if da > S::zero() {
            let near = LineSegment::new(segment.a, mid);
            let far = LineSegment::new(mid, segment.b);
            self.front
                .as_deref()
                .and_then(|n| n.detect_collision(&near))
                .or_else(|| self.back.as_deref().and_then(|n| n.detect_collision(&far)))
        } else {
            let near = LineSegment::new(segment.a, mid);
            let far = LineSegment::new(mid, segment.b);
            self.back
                .as_deref()
                .and_then(|n| n.detect_collision(&near))
                .or_else(|| self.front.as_deref().and_then(|n| n.detect_collision(&far)))
        }
    }
}

/// A binary space partitioning tree of convex 3D polygons.
#[derive(Clone, Debug, Default)]
pub struct BspTree<S: Scalar> {
    root: Option<Box<BspNode<S>>>,
}

impl<S: Scalar> BspTree<S> {
    pub fn new() -> Self {
        BspTree { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&BspNode<S>> {
        self.root.as_deref()
    }

    /// Number of polygons currently stored across the whole tree.
    pub fn polygon_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.polygon_count())
    }

    /// Inserts `polygon`, lazily creating the root from the polygon's own
    /// support plane if the tree is empty.
    pub fn insert(&mut self, polygon: Polygon<S>) {
        match &mut self.root {
            None => {
                let mut node = Box::new(BspNode::new(*polygon.plane()));
                node.insert(polygon);
                self.root = Some(node);
            }
            Some(node) => node.insert(polygon),
        }
    }

    /// Returns the polygon nearest to `segment.a` that the segment
    /// crosses, or `None` if it hits nothing.
    pub fn detect_collision(&self, segment: &LineSegment<S>) -> Option<Polygon<S>> {
        self.root.as_deref().and_then(|n| n.detect_collision(segment))
    }
}

/// Builds a [`Polygon`] from vertices, propagating the construction error.
/// Convenience used by callers assembling a tree from raw coordinates.
pub fn polygon<S: Scalar>(vertices: Vec<crate::geometry::Point3D<S>>) -> Result<Polygon<S>, Error> {
    Polygon::new(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3D;

    fn square(z: f64) -> Polygon<f64> {
        Polygon::new(vec![
            Point3D::new(0.0, 0.0, z),
            Point3D::new(1.0, 0.0, z),
            Point3D::new(1.0, 1.0, z),
            Point3D::new(0.0, 1.0, z),
        ])
        .unwrap()
    }

    /// Seed scenario 1: an axis-aligned square hit by a vertical probe.
    #[test]
    fn detects_collision_with_a_single_square() {
        let mut tree = BspTree::new();
        tree.insert(square(0.0));

        let segment = LineSegment::new(Point3D::new(0.5, 0.5, -1.0), Point3D::new(0.5, 0.5, 1.0));
        let hit = tree.detect_collision(&segment);
        assert!(hit.is_some());
    }

    #[test]
    fn misses_when_segment_does_not_cross_the_polygon() {
        let mut tree = BspTree::new();
        tree.insert(square(0.0));

        let segment = LineSegment::new(Point3D::new(5.0, 5.0, -1.0), Point3D::new(5.0, 5.0, 1.0));
        assert!(tree.detect_collision(&segment).is_none());
    }

    /// Seed scenario 2: a crossing square ends up split into the first
    /// node's front and back subtrees.
    #[test]
    fn crossing_polygon_is_split_into_front_and_back() {
        let mut tree = BspTree::new();
        tree.insert(square(0.0));

        let crossing = Polygon::new(vec![
            Point3D::new(0.5, -1.0, -1.0),
            Point3D::new(0.5, 1.0, -1.0),
            Point3D::new(0.5, 1.0, 1.0),
            Point3D::new(0.5, -1.0, 1.0),
        ])
        .unwrap();
        tree.insert(crossing);

        let root = tree.root().unwrap();
        assert!(root.front().is_some());
        assert!(root.back().is_some());
        assert_eq!(tree.polygon_count(), 3); // original square + 2 split halves
    }

    #[test]
    fn coincident_polygon_joins_the_existing_node() {
        let mut tree = BspTree::new();
        tree.insert(square(0.0));
        tree.insert(square(0.0));

        let root = tree.root().unwrap();
        assert_eq!(root.coincident_polygons().len(), 2);
        assert!(root.front().is_none());
        assert!(root.back().is_none());
    }

    #[test]
    fn empty_tree_has_no_collisions() {
        let tree: BspTree<f64> = BspTree::new();
        assert!(tree.is_empty());
        let segment = LineSegment::new(Point3D::new(0.0, 0.0, -1.0), Point3D::new(0.0, 0.0, 1.0));
        assert!(tree.detect_collision(&segment).is_none());
    }
}

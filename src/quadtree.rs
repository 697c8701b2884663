//! Point-region quadtree over moving 2D particles.
//!
//! Leaves hold a bucket of particles; once a bucket overflows, the node
//! subdivides into four quadrants in a fixed {NW, NE, SW, SE} order and
//! its particles are reassigned by containment (spec.md §4.3). Moving
//! particles are kept consistent by [`QuadTree::update_tree`], and k-NN is
//! a best-first search over node bounding boxes.

use crate::error::Error;
use crate::geometry::{Point2D, Rect};
use crate::particle::ParticleHandle;
use crate::scalar::Scalar;
use log::{debug, trace};
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::{Rc, Weak};

/// Quadrant order fixed by spec.md §4.3: ties on an internal split line
/// resolve to the lower-indexed quadrant here.
const NW: usize = 0;
const NE: usize = 1;
const SW: usize = 2;
const SE: usize = 3;

/// A node of the quadtree. Owns its four children exclusively; the
/// `parent` link is a non-owning back-reference used for relocation.
pub struct QuadNode<S: Scalar> {
    boundary: Rect<S>,
    bucket: Vec<ParticleHandle<S>>,
    children: Option<Box<[Rc<RefCell<QuadNode<S>>>; 4]>>,
    parent: Weak<RefCell<QuadNode<S>>>,
    is_leaf: bool,
}

impl<S: Scalar> QuadNode<S> {
    fn new_rc(boundary: Rect<S>, parent: Weak<RefCell<QuadNode<S>>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(QuadNode {
            boundary,
            bucket: Vec::new(),
            children: None,
            parent,
            is_leaf: true,
        }))
    }

    pub fn boundary(&self) -> Rect<S> {
        self.boundary
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn bucket(&self) -> &[ParticleHandle<S>] {
        &self.bucket
    }

    /// The four children in `{NW, NE, SW, SE}` order, or `None` for a leaf.
    pub fn children(&self) -> Option<&[Rc<RefCell<QuadNode<S>>>; 4]> {
        self.children.as_deref()
    }

    /// Inserts `particle` into the subtree rooted at `node`, subdividing
    /// if a leaf's bucket overflows. Returns `false` if the particle falls
    /// outside this node's boundary (the caller decides what to do).
    fn insert(node: &Rc<RefCell<Self>>, particle: ParticleHandle<S>, bucket_size: usize) -> bool {
        let position = particle.borrow().position();
        if !node.borrow().boundary.contains(&position) {
            return false;
        }

        let is_leaf = node.borrow().is_leaf;
        if is_leaf {
            let full = node.borrow().bucket.len() >= bucket_size;
            if !full {
                node.borrow_mut().bucket.push(particle);
                return true;
            }
            debug!("leaf bucket full, subdividing");
            Self::subdivide(node, bucket_size);
        }

        Self::propagate(node, particle, bucket_size)
    }

    /// Splits a full leaf into four quadrants at its boundary's midpoint
    /// and reassigns its bucket by containment.
    fn subdivide(node: &Rc<RefCell<Self>>, bucket_size: usize) {
        let boundary = node.borrow().boundary;
        let pmin = boundary.pmin();
        let pmax = boundary.pmax();
        let mid = boundary.center();

        let parent_ref = Rc::downgrade(node);
        // Indices line up with the NW/NE/SW/SE constants above.
        let children: [Rc<RefCell<QuadNode<S>>>; 4] = [
            Self::new_rc(Rect::new(pmin, mid), parent_ref.clone()),
            Self::new_rc(Rect::new(Point2D::new(mid.x, pmin.y), Point2D::new(pmax.x, mid.y)), parent_ref.clone()),
            Self::new_rc(Rect::new(Point2D::new(pmin.x, mid.y), Point2D::new(mid.x, pmax.y)), parent_ref.clone()),
            Self::new_rc(Rect::new(mid, pmax), parent_ref),
        ];

        let old_bucket = {
            let mut n = node.borrow_mut();
            n.is_leaf = false;
            n.children = Some(Box::new(children));
            std::mem::take(&mut n.bucket)
        };

        for particle in old_bucket {
            Self::propagate(node, particle, bucket_size);
        }
    }

    /// Tries each child in `{NW, NE, SW, SE}` order, stopping at the first
    /// one that accepts the particle.
    fn propagate(node: &Rc<RefCell<Self>>, particle: ParticleHandle<S>, bucket_size: usize) -> bool {
        let children = node.borrow().children.clone();
        let children = match children {
            Some(c) => c,
            None => return false,
        };
        for child in children.iter() {
            if Self::insert(child, particle.clone(), bucket_size) {
                return true;
            }
        }
        false
    }

    /// Keeps this subtree consistent after particles have moved: escaped
    /// particles are walked up to the first ancestor whose boundary still
    /// contains them, then reinserted from there.
    fn update_node(node: &Rc<RefCell<Self>>, bucket_size: usize) {
        let is_leaf = node.borrow().is_leaf;
        if is_leaf {
            let escaped: Vec<ParticleHandle<S>> = {
                let mut n = node.borrow_mut();
                let boundary = n.boundary;
                let (staying, escaped): (Vec<_>, Vec<_>) = std::mem::take(&mut n.bucket)
                    .into_iter()
                    .partition(|p| boundary.contains(&p.borrow().position()));
                n.bucket = staying;
                escaped
            };
            for particle in escaped {
                trace!("particle escaped its leaf, relocating");
                Self::relocate(node, particle, bucket_size);
            }
        } else {
            let children = node.borrow().children.clone();
            if let Some(children) = children {
                for child in children.iter() {
                    Self::update_node(child, bucket_size);
                }
            }
        }
    }

    /// Walks up from `leaf` until reaching the first ancestor whose
    /// boundary contains `particle`, then reinserts it from there. A
    /// particle that has left the world entirely (no containing ancestor)
    /// is silently dropped, mirroring `insert`'s out-of-world semantics.
    fn relocate(leaf: &Rc<RefCell<Self>>, particle: ParticleHandle<S>, bucket_size: usize) {
        let mut current = leaf.clone();
        loop {
            let position = particle.borrow().position();
            if current.borrow().boundary.contains(&position) {
                break;
            }
            let parent = current.borrow().parent.upgrade();
            match parent {
                Some(p) => current = p,
                None => return,
            }
        }
        Self::insert(&current, particle, bucket_size);
    }
}

struct NodeCandidate<S: Scalar> {
    dist: OrderedFloat<f64>,
    node: Rc<RefCell<QuadNode<S>>>,
}

impl<S: Scalar> PartialEq for NodeCandidate<S> {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}
impl<S: Scalar> Eq for NodeCandidate<S> {}
impl<S: Scalar> PartialOrd for NodeCandidate<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<S: Scalar> Ord for NodeCandidate<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist)
    }
}

struct ParticleCandidate<S: Scalar> {
    dist: OrderedFloat<f64>,
    particle: ParticleHandle<S>,
}

impl<S: Scalar> PartialEq for ParticleCandidate<S> {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}
impl<S: Scalar> Eq for ParticleCandidate<S> {}
impl<S: Scalar> PartialOrd for ParticleCandidate<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<S: Scalar> Ord for ParticleCandidate<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist)
    }
}

/// Construction parameters for a [`QuadTree`], validated once up front
/// instead of the original's global mutable `bucketSize` (spec.md §9).
#[derive(Copy, Clone, Debug)]
pub struct QuadTreeConfig<S: Scalar> {
    pub boundary: Rect<S>,
    pub bucket_size: usize,
}

impl<S: Scalar> QuadTreeConfig<S> {
    fn validate(&self) -> Result<(), Error> {
        if self.bucket_size == 0 {
            return Err(Error::InvalidConfiguration("bucket_size must be positive".into()));
        }
        if !self.boundary.is_valid() {
            return Err(Error::InvalidConfiguration("world boundary has pmin > pmax".into()));
        }
        Ok(())
    }
}

/// Indexes a dynamic population of particles inside a fixed rectangular
/// world. See module docs for the subdivision and k-NN protocol.
pub struct QuadTree<S: Scalar> {
    root: Rc<RefCell<QuadNode<S>>>,
    bucket_size: usize,
}

impl<S: Scalar> QuadTree<S> {
    pub fn new(boundary: Rect<S>, bucket_size: usize) -> Result<Self, Error> {
        Self::with_config(QuadTreeConfig { boundary, bucket_size })
    }

    pub fn with_config(config: QuadTreeConfig<S>) -> Result<Self, Error> {
        config.validate()?;
        Ok(QuadTree {
            root: QuadNode::new_rc(config.boundary, Weak::new()),
            bucket_size: config.bucket_size,
        })
    }

    pub fn root(&self) -> Rc<RefCell<QuadNode<S>>> {
        self.root.clone()
    }

    /// Inserts a single particle, returning `false` if it falls outside
    /// the world.
    pub fn insert_one(&mut self, particle: ParticleHandle<S>) -> bool {
        QuadNode::insert(&self.root, particle, self.bucket_size)
    }

    /// Inserts a batch of particles, one at a time, in order.
    pub fn insert(&mut self, particles: Vec<ParticleHandle<S>>) {
        for particle in particles {
            self.insert_one(particle);
        }
    }

    /// Relocates particles that have drifted out of their leaf's boundary.
    pub fn update_tree(&mut self) {
        QuadNode::update_node(&self.root, self.bucket_size);
    }

    /// Returns the `k` particles nearest `query`, ascending by distance,
    /// via best-first search over node bounding boxes.
    pub fn knn(&self, query: Point2D<S>, k: usize) -> Vec<ParticleHandle<S>> {
        if k == 0 {
            return Vec::new();
        }

        let mut node_pq = BinaryHeap::new();
        node_pq.push(Reverse(NodeCandidate {
            dist: OrderedFloat(0.0),
            node: self.root.clone(),
        }));
        let mut result_pq: BinaryHeap<ParticleCandidate<S>> = BinaryHeap::new();

        while let Some(Reverse(candidate)) = node_pq.pop() {
            let node = candidate.node.borrow();
            if node.is_leaf {
                for particle in node.bucket.iter() {
                    let dist = query.distance(particle.borrow().position()).to_f64();
                    if result_pq.len() < k {
                        result_pq.push(ParticleCandidate {
                            dist: OrderedFloat(dist),
                            particle: particle.clone(),
                        });
                    } else if let Some(top) = result_pq.peek() {
                        if OrderedFloat(dist) < top.dist {
                            result_pq.pop();
                            result_pq.push(ParticleCandidate {
                                dist: OrderedFloat(dist),
                                particle: particle.clone(),
                            });
                        }
                    }
                }
            } else if let Some(children) = &node.children {
                for child in children.iter() {
                    let child_dist = child.borrow().boundary.min_distance(&query).to_f64();
                    let admit = result_pq.len() < k
                        || result_pq.peek().map_or(true, |top| OrderedFloat(child_dist) < top.dist);
                    if admit {
                        node_pq.push(Reverse(NodeCandidate {
                            dist: OrderedFloat(child_dist),
                            node: child.clone(),
                        }));
                    }
                }
            }
        }

        result_pq
            .into_sorted_vec()
            .into_iter()
            .map(|c| c.particle)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2D;

    fn world() -> Rect<f64> {
        Rect::new(Point2D::new(0.0, 0.0), Point2D::new(100.0, 100.0))
    }

    fn particle_at(x: f64, y: f64) -> ParticleHandle<f64> {
        crate::particle::Particle::handle(Point2D::new(x, y), Vector2D::new(0.0, 0.0))
    }

    #[test]
    fn out_of_world_insert_returns_false() {
        let mut tree = QuadTree::new(world(), 4).unwrap();
        assert!(!tree.insert_one(particle_at(200.0, 200.0)));
    }

    /// Seed scenario 3: the fifth insertion forces a subdivision, and the
    /// five points land in the quadrants the fixed NW/NE/SW/SE order and
    /// the boundary midpoint predict.
    #[test]
    fn fifth_insertion_subdivides_into_expected_quadrants() {
        let mut tree = QuadTree::new(world(), 4).unwrap();
        for (x, y) in [(10.0, 10.0), (20.0, 20.0), (30.0, 30.0), (40.0, 40.0), (50.0, 50.0)] {
            tree.insert_one(particle_at(x, y));
        }

        let root = tree.root();
        let root = root.borrow();
        assert!(!root.is_leaf());
        let children = root.children().unwrap();

        let nw = children[NW].borrow();
        assert_eq!(nw.boundary().pmin(), Point2D::new(0.0, 0.0));
        assert_eq!(nw.boundary().pmax(), Point2D::new(50.0, 50.0));
        assert_eq!(nw.bucket().len(), 4);

        let ne = children[NE].borrow();
        assert_eq!(ne.boundary().pmin(), Point2D::new(50.0, 0.0));
        assert_eq!(ne.bucket().len(), 1);
    }

    #[test]
    fn knn_matches_brute_force_on_a_small_population() {
        let mut tree = QuadTree::new(world(), 4).unwrap();
        let points = [
            (10.0, 10.0),
            (20.0, 20.0),
            (90.0, 90.0),
            (50.0, 51.0),
            (49.0, 50.0),
            (51.0, 50.0),
            (50.0, 49.0),
            (0.0, 0.0),
        ];
        let handles: Vec<_> = points.iter().map(|&(x, y)| particle_at(x, y)).collect();
        tree.insert(handles);

        let query = Point2D::new(50.0, 50.0);
        let got = tree.knn(query, 3);
        let got_dists: Vec<f64> = got.iter().map(|p| query.distance(p.borrow().position())).collect();

        let mut brute: Vec<f64> = points
            .iter()
            .map(|&(x, y)| query.distance(Point2D::new(x, y)))
            .collect();
        brute.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_eq!(got.len(), 3);
        for (a, b) in got_dists.iter().zip(brute.iter().take(3)) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn update_tree_relocates_a_moved_particle() {
        let mut tree = QuadTree::new(world(), 4).unwrap();
        for (x, y) in [(10.0, 10.0), (20.0, 20.0), (30.0, 30.0), (40.0, 40.0), (45.0, 45.0)] {
            tree.insert_one(particle_at(x, y));
        }
        // Subdivided; move the (45,45) particle into the SE quadrant.
        let root = tree.root();
        let moved = {
            let root_ref = root.borrow();
            let nw = root_ref.children().unwrap()[NW].borrow();
            nw.bucket()
                .iter()
                .find(|p| p.borrow().position() == Point2D::new(45.0, 45.0))
                .unwrap()
                .clone()
        };
        moved.borrow_mut().set_position(Point2D::new(80.0, 80.0));

        tree.update_tree();

        let root_ref = root.borrow();
        let se = root_ref.children().unwrap()[SE].borrow();
        assert!(se
            .bucket()
            .iter()
            .any(|p| p.borrow().position() == Point2D::new(80.0, 80.0)));
    }
}

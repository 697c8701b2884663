//! Similarity search tree (SS-tree) over embeddings, bounded by centroid
//! + radius hyperspheres.
//!
//! Insertion descends to the closest leaf by centroid distance and
//! overflows propagate a split upward, exactly as in a B-tree; height
//! balance is maintained by always splitting a full node rather than
//! letting leaves grow unbounded (spec.md §4.4).

use crate::data::Data;
use crate::embedding::Embedding;
use crate::error::Error;
use log::{debug, trace};
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::{Rc, Weak};

/// A node of the SS-tree. Exactly one of `data` (leaf) or `children`
/// (internal) is populated at a time, tracked by `is_leaf`.
pub struct SSNode {
    centroid: Embedding,
    radius: f64,
    is_leaf: bool,
    parent: Weak<RefCell<SSNode>>,
    data: Vec<Rc<Data>>,
    children: Vec<Rc<RefCell<SSNode>>>,
}

impl SSNode {
    fn new_leaf_rc(parent: Weak<RefCell<SSNode>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(SSNode {
            centroid: Embedding::new(Vec::new()),
            radius: 0.0,
            is_leaf: true,
            parent,
            data: Vec::new(),
            children: Vec::new(),
        }))
    }

    fn new_internal_rc(parent: Weak<RefCell<SSNode>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(SSNode {
            centroid: Embedding::new(Vec::new()),
            radius: 0.0,
            is_leaf: false,
            parent,
            data: Vec::new(),
            children: Vec::new(),
        }))
    }

    pub fn centroid(&self) -> &Embedding {
        &self.centroid
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn data(&self) -> &[Rc<Data>] {
        &self.data
    }

    pub fn children(&self) -> &[Rc<RefCell<SSNode>>] {
        &self.children
    }

    pub fn intersects_point(&self, embedding: &Embedding) -> bool {
        self.centroid.distance(embedding) <= self.radius
    }

    /// The centroids this node's bounding envelope is computed from: its
    /// data's embeddings if a leaf, its children's centroids otherwise.
    fn entry_embeddings(&self) -> Vec<Embedding> {
        if self.is_leaf {
            self.data.iter().map(|d| d.embedding().clone()).collect()
        } else {
            self.children.iter().map(|c| c.borrow().centroid.clone()).collect()
        }
    }

    fn find_closest_child(&self, embedding: &Embedding) -> Rc<RefCell<SSNode>> {
        self.children
            .iter()
            .min_by(|a, b| {
                let da = a.borrow().centroid.distance(embedding);
                let db = b.borrow().centroid.distance(embedding);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            })
            .expect("find_closest_child called on a node with no children")
            .clone()
    }

    /// Recomputes `centroid` (the mean of the entry embeddings) and
    /// `radius` (the furthest an entry or child sphere reaches from it).
    fn update_bounding_envelope(&mut self) {
        let entries = self.entry_embeddings();
        let dim = entries.first().map_or(0, |e| e.dim());
        let mut sum = vec![0.0; dim];
        for e in &entries {
            for (i, v) in e.values().iter().enumerate() {
                sum[i] += v;
            }
        }
        let n = entries.len().max(1) as f64;
        let mean = Embedding::new(sum.iter().map(|v| v / n).collect());

        let radius = if self.is_leaf {
            self.data
                .iter()
                .map(|d| mean.distance(d.embedding()))
                .fold(0.0, f64::max)
        } else {
            self.children
                .iter()
                .map(|c| {
                    let c = c.borrow();
                    mean.distance(&c.centroid) + c.radius
                })
                .fold(0.0, f64::max)
        };

        self.centroid = mean;
        self.radius = radius;
    }

    /// The coordinate axis along which the entries spread out the most,
    /// used to choose a split direction (spec.md §4.4).
    fn direction_of_max_variance(&self) -> usize {
        let entries = self.entry_embeddings();
        let dim = entries.first().map_or(0, |e| e.dim());
        let n = entries.len().max(1) as f64;

        let mut best_axis = 0;
        let mut best_variance = -1.0;
        for axis in 0..dim {
            let mean: f64 = entries.iter().map(|e| e[axis]).sum::<f64>() / n;
            let variance: f64 = entries.iter().map(|e| (e[axis] - mean).powi(2)).sum::<f64>() / n;
            if variance > best_variance {
                best_variance = variance;
                best_axis = axis;
            }
        }
        best_axis
    }

    /// Picks the median index along `axis` as the split boundary, per
    /// spec.md §4.4's default split rule — entries are sorted by
    /// coordinate `axis` and cut at `floor(n/2)`.
    ///
    /// Operates on whichever entry kind this node actually holds — unlike
    /// the coordinate index this is grounded on, which sorted the (empty,
    /// for an internal node) data vector regardless of node kind.
    fn find_split_index(&self, _axis: usize) -> usize {
        let n = self.entry_count();
        (n / 2).max(1)
    }

    /// The min-variance sweep spec.md §4.4 names as a substitute for the
    /// median default: picks whichever split point minimizes the summed
    /// variance of the two resulting groups. Not called from
    /// [`Self::split`] — kept for reference, mirroring the original's own
    /// `minVarianceSplit` having no caller.
    #[allow(dead_code)]
    fn min_variance_split_index(&self, axis: usize) -> usize {
        let mut indices: Vec<usize> = (0..self.entry_count()).collect();
        let coord = |i: usize| self.entry_coordinate(i, axis);
        indices.sort_by(|&a, &b| coord(a).partial_cmp(&coord(b)).unwrap_or(Ordering::Equal));

        let n = indices.len();
        let mut best_split = n / 2;
        let mut best_cost = f64::INFINITY;
        for split in 1..n {
            let cost = Self::variance_of(&indices[..split], &coord) + Self::variance_of(&indices[split..], &coord);
            if cost < best_cost {
                best_cost = cost;
                best_split = split;
            }
        }
        best_split
    }

    fn entry_count(&self) -> usize {
        if self.is_leaf {
            self.data.len()
        } else {
            self.children.len()
        }
    }

    fn entry_coordinate(&self, index: usize, axis: usize) -> f64 {
        if self.is_leaf {
            self.data[index].embedding()[axis]
        } else {
            self.children[index].borrow().centroid[axis]
        }
    }

    fn variance_of(indices: &[usize], coord: &impl Fn(usize) -> f64) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let n = indices.len() as f64;
        let mean: f64 = indices.iter().map(|&i| coord(i)).sum::<f64>() / n;
        indices.iter().map(|&i| (coord(i) - mean).powi(2)).sum::<f64>() / n
    }

    /// Splits an overflowing node into two height-balanced siblings,
    /// re-parenting children as needed. Returns the two new nodes; the
    /// original `node` is discarded by its caller.
    fn split(node: &Rc<RefCell<SSNode>>) -> (Rc<RefCell<SSNode>>, Rc<RefCell<SSNode>>) {
        let axis = node.borrow().direction_of_max_variance();
        let split_at = node.borrow().find_split_index(axis);
        let parent = node.borrow().parent.clone();
        let is_leaf = node.borrow().is_leaf;

        let left = if is_leaf {
            SSNode::new_leaf_rc(parent.clone())
        } else {
            SSNode::new_internal_rc(parent.clone())
        };
        let right = if is_leaf {
            SSNode::new_leaf_rc(parent)
        } else {
            SSNode::new_internal_rc(node.borrow().parent.clone())
        };

        let mut indices: Vec<usize> = (0..node.borrow().entry_count()).collect();
        {
            let n = node.borrow();
            indices.sort_by(|&a, &b| {
                n.entry_coordinate(a, axis)
                    .partial_cmp(&n.entry_coordinate(b, axis))
                    .unwrap_or(Ordering::Equal)
            });
        }

        if is_leaf {
            let mut n = node.borrow_mut();
            let data = std::mem::take(&mut n.data);
            let mut left_data = Vec::new();
            let mut right_data = Vec::new();
            for (rank, idx) in indices.into_iter().enumerate() {
                if rank < split_at {
                    left_data.push(data[idx].clone());
                } else {
                    right_data.push(data[idx].clone());
                }
            }
            left.borrow_mut().data = left_data;
            right.borrow_mut().data = right_data;
        } else {
            let mut n = node.borrow_mut();
            let children = std::mem::take(&mut n.children);
            let mut left_children = Vec::new();
            let mut right_children = Vec::new();
            for (rank, idx) in indices.into_iter().enumerate() {
                if rank < split_at {
                    left_children.push(children[idx].clone());
                } else {
                    right_children.push(children[idx].clone());
                }
            }
            for c in &left_children {
                c.borrow_mut().parent = Rc::downgrade(&left);
            }
            for c in &right_children {
                c.borrow_mut().parent = Rc::downgrade(&right);
            }
            left.borrow_mut().children = left_children;
            right.borrow_mut().children = right_children;
        }

        left.borrow_mut().update_bounding_envelope();
        right.borrow_mut().update_bounding_envelope();
        (left, right)
    }

    /// Inserts `data` into the subtree rooted at `node`. Returns `Some`
    /// with the two siblings that replace `node` if inserting caused an
    /// overflow-triggered split, otherwise `None`.
    fn insert(
        node: &Rc<RefCell<SSNode>>,
        data: Rc<Data>,
        max_points: usize,
    ) -> Option<(Rc<RefCell<SSNode>>, Rc<RefCell<SSNode>>)> {
        let is_leaf = node.borrow().is_leaf;

        if is_leaf {
            if node.borrow().data.iter().any(|d| **d == *data) {
                trace!("duplicate path on insert, ignoring");
                return None;
            }
            node.borrow_mut().data.push(data);
            node.borrow_mut().update_bounding_envelope();
            let overflow = node.borrow().data.len() > max_points;
            if overflow {
                debug!("leaf overflowed, splitting");
                return Some(Self::split(node));
            }
            return None;
        }

        let child = node.borrow().find_closest_child(data.embedding());
        let split_result = Self::insert(&child, data, max_points);

        match split_result {
            None => {
                node.borrow_mut().update_bounding_envelope();
                None
            }
            Some((a, b)) => {
                {
                    let mut n = node.borrow_mut();
                    let pos = n.children.iter().position(|c| Rc::ptr_eq(c, &child));
                    if let Some(pos) = pos {
                        n.children.remove(pos);
                    }
                    a.borrow_mut().parent = Rc::downgrade(node);
                    b.borrow_mut().parent = Rc::downgrade(node);
                    n.children.push(a);
                    n.children.push(b);
                }
                node.borrow_mut().update_bounding_envelope();
                let overflow = node.borrow().children.len() > max_points;
                if overflow {
                    debug!("internal node overflowed, splitting");
                    Some(Self::split(node))
                } else {
                    None
                }
            }
        }
    }

    /// Looks up the node holding `data`, descending toward the closest
    /// child at each level and comparing by pointer identity at the leaf
    /// — not by embedding value, since two distinct entries can share
    /// coordinates. Mirrors `SSNode::search` in the original.
    fn search(node: &Rc<RefCell<SSNode>>, data: &Data) -> Option<Rc<RefCell<SSNode>>> {
        let is_leaf = node.borrow().is_leaf;
        if is_leaf {
            let found = node.borrow().data.iter().any(|d| std::ptr::eq(d.as_ref(), data));
            return if found { Some(node.clone()) } else { None };
        }
        let child = node.borrow().find_closest_child(data.embedding());
        Self::search(&child, data)
    }
}

struct NodeCandidate {
    dist: OrderedFloat<f64>,
    node: Rc<RefCell<SSNode>>,
}
impl PartialEq for NodeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}
impl Eq for NodeCandidate {}
impl PartialOrd for NodeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for NodeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist)
    }
}

struct DataCandidate {
    dist: OrderedFloat<f64>,
    data: Rc<Data>,
}
impl PartialEq for DataCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}
impl Eq for DataCandidate {}
impl PartialOrd for DataCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DataCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist)
    }
}

/// Construction parameters for an [`SSTree`], validated once up front
/// instead of the original's global constant `M`.
#[derive(Copy, Clone, Debug)]
pub struct SSTreeConfig {
    pub max_points_per_node: usize,
}

impl SSTreeConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.max_points_per_node < 2 {
            return Err(Error::InvalidConfiguration(
                "max_points_per_node must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

/// A similarity search tree indexing [`Data`] by embedding.
pub struct SSTree {
    root: Option<Rc<RefCell<SSNode>>>,
    max_points_per_node: usize,
}

impl SSTree {
    pub fn new(max_points_per_node: usize) -> Result<Self, Error> {
        Self::with_config(SSTreeConfig { max_points_per_node })
    }

    pub fn with_config(config: SSTreeConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(SSTree {
            root: None,
            max_points_per_node: config.max_points_per_node,
        })
    }

    pub fn root(&self) -> Option<Rc<RefCell<SSNode>>> {
        self.root.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts `data`, creating the root on first use and growing the
    /// tree's height by one whenever the root itself overflows.
    pub fn insert(&mut self, data: Data) {
        let data = Rc::new(data);
        match &self.root {
            None => {
                let leaf = SSNode::new_leaf_rc(Weak::new());
                leaf.borrow_mut().data.push(data);
                leaf.borrow_mut().update_bounding_envelope();
                self.root = Some(leaf);
            }
            Some(root) => {
                if let Some((a, b)) = SSNode::insert(root, data, self.max_points_per_node) {
                    let new_root = SSNode::new_internal_rc(Weak::new());
                    a.borrow_mut().parent = Rc::downgrade(&new_root);
                    b.borrow_mut().parent = Rc::downgrade(&new_root);
                    new_root.borrow_mut().children = vec![a, b];
                    new_root.borrow_mut().update_bounding_envelope();
                    self.root = Some(new_root);
                }
            }
        }
    }

    /// Returns the node holding `data`, found by identity (not by
    /// embedding value), or `None` if this exact entry was never inserted.
    pub fn search(&self, data: &Data) -> Option<Rc<RefCell<SSNode>>> {
        self.root.as_ref().and_then(|r| SSNode::search(r, data))
    }

    /// Returns the `k` entries nearest `query`, ascending by distance,
    /// via best-first search using each node's sphere lower bound
    /// `max(0, dist(centroid, query) - radius)`.
    pub fn knn(&self, query: &Embedding, k: usize) -> Vec<Rc<Data>> {
        let root = match &self.root {
            Some(r) => r.clone(),
            None => return Vec::new(),
        };
        if k == 0 {
            return Vec::new();
        }

        let mut node_pq = BinaryHeap::new();
        node_pq.push(std::cmp::Reverse(NodeCandidate {
            dist: OrderedFloat(0.0),
            node: root,
        }));
        let mut result_pq: BinaryHeap<DataCandidate> = BinaryHeap::new();

        while let Some(std::cmp::Reverse(candidate)) = node_pq.pop() {
            let node = candidate.node.borrow();
            if node.is_leaf {
                for data in &node.data {
                    let dist = query.distance(data.embedding());
                    if result_pq.len() < k {
                        result_pq.push(DataCandidate {
                            dist: OrderedFloat(dist),
                            data: data.clone(),
                        });
                    } else if let Some(top) = result_pq.peek() {
                        if OrderedFloat(dist) < top.dist {
                            result_pq.pop();
                            result_pq.push(DataCandidate {
                                dist: OrderedFloat(dist),
                                data: data.clone(),
                            });
                        }
                    }
                }
            } else {
                for child in &node.children {
                    let c = child.borrow();
                    let lower_bound = (query.distance(&c.centroid) - c.radius).max(0.0);
                    let admit = result_pq.len() < k
                        || result_pq.peek().map_or(true, |top| OrderedFloat(lower_bound) < top.dist);
                    if admit {
                        node_pq.push(std::cmp::Reverse(NodeCandidate {
                            dist: OrderedFloat(lower_bound),
                            node: child.clone(),
                        }));
                    }
                }
            }
        }

        result_pq.into_sorted_vec().into_iter().map(|c| c.data).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(x: f64, path: &str) -> Data {
        Data::new(Embedding::new(vec![x, 0.0]), path)
    }

    #[test]
    fn rejects_too_small_max_points() {
        assert!(SSTree::new(1).is_err());
        assert!(SSTree::new(2).is_ok());
    }

    #[test]
    fn search_finds_the_node_holding_an_inserted_entry_by_identity() {
        let mut tree = SSTree::new(4).unwrap();
        tree.insert(entry(1.0, "/a"));
        tree.insert(entry(2.0, "/b"));

        let stored = tree.root().unwrap().borrow().data()[0].clone();
        let found = tree.search(stored.as_ref()).unwrap();
        assert!(found.borrow().data().iter().any(|d| d.path() == "/a"));

        // A distinct `Data` at the same coordinates is a different object,
        // so identity-based search does not confuse it with `stored` even
        // though the two would compare equal by path if they shared one.
        let lookalike = entry(1.0, "/never-inserted");
        assert!(tree.search(&lookalike).is_none());
    }

    #[test]
    fn duplicate_path_reinsert_is_a_no_op() {
        let mut tree = SSTree::new(4).unwrap();
        tree.insert(entry(1.0, "/a"));
        tree.insert(Data::new(Embedding::new(vec![50.0, 0.0]), "/a"));

        let root = tree.root().unwrap();
        assert_eq!(root.borrow().data().len(), 1);
        assert_eq!(root.borrow().data()[0].embedding()[0], 1.0);
    }

    /// Overflowing a leaf with `max_points_per_node == 4` creates an
    /// internal root over two leaf siblings.
    #[test]
    fn overflowing_a_leaf_splits_and_grows_a_root() {
        let mut tree = SSTree::new(4).unwrap();
        for (x, path) in [(0.0, "/a"), (1.0, "/b"), (2.0, "/c"), (3.0, "/d"), (100.0, "/e")] {
            tree.insert(entry(x, path));
        }

        let root = tree.root().unwrap();
        assert!(!root.borrow().is_leaf());
        assert_eq!(root.borrow().children().len(), 2);

        let total: usize = root
            .borrow()
            .children()
            .iter()
            .map(|c| c.borrow().data().len())
            .sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn knn_matches_brute_force_on_a_small_population() {
        let mut tree = SSTree::new(4).unwrap();
        let points = [0.0, 1.0, 2.0, 10.0, 11.0, 50.0];
        for (i, &x) in points.iter().enumerate() {
            tree.insert(entry(x, &format!("/p{i}")));
        }

        let query = Embedding::new(vec![1.5, 0.0]);
        let got = tree.knn(&query, 2);
        let got_values: Vec<f64> = got.iter().map(|d| d.embedding()[0]).collect();
        assert_eq!(got.len(), 2);
        assert!(got_values.contains(&1.0));
        assert!(got_values.contains(&2.0));
    }
}

use super::point::Point2D;
use crate::scalar::{smax, Scalar};

/// An axis-aligned rectangle, used as the quadtree's world boundary and
/// each node's region.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect<S: Scalar> {
    pmin: Point2D<S>,
    pmax: Point2D<S>,
}

impl<S: Scalar> Rect<S> {
    pub fn new(pmin: Point2D<S>, pmax: Point2D<S>) -> Self {
        Rect { pmin, pmax }
    }

    pub fn pmin(&self) -> Point2D<S> {
        self.pmin
    }

    pub fn pmax(&self) -> Point2D<S> {
        self.pmax
    }

    pub fn center(&self) -> Point2D<S> {
        let two = S::one() + S::one();
        Point2D::new(
            (self.pmin.x + self.pmax.x) / two,
            (self.pmin.y + self.pmax.y) / two,
        )
    }

    pub fn contains(&self, p: &Point2D<S>) -> bool {
        p.x >= self.pmin.x && p.x <= self.pmax.x && p.y >= self.pmin.y && p.y <= self.pmax.y
    }

    pub fn intersects(&self, other: &Rect<S>) -> bool {
        self.pmin.x <= other.pmax.x
            && self.pmax.x >= other.pmin.x
            && self.pmin.y <= other.pmax.y
            && self.pmax.y >= other.pmin.y
    }

    pub fn is_within(&self, other: &Rect<S>) -> bool {
        self.pmin.x >= other.pmin.x
            && self.pmax.x <= other.pmax.x
            && self.pmin.y >= other.pmin.y
            && self.pmax.y <= other.pmax.y
    }

    pub fn is_valid(&self) -> bool {
        self.pmin.x <= self.pmax.x && self.pmin.y <= self.pmax.y
    }

    /// Minimum Euclidean distance from `p` to this rectangle (zero if `p`
    /// is inside), per the per-axis clamp in spec.md §4.3.
    pub fn min_distance(&self, p: &Point2D<S>) -> S {
        let dx = smax(smax(self.pmin.x - p.x, S::zero()), p.x - self.pmax.x);
        let dy = smax(smax(self.pmin.y - p.y, S::zero()), p.y - self.pmax.y);
        (dx * dx + dy * dy).sqrt()
    }
}

use super::plane::Plane;
use super::point::Point3D;
use super::vector::Vector3D;
use crate::scalar::Scalar;

/// An infinite line: an origin point plus a direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line<S: Scalar> {
    pub origin: Point3D<S>,
    pub dir: Vector3D<S>,
}

impl<S: Scalar> Line<S> {
    pub fn new(origin: Point3D<S>, dir: Vector3D<S>) -> Self {
        Line { origin, dir }
    }
}

/// A bounded segment `[a, b]`, used for BSP collision queries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSegment<S: Scalar> {
    pub a: Point3D<S>,
    pub b: Point3D<S>,
}

impl<S: Scalar> LineSegment<S> {
    pub fn new(a: Point3D<S>, b: Point3D<S>) -> Self {
        LineSegment { a, b }
    }

    /// Parametric intersection with `plane`. Returns `(t, point)` with
    /// `t ∈ [0, 1]` measured from `a` to `b`, or `None` if the segment
    /// doesn't straddle the plane (parallel, or the crossing falls outside
    /// `[a, b]`).
    pub fn intersect_plane(&self, plane: &Plane<S>) -> Option<(S, Point3D<S>)> {
        let d0 = plane.signed_distance(&self.a);
        let d1 = plane.signed_distance(&self.b);
        let denom = d0 - d1;
        if denom.is_zero() {
            return None;
        }
        let t = d0 / denom;
        if t < S::zero() || t > S::one() {
            return None;
        }
        Some((t, self.a + (self.b - self.a) * t))
    }
}

use super::plane::{Plane, Relation};
use super::point::Point3D;
use crate::error::Error;
use crate::scalar::Scalar;

/// A convex, coplanar polygon: an ordered cycle of >= 3 distinct,
/// non-collinear vertices, together with its support plane.
///
/// Construction validates the invariants spec.md leaves to "the caller's
/// responsibility" in the original design — [`Polygon::new`] rejects
/// degenerate input instead of assuming it was checked upstream.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon<S: Scalar> {
    vertices: Vec<Point3D<S>>,
    plane: Plane<S>,
}

impl<S: Scalar> Polygon<S> {
    /// Builds a polygon from its vertex cycle, deriving the support plane
    /// from the first non-collinear triple of consecutive vertices.
    pub fn new(vertices: Vec<Point3D<S>>) -> Result<Self, Error> {
        let n = vertices.len();
        if n < 3 {
            return Err(Error::InvalidGeometry(format!(
                "polygon needs at least 3 vertices, got {n}"
            )));
        }
        for i in 0..n {
            if vertices[i] == vertices[(i + 1) % n] {
                return Err(Error::InvalidGeometry(
                    "consecutive vertices must be distinct".into(),
                ));
            }
        }

        let mut normal = None;
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let c = vertices[(i + 2) % n];
            let cross = (b - a).cross(c - b);
            if cross.length_squared() > S::epsilon() {
                normal = Some(cross.normalize());
                break;
            }
        }
        let normal = normal
            .ok_or_else(|| Error::InvalidGeometry("polygon vertices are collinear".into()))?;

        let plane = Plane::new(vertices[0], normal);
        for v in &vertices {
            if plane.signed_distance(v).abs() > S::epsilon() {
                return Err(Error::InvalidGeometry(
                    "polygon vertices are not coplanar".into(),
                ));
            }
        }

        Ok(Polygon { vertices, plane })
    }

    pub fn vertices(&self) -> &[Point3D<S>] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane<S> {
        &self.plane
    }

    /// Classifies this polygon against `plane` by scanning all vertices,
    /// per spec.md §4.1.
    pub fn relation_with_plane(&self, plane: &Plane<S>) -> Relation {
        let (mut front, mut back) = (false, false);
        for v in &self.vertices {
            match plane.classify(v) {
                Relation::InFront => front = true,
                Relation::Behind => back = true,
                Relation::Coincident => {}
                Relation::Split => unreachable!("Plane::classify never returns Split"),
            }
            if front && back {
                return Relation::Split;
            }
        }
        match (front, back) {
            (true, _) => Relation::InFront,
            (_, true) => Relation::Behind,
            _ => Relation::Coincident,
        }
    }

    /// Splits this polygon by `plane`, walking vertex pairs cyclically and
    /// inserting an intersection vertex wherever an edge crosses the plane.
    ///
    /// Returns `(front_half, back_half)`. Either side is `None` if the
    /// corresponding vertex list has fewer than 3 points; per spec.md
    /// §4.1 that degenerate case routes the *whole* original polygon to
    /// the other side rather than discarding it.
    pub fn split(&self, plane: &Plane<S>) -> (Option<Polygon<S>>, Option<Polygon<S>>) {
        let n = self.vertices.len();
        let mut front = Vec::new();
        let mut back = Vec::new();

        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[(i + 1) % n];
            let di = plane.signed_distance(&vi);
            let dj = plane.signed_distance(&vj);

            if di >= S::zero() {
                front.push(vi);
            }
            if di <= S::zero() {
                back.push(vi);
            }

            let straddles = (di > S::zero() && dj < S::zero()) || (di < S::zero() && dj > S::zero());
            if straddles {
                let t = di / (di - dj);
                let x = vi + (vj - vi) * t;
                front.push(x);
                back.push(x);
            }
        }

        let make = |verts: Vec<Point3D<S>>| -> Option<Polygon<S>> {
            if verts.len() < 3 {
                None
            } else {
                Some(Polygon {
                    vertices: verts,
                    plane: self.plane,
                })
            }
        };

        match (make(front), make(back)) {
            (None, _) => (None, Some(self.clone())),
            (_, None) => (Some(self.clone()), None),
            (front, back) => (front, back),
        }
    }

    /// Tests whether `p` (assumed to lie on this polygon's plane) falls
    /// inside the convex boundary, by checking that it's on the same side
    /// of every edge. Points on an edge are treated as inside.
    pub fn contains_point(&self, p: &Point3D<S>) -> bool {
        let n = self.vertices.len();
        let mut sign: Option<bool> = None;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let edge = b - a;
            let to_p = *p - a;
            let d = edge.cross(to_p).dot(self.plane.normal);
            if d.abs() <= S::epsilon() {
                continue;
            }
            let positive = d > S::zero();
            match sign {
                None => sign = Some(positive),
                Some(s) if s != positive => return false,
                _ => {}
            }
        }
        true
    }
}

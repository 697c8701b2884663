use super::vector::{Vector2D, Vector3D};
use crate::scalar::Scalar;
use std::ops::{Add, Mul, Sub};

/// A point in the 2D world the quadtree indexes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D<S: Scalar> {
    pub x: S,
    pub y: S,
}

impl<S: Scalar> Point2D<S> {
    pub fn new(x: S, y: S) -> Self {
        Point2D { x, y }
    }

    pub fn distance(self, other: Point2D<S>) -> S {
        (self - other).length()
    }
}

impl<S: Scalar> Sub for Point2D<S> {
    type Output = Vector2D<S>;
    fn sub(self, rhs: Self) -> Vector2D<S> {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S: Scalar> Add<Vector2D<S>> for Point2D<S> {
    type Output = Point2D<S>;
    fn add(self, rhs: Vector2D<S>) -> Self {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<S: Scalar> Mul<S> for Point2D<S> {
    type Output = Point2D<S>;
    fn mul(self, rhs: S) -> Self {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

/// A point in the 3D space the BSP tree partitions.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3D<S: Scalar> {
    pub x: S,
    pub y: S,
    pub z: S,
}

impl<S: Scalar> Point3D<S> {
    pub fn new(x: S, y: S, z: S) -> Self {
        Point3D { x, y, z }
    }
}

impl<S: Scalar> Sub for Point3D<S> {
    type Output = Vector3D<S>;
    fn sub(self, rhs: Self) -> Vector3D<S> {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<S: Scalar> Add<Vector3D<S>> for Point3D<S> {
    type Output = Point3D<S>;
    fn add(self, rhs: Vector3D<S>) -> Self {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<S: Scalar> Mul<S> for Point3D<S> {
    type Output = Point3D<S>;
    fn mul(self, rhs: S) -> Self {
        Point3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

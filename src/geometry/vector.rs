use crate::scalar::Scalar;
use std::ops::{Add, Mul, Neg, Sub};

/// A 2D displacement — the result of subtracting two [`super::Point2D`]s.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2D<S: Scalar> {
    pub x: S,
    pub y: S,
}

impl<S: Scalar> Vector2D<S> {
    pub fn new(x: S, y: S) -> Self {
        Vector2D { x, y }
    }

    pub fn dot(self, other: Vector2D<S>) -> S {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> S {
        self.dot(self)
    }

    pub fn length(self) -> S {
        self.length_squared().sqrt()
    }
}

impl<S: Scalar> Add for Vector2D<S> {
    type Output = Vector2D<S>;
    fn add(self, rhs: Self) -> Self {
        Vector2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<S: Scalar> Sub for Vector2D<S> {
    type Output = Vector2D<S>;
    fn sub(self, rhs: Self) -> Self {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S: Scalar> Neg for Vector2D<S> {
    type Output = Vector2D<S>;
    fn neg(self) -> Self {
        Vector2D::new(-self.x, -self.y)
    }
}

impl<S: Scalar> Mul<S> for Vector2D<S> {
    type Output = Vector2D<S>;
    fn mul(self, rhs: S) -> Self {
        Vector2D::new(self.x * rhs, self.y * rhs)
    }
}

/// A 3D displacement, with the cross product the BSP plane math needs.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3D<S: Scalar> {
    pub x: S,
    pub y: S,
    pub z: S,
}

impl<S: Scalar> Vector3D<S> {
    pub fn new(x: S, y: S, z: S) -> Self {
        Vector3D { x, y, z }
    }

    pub fn dot(self, other: Vector3D<S>) -> S {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3D<S>) -> Vector3D<S> {
        Vector3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(self) -> S {
        self.dot(self)
    }

    pub fn length(self) -> S {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction. Caller is responsible for not
    /// normalizing a near-zero vector (the BSP polygon constructor checks
    /// `length_squared()` against [`Scalar::epsilon`] before calling this).
    pub fn normalize(self) -> Vector3D<S> {
        let len = self.length();
        Vector3D::new(self.x / len, self.y / len, self.z / len)
    }
}

impl<S: Scalar> Add for Vector3D<S> {
    type Output = Vector3D<S>;
    fn add(self, rhs: Self) -> Self {
        Vector3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<S: Scalar> Sub for Vector3D<S> {
    type Output = Vector3D<S>;
    fn sub(self, rhs: Self) -> Self {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<S: Scalar> Neg for Vector3D<S> {
    type Output = Vector3D<S>;
    fn neg(self) -> Self {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

impl<S: Scalar> Mul<S> for Vector3D<S> {
    type Output = Vector3D<S>;
    fn mul(self, rhs: S) -> Self {
        Vector3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

//! Dense floating-point vectors indexed by the SS-tree.

use crate::error::Error;
use std::ops::{Add, Index, Mul, Sub};

/// A point in the embedding space being indexed. Always `f64`-valued —
/// the SS-tree's bounding-sphere arithmetic isn't generic over [`Scalar`](crate::scalar::Scalar)
/// the way the BSP and quadtree geometry is, since spec.md §4.4 fixes the
/// similarity space to floating-point embeddings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Embedding(Vec<f64>);

impl Embedding {
    pub fn new(values: Vec<f64>) -> Self {
        Embedding(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn l2_norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Euclidean distance to `other`; both embeddings must share a dimension.
    pub fn distance(&self, other: &Embedding) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Elementwise division by a scalar, rejecting near-zero divisors the
    /// way the original's `Point::operator/` does.
    pub fn div_scalar(&self, scalar: f64) -> Result<Embedding, Error> {
        if scalar.abs() < f64::EPSILON * 8.0 {
            return Err(Error::NearZeroDivision);
        }
        Ok(Embedding(self.0.iter().map(|v| v / scalar).collect()))
    }
}

impl Index<usize> for Embedding {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl Add for &Embedding {
    type Output = Embedding;
    fn add(self, rhs: &Embedding) -> Embedding {
        Embedding(self.0.iter().zip(rhs.0.iter()).map(|(a, b)| a + b).collect())
    }
}

impl Sub for &Embedding {
    type Output = Embedding;
    fn sub(self, rhs: &Embedding) -> Embedding {
        Embedding(self.0.iter().zip(rhs.0.iter()).map(|(a, b)| a - b).collect())
    }
}

impl Mul<f64> for &Embedding {
    type Output = Embedding;
    fn mul(self, rhs: f64) -> Embedding {
        Embedding(self.0.iter().map(|v| v * rhs).collect())
    }
}

//! The numeric scalar abstraction (`N` in the design notes).
//!
//! Every geometric predicate in this crate is generic over `Scalar` rather
//! than hard-coded to `f32`/`f64`, so a caller can plug in a fixed-point or
//! interval backend without touching the tree algorithms. The blanket
//! impls below cover the two backends anyone actually reaches for.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A totally-ordered numeric value with the handful of operations the
/// geometric layer needs: arithmetic, square root, absolute value, and an
/// exact zero for relational classification.
///
/// `PartialOrd`/`PartialEq` are used as-is rather than widened to `Ord`/`Eq`
/// — the crate assumes well-behaved input (no NaN-like values reaching a
/// predicate), matching the "numerically robust predicates under
/// adversarial input" non-goal.
pub trait Scalar:
    Copy
    + Default
    + fmt::Debug
    + PartialOrd
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;

    /// The slack below which a value is treated as exactly zero — used for
    /// coplanarity/collinearity checks and for flagging near-zero divisors.
    fn epsilon() -> Self;

    /// Projection used for the `f64`-keyed priority queues in the k-NN
    /// searches; every backend can be compared on a common footing there
    /// even though the tree itself stores the native representation.
    fn to_f64(self) -> f64;

    fn is_zero(self) -> bool {
        self.abs() <= Self::epsilon()
    }
}

macro_rules! impl_scalar_for_float {
    ($t:ty, $eps_scale:expr) => {
        impl Scalar for $t {
            fn zero() -> Self {
                0.0
            }
            fn one() -> Self {
                1.0
            }
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }
            fn abs(self) -> Self {
                <$t>::abs(self)
            }
            fn epsilon() -> Self {
                <$t>::EPSILON * $eps_scale
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_scalar_for_float!(f32, 8.0);
impl_scalar_for_float!(f64, 8.0);

/// Returns the larger of two scalars, without requiring `Ord`.
pub fn smax<S: Scalar>(a: S, b: S) -> S {
    if a > b {
        a
    } else {
        b
    }
}

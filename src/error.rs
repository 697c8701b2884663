//! Error kinds for construction-time and arithmetic failures.
//!
//! Per spec.md §7, these are reserved for the handful of cases that are
//! genuinely recoverable-but-invalid construction inputs; the routine
//! outcomes of tree operations (a point outside the world, a duplicate
//! insert, an empty query result) are ordinary `bool`/`Option`/`Vec`
//! values, not `Error`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("division by a value too close to zero")]
    NearZeroDivision,
}

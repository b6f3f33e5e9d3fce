//! Factorization/solve adapters.
//!
//! Each adapter is a thin typed shim over an external decomposition
//! routine: it validates shapes, sizes scratch workspace (via the
//! `lwork = -1` query where the routine supports one), invokes the
//! routine and translates its `info` code. No adapter re-implements
//! factorization arithmetic; with the `lapack` feature the routines come
//! from the system LAPACK via `lapack-sys`, otherwise the built-in
//! fallbacks in [`naive`] honor the same status-code contract.
//!
//! Numeric deficiency — a singular pivot, a rank-deficient triangle, an
//! iteration that ran out of sweeps — is a typed [`Outcome`], never a
//! silent success and never an `Err`. `Err` is reserved for shape errors
//! and invalid-argument reports, which are programming errors.

mod bunch_kaufman;
#[cfg(feature = "lapack")]
mod lapack;
#[cfg(not(feature = "lapack"))]
mod naive;
mod orthogonal;
mod status;
mod svd;
mod triangular;

pub use bunch_kaufman::{factor_symmetric, BunchKaufman};
pub use orthogonal::{factor_qr, Householder};
pub use svd::{svd, Svd};
pub use triangular::{triangular_solve, triangular_solve_tagged};

use crate::scalar::Scalar;

/// Numeric result of a factorization or solve.
///
/// Deficiency is data: callers inspect the outcome and decide whether to
/// proceed, retry with a different method, or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The routine completed and the results are fully usable.
    Success,
    /// The input is singular or rank-deficient. `position` is the
    /// one-based pivot or diagonal index where the deficiency surfaced.
    RankDeficient { position: usize },
    /// An iterative decomposition did not converge within its sweep
    /// budget. Partial results are not usable.
    NotConverged { sweeps: usize },
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Which triangle of a symmetric matrix the caller stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uplo {
    Upper,
    Lower,
}

impl Uplo {
    #[cfg_attr(not(feature = "lapack"), allow(dead_code))]
    pub(crate) fn flag(self) -> u8 {
        match self {
            Uplo::Upper => b'U',
            Uplo::Lower => b'L',
        }
    }
}

/// Side from which an orthogonal factor is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Whether a routine operates on the matrix or its transpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trans {
    No,
    Transpose,
}

impl Trans {
    #[cfg_attr(not(feature = "lapack"), allow(dead_code))]
    pub(crate) fn flag(self) -> u8 {
        match self {
            Trans::No => b'N',
            Trans::Transpose => b'T',
        }
    }
}

/// Scalar types the adapter layer supports.
#[cfg(feature = "lapack")]
pub trait FactorScalar: Scalar + num_traits::Float + lapack::LapackScalar {}

/// Scalar types the adapter layer supports.
#[cfg(not(feature = "lapack"))]
pub trait FactorScalar: Scalar + num_traits::Float {}

impl FactorScalar for f32 {}
impl FactorScalar for f64 {}

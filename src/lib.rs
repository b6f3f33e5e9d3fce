//! Fused expression-template linear algebra.
//!
//! matexpr builds lazy operator trees over dense and sparse vectors and
//! matrices, deduces the structural properties of every subexpression at
//! compile time, and evaluates the whole tree in a single fused pass when
//! a container is assigned from it. No intermediate temporaries are
//! materialized unless aliasing or a non-elementwise operation forces one.
//!
//! # Core Types
//!
//! - [`DenseMatrix`] / [`DenseVector`]: owning column-major containers
//! - [`CsrMatrix`] / [`SparseVector`]: compressed sparse containers
//! - [`Expression`]: the lazy node trait every operator tree implements
//! - [`Ex`]: the expression handle that carries operator overloads
//! - Structural tags ([`tag::Upper`], [`tag::Symmetric`], ...): compile-time
//!   promises about runtime values, combined through explicit type-level
//!   tables
//!
//! # Building Expressions
//!
//! Operators over container references compose nodes without touching
//! element data:
//!
//! ```rust
//! use matexpr::{assign, DenseMatrix};
//!
//! let a = DenseMatrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
//! let b = DenseMatrix::from_rows(&[&[5.0, 6.0], &[7.0, 8.0]]).unwrap();
//! let mut c = DenseMatrix::zeros(2, 2);
//!
//! // One fused pass: no temporary for `&a + &b`.
//! assign(&mut c, &(2.0 * (&a + &b)));
//! assert_eq!(c[[0, 0]], 12.0);
//! ```
//!
//! # Structural Tags
//!
//! A tag is a caller-certified promise. Declaring one that the runtime
//! values violate gives unspecified results; the `validate-tags`
//! feature re-checks every assignment and panics on a broken promise.
//!
//! ```rust
//! use matexpr::DenseMatrix;
//!
//! let u = DenseMatrix::from_rows(&[&[1.0, 2.0], &[0.0, 3.0]]).unwrap();
//! let v = DenseMatrix::from_rows(&[&[4.0, 5.0], &[0.0, 6.0]]).unwrap();
//!
//! // upper * upper is statically upper: the strictly-lower part of the
//! // result is never visited during evaluation.
//! let p = (u.as_expr().declare_upper() * v.as_expr().declare_upper()).eval();
//! assert_eq!(p[[1, 0]], 0.0);
//! ```
//!
//! # Evaluation Strategy
//!
//! Assignment walks the tree once and picks a strategy per node: a fused
//! elementwise loop (SIMD-dispatched for f32/f64 under the `simd`
//! feature), a dedicated product kernel (CBLAS under the `blas` feature,
//! a built-in blocked kernel otherwise), or a region-restricted loop when
//! the deduced tag certifies triangular or diagonal structure. Barrier
//! nodes ([`Ex::serial`], [`Ex::nosimd`], [`Ex::noalias`]) only constrain
//! the strategy; they never change the numeric result.
//!
//! # Factorizations
//!
//! The [`factor`] module wraps external decomposition routines (LAPACK
//! under the `lapack` feature, built-in fallbacks otherwise) behind thin
//! adapters that size workspace, marshal arguments and translate status
//! codes. Numeric deficiency (singular input, non-convergence) is a typed
//! [`factor::Outcome`], never a silent success and never an `Err`.

pub mod backend;
mod dense;
mod eval;
pub mod expr;
pub mod factor;
mod ops;
mod scalar;
pub(crate) mod simd;
mod sparse;
pub mod tag;

// ============================================================================
// Containers
// ============================================================================
pub use dense::{DenseMatrix, DenseVector};
pub use sparse::{CsrMatrix, SparseVector};

// ============================================================================
// Expression building
// ============================================================================
pub use expr::{
    kron, matvec, reshape, schur, vecmat, Ex, Expression, IntoExpr, OneArg, ScalarArg, ZeroArg,
};

// ============================================================================
// Evaluation engine
// ============================================================================
pub use eval::{
    assign, assign_add, assign_sub, try_assign, AssignTarget, EvalContext, PtrRange, Strategy,
};

// ============================================================================
// Scalar abstraction
// ============================================================================
pub use scalar::{Conjugate, Scalar};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by expression construction, assignment and the
/// factorization adapters.
///
/// Numeric deficiency (rank-deficient input, non-convergence) is not an
/// error; it is reported through [`factor::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    /// Operand shapes are incompatible for an elementwise operation.
    #[error("dimension mismatch: {0}x{1} vs {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    /// Inner dimensions of a product disagree.
    #[error("inner dimension mismatch: {lhs_cols} vs {rhs_rows}")]
    InnerDimension { lhs_cols: usize, rhs_rows: usize },

    /// A square matrix was required.
    #[error("non-square matrix: rows={rows}, cols={cols}")]
    NonSquare { rows: usize, cols: usize },

    /// A reshape would change the element count.
    #[error("reshape changes element count: {from} vs {to}")]
    ReshapeCount { from: usize, to: usize },

    /// Sparse index structure is ill-formed.
    #[error("invalid sparse structure: {0}")]
    BadSparse(&'static str),

    /// An external routine rejected an argument. This is a programming
    /// error in the adapter layer, not a property of the input data.
    #[error("invalid argument {position} to {routine}")]
    BadArgument {
        /// Routine that rejected the call.
        routine: &'static str,
        /// One-based argument position, as reported by the routine.
        position: usize,
    },

    /// A workspace-size query returned nonsense.
    #[error("workspace query failed for {0}")]
    WorkspaceQuery(&'static str),
}

/// Result type for matexpr operations.
pub type Result<T> = std::result::Result<T, ExprError>;

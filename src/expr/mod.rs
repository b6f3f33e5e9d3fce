//! Expression node library.
//!
//! Every algebraic operation is one node type: a copy-cheap descriptor
//! over its operand expressions that owns no bulk data, only operand
//! handles and cached dimensions. Operand ownership is hybrid: named
//! containers are borrowed (the leaf types in [`leaf`]), temporaries are
//! held by value. Trees are built by the operators in [`crate::ops`] and
//! the methods on [`Ex`]; nothing is computed until a container is
//! assigned from the tree.

mod barrier;
mod binary;
mod declare;
mod expression;
mod kron;
mod leaf;
mod matmul;
mod reshape;
mod scale;
mod transpose;

pub use barrier::{NoAliasExpr, NoSimdExpr, SerialExpr};
pub use binary::{AddExpr, SchurExpr, SubExpr};
pub use declare::Declare;
pub use expression::{DenseRef, Ex, Expression, IntoExpr};
pub use kron::KronExpr;
pub use leaf::{CsrRef, MatOwned, MatRef, SpVecRef, VecOwned, VecRef};
pub use matmul::{MatMulExpr, MatVecExpr, SpMatVecExpr, VecMatExpr};
pub use reshape::ReshapeExpr;
pub use scale::{OneArg, ScalarArg, ScaleExpr, ZeroArg};
pub use transpose::{AdjExpr, TransExpr};

use crate::Result;

/// Kronecker product of two expressions.
///
/// The result has `lhs.rows() * rhs.rows()` rows and
/// `lhs.cols() * rhs.cols()` columns. Assumes aliasing with any target
/// unless wrapped in a no-alias barrier.
pub fn kron<L: IntoExpr, R: IntoExpr>(lhs: L, rhs: R) -> Ex<KronExpr<L::Expr, R::Expr>>
where
    R::Expr: Expression<Elem = <L::Expr as Expression>::Elem>,
    <L::Expr as Expression>::Tag: crate::tag::MulWith<<R::Expr as Expression>::Tag>,
{
    Ex(KronExpr::new(lhs.into_expr(), rhs.into_expr()))
}

/// Schur (elementwise) product of two same-shape expressions.
///
/// # Panics
///
/// Panics if the operand shapes differ; use [`SchurExpr::try_new`] for a
/// recoverable error.
pub fn schur<L: IntoExpr, R: IntoExpr>(lhs: L, rhs: R) -> Ex<SchurExpr<L::Expr, R::Expr>>
where
    R::Expr: Expression<Elem = <L::Expr as Expression>::Elem>,
    <L::Expr as Expression>::Tag: crate::tag::SchurWith<<R::Expr as Expression>::Tag>,
{
    Ex(SchurExpr::new(lhs.into_expr(), rhs.into_expr()))
}

/// Dense matrix times column vector, as a dedicated product node.
///
/// # Panics
///
/// Panics if the operand shapes are incompatible; use
/// [`MatVecExpr::try_new`] for a recoverable error.
pub fn matvec<L: IntoExpr, R: IntoExpr>(lhs: L, rhs: R) -> Ex<MatVecExpr<L::Expr, R::Expr>>
where
    R::Expr: Expression<Elem = <L::Expr as Expression>::Elem>,
{
    Ex(MatVecExpr::new(lhs.into_expr(), rhs.into_expr()))
}

/// Row vector times dense matrix (transpose-multiply), as a dedicated
/// product node.
///
/// # Panics
///
/// Panics if the operand shapes are incompatible; use
/// [`VecMatExpr::try_new`] for a recoverable error.
pub fn vecmat<L: IntoExpr, R: IntoExpr>(lhs: L, rhs: R) -> Ex<VecMatExpr<L::Expr, R::Expr>>
where
    R::Expr: Expression<Elem = <L::Expr as Expression>::Elem>,
{
    Ex(VecMatExpr::new(lhs.into_expr(), rhs.into_expr()))
}

/// Norm-preserving reshape: same elements in column-major order, new
/// dimensions. Fails if the element count changes.
pub fn reshape<E: IntoExpr>(expr: E, rows: usize, cols: usize) -> Result<Ex<ReshapeExpr<E::Expr>>> {
    Ok(Ex(ReshapeExpr::try_new(expr.into_expr(), rows, cols)?))
}

//! `std::ops` wiring.
//!
//! Operators are defined on [`Ex`] handles (generic right-hand side) and
//! on container references (concrete right-hand sides), so that
//! `&a + &b`, `&a * &x` and `2.0 * (&a + &b)` all build nodes without
//! touching element data. Every operator panics on a shape mismatch, with
//! the same message as the corresponding `try_new`; shape-fallible code
//! should construct nodes through `try_new` instead.

use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::dense::{DenseMatrix, DenseVector};
use crate::expr::{
    AddExpr, Ex, Expression, IntoExpr, MatMulExpr, MatRef, MatVecExpr, ScaleExpr, SpMatVecExpr,
    SubExpr, VecRef,
};
use crate::scalar::Scalar;
use crate::sparse::CsrMatrix;
use crate::tag::{AddWith, General, MulWith};

// ============================================================================
// Expression handle, generic right-hand side
// ============================================================================

impl<A, R> Add<R> for Ex<A>
where
    A: Expression,
    R: IntoExpr,
    R::Expr: Expression<Elem = A::Elem>,
    A::Tag: AddWith<<R::Expr as Expression>::Tag>,
{
    type Output = Ex<AddExpr<A, R::Expr>>;

    fn add(self, rhs: R) -> Self::Output {
        Ex(AddExpr::new(self.0, rhs.into_expr()))
    }
}

impl<A, R> Sub<R> for Ex<A>
where
    A: Expression,
    R: IntoExpr,
    R::Expr: Expression<Elem = A::Elem>,
    A::Tag: AddWith<<R::Expr as Expression>::Tag>,
{
    type Output = Ex<SubExpr<A, R::Expr>>;

    fn sub(self, rhs: R) -> Self::Output {
        Ex(SubExpr::new(self.0, rhs.into_expr()))
    }
}

impl<A, R> Mul<R> for Ex<A>
where
    A: Expression,
    R: IntoExpr,
    R::Expr: Expression<Elem = A::Elem>,
    A::Tag: MulWith<<R::Expr as Expression>::Tag>,
{
    type Output = Ex<MatMulExpr<A, R::Expr>>;

    fn mul(self, rhs: R) -> Self::Output {
        Ex(MatMulExpr::new(self.0, rhs.into_expr()))
    }
}

impl<A: Expression> Neg for Ex<A> {
    type Output = Ex<ScaleExpr<A, A::Elem>>;

    fn neg(self) -> Self::Output {
        let minus_one = A::Elem::zero() - A::Elem::one();
        self.scale(minus_one)
    }
}

// ============================================================================
// Dense matrix references
// ============================================================================

impl<'a, 'b, T: Scalar> Add<&'b DenseMatrix<T>> for &'a DenseMatrix<T> {
    type Output = Ex<AddExpr<MatRef<'a, T>, MatRef<'b, T>>>;

    fn add(self, rhs: &'b DenseMatrix<T>) -> Self::Output {
        Ex(AddExpr::new(self.into_expr(), rhs.into_expr()))
    }
}

impl<'a, 'b, T: Scalar> Sub<&'b DenseMatrix<T>> for &'a DenseMatrix<T> {
    type Output = Ex<SubExpr<MatRef<'a, T>, MatRef<'b, T>>>;

    fn sub(self, rhs: &'b DenseMatrix<T>) -> Self::Output {
        Ex(SubExpr::new(self.into_expr(), rhs.into_expr()))
    }
}

impl<'a, T: Scalar, B> Add<Ex<B>> for &'a DenseMatrix<T>
where
    B: Expression<Elem = T>,
    General: AddWith<B::Tag>,
{
    type Output = Ex<AddExpr<MatRef<'a, T>, B>>;

    fn add(self, rhs: Ex<B>) -> Self::Output {
        Ex(AddExpr::new(self.into_expr(), rhs.0))
    }
}

impl<'a, T: Scalar, B> Sub<Ex<B>> for &'a DenseMatrix<T>
where
    B: Expression<Elem = T>,
    General: AddWith<B::Tag>,
{
    type Output = Ex<SubExpr<MatRef<'a, T>, B>>;

    fn sub(self, rhs: Ex<B>) -> Self::Output {
        Ex(SubExpr::new(self.into_expr(), rhs.0))
    }
}

impl<'a, 'b, T: Scalar> Mul<&'b DenseMatrix<T>> for &'a DenseMatrix<T> {
    type Output = Ex<MatMulExpr<MatRef<'a, T>, MatRef<'b, T>>>;

    fn mul(self, rhs: &'b DenseMatrix<T>) -> Self::Output {
        Ex(MatMulExpr::new(self.into_expr(), rhs.into_expr()))
    }
}

impl<'a, T: Scalar, B> Mul<Ex<B>> for &'a DenseMatrix<T>
where
    B: Expression<Elem = T>,
    General: MulWith<B::Tag>,
{
    type Output = Ex<MatMulExpr<MatRef<'a, T>, B>>;

    fn mul(self, rhs: Ex<B>) -> Self::Output {
        Ex(MatMulExpr::new(self.into_expr(), rhs.0))
    }
}

impl<'a, 'b, T: Scalar> Mul<&'b DenseVector<T>> for &'a DenseMatrix<T> {
    type Output = Ex<MatVecExpr<MatRef<'a, T>, VecRef<'b, T>>>;

    fn mul(self, rhs: &'b DenseVector<T>) -> Self::Output {
        Ex(MatVecExpr::new(self.into_expr(), rhs.into_expr()))
    }
}

// ============================================================================
// Dense vector references
// ============================================================================

impl<'a, 'b, T: Scalar> Add<&'b DenseVector<T>> for &'a DenseVector<T> {
    type Output = Ex<AddExpr<VecRef<'a, T>, VecRef<'b, T>>>;

    fn add(self, rhs: &'b DenseVector<T>) -> Self::Output {
        Ex(AddExpr::new(self.into_expr(), rhs.into_expr()))
    }
}

impl<'a, 'b, T: Scalar> Sub<&'b DenseVector<T>> for &'a DenseVector<T> {
    type Output = Ex<SubExpr<VecRef<'a, T>, VecRef<'b, T>>>;

    fn sub(self, rhs: &'b DenseVector<T>) -> Self::Output {
        Ex(SubExpr::new(self.into_expr(), rhs.into_expr()))
    }
}

impl<'a, T: Scalar, B> Add<Ex<B>> for &'a DenseVector<T>
where
    B: Expression<Elem = T>,
    General: AddWith<B::Tag>,
{
    type Output = Ex<AddExpr<VecRef<'a, T>, B>>;

    fn add(self, rhs: Ex<B>) -> Self::Output {
        Ex(AddExpr::new(self.into_expr(), rhs.0))
    }
}

impl<'a, T: Scalar, B> Sub<Ex<B>> for &'a DenseVector<T>
where
    B: Expression<Elem = T>,
    General: AddWith<B::Tag>,
{
    type Output = Ex<SubExpr<VecRef<'a, T>, B>>;

    fn sub(self, rhs: Ex<B>) -> Self::Output {
        Ex(SubExpr::new(self.into_expr(), rhs.0))
    }
}

// ============================================================================
// Sparse matrix times dense vector
// ============================================================================

impl<'a, 'b, T: Scalar> Mul<&'b DenseVector<T>> for &'a CsrMatrix<T> {
    type Output = Ex<SpMatVecExpr<'a, T, VecRef<'b, T>>>;

    fn mul(self, rhs: &'b DenseVector<T>) -> Self::Output {
        Ex(SpMatVecExpr::new(self, rhs.into_expr()))
    }
}

impl<'a, T: Scalar, B> Mul<Ex<B>> for &'a CsrMatrix<T>
where
    B: Expression<Elem = T>,
{
    type Output = Ex<SpMatVecExpr<'a, T, B>>;

    fn mul(self, rhs: Ex<B>) -> Self::Output {
        Ex(SpMatVecExpr::new(self, rhs.0))
    }
}

// ============================================================================
// Scalar left factors
// ============================================================================

// `expr * 2.0` cannot coexist with the generic `Mul<R: IntoExpr>` impl,
// so scalar factors go on the left (or through `Ex::scale`).
macro_rules! scalar_lhs {
    ($($t:ty),* $(,)?) => {$(
        impl<E: Expression<Elem = $t>> Mul<Ex<E>> for $t {
            type Output = Ex<ScaleExpr<E, $t>>;

            fn mul(self, rhs: Ex<E>) -> Self::Output {
                rhs.scale(self)
            }
        }

        impl<'a> Mul<&'a DenseMatrix<$t>> for $t {
            type Output = Ex<ScaleExpr<MatRef<'a, $t>, $t>>;

            fn mul(self, rhs: &'a DenseMatrix<$t>) -> Self::Output {
                rhs.as_expr().scale(self)
            }
        }

        impl<'a> Mul<&'a DenseVector<$t>> for $t {
            type Output = Ex<ScaleExpr<VecRef<'a, $t>, $t>>;

            fn mul(self, rhs: &'a DenseVector<$t>) -> Self::Output {
                rhs.as_expr().scale(self)
            }
        }
    )*};
}

scalar_lhs!(
    f32,
    f64,
    i32,
    i64,
    num_complex::Complex32,
    num_complex::Complex64,
);

#[cfg(test)]
mod tests {
    use crate::DenseMatrix;

    #[test]
    fn operator_chain_builds_and_evaluates() {
        let a = DenseMatrix::from_fn(2, 2, |i, j| (i + 2 * j) as f64);
        let b = DenseMatrix::identity(2);
        let c = (2.0 * (&a + &b)).eval();
        assert_eq!(c[[0, 0]], 2.0 * (a[[0, 0]] + 1.0));
        assert_eq!(c[[1, 0]], 2.0 * a[[1, 0]]);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn mismatched_add_panics() {
        let a = DenseMatrix::<f64>::zeros(2, 3);
        let b = DenseMatrix::<f64>::zeros(3, 2);
        let _ = &a + &b;
    }
}

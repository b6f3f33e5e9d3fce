//! Leaf nodes: expression views over containers.
//!
//! Named containers are borrowed; a leaf must not outlive the container
//! it references, which the lifetimes enforce. Temporaries are held by
//! value through the owning leaf types.

use crate::dense::{DenseMatrix, DenseVector};
use crate::eval::PtrRange;
use crate::scalar::Scalar;
use crate::sparse::{CsrMatrix, SparseVector};
use crate::tag::General;

use super::expression::{DenseRef, Ex, Expression, IntoExpr};

/// Borrowing leaf over a dense matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatRef<'a, T> {
    m: &'a DenseMatrix<T>,
}

impl<'a, T: Scalar> Expression for MatRef<'a, T> {
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = true;
    const ALIAS_SAFE: bool = true;

    fn rows(&self) -> usize {
        self.m.rows()
    }

    fn cols(&self) -> usize {
        self.m.cols()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> T {
        self.m[[i, j]]
    }

    fn aliases(&self, target: PtrRange) -> bool {
        target.overlaps(self.m.ptr_range())
    }

    fn as_dense(&self) -> Option<DenseRef<'_, T>> {
        Some(DenseRef {
            data: self.m.as_slice(),
            rows: self.m.rows(),
            cols: self.m.cols(),
        })
    }
}

/// Owning leaf over a dense matrix (a materialized temporary).
#[derive(Debug, Clone)]
pub struct MatOwned<T> {
    m: DenseMatrix<T>,
}

impl<T: Scalar> Expression for MatOwned<T> {
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = true;
    const ALIAS_SAFE: bool = true;

    fn rows(&self) -> usize {
        self.m.rows()
    }

    fn cols(&self) -> usize {
        self.m.cols()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> T {
        self.m[[i, j]]
    }

    fn aliases(&self, _target: PtrRange) -> bool {
        // storage owned by the tree is unreachable as an assignment target
        false
    }

    fn as_dense(&self) -> Option<DenseRef<'_, T>> {
        Some(DenseRef {
            data: self.m.as_slice(),
            rows: self.m.rows(),
            cols: self.m.cols(),
        })
    }
}

/// Borrowing leaf over a dense column vector (an n x 1 expression).
#[derive(Debug, Clone, Copy)]
pub struct VecRef<'a, T> {
    v: &'a DenseVector<T>,
}

impl<'a, T: Scalar> Expression for VecRef<'a, T> {
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = true;
    const ALIAS_SAFE: bool = true;

    fn rows(&self) -> usize {
        self.v.len()
    }

    fn cols(&self) -> usize {
        1
    }

    #[inline(always)]
    fn get(&self, i: usize, _j: usize) -> T {
        self.v[i]
    }

    fn aliases(&self, target: PtrRange) -> bool {
        target.overlaps(self.v.ptr_range())
    }

    fn as_dense(&self) -> Option<DenseRef<'_, T>> {
        Some(DenseRef {
            data: self.v.as_slice(),
            rows: self.v.len(),
            cols: 1,
        })
    }
}

/// Owning leaf over a dense column vector.
#[derive(Debug, Clone)]
pub struct VecOwned<T> {
    v: DenseVector<T>,
}

impl<T: Scalar> Expression for VecOwned<T> {
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = true;
    const ALIAS_SAFE: bool = true;

    fn rows(&self) -> usize {
        self.v.len()
    }

    fn cols(&self) -> usize {
        1
    }

    #[inline(always)]
    fn get(&self, i: usize, _j: usize) -> T {
        self.v[i]
    }

    fn aliases(&self, _target: PtrRange) -> bool {
        false
    }

    fn as_dense(&self) -> Option<DenseRef<'_, T>> {
        Some(DenseRef {
            data: self.v.as_slice(),
            rows: self.v.len(),
            cols: 1,
        })
    }
}

/// Borrowing leaf over a CSR matrix. Element access is a per-row binary
/// search; the dedicated sparse product nodes iterate stored entries
/// instead.
#[derive(Debug, Clone, Copy)]
pub struct CsrRef<'a, T> {
    m: &'a CsrMatrix<T>,
}

impl<'a, T: Scalar> Expression for CsrRef<'a, T> {
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = true;
    const ALIAS_SAFE: bool = true;

    fn rows(&self) -> usize {
        self.m.rows()
    }

    fn cols(&self) -> usize {
        self.m.cols()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        self.m.get(i, j)
    }

    fn aliases(&self, target: PtrRange) -> bool {
        target.overlaps(self.m.ptr_range())
    }
}

/// Borrowing leaf over a sparse vector.
#[derive(Debug, Clone, Copy)]
pub struct SpVecRef<'a, T> {
    v: &'a SparseVector<T>,
}

impl<'a, T: Scalar> Expression for SpVecRef<'a, T> {
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = true;
    const ALIAS_SAFE: bool = true;

    fn rows(&self) -> usize {
        self.v.len()
    }

    fn cols(&self) -> usize {
        1
    }

    #[inline]
    fn get(&self, i: usize, _j: usize) -> T {
        self.v.get(i)
    }

    fn aliases(&self, target: PtrRange) -> bool {
        target.overlaps(self.v.ptr_range())
    }
}

// ============================================================================
// IntoExpr conversions and inherent as_expr helpers
// ============================================================================

impl<'a, T: Scalar> IntoExpr for &'a DenseMatrix<T> {
    type Expr = MatRef<'a, T>;

    fn into_expr(self) -> MatRef<'a, T> {
        MatRef { m: self }
    }
}

impl<T: Scalar> IntoExpr for DenseMatrix<T> {
    type Expr = MatOwned<T>;

    fn into_expr(self) -> MatOwned<T> {
        MatOwned { m: self }
    }
}

impl<'a, T: Scalar> IntoExpr for &'a DenseVector<T> {
    type Expr = VecRef<'a, T>;

    fn into_expr(self) -> VecRef<'a, T> {
        VecRef { v: self }
    }
}

impl<T: Scalar> IntoExpr for DenseVector<T> {
    type Expr = VecOwned<T>;

    fn into_expr(self) -> VecOwned<T> {
        VecOwned { v: self }
    }
}

impl<'a, T: Scalar> IntoExpr for &'a CsrMatrix<T> {
    type Expr = CsrRef<'a, T>;

    fn into_expr(self) -> CsrRef<'a, T> {
        CsrRef { m: self }
    }
}

impl<'a, T: Scalar> IntoExpr for &'a SparseVector<T> {
    type Expr = SpVecRef<'a, T>;

    fn into_expr(self) -> SpVecRef<'a, T> {
        SpVecRef { v: self }
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// Borrow as a leaf expression handle.
    pub fn as_expr(&self) -> Ex<MatRef<'_, T>> {
        Ex(MatRef { m: self })
    }
}

impl<T: Scalar> DenseVector<T> {
    /// Borrow as a leaf expression handle.
    pub fn as_expr(&self) -> Ex<VecRef<'_, T>> {
        Ex(VecRef { v: self })
    }
}

impl<T: Scalar> CsrMatrix<T> {
    /// Borrow as a leaf expression handle.
    pub fn as_expr(&self) -> Ex<CsrRef<'_, T>> {
        Ex(CsrRef { m: self })
    }
}

impl<T: Scalar> SparseVector<T> {
    /// Borrow as a leaf expression handle.
    pub fn as_expr(&self) -> Ex<SpVecRef<'_, T>> {
        Ex(SpVecRef { v: self })
    }
}

//! Product nodes. Products are not elementwise: their `get` recomputes an
//! inner reduction per call, so the evaluation engine materializes their
//! operands and hands the bulk work to a dedicated kernel instead of
//! fusing them into an enclosing loop.

use num_traits::{One, Zero};

use crate::backend::GemmKernel;
use crate::eval::{EvalContext, PtrRange};
use crate::sparse::CsrMatrix;
use crate::tag::{General, MulWith, Region, Structure};
use crate::{ExprError, Result};

use super::expression::Expression;

/// Matrix-matrix product.
///
/// The structural tag follows the product table: `Upper * Upper` is
/// provably `Upper`, `StrictLower * Lower` is provably `StrictLower`, and
/// so on. When the tag certifies a triangular region, evaluation skips
/// the provably-zero half entirely.
#[derive(Debug, Clone, Copy)]
pub struct MatMulExpr<L, R> {
    lhs: L,
    rhs: R,
    rows: usize,
    cols: usize,
    inner: usize,
}

impl<L, R> MatMulExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
    L::Tag: MulWith<R::Tag>,
{
    /// Construct, checking the inner dimension.
    pub fn try_new(lhs: L, rhs: R) -> Result<Self> {
        if lhs.cols() != rhs.rows() {
            return Err(ExprError::InnerDimension {
                lhs_cols: lhs.cols(),
                rhs_rows: rhs.rows(),
            });
        }
        let (rows, cols, inner) = (lhs.rows(), rhs.cols(), lhs.cols());
        Ok(Self {
            lhs,
            rhs,
            rows,
            cols,
            inner,
        })
    }

    /// Construct, panicking on an inner dimension mismatch.
    pub fn new(lhs: L, rhs: R) -> Self {
        match Self::try_new(lhs, rhs) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<L, R> Expression for MatMulExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
    L::Tag: MulWith<R::Tag>,
{
    type Elem = L::Elem;
    type Tag = <L::Tag as MulWith<R::Tag>>::Output;

    const ELEMENTWISE: bool = false;
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = L::SERIAL_ONLY || R::SERIAL_ONLY;
    const NO_SIMD: bool = L::NO_SIMD || R::NO_SIMD;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, i: usize, j: usize) -> Self::Elem {
        let mut acc = Self::Elem::zero();
        for k in 0..self.inner {
            acc += self.lhs.get(i, k) * self.rhs.get(k, j);
        }
        acc
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.lhs.aliases(target) || self.rhs.aliases(target)
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        // A triangular tag makes the region loop cheaper than a full GEMM:
        // half the output is known zero and each kept entry needs only the
        // inner products the region allows. Barriers take this path too.
        if Self::SERIAL_ONLY || !matches!(<Self::Tag as Structure>::REGION, Region::Full) {
            crate::eval::fill_region(self, out, ctx);
            return;
        }
        let a = crate::eval::dense_operand(&self.lhs, ctx);
        let b = crate::eval::dense_operand(&self.rhs, ctx);
        if Self::NO_SIMD {
            crate::backend::naive_gemm(
                self.rows,
                self.cols,
                self.inner,
                Self::Elem::one(),
                &a,
                self.rows,
                &b,
                self.inner,
                Self::Elem::zero(),
                out,
                self.rows,
            );
        } else {
            Self::Elem::gemm(
                self.rows,
                self.cols,
                self.inner,
                Self::Elem::one(),
                &a,
                self.rows,
                &b,
                self.inner,
                Self::Elem::zero(),
                out,
                self.rows,
            );
        }
    }
}

/// Matrix times column vector. The result is a column.
#[derive(Debug, Clone, Copy)]
pub struct MatVecExpr<L, R> {
    lhs: L,
    rhs: R,
    rows: usize,
    inner: usize,
}

impl<L, R> MatVecExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    pub fn try_new(lhs: L, rhs: R) -> Result<Self> {
        if rhs.cols() != 1 || lhs.cols() != rhs.rows() {
            return Err(ExprError::InnerDimension {
                lhs_cols: lhs.cols(),
                rhs_rows: rhs.rows(),
            });
        }
        let (rows, inner) = (lhs.rows(), lhs.cols());
        Ok(Self {
            lhs,
            rhs,
            rows,
            inner,
        })
    }

    pub fn new(lhs: L, rhs: R) -> Self {
        match Self::try_new(lhs, rhs) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<L, R> Expression for MatVecExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    type Elem = L::Elem;
    type Tag = General;

    const ELEMENTWISE: bool = false;
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = L::SERIAL_ONLY || R::SERIAL_ONLY;
    const NO_SIMD: bool = L::NO_SIMD || R::NO_SIMD;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        1
    }

    fn get(&self, i: usize, _j: usize) -> Self::Elem {
        let mut acc = Self::Elem::zero();
        for k in 0..self.inner {
            acc += self.lhs.get(i, k) * self.rhs.get(k, 0);
        }
        acc
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.lhs.aliases(target) || self.rhs.aliases(target)
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        if Self::SERIAL_ONLY {
            crate::eval::fill_region(self, out, ctx);
            return;
        }
        let a = crate::eval::dense_operand(&self.lhs, ctx);
        let x = crate::eval::dense_operand(&self.rhs, ctx);
        out.fill(Self::Elem::zero());
        // column-major: accumulate x[k] * A[:, k]
        for k in 0..self.inner {
            let col = &a[k * self.rows..(k + 1) * self.rows];
            if Self::NO_SIMD {
                for (o, &v) in out.iter_mut().zip(col) {
                    *o += x[k] * v;
                }
            } else {
                crate::simd::axpy(x[k], col, out);
            }
        }
    }
}

/// Row vector times matrix. The result is a single row.
#[derive(Debug, Clone, Copy)]
pub struct VecMatExpr<L, R> {
    lhs: L,
    rhs: R,
    cols: usize,
    inner: usize,
}

impl<L, R> VecMatExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    pub fn try_new(lhs: L, rhs: R) -> Result<Self> {
        if lhs.cols() != 1 || lhs.rows() != rhs.rows() {
            return Err(ExprError::InnerDimension {
                lhs_cols: lhs.rows(),
                rhs_rows: rhs.rows(),
            });
        }
        let (cols, inner) = (rhs.cols(), rhs.rows());
        Ok(Self {
            lhs,
            rhs,
            cols,
            inner,
        })
    }

    pub fn new(lhs: L, rhs: R) -> Self {
        match Self::try_new(lhs, rhs) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<L, R> Expression for VecMatExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
{
    type Elem = L::Elem;
    type Tag = General;

    const ELEMENTWISE: bool = false;
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = L::SERIAL_ONLY || R::SERIAL_ONLY;
    const NO_SIMD: bool = L::NO_SIMD || R::NO_SIMD;

    fn rows(&self) -> usize {
        1
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, _i: usize, j: usize) -> Self::Elem {
        let mut acc = Self::Elem::zero();
        for k in 0..self.inner {
            acc += self.lhs.get(k, 0) * self.rhs.get(k, j);
        }
        acc
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.lhs.aliases(target) || self.rhs.aliases(target)
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        if Self::SERIAL_ONLY {
            crate::eval::fill_region(self, out, ctx);
            return;
        }
        let x = crate::eval::dense_operand(&self.lhs, ctx);
        let a = crate::eval::dense_operand(&self.rhs, ctx);
        // one dot product per output column
        for (j, o) in out.iter_mut().enumerate() {
            let col = &a[j * self.inner..(j + 1) * self.inner];
            *o = if Self::NO_SIMD {
                let mut acc = Self::Elem::zero();
                for (&u, &v) in x.iter().zip(col) {
                    acc += u * v;
                }
                acc
            } else {
                crate::simd::dot(&x, col)
            };
        }
    }
}

/// Sparse matrix times dense column vector.
///
/// Work is proportional to the number of stored entries; rows without
/// stored entries produce exact zeros.
#[derive(Debug, Clone, Copy)]
pub struct SpMatVecExpr<'a, T, R> {
    matrix: &'a CsrMatrix<T>,
    rhs: R,
}

impl<'a, T, R> SpMatVecExpr<'a, T, R>
where
    T: crate::scalar::Scalar,
    R: Expression<Elem = T>,
{
    pub fn try_new(matrix: &'a CsrMatrix<T>, rhs: R) -> Result<Self> {
        if rhs.cols() != 1 || matrix.cols() != rhs.rows() {
            return Err(ExprError::InnerDimension {
                lhs_cols: matrix.cols(),
                rhs_rows: rhs.rows(),
            });
        }
        Ok(Self { matrix, rhs })
    }

    pub fn new(matrix: &'a CsrMatrix<T>, rhs: R) -> Self {
        match Self::try_new(matrix, rhs) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, T, R> Expression for SpMatVecExpr<'a, T, R>
where
    T: crate::scalar::Scalar,
    R: Expression<Elem = T>,
{
    type Elem = T;
    type Tag = General;

    const ELEMENTWISE: bool = false;
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = R::SERIAL_ONLY;
    const NO_SIMD: bool = R::NO_SIMD;

    fn rows(&self) -> usize {
        self.matrix.rows()
    }

    fn cols(&self) -> usize {
        1
    }

    fn get(&self, i: usize, _j: usize) -> Self::Elem {
        let mut acc = T::zero();
        for (col, &v) in self.matrix.row(i) {
            acc += v * self.rhs.get(col, 0);
        }
        acc
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.matrix.ptr_range().overlaps(target) || self.rhs.aliases(target)
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        let x = crate::eval::dense_operand(&self.rhs, ctx);
        for (i, o) in out.iter_mut().enumerate() {
            let mut acc = T::zero();
            for (col, &v) in self.matrix.row(i) {
                acc += v * x[col];
            }
            *o = acc;
        }
    }
}

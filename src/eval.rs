//! The evaluation engine: alias analysis, strategy selection and the
//! region-restricted fill loops behind every assignment.
//!
//! Assignment is the only trigger of computation. `assign` checks shapes,
//! runs the conservative alias analysis, then either lets the root node
//! evaluate straight into the target buffer or routes it through a
//! temporary when the target overlaps an operand of a node that reads
//! positions other than the one being written.

use std::ops::Deref;

use num_traits::{One, Zero};

use crate::dense::{DenseMatrix, DenseVector};
use crate::expr::Expression;
use crate::scalar::{Conjugate, Scalar};
use crate::tag::{Region, Structure};
use crate::{ExprError, Result};

// ============================================================================
// Alias analysis
// ============================================================================

/// Byte address range of a container's storage. Two containers alias iff
/// their ranges overlap; distinct allocations never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtrRange {
    start: usize,
    end: usize,
}

impl PtrRange {
    pub fn of_slice<T>(slice: &[T]) -> Self {
        let start = slice.as_ptr() as usize;
        Self {
            start,
            end: start + std::mem::size_of_val(slice),
        }
    }

    pub fn overlaps(self, other: PtrRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// ============================================================================
// Assignment
// ============================================================================

/// How an assignment was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// The root node evaluated directly into the target buffer.
    #[default]
    Direct,
    /// The tree was evaluated into a temporary first, then copied.
    Temporary,
}

/// Per-assignment bookkeeping, reported back to the caller. Tests use it
/// to pin down which path an assignment took.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext {
    /// The target storage overlapped a leaf of the expression.
    ///
    /// With owning containers as targets the borrow checker already
    /// prevents holding `&mut` to the target while it appears as a leaf,
    /// so this only fires for targets whose storage overlaps a leaf
    /// through a separate allocation view (for example a target backed
    /// by a sub-slice of a buffer another leaf also reads).
    pub aliased: bool,
    /// Somewhere in the evaluation a temporary buffer was allocated,
    /// either for alias safety or to feed a product kernel.
    pub used_temporary: bool,
    /// Strategy chosen for the root assignment.
    pub strategy: Strategy,
}

/// A container that an expression can be assigned into.
pub trait AssignTarget<T: Scalar> {
    fn target_rows(&self) -> usize;
    fn target_cols(&self) -> usize;
    fn target_range(&self) -> PtrRange;
    fn buf_mut(&mut self) -> &mut [T];
}

impl<T: Scalar> AssignTarget<T> for DenseMatrix<T> {
    fn target_rows(&self) -> usize {
        self.rows()
    }

    fn target_cols(&self) -> usize {
        self.cols()
    }

    fn target_range(&self) -> PtrRange {
        self.ptr_range()
    }

    fn buf_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Scalar> AssignTarget<T> for DenseVector<T> {
    fn target_rows(&self) -> usize {
        self.len()
    }

    fn target_cols(&self) -> usize {
        1
    }

    fn target_range(&self) -> PtrRange {
        self.ptr_range()
    }

    fn buf_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/// Evaluate `expr` into `target`, replacing its contents.
pub fn try_assign<T, E, G>(target: &mut G, expr: &E) -> Result<EvalContext>
where
    T: Scalar,
    E: Expression<Elem = T>,
    G: AssignTarget<T>,
{
    let (rows, cols) = (target.target_rows(), target.target_cols());
    if rows != expr.rows() || cols != expr.cols() {
        return Err(ExprError::DimensionMismatch(
            rows,
            cols,
            expr.rows(),
            expr.cols(),
        ));
    }

    let mut ctx = EvalContext::default();
    ctx.aliased = expr.aliases(target.target_range());

    if ctx.aliased && !E::ALIAS_SAFE {
        // the target feeds the computation: evaluate fully, then commit
        let mut tmp = vec![T::zero(); rows * cols];
        expr.eval_into(&mut tmp, &mut ctx);
        target.buf_mut().copy_from_slice(&tmp);
        ctx.used_temporary = true;
        ctx.strategy = Strategy::Temporary;
    } else {
        expr.eval_into(target.buf_mut(), &mut ctx);
    }

    validate_result::<T, E::Tag>(target.buf_mut(), rows, cols);
    Ok(ctx)
}

/// Evaluate `expr` into `target`.
///
/// # Panics
///
/// Panics on a shape mismatch; use [`try_assign`] for a recoverable
/// error.
pub fn assign<T, E, G>(target: &mut G, expr: &E) -> EvalContext
where
    T: Scalar,
    E: Expression<Elem = T>,
    G: AssignTarget<T>,
{
    match try_assign(target, expr) {
        Ok(ctx) => ctx,
        Err(e) => panic!("{e}"),
    }
}

fn compound_assign<T, E, G, F>(target: &mut G, expr: &E, f: F) -> Result<EvalContext>
where
    T: Scalar,
    E: Expression<Elem = T>,
    G: AssignTarget<T>,
    F: Fn(T, T) -> T,
{
    let (rows, cols) = (target.target_rows(), target.target_cols());
    if rows != expr.rows() || cols != expr.cols() {
        return Err(ExprError::DimensionMismatch(
            rows,
            cols,
            expr.rows(),
            expr.cols(),
        ));
    }

    let mut ctx = EvalContext::default();
    ctx.aliased = expr.aliases(target.target_range());

    if E::ELEMENTWISE && !ctx.aliased {
        // fused in-place update, skipping the provably-zero region
        let buf = target.buf_mut();
        match <E::Tag as Structure>::REGION {
            Region::Zero => {}
            _ => {
                for j in 0..cols {
                    for i in 0..rows {
                        let o = &mut buf[i + j * rows];
                        *o = f(*o, expr.get(i, j));
                    }
                }
            }
        }
    } else {
        let mut tmp = vec![T::zero(); rows * cols];
        expr.eval_into(&mut tmp, &mut ctx);
        ctx.used_temporary = true;
        ctx.strategy = Strategy::Temporary;
        for (o, &v) in target.buf_mut().iter_mut().zip(&tmp) {
            *o = f(*o, v);
        }
    }
    Ok(ctx)
}

/// `target += expr`.
///
/// # Panics
///
/// Panics on a shape mismatch.
pub fn assign_add<T, E, G>(target: &mut G, expr: &E) -> EvalContext
where
    T: Scalar,
    E: Expression<Elem = T>,
    G: AssignTarget<T>,
{
    match compound_assign(target, expr, |a, b| a + b) {
        Ok(ctx) => ctx,
        Err(e) => panic!("{e}"),
    }
}

/// `target -= expr`.
///
/// # Panics
///
/// Panics on a shape mismatch.
pub fn assign_sub<T, E, G>(target: &mut G, expr: &E) -> EvalContext
where
    T: Scalar,
    E: Expression<Elem = T>,
    G: AssignTarget<T>,
{
    match compound_assign(target, expr, |a, b| a - b) {
        Ok(ctx) => ctx,
        Err(e) => panic!("{e}"),
    }
}

#[cfg(feature = "validate-tags")]
fn validate_result<T: Scalar, S: Structure>(buf: &[T], rows: usize, cols: usize) {
    if !crate::tag::holds::<S, T>(buf, rows, cols) {
        panic!(
            "structural declaration violated: assigned values do not satisfy `{}`",
            S::NAME
        );
    }
}

#[cfg(not(feature = "validate-tags"))]
fn validate_result<T: Scalar, S: Structure>(_buf: &[T], _rows: usize, _cols: usize) {}

// ============================================================================
// Fill loops
// ============================================================================

/// Fused evaluation of `expr` into a tight column-major buffer,
/// restricted to the structurally nonzero region certified by the tag.
/// The skipped region is written with exact zeros (or exact ones on a
/// unit diagonal), never with computed values.
pub(crate) fn fill_region<E: Expression>(expr: &E, out: &mut [E::Elem], _ctx: &mut EvalContext) {
    let (rows, cols) = (expr.rows(), expr.cols());
    debug_assert_eq!(out.len(), rows * cols);

    match <E::Tag as Structure>::REGION {
        Region::Zero => out.fill(E::Elem::zero()),
        Region::Diagonal { unit } => {
            out.fill(E::Elem::zero());
            for d in 0..rows.min(cols) {
                out[d + d * rows] = if unit { E::Elem::one() } else { expr.get(d, d) };
            }
        }
        Region::Lower { strict, unit } => {
            out.fill(E::Elem::zero());
            for j in 0..cols {
                if unit && j < rows {
                    out[j + j * rows] = E::Elem::one();
                }
                let start = if strict || unit { j + 1 } else { j };
                for i in start..rows {
                    out[i + j * rows] = expr.get(i, j);
                }
            }
        }
        Region::Upper { strict, unit } => {
            out.fill(E::Elem::zero());
            for j in 0..cols {
                let end = if strict || unit { j.min(rows) } else { (j + 1).min(rows) };
                for i in 0..end {
                    out[i + j * rows] = expr.get(i, j);
                }
                if unit && j < rows {
                    out[j + j * rows] = E::Elem::one();
                }
            }
        }
        Region::Full => {
            if (E::Tag::IS_SYMMETRIC || E::Tag::IS_HERMITIAN) && rows == cols {
                // compute one triangle, mirror the other
                for j in 0..cols {
                    for i in 0..=j {
                        let v = expr.get(i, j);
                        out[i + j * rows] = v;
                        out[j + i * rows] = if E::Tag::IS_HERMITIAN { v.conj() } else { v };
                    }
                }
            } else if E::SERIAL_ONLY || E::NO_SIMD {
                fill_full(expr, out, rows, cols);
            } else {
                crate::simd::dispatch_if_large(rows * cols, || fill_full(expr, out, rows, cols));
            }
        }
    }
}

fn fill_full<E: Expression>(expr: &E, out: &mut [E::Elem], rows: usize, cols: usize) {
    for j in 0..cols {
        for (i, o) in out[j * rows..(j + 1) * rows].iter_mut().enumerate() {
            *o = expr.get(i, j);
        }
    }
}

// ============================================================================
// Operand materialization for kernels
// ============================================================================

/// A dense column-major view of an operand: borrowed straight from a
/// container leaf when possible, otherwise evaluated into an owned
/// buffer.
pub(crate) enum Operand<'a, T> {
    Borrowed(&'a [T]),
    Owned(Vec<T>),
}

impl<T> Deref for Operand<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            Operand::Borrowed(s) => s,
            Operand::Owned(v) => v,
        }
    }
}

/// Dense column-major elements of `expr`, materializing only when no
/// existing buffer is available.
pub(crate) fn dense_operand<'a, E: Expression>(
    expr: &'a E,
    ctx: &mut EvalContext,
) -> Operand<'a, E::Elem> {
    if let Some(d) = expr.as_dense() {
        Operand::Borrowed(d.data)
    } else {
        let mut buf = vec![E::Elem::zero(); expr.rows() * expr.cols()];
        expr.eval_into(&mut buf, ctx);
        ctx.used_temporary = true;
        Operand::Owned(buf)
    }
}

enum Side<'a, E: Expression> {
    Lazy(&'a E),
    Mat(Operand<'a, E::Elem>),
}

impl<E: Expression> Side<'_, E> {
    #[inline(always)]
    fn get(&self, i: usize, j: usize, rows: usize) -> E::Elem {
        match self {
            Side::Lazy(e) => e.get(i, j),
            Side::Mat(m) => m[i + j * rows],
        }
    }
}

/// Combine two operands elementwise into `out`. Sides that host a product
/// somewhere below are materialized once up front; elementwise sides stay
/// lazy and fuse into the combining pass.
#[allow(clippy::too_many_arguments)]
pub(crate) fn binary_into<L, R, F>(
    lhs: &L,
    rhs: &R,
    f: F,
    out: &mut [L::Elem],
    rows: usize,
    cols: usize,
    serial: bool,
    nosimd: bool,
    ctx: &mut EvalContext,
) where
    L: Expression,
    R: Expression<Elem = L::Elem>,
    F: Fn(L::Elem, L::Elem) -> L::Elem,
{
    let l = if L::ELEMENTWISE {
        Side::Lazy(lhs)
    } else {
        Side::Mat(dense_operand(lhs, ctx))
    };
    let r = if R::ELEMENTWISE {
        Side::Lazy(rhs)
    } else {
        Side::Mat(dense_operand(rhs, ctx))
    };

    let mut combine = move || {
        for j in 0..cols {
            for (i, o) in out[j * rows..(j + 1) * rows].iter_mut().enumerate() {
                *o = f(l.get(i, j, rows), r.get(i, j, rows));
            }
        }
    };
    if serial || nosimd {
        combine();
    } else {
        crate::simd::dispatch_if_large(rows * cols, combine);
    }
}

/// Apply `f` to every element of a materialized operand, writing into
/// `out`. Used by nodes whose operand hosts a product below.
#[allow(clippy::too_many_arguments)]
pub(crate) fn unary_into<E, F>(
    operand: &E,
    f: F,
    out: &mut [E::Elem],
    rows: usize,
    cols: usize,
    serial: bool,
    nosimd: bool,
    ctx: &mut EvalContext,
) where
    E: Expression,
    F: Fn(E::Elem) -> E::Elem,
{
    let m = dense_operand(operand, ctx);
    let mut apply = move || {
        for (o, &v) in out.iter_mut().zip(m.iter()) {
            *o = f(v);
        }
    };
    if serial || nosimd {
        apply();
    } else {
        crate::simd::dispatch_if_large(rows * cols, apply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_ranges_of_distinct_allocations_do_not_overlap() {
        let a = vec![0.0f64; 8];
        let b = vec![0.0f64; 8];
        assert!(!PtrRange::of_slice(&a).overlaps(PtrRange::of_slice(&b)));
        assert!(PtrRange::of_slice(&a).overlaps(PtrRange::of_slice(&a[4..])));
    }

    #[test]
    fn assign_checks_shapes() {
        let a = DenseMatrix::<f64>::zeros(2, 3);
        let mut c = DenseMatrix::<f64>::zeros(3, 2);
        let err = try_assign(&mut c, &a.as_expr()).unwrap_err();
        assert!(matches!(err, ExprError::DimensionMismatch(..)));
    }
}

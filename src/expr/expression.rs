//! The core expression trait and the `Ex` handle.

use crate::dense::DenseMatrix;
use crate::eval::{EvalContext, PtrRange};
use crate::scalar::Scalar;
use crate::tag::{
    Diagonal, Hermitian, JoinWith, Lower, StrictLower, StrictUpper, Structure, Symmetric,
    UnitLower, UnitUpper, Upper,
};
use crate::Result;

use super::barrier::{NoAliasExpr, NoSimdExpr, SerialExpr};
use super::declare::Declare;
use super::reshape::ReshapeExpr;
use super::scale::{ScalarArg, ScaleExpr};
use super::transpose::{AdjExpr, TransExpr};

/// Borrowed view of a tight column-major buffer, returned by expressions
/// whose elements already sit in dense storage. Lets the product kernels
/// skip materialization for container leaves.
#[derive(Debug, Clone, Copy)]
pub struct DenseRef<'a, T> {
    pub data: &'a [T],
    pub rows: usize,
    pub cols: usize,
}

/// A deferred, non-materializing computation over sub-expressions.
///
/// Implementations are lightweight descriptors: construction performs the
/// shape compatibility check and caches dimensions, nothing else. The
/// associated consts are the static introspection surface used by the
/// evaluation engine (and by conformance tests) to pick a strategy
/// without runtime queries.
pub trait Expression {
    /// Element type of the materialized result.
    type Elem: Scalar;
    /// Structural tag, provably correct for all operand values.
    type Tag: Structure;

    /// `get` is O(1) per element, so the node fuses into a single pass.
    const ELEMENTWISE: bool;
    /// Evaluating into a target that aliases an operand is safe without a
    /// temporary (position-wise reads only). Product-like and
    /// index-shuffling nodes must leave this `false`.
    const ALIAS_SAFE: bool;
    /// A barrier below forbids blocked/vectorized evaluation entirely.
    const SERIAL_ONLY: bool = false;
    /// A barrier below forbids SIMD kernels (blocked scalar loops stay
    /// allowed).
    const NO_SIMD: bool = false;
    /// This node is a structural declaration wrapper.
    const IS_DECLARATION: bool = false;
    /// Evaluating this node writes back into one of its operands.
    const MODIFIES_OPERAND: bool = false;

    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    /// Element at `(i, j)`, computed on demand. For non-elementwise nodes
    /// (products) this recomputes the full inner reduction per call;
    /// callers needing many elements should assign to a container first.
    fn get(&self, i: usize, j: usize) -> Self::Elem;

    /// Does any leaf container of this subtree share storage with
    /// `target`? Conservative: product nodes report their operands'
    /// answer, no-alias barriers prune their subtree.
    fn aliases(&self, target: PtrRange) -> bool;

    /// The elements of this expression as an existing tight column-major
    /// buffer, if it has one. Only container leaves and value-preserving
    /// wrappers return `Some`.
    fn as_dense(&self) -> Option<DenseRef<'_, Self::Elem>> {
        None
    }

    /// Evaluate into a tight column-major buffer of exactly
    /// `rows() * cols()` elements. Nodes with a dedicated kernel override
    /// this; the default is the fused region-restricted loop.
    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext)
    where
        Self: Sized,
    {
        crate::eval::fill_region(self, out, ctx);
    }

    /// Decay to an owning container.
    fn eval(&self) -> DenseMatrix<Self::Elem>
    where
        Self: Sized,
    {
        let mut out = DenseMatrix::zeros(self.rows(), self.cols());
        let mut ctx = EvalContext::default();
        self.eval_into(out.as_mut_slice(), &mut ctx);
        out
    }
}

/// Conversion into a bare expression node. Implemented by [`Ex`], by
/// container references (borrowing leaves) and by containers themselves
/// (owning leaves for temporaries).
pub trait IntoExpr {
    type Expr: Expression;

    fn into_expr(self) -> Self::Expr;
}

impl<E: Expression> IntoExpr for Ex<E> {
    type Expr = E;

    fn into_expr(self) -> E {
        self.0
    }
}

/// Expression handle: a thin newtype that carries the operator overloads
/// and the fluent builder methods. Wrapping keeps the `std::ops` impls
/// coherent while the node types stay plain data.
#[derive(Debug, Clone, Copy)]
pub struct Ex<E>(pub E);

impl<E: Expression> Ex<E> {
    pub fn into_inner(self) -> E {
        self.0
    }

    pub fn rows(&self) -> usize {
        self.0.rows()
    }

    pub fn cols(&self) -> usize {
        self.0.cols()
    }

    /// Transpose.
    pub fn t(self) -> Ex<TransExpr<E>> {
        Ex(TransExpr::new(self.0))
    }

    /// Conjugate transpose.
    pub fn adjoint(self) -> Ex<AdjExpr<E>> {
        Ex(AdjExpr::new(self.0))
    }

    /// Multiply every element by `factor`. Use [`crate::OneArg`] /
    /// [`crate::ZeroArg`] for factors known at compile time; the trivial
    /// multiplication folds out of the generated loop.
    pub fn scale<S: ScalarArg<E::Elem>>(self, factor: S) -> Ex<ScaleExpr<E, S>> {
        Ex(ScaleExpr::new(self.0, factor))
    }

    /// Norm-preserving reshape to `rows` x `cols`.
    pub fn reshape(self, rows: usize, cols: usize) -> Result<Ex<ReshapeExpr<E>>> {
        Ok(Ex(ReshapeExpr::try_new(self.0, rows, cols)?))
    }

    /// Evaluate the tree into a fresh dense matrix.
    pub fn eval(&self) -> DenseMatrix<E::Elem> {
        self.0.eval()
    }

    /// Evaluate a column-shaped tree into a fresh dense vector.
    ///
    /// # Panics
    ///
    /// Panics if the expression is not a single column.
    pub fn eval_vector(&self) -> crate::dense::DenseVector<E::Elem> {
        assert_eq!(self.cols(), 1, "eval_vector requires a column expression");
        let mut out = crate::dense::DenseVector::zeros(self.rows());
        let mut ctx = EvalContext::default();
        self.0.eval_into(out.as_mut_slice(), &mut ctx);
        out
    }

    // ------------------------------------------------------------------
    // Evaluation barriers
    // ------------------------------------------------------------------

    /// Force a serial, non-blocked, non-SIMD evaluation path. The numeric
    /// result is unchanged.
    pub fn serial(self) -> Ex<SerialExpr<E>> {
        Ex(SerialExpr::new(self.0))
    }

    /// Forbid SIMD kernels while keeping the blocked strategy. The
    /// numeric result is unchanged.
    pub fn nosimd(self) -> Ex<NoSimdExpr<E>> {
        Ex(NoSimdExpr::new(self.0))
    }

    /// Assert that no assignment target aliases any leaf of this subtree,
    /// skipping the safety temporary. Caller-certified.
    pub fn noalias(self) -> Ex<NoAliasExpr<E>> {
        Ex(NoAliasExpr::new(self.0))
    }

    // ------------------------------------------------------------------
    // Structural declarations (caller-certified promises)
    // ------------------------------------------------------------------

    /// Declare the result symmetric.
    pub fn declare_symmetric(self) -> Ex<Declare<E, Symmetric>>
    where
        E::Tag: JoinWith<Symmetric>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result Hermitian.
    pub fn declare_hermitian(self) -> Ex<Declare<E, Hermitian>>
    where
        E::Tag: JoinWith<Hermitian>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result lower triangular.
    pub fn declare_lower(self) -> Ex<Declare<E, Lower>>
    where
        E::Tag: JoinWith<Lower>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result upper triangular.
    pub fn declare_upper(self) -> Ex<Declare<E, Upper>>
    where
        E::Tag: JoinWith<Upper>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result diagonal.
    pub fn declare_diagonal(self) -> Ex<Declare<E, Diagonal>>
    where
        E::Tag: JoinWith<Diagonal>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result strictly lower triangular.
    pub fn declare_strictly_lower(self) -> Ex<Declare<E, StrictLower>>
    where
        E::Tag: JoinWith<StrictLower>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result strictly upper triangular.
    pub fn declare_strictly_upper(self) -> Ex<Declare<E, StrictUpper>>
    where
        E::Tag: JoinWith<StrictUpper>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result unit lower triangular.
    pub fn declare_unit_lower(self) -> Ex<Declare<E, UnitLower>>
    where
        E::Tag: JoinWith<UnitLower>,
    {
        Ex(Declare::new(self.0))
    }

    /// Declare the result unit upper triangular.
    pub fn declare_unit_upper(self) -> Ex<Declare<E, UnitUpper>>
    where
        E::Tag: JoinWith<UnitUpper>,
    {
        Ex(Declare::new(self.0))
    }
}

impl<E: Expression> Expression for Ex<E> {
    type Elem = E::Elem;
    type Tag = E::Tag;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    const ALIAS_SAFE: bool = E::ALIAS_SAFE;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;
    const IS_DECLARATION: bool = E::IS_DECLARATION;
    const MODIFIES_OPERAND: bool = E::MODIFIES_OPERAND;

    fn rows(&self) -> usize {
        self.0.rows()
    }

    fn cols(&self) -> usize {
        self.0.cols()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        self.0.get(i, j)
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.0.aliases(target)
    }

    fn as_dense(&self) -> Option<DenseRef<'_, Self::Elem>> {
        self.0.as_dense()
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        self.0.eval_into(out, ctx);
    }
}

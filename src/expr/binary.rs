//! Elementwise binary nodes: addition, subtraction, Schur product.

use crate::eval::{EvalContext, PtrRange};
use crate::tag::{AddWith, SchurWith};
use crate::{ExprError, Result};

use super::expression::Expression;

macro_rules! binary_node {
    ($(#[$doc:meta])* $node:ident, $table:ident, $apply:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $node<L, R> {
            lhs: L,
            rhs: R,
            rows: usize,
            cols: usize,
        }

        impl<L, R> $node<L, R>
        where
            L: Expression,
            R: Expression<Elem = L::Elem>,
            L::Tag: $table<R::Tag>,
        {
            /// Construct, checking shape compatibility.
            pub fn try_new(lhs: L, rhs: R) -> Result<Self> {
                if lhs.rows() != rhs.rows() || lhs.cols() != rhs.cols() {
                    return Err(ExprError::DimensionMismatch(
                        lhs.rows(),
                        lhs.cols(),
                        rhs.rows(),
                        rhs.cols(),
                    ));
                }
                let (rows, cols) = (lhs.rows(), lhs.cols());
                Ok(Self {
                    lhs,
                    rhs,
                    rows,
                    cols,
                })
            }

            /// Construct, panicking on shape mismatch.
            pub fn new(lhs: L, rhs: R) -> Self {
                match Self::try_new(lhs, rhs) {
                    Ok(node) => node,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl<L, R> Expression for $node<L, R>
        where
            L: Expression,
            R: Expression<Elem = L::Elem>,
            L::Tag: $table<R::Tag>,
        {
            type Elem = L::Elem;
            type Tag = <L::Tag as $table<R::Tag>>::Output;

            const ELEMENTWISE: bool = L::ELEMENTWISE && R::ELEMENTWISE;
            const ALIAS_SAFE: bool = L::ALIAS_SAFE && R::ALIAS_SAFE;
            const SERIAL_ONLY: bool = L::SERIAL_ONLY || R::SERIAL_ONLY;
            const NO_SIMD: bool = L::NO_SIMD || R::NO_SIMD;

            fn rows(&self) -> usize {
                self.rows
            }

            fn cols(&self) -> usize {
                self.cols
            }

            #[inline(always)]
            fn get(&self, i: usize, j: usize) -> Self::Elem {
                let f = $apply;
                f(self.lhs.get(i, j), self.rhs.get(i, j))
            }

            fn aliases(&self, target: PtrRange) -> bool {
                self.lhs.aliases(target) || self.rhs.aliases(target)
            }

            fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
                if Self::ELEMENTWISE {
                    // the whole chain fuses into one pass
                    crate::eval::fill_region(self, out, ctx);
                } else {
                    // a product below forces its subtree to materialize first
                    crate::eval::binary_into::<L, R, _>(
                        &self.lhs,
                        &self.rhs,
                        $apply,
                        out,
                        self.rows,
                        self.cols,
                        Self::SERIAL_ONLY,
                        Self::NO_SIMD,
                        ctx,
                    );
                }
            }
        }
    };
}

binary_node!(
    /// Elementwise sum of two same-shape expressions.
    AddExpr,
    AddWith,
    |a, b| a + b
);

binary_node!(
    /// Elementwise difference of two same-shape expressions.
    SubExpr,
    AddWith,
    |a, b| a - b
);

binary_node!(
    /// Schur (elementwise) product. An entry survives only where both
    /// operands may be nonzero; see [`SchurWith`] for the tag algebra.
    SchurExpr,
    SchurWith,
    |a, b| a * b
);

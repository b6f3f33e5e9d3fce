//! Evaluation barriers: numerically transparent wrappers that restrict
//! the strategies the engine may pick for their subtree.

use crate::eval::{EvalContext, PtrRange};

use super::expression::{DenseRef, Expression};

macro_rules! barrier {
    ($(#[$doc:meta])* $node:ident, serial = $serial:expr, nosimd = $nosimd:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $node<E> {
            operand: E,
        }

        impl<E: Expression> $node<E> {
            pub fn new(operand: E) -> Self {
                Self { operand }
            }
        }

        impl<E: Expression> Expression for $node<E> {
            type Elem = E::Elem;
            type Tag = E::Tag;

            const ELEMENTWISE: bool = E::ELEMENTWISE;
            const ALIAS_SAFE: bool = E::ALIAS_SAFE;
            const SERIAL_ONLY: bool = $serial || E::SERIAL_ONLY;
            const NO_SIMD: bool = $nosimd || E::NO_SIMD;
            const IS_DECLARATION: bool = E::IS_DECLARATION;

            fn rows(&self) -> usize {
                self.operand.rows()
            }

            fn cols(&self) -> usize {
                self.operand.cols()
            }

            #[inline(always)]
            fn get(&self, i: usize, j: usize) -> Self::Elem {
                self.operand.get(i, j)
            }

            fn aliases(&self, target: PtrRange) -> bool {
                self.operand.aliases(target)
            }

            fn as_dense(&self) -> Option<DenseRef<'_, Self::Elem>> {
                self.operand.as_dense()
            }

            // no eval_into override: the default region loop honors the
            // barrier consts, which the operand's own kernel would not
        }
    };
}

barrier!(
    /// Force serial, non-blocked, non-SIMD evaluation of the subtree.
    SerialExpr,
    serial = true,
    nosimd = true
);

barrier!(
    /// Forbid SIMD kernels in the subtree; scalar loops remain.
    NoSimdExpr,
    serial = false,
    nosimd = true
);

/// Caller's assertion that no assignment target aliases any leaf below.
/// Prunes alias analysis for the subtree, skipping the safety temporary.
#[derive(Debug, Clone, Copy)]
pub struct NoAliasExpr<E> {
    operand: E,
}

impl<E: Expression> NoAliasExpr<E> {
    pub fn new(operand: E) -> Self {
        Self { operand }
    }
}

impl<E: Expression> Expression for NoAliasExpr<E> {
    type Elem = E::Elem;
    type Tag = E::Tag;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    const ALIAS_SAFE: bool = true;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;
    const IS_DECLARATION: bool = E::IS_DECLARATION;

    fn rows(&self) -> usize {
        self.operand.rows()
    }

    fn cols(&self) -> usize {
        self.operand.cols()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        self.operand.get(i, j)
    }

    fn aliases(&self, _target: PtrRange) -> bool {
        false
    }

    fn as_dense(&self) -> Option<DenseRef<'_, Self::Elem>> {
        self.operand.as_dense()
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        self.operand.eval_into(out, ctx);
    }
}

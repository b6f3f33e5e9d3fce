use std::marker::PhantomData;

use crate::eval::{EvalContext, PtrRange};
use crate::tag::{JoinWith, Structure};

use super::expression::{DenseRef, Expression};

/// Caller-certified structural declaration.
///
/// Wraps an expression and joins the promise `S` onto its tag; the values
/// and the evaluation strategy are untouched. The promise is not checked
/// unless the `validate-tags` feature is enabled, in which case every
/// assignment re-checks the materialized values and panics on a
/// violation.
#[derive(Debug, Clone, Copy)]
pub struct Declare<E, S> {
    operand: E,
    _promise: PhantomData<S>,
}

impl<E, S> Declare<E, S>
where
    E: Expression,
    S: Structure,
    E::Tag: JoinWith<S>,
{
    pub fn new(operand: E) -> Self {
        Self {
            operand,
            _promise: PhantomData,
        }
    }
}

impl<E, S> Expression for Declare<E, S>
where
    E: Expression,
    S: Structure,
    E::Tag: JoinWith<S>,
{
    type Elem = E::Elem;
    type Tag = <E::Tag as JoinWith<S>>::Output;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    const ALIAS_SAFE: bool = E::ALIAS_SAFE;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;
    const IS_DECLARATION: bool = true;

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

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        self.operand.eval_into(out, ctx);
    }
}

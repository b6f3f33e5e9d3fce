use crate::eval::{EvalContext, PtrRange};
use crate::tag::General;
use crate::{ExprError, Result};

use super::expression::Expression;

/// Reinterpret the elements of an expression, in column-major order, under
/// new dimensions. The element count must be preserved.
#[derive(Debug, Clone, Copy)]
pub struct ReshapeExpr<E> {
    operand: E,
    rows: usize,
    cols: usize,
    orows: usize,
}

impl<E: Expression> ReshapeExpr<E> {
    pub fn try_new(operand: E, rows: usize, cols: usize) -> Result<Self> {
        let count = operand.rows() * operand.cols();
        if rows * cols != count {
            return Err(ExprError::ReshapeCount {
                from: count,
                to: rows * cols,
            });
        }
        let orows = operand.rows();
        Ok(Self {
            operand,
            rows,
            cols,
            orows,
        })
    }
}

impl<E: Expression> Expression for ReshapeExpr<E> {
    type Elem = E::Elem;
    // reshaping scrambles any triangular or symmetric pattern
    type Tag = General;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        let k = i + j * self.rows;
        self.operand.get(k % self.orows, k / self.orows)
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.operand.aliases(target)
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        // same linear layout, so the operand can write straight through
        self.operand.eval_into(out, ctx);
    }
}

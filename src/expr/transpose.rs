use crate::eval::PtrRange;
use crate::scalar::Conjugate;
use crate::tag::Structure;

use super::expression::Expression;

/// Lazy transpose. Swaps index order without touching the data.
#[derive(Debug, Clone, Copy)]
pub struct TransExpr<E> {
    operand: E,
}

impl<E: Expression> TransExpr<E> {
    pub fn new(operand: E) -> Self {
        Self { operand }
    }
}

impl<E: Expression> Expression for TransExpr<E> {
    type Elem = E::Elem;
    type Tag = <E::Tag as Structure>::Transposed;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    // the (i, j) output element reads operand position (j, i)
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;

    fn rows(&self) -> usize {
        self.operand.cols()
    }

    fn cols(&self) -> usize {
        self.operand.rows()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        self.operand.get(j, i)
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.operand.aliases(target)
    }
}

/// Lazy conjugate transpose.
#[derive(Debug, Clone, Copy)]
pub struct AdjExpr<E> {
    operand: E,
}

impl<E: Expression> AdjExpr<E> {
    pub fn new(operand: E) -> Self {
        Self { operand }
    }
}

impl<E: Expression> Expression for AdjExpr<E> {
    type Elem = E::Elem;
    type Tag = <E::Tag as Structure>::Transposed;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;

    fn rows(&self) -> usize {
        self.operand.cols()
    }

    fn cols(&self) -> usize {
        self.operand.rows()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        self.operand.get(j, i).conj()
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.operand.aliases(target)
    }
}

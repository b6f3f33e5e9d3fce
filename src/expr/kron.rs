use crate::eval::PtrRange;
use crate::tag::MulWith;

use super::expression::Expression;

/// Kronecker product: every element of the left operand scales a full
/// copy of the right operand. Dimensions multiply, so construction never
/// fails. The tag follows the product table, which is also sound here:
/// a block-triangular matrix with triangular blocks is triangular.
#[derive(Debug, Clone, Copy)]
pub struct KronExpr<L, R> {
    lhs: L,
    rhs: R,
    rrows: usize,
    rcols: usize,
}

impl<L, R> KronExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
    L::Tag: MulWith<R::Tag>,
{
    pub fn new(lhs: L, rhs: R) -> Self {
        let (rrows, rcols) = (rhs.rows(), rhs.cols());
        Self {
            lhs,
            rhs,
            rrows,
            rcols,
        }
    }
}

impl<L, R> Expression for KronExpr<L, R>
where
    L: Expression,
    R: Expression<Elem = L::Elem>,
    L::Tag: MulWith<R::Tag>,
{
    type Elem = L::Elem;
    type Tag = <L::Tag as MulWith<R::Tag>>::Output;

    const ELEMENTWISE: bool = L::ELEMENTWISE && R::ELEMENTWISE;
    // output position (i, j) reads operand positions that differ from
    // (i, j), so an aliasing target needs a temporary
    const ALIAS_SAFE: bool = false;
    const SERIAL_ONLY: bool = L::SERIAL_ONLY || R::SERIAL_ONLY;
    const NO_SIMD: bool = L::NO_SIMD || R::NO_SIMD;

    fn rows(&self) -> usize {
        self.lhs.rows() * self.rrows
    }

    fn cols(&self) -> usize {
        self.lhs.cols() * self.rcols
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        self.lhs.get(i / self.rrows, j / self.rcols) * self.rhs.get(i % self.rrows, j % self.rcols)
    }

    fn aliases(&self, target: PtrRange) -> bool {
        self.lhs.aliases(target) || self.rhs.aliases(target)
    }
}

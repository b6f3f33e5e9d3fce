//! Scalar multiplication with compile-time folding of trivial factors.

use num_traits::Zero;

use crate::eval::{EvalContext, PtrRange};
use crate::scalar::Scalar;
use crate::tag::{Null, Structure};

use super::expression::Expression;

/// A scale factor, possibly known at compile time.
///
/// Plain scalars implement this with a runtime value; [`ZeroArg`] and
/// [`OneArg`] are type-level constants whose trivial multiplications fold
/// out of the generated code entirely. A runtime factor that happens to
/// be zero is still caught, by a per-assignment branch rather than a
/// compile-time one.
pub trait ScalarArg<T: Scalar>: Copy + 'static {
    /// The factor is the constant zero.
    const STATIC_ZERO: bool = false;
    /// The factor is the constant one.
    const STATIC_ONE: bool = false;

    /// Structural tag of a scaled expression whose operand has tag `S`.
    type TagFor<S: Structure>: Structure;

    fn value(&self) -> T;
}

impl<T: Scalar> ScalarArg<T> for T {
    // an unknown factor destroys unit diagonals and Hermitian structure
    type TagFor<S: Structure> = S::Scaled;

    #[inline(always)]
    fn value(&self) -> T {
        *self
    }
}

/// Type-level zero scale factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroArg;

impl<T: Scalar> ScalarArg<T> for ZeroArg {
    const STATIC_ZERO: bool = true;

    type TagFor<S: Structure> = Null;

    #[inline(always)]
    fn value(&self) -> T {
        T::zero()
    }
}

/// Type-level unit scale factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneArg;

impl<T: Scalar> ScalarArg<T> for OneArg {
    const STATIC_ONE: bool = true;

    // multiplying by one preserves every promise
    type TagFor<S: Structure> = S;

    #[inline(always)]
    fn value(&self) -> T {
        T::one()
    }
}

/// Elementwise scalar multiply node.
#[derive(Debug, Clone, Copy)]
pub struct ScaleExpr<E, S> {
    operand: E,
    factor: S,
}

impl<E: Expression, S: ScalarArg<E::Elem>> ScaleExpr<E, S> {
    pub fn new(operand: E, factor: S) -> Self {
        Self { operand, factor }
    }
}

impl<E: Expression, S: ScalarArg<E::Elem>> Expression for ScaleExpr<E, S> {
    type Elem = E::Elem;
    type Tag = S::TagFor<E::Tag>;

    const ELEMENTWISE: bool = E::ELEMENTWISE;
    const ALIAS_SAFE: bool = E::ALIAS_SAFE;
    const SERIAL_ONLY: bool = E::SERIAL_ONLY;
    const NO_SIMD: bool = E::NO_SIMD;

    fn rows(&self) -> usize {
        self.operand.rows()
    }

    fn cols(&self) -> usize {
        self.operand.cols()
    }

    #[inline(always)]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        if S::STATIC_ZERO {
            Self::Elem::zero()
        } else if S::STATIC_ONE {
            self.operand.get(i, j)
        } else {
            self.factor.value() * self.operand.get(i, j)
        }
    }

    fn aliases(&self, target: PtrRange) -> bool {
        if S::STATIC_ZERO {
            // the operand is never read
            false
        } else {
            self.operand.aliases(target)
        }
    }

    fn eval_into(&self, out: &mut [Self::Elem], ctx: &mut EvalContext) {
        if S::STATIC_ZERO {
            out.fill(Self::Elem::zero());
            return;
        }
        if !S::STATIC_ONE && self.factor.value().is_zero() {
            // runtime fallback for a factor not known at compile time
            out.fill(Self::Elem::zero());
            return;
        }
        if Self::ELEMENTWISE {
            crate::eval::fill_region(self, out, ctx);
        } else {
            let v = self.factor.value();
            crate::eval::unary_into::<E, _>(
                &self.operand,
                move |x| v * x,
                out,
                self.rows(),
                self.cols(),
                Self::SERIAL_ONLY,
                Self::NO_SIMD,
                ctx,
            );
        }
    }
}

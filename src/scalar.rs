//! Scalar type bounds shared by containers, expression nodes and kernels.

use num_complex::Complex;
use num_traits::{Num, NumAssign, One, Zero};

use crate::backend::GemmKernel;
use crate::simd::MaybeSimd;

/// Shared trait bounds for all element types usable in expressions.
///
/// `Scalar` is a blanket alias: anything that is cheap to copy, supports
/// the arithmetic the evaluator fuses, carries a conjugation, and has a
/// product kernel qualifies. f32, f64, i32, i64 and the `num_complex`
/// types all do.
pub trait Scalar:
    Copy
    + Send
    + Sync
    + std::fmt::Debug
    + PartialEq
    + NumAssign
    + Zero
    + One
    + Conjugate
    + MaybeSimd
    + GemmKernel
    + 'static
{
}

impl<T> Scalar for T where
    T: Copy
        + Send
        + Sync
        + std::fmt::Debug
        + PartialEq
        + NumAssign
        + Zero
        + One
        + Conjugate
        + MaybeSimd
        + GemmKernel
        + 'static
{
}

/// Element-level conjugation, used by adjoint nodes and Hermitian
/// structure checks. Identity for real and integer types.
pub trait Conjugate: Copy {
    fn conj(self) -> Self;
}

macro_rules! impl_conjugate_real {
    ($($t:ty),*) => {
        $(
            impl Conjugate for $t {
                #[inline(always)]
                fn conj(self) -> Self {
                    self
                }
            }
        )*
    };
}

impl_conjugate_real!(f32, f64, i8, i16, i32, i64, i128, isize);

impl<T: Num + Copy + std::ops::Neg<Output = T>> Conjugate for Complex<T> {
    #[inline(always)]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn assert_scalar<T: Scalar>() {}

    #[test]
    fn standard_types_are_scalars() {
        assert_scalar::<f32>();
        assert_scalar::<f64>();
        assert_scalar::<i32>();
        assert_scalar::<i64>();
        assert_scalar::<Complex64>();
    }

    #[test]
    fn conjugation() {
        assert_eq!(Conjugate::conj(2.5f64), 2.5);
        let z = Complex64::new(1.0, -2.0);
        assert_eq!(Conjugate::conj(z), Complex64::new(1.0, 2.0));
    }
}

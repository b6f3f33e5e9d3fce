//! Runtime-dispatched SIMD kernels for the fused evaluation loops.
//!
//! Everything here degrades gracefully: without the `simd` feature the
//! dispatch helpers run the closure as-is and the `MaybeSimd` hooks
//! return `None`, so callers always carry a scalar fallback.

#[inline(always)]
pub(crate) fn dispatch<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "simd")]
    {
        pulp::Arch::new().dispatch(f)
    }
    #[cfg(not(feature = "simd"))]
    {
        f()
    }
}

#[inline(always)]
pub(crate) fn dispatch_if_large<R>(len: usize, f: impl FnOnce() -> R) -> R {
    // Avoid runtime-dispatch overhead for tiny loops; correctness does not
    // depend on this threshold.
    if len >= 64 {
        dispatch(f)
    } else {
        f()
    }
}

/// Trait for types that may have SIMD-accelerated inner kernels.
///
/// Default implementations return `None` (no SIMD available). f32/f64
/// override these with vectorized kernels when the `simd` feature is
/// enabled.
pub trait MaybeSimd: Copy + Sized {
    /// `dst[i] += alpha * src[i]`.
    fn try_simd_axpy(_alpha: Self, _src: &[Self], _dst: &mut [Self]) -> Option<()> {
        None
    }

    /// Dot product of two equal-length slices.
    fn try_simd_dot(_a: &[Self], _b: &[Self]) -> Option<Self> {
        None
    }
}

// Default (no-op) impls for integer types and Complex
macro_rules! impl_no_simd {
    ($($t:ty),*) => {
        $(impl MaybeSimd for $t {})*
    };
}

impl_no_simd!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T: num_traits::Num + Copy + Clone + std::ops::Neg<Output = T>> MaybeSimd
    for num_complex::Complex<T>
{
}

// f32/f64: SIMD-accelerated when the feature is enabled, no-op otherwise
#[cfg(not(feature = "simd"))]
impl MaybeSimd for f32 {}

#[cfg(not(feature = "simd"))]
impl MaybeSimd for f64 {}

#[cfg(feature = "simd")]
mod simd_impls {
    use super::MaybeSimd;
    use pulp::{Simd, WithSimd};

    macro_rules! impl_maybe_simd_float {
        ($t:ty, $as_simd:ident, $as_mut_simd:ident, $splat:ident, $mul_add:ident,
         $add:ident, $reduce:ident) => {
            impl MaybeSimd for $t {
                fn try_simd_axpy(alpha: $t, src: &[$t], dst: &mut [$t]) -> Option<()> {
                    struct Axpy<'a> {
                        alpha: $t,
                        src: &'a [$t],
                        dst: &'a mut [$t],
                    }
                    impl<'a> WithSimd for Axpy<'a> {
                        type Output = ();

                        #[inline(always)]
                        fn with_simd<S: Simd>(self, simd: S) -> Self::Output {
                            debug_assert_eq!(self.src.len(), self.dst.len());
                            let (s_head, s_tail) = S::$as_simd(self.src);
                            let (d_head, d_tail) = S::$as_mut_simd(self.dst);
                            let a = simd.$splat(self.alpha);

                            for (d, &s) in d_head.iter_mut().zip(s_head.iter()) {
                                *d = simd.$mul_add(a, s, *d);
                            }
                            for (d, &s) in d_tail.iter_mut().zip(s_tail.iter()) {
                                *d += self.alpha * s;
                            }
                        }
                    }

                    Some(pulp::Arch::new().dispatch(Axpy { alpha, src, dst }))
                }

                fn try_simd_dot(a: &[$t], b: &[$t]) -> Option<$t> {
                    struct Dot<'a> {
                        a: &'a [$t],
                        b: &'a [$t],
                    }
                    impl<'a> WithSimd for Dot<'a> {
                        type Output = $t;

                        #[inline(always)]
                        fn with_simd<S: Simd>(self, simd: S) -> Self::Output {
                            debug_assert_eq!(self.a.len(), self.b.len());
                            let (a_head, a_tail) = S::$as_simd(self.a);
                            let (b_head, b_tail) = S::$as_simd(self.b);

                            let mut acc0 = simd.$splat(0.0);
                            let mut acc1 = simd.$splat(0.0);
                            let mut acc2 = simd.$splat(0.0);
                            let mut acc3 = simd.$splat(0.0);

                            let mut i = 0usize;
                            while i + 4 <= a_head.len() {
                                acc0 = simd.$mul_add(a_head[i], b_head[i], acc0);
                                acc1 = simd.$mul_add(a_head[i + 1], b_head[i + 1], acc1);
                                acc2 = simd.$mul_add(a_head[i + 2], b_head[i + 2], acc2);
                                acc3 = simd.$mul_add(a_head[i + 3], b_head[i + 3], acc3);
                                i += 4;
                            }
                            for j in i..a_head.len() {
                                acc0 = simd.$mul_add(a_head[j], b_head[j], acc0);
                            }

                            let acc =
                                simd.$add(simd.$add(acc0, acc1), simd.$add(acc2, acc3));
                            let mut sum = simd.$reduce(acc);
                            for (&x, &y) in a_tail.iter().zip(b_tail.iter()) {
                                sum += x * y;
                            }
                            sum
                        }
                    }

                    Some(pulp::Arch::new().dispatch(Dot { a, b }))
                }
            }
        };
    }

    impl_maybe_simd_float!(
        f32,
        as_simd_f32s,
        as_mut_simd_f32s,
        splat_f32s,
        mul_add_f32s,
        add_f32s,
        reduce_sum_f32s
    );
    impl_maybe_simd_float!(
        f64,
        as_simd_f64s,
        as_mut_simd_f64s,
        splat_f64s,
        mul_add_f64s,
        add_f64s,
        reduce_sum_f64s
    );
}

/// `dst[i] += alpha * src[i]`, SIMD when available.
#[inline]
pub(crate) fn axpy<T: MaybeSimd + num_traits::NumAssign>(alpha: T, src: &[T], dst: &mut [T]) {
    if T::try_simd_axpy(alpha, src, dst).is_some() {
        return;
    }
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d += alpha * s;
    }
}

/// Dot product, SIMD when available.
#[inline]
pub(crate) fn dot<T: MaybeSimd + num_traits::NumAssign + num_traits::Zero>(
    a: &[T],
    b: &[T],
) -> T {
    if let Some(r) = T::try_simd_dot(a, b) {
        return r;
    }
    let mut acc = T::zero();
    for (&x, &y) in a.iter().zip(b.iter()) {
        acc += x * y;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axpy_matches_scalar_loop() {
        let src: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let mut dst = vec![1.0f64; 200];
        axpy(0.5, &src, &mut dst);
        for (i, &d) in dst.iter().enumerate() {
            assert_eq!(d, 1.0 + 0.5 * i as f64);
        }
    }

    #[test]
    fn dot_matches_scalar_loop() {
        let a: Vec<f64> = (0..133).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..133).map(|i| (i % 7) as f64).collect();
        let expected: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        assert_eq!(dot(&a, &b), expected);
    }
}

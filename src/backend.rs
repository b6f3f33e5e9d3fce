//! Matrix-product kernels.
//!
//! [`GemmKernel`] is the seam between the expression engine and the
//! backend: every scalar type carries its own `gemm` on column-major
//! slices. With the `blas` feature enabled the four LAPACK scalar types
//! route to CBLAS; everything else (and every type when the feature is
//! off) uses the portable axpy-based kernel below.

use num_traits::{NumAssign, Zero};

use crate::simd::MaybeSimd;

/// Per-scalar `C = alpha * A * B + beta * C` on column-major buffers.
///
/// `a` is `m x k` with leading dimension `lda`, `b` is `k x n` with
/// leading dimension `ldb`, `c` is `m x n` with leading dimension `ldc`.
pub trait GemmKernel: Sized {
    #[allow(clippy::too_many_arguments)]
    fn gemm(
        m: usize,
        n: usize,
        k: usize,
        alpha: Self,
        a: &[Self],
        lda: usize,
        b: &[Self],
        ldb: usize,
        beta: Self,
        c: &mut [Self],
        ldc: usize,
    );
}

/// Portable scalar kernel: per output column, scale by `beta` then
/// accumulate one axpy per inner index. Never uses SIMD; this is also the
/// path taken under a no-SIMD barrier.
#[allow(clippy::too_many_arguments)]
pub(crate) fn naive_gemm<T: Copy + NumAssign + Zero>(
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) {
    for j in 0..n {
        let cj = &mut c[j * ldc..j * ldc + m];
        if beta.is_zero() {
            cj.fill(T::zero());
        } else {
            for v in cj.iter_mut() {
                *v *= beta;
            }
        }
        for p in 0..k {
            let w = alpha * b[p + j * ldb];
            if w.is_zero() {
                continue;
            }
            let ap = &a[p * lda..p * lda + m];
            for (cv, &av) in cj.iter_mut().zip(ap) {
                *cv += w * av;
            }
        }
    }
}

/// Same column/axpy schedule as [`naive_gemm`] but with the vectorized
/// axpy, for float types when CBLAS is not linked.
#[allow(clippy::too_many_arguments)]
#[cfg_attr(feature = "blas", allow(dead_code))]
fn axpy_gemm<T: MaybeSimd + NumAssign + Zero>(
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) {
    for j in 0..n {
        let cj = &mut c[j * ldc..j * ldc + m];
        if beta.is_zero() {
            cj.fill(T::zero());
        } else {
            for v in cj.iter_mut() {
                *v *= beta;
            }
        }
        for p in 0..k {
            let w = alpha * b[p + j * ldb];
            crate::simd::axpy(w, &a[p * lda..p * lda + m], cj);
        }
    }
}

macro_rules! impl_gemm_naive {
    ($($t:ty),* $(,)?) => {$(
        impl GemmKernel for $t {
            #[inline]
            fn gemm(
                m: usize,
                n: usize,
                k: usize,
                alpha: Self,
                a: &[Self],
                lda: usize,
                b: &[Self],
                ldb: usize,
                beta: Self,
                c: &mut [Self],
                ldc: usize,
            ) {
                naive_gemm(m, n, k, alpha, a, lda, b, ldb, beta, c, ldc);
            }
        }
    )*};
}

impl_gemm_naive!(i8, i16, i32, i64, isize);

macro_rules! impl_gemm_axpy {
    ($($t:ty),* $(,)?) => {$(
        #[cfg(not(feature = "blas"))]
        impl GemmKernel for $t {
            #[inline]
            fn gemm(
                m: usize,
                n: usize,
                k: usize,
                alpha: Self,
                a: &[Self],
                lda: usize,
                b: &[Self],
                ldb: usize,
                beta: Self,
                c: &mut [Self],
                ldc: usize,
            ) {
                axpy_gemm(m, n, k, alpha, a, lda, b, ldb, beta, c, ldc);
            }
        }
    )*};
}

impl_gemm_axpy!(f32, f64, num_complex::Complex32, num_complex::Complex64);

#[cfg(feature = "blas")]
mod blas_impl {
    use super::GemmKernel;

    macro_rules! impl_gemm_real {
        ($t:ty, $gemm:path) => {
            impl GemmKernel for $t {
                fn gemm(
                    m: usize,
                    n: usize,
                    k: usize,
                    alpha: Self,
                    a: &[Self],
                    lda: usize,
                    b: &[Self],
                    ldb: usize,
                    beta: Self,
                    c: &mut [Self],
                    ldc: usize,
                ) {
                    unsafe {
                        $gemm(
                            cblas_sys::CBLAS_LAYOUT::CblasColMajor,
                            cblas_sys::CBLAS_TRANSPOSE::CblasNoTrans,
                            cblas_sys::CBLAS_TRANSPOSE::CblasNoTrans,
                            m as i32,
                            n as i32,
                            k as i32,
                            alpha,
                            a.as_ptr(),
                            lda as i32,
                            b.as_ptr(),
                            ldb as i32,
                            beta,
                            c.as_mut_ptr(),
                            ldc as i32,
                        );
                    }
                }
            }
        };
    }

    macro_rules! impl_gemm_complex {
        ($t:ty, $gemm:path) => {
            impl GemmKernel for $t {
                fn gemm(
                    m: usize,
                    n: usize,
                    k: usize,
                    alpha: Self,
                    a: &[Self],
                    lda: usize,
                    b: &[Self],
                    ldb: usize,
                    beta: Self,
                    c: &mut [Self],
                    ldc: usize,
                ) {
                    unsafe {
                        $gemm(
                            cblas_sys::CBLAS_LAYOUT::CblasColMajor,
                            cblas_sys::CBLAS_TRANSPOSE::CblasNoTrans,
                            cblas_sys::CBLAS_TRANSPOSE::CblasNoTrans,
                            m as i32,
                            n as i32,
                            k as i32,
                            (&alpha) as *const _ as *const _,
                            a.as_ptr() as *const _,
                            lda as i32,
                            b.as_ptr() as *const _,
                            ldb as i32,
                            (&beta) as *const _ as *const _,
                            c.as_mut_ptr() as *mut _,
                            ldc as i32,
                        );
                    }
                }
            }
        };
    }

    impl_gemm_real!(f32, cblas_sys::cblas_sgemm);
    impl_gemm_real!(f64, cblas_sys::cblas_dgemm);
    impl_gemm_complex!(num_complex::Complex32, cblas_sys::cblas_cgemm);
    impl_gemm_complex!(num_complex::Complex64, cblas_sys::cblas_zgemm);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_gemm_matches_by_hand() {
        // A = [1 3; 2 4], B = [5 7; 6 8] (column-major)
        let a = [1.0f64, 2.0, 3.0, 4.0];
        let b = [5.0f64, 6.0, 7.0, 8.0];
        let mut c = [0.0f64; 4];
        naive_gemm(2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &mut c, 2);
        assert_eq!(c, [23.0, 34.0, 31.0, 46.0]);
    }

    #[test]
    fn gemm_kernel_accumulates_with_beta() {
        let a = [1.0f64, 2.0, 3.0, 4.0];
        let b = [5.0f64, 6.0, 7.0, 8.0];
        let mut c = [1.0f64, 1.0, 1.0, 1.0];
        f64::gemm(2, 2, 2, 2.0, &a, 2, &b, 2, 1.0, &mut c, 2);
        assert_eq!(c, [47.0, 69.0, 63.0, 93.0]);
    }

    #[test]
    fn integer_gemm() {
        let a = [1i32, 2, 3, 4];
        let b = [1i32, 0, 0, 1];
        let mut c = [0i32; 4];
        i32::gemm(2, 2, 2, 1, &a, 2, &b, 2, 0, &mut c, 2);
        assert_eq!(c, a);
    }
}

//! Raw shims over the Fortran LAPACK symbols in `lapack-sys`.
//!
//! Everything here is `unsafe` and argument-for-argument faithful to the
//! Fortran interfaces; the adapters above own shape validation, workspace
//! sizing and `info` translation. Flags are passed as single ASCII bytes.

use std::os::raw::{c_char, c_int};

/// Per-scalar entry points for the routines the adapter layer uses.
#[allow(clippy::too_many_arguments)]
pub trait LapackScalar: Sized {
    unsafe fn sytrf(
        uplo: u8,
        n: i32,
        a: *mut Self,
        lda: i32,
        ipiv: *mut i32,
        work: *mut Self,
        lwork: i32,
        info: *mut i32,
    );

    unsafe fn sytrs(
        uplo: u8,
        n: i32,
        nrhs: i32,
        a: *const Self,
        lda: i32,
        ipiv: *const i32,
        b: *mut Self,
        ldb: i32,
        info: *mut i32,
    );

    unsafe fn geqrf(
        m: i32,
        n: i32,
        a: *mut Self,
        lda: i32,
        tau: *mut Self,
        work: *mut Self,
        lwork: i32,
        info: *mut i32,
    );

    unsafe fn ormqr(
        side: u8,
        trans: u8,
        m: i32,
        n: i32,
        k: i32,
        a: *const Self,
        lda: i32,
        tau: *const Self,
        c: *mut Self,
        ldc: i32,
        work: *mut Self,
        lwork: i32,
        info: *mut i32,
    );

    unsafe fn trtrs(
        uplo: u8,
        trans: u8,
        diag: u8,
        n: i32,
        nrhs: i32,
        a: *const Self,
        lda: i32,
        b: *mut Self,
        ldb: i32,
        info: *mut i32,
    );

    unsafe fn gesvd(
        jobu: u8,
        jobvt: u8,
        m: i32,
        n: i32,
        a: *mut Self,
        lda: i32,
        s: *mut Self,
        u: *mut Self,
        ldu: i32,
        vt: *mut Self,
        ldvt: i32,
        work: *mut Self,
        lwork: i32,
        info: *mut i32,
    );
}

macro_rules! impl_lapack_scalar {
    ($t:ty, $sytrf:path, $sytrs:path, $geqrf:path, $ormqr:path, $trtrs:path, $gesvd:path) => {
        impl LapackScalar for $t {
            unsafe fn sytrf(
                uplo: u8,
                n: i32,
                a: *mut Self,
                lda: i32,
                ipiv: *mut i32,
                work: *mut Self,
                lwork: i32,
                info: *mut i32,
            ) {
                $sytrf(
                    &(uplo as c_char),
                    &(n as c_int),
                    a,
                    &(lda as c_int),
                    ipiv,
                    work,
                    &(lwork as c_int),
                    info,
                );
            }

            unsafe fn sytrs(
                uplo: u8,
                n: i32,
                nrhs: i32,
                a: *const Self,
                lda: i32,
                ipiv: *const i32,
                b: *mut Self,
                ldb: i32,
                info: *mut i32,
            ) {
                $sytrs(
                    &(uplo as c_char),
                    &(n as c_int),
                    &(nrhs as c_int),
                    a,
                    &(lda as c_int),
                    ipiv,
                    b,
                    &(ldb as c_int),
                    info,
                );
            }

            unsafe fn geqrf(
                m: i32,
                n: i32,
                a: *mut Self,
                lda: i32,
                tau: *mut Self,
                work: *mut Self,
                lwork: i32,
                info: *mut i32,
            ) {
                $geqrf(
                    &(m as c_int),
                    &(n as c_int),
                    a,
                    &(lda as c_int),
                    tau,
                    work,
                    &(lwork as c_int),
                    info,
                );
            }

            unsafe fn ormqr(
                side: u8,
                trans: u8,
                m: i32,
                n: i32,
                k: i32,
                a: *const Self,
                lda: i32,
                tau: *const Self,
                c: *mut Self,
                ldc: i32,
                work: *mut Self,
                lwork: i32,
                info: *mut i32,
            ) {
                $ormqr(
                    &(side as c_char),
                    &(trans as c_char),
                    &(m as c_int),
                    &(n as c_int),
                    &(k as c_int),
                    a,
                    &(lda as c_int),
                    tau,
                    c,
                    &(ldc as c_int),
                    work,
                    &(lwork as c_int),
                    info,
                );
            }

            unsafe fn trtrs(
                uplo: u8,
                trans: u8,
                diag: u8,
                n: i32,
                nrhs: i32,
                a: *const Self,
                lda: i32,
                b: *mut Self,
                ldb: i32,
                info: *mut i32,
            ) {
                $trtrs(
                    &(uplo as c_char),
                    &(trans as c_char),
                    &(diag as c_char),
                    &(n as c_int),
                    &(nrhs as c_int),
                    a,
                    &(lda as c_int),
                    b,
                    &(ldb as c_int),
                    info,
                );
            }

            unsafe fn gesvd(
                jobu: u8,
                jobvt: u8,
                m: i32,
                n: i32,
                a: *mut Self,
                lda: i32,
                s: *mut Self,
                u: *mut Self,
                ldu: i32,
                vt: *mut Self,
                ldvt: i32,
                work: *mut Self,
                lwork: i32,
                info: *mut i32,
            ) {
                $gesvd(
                    &(jobu as c_char),
                    &(jobvt as c_char),
                    &(m as c_int),
                    &(n as c_int),
                    a,
                    &(lda as c_int),
                    s,
                    u,
                    &(ldu as c_int),
                    vt,
                    &(ldvt as c_int),
                    work,
                    &(lwork as c_int),
                    info,
                );
            }
        }
    };
}

impl_lapack_scalar!(
    f32,
    lapack_sys::ssytrf_,
    lapack_sys::ssytrs_,
    lapack_sys::sgeqrf_,
    lapack_sys::sormqr_,
    lapack_sys::strtrs_,
    lapack_sys::sgesvd_
);

impl_lapack_scalar!(
    f64,
    lapack_sys::dsytrf_,
    lapack_sys::dsytrs_,
    lapack_sys::dgeqrf_,
    lapack_sys::dormqr_,
    lapack_sys::dtrtrs_,
    lapack_sys::dgesvd_
);

/// Run the `lwork = -1` workspace-size query convention: `probe` is the
/// first workspace element after the query call.
pub(crate) fn lwork_from_probe<T: num_traits::ToPrimitive>(
    routine: &'static str,
    probe: T,
) -> crate::Result<usize> {
    match probe.to_usize() {
        Some(l) if l > 0 => Ok(l),
        _ => Err(crate::ExprError::WorkspaceQuery(routine)),
    }
}

//! QR factorization and orthogonal-factor application.

use num_traits::Zero;

use crate::dense::DenseMatrix;
use crate::{ExprError, Result};

#[cfg(feature = "lapack")]
use super::status::translate_factor;
use super::{FactorScalar, Outcome, Side, Trans};

/// Householder QR factors in compact storage: `R` in the upper triangle,
/// reflector tails below the diagonal, scaling factors in `tau`. `Q` is
/// never formed explicitly; [`Householder::apply_q`] applies it.
#[derive(Debug, Clone)]
pub struct Householder<T> {
    qr: DenseMatrix<T>,
    tau: Vec<T>,
}

/// QR-factor an `m x n` matrix.
pub fn factor_qr<T: FactorScalar>(a: &DenseMatrix<T>) -> Result<(Householder<T>, Outcome)> {
    let (m, n) = (a.rows(), a.cols());
    let mut qr = a.clone();
    let mut tau = vec![T::zero(); m.min(n)];

    #[cfg(feature = "lapack")]
    let outcome = {
        let mut info = 0i32;
        let lda = m.max(1) as i32;
        let mut probe = [T::zero()];
        unsafe {
            T::geqrf(
                m as i32,
                n as i32,
                qr.as_mut_slice().as_mut_ptr(),
                lda,
                tau.as_mut_ptr(),
                probe.as_mut_ptr(),
                -1,
                &mut info,
            );
        }
        translate_factor("geqrf", info)?;
        let lwork = super::lapack::lwork_from_probe("geqrf", probe[0])?;
        let mut work = vec![T::zero(); lwork];
        unsafe {
            T::geqrf(
                m as i32,
                n as i32,
                qr.as_mut_slice().as_mut_ptr(),
                lda,
                tau.as_mut_ptr(),
                work.as_mut_ptr(),
                lwork as i32,
                &mut info,
            );
        }
        translate_factor("geqrf", info)?
    };

    #[cfg(not(feature = "lapack"))]
    let outcome = {
        super::naive::householder_qr(qr.as_mut_slice(), m, n, &mut tau);
        Outcome::Success
    };

    Ok((Householder { qr, tau }, outcome))
}

impl<T: FactorScalar> Householder<T> {
    /// Apply `Q` (or `Qᵀ`) to `c` from the given side without forming it.
    pub fn apply_q(
        &self,
        c: &DenseMatrix<T>,
        side: Side,
        trans: Trans,
    ) -> Result<(DenseMatrix<T>, Outcome)> {
        let m = self.qr.rows();
        let compatible = match side {
            Side::Left => c.rows() == m,
            Side::Right => c.cols() == m,
        };
        if !compatible {
            return Err(ExprError::DimensionMismatch(m, m, c.rows(), c.cols()));
        }
        let mut out = c.clone();

        #[cfg(feature = "lapack")]
        let outcome = {
            let mut info = 0i32;
            let side_flag = match side {
                Side::Left => b'L',
                Side::Right => b'R',
            };
            let (crows, ccols) = (c.rows(), c.cols());
            let mut probe = [T::zero()];
            unsafe {
                T::ormqr(
                    side_flag,
                    trans.flag(),
                    crows as i32,
                    ccols as i32,
                    self.tau.len() as i32,
                    self.qr.as_slice().as_ptr(),
                    m.max(1) as i32,
                    self.tau.as_ptr(),
                    out.as_mut_slice().as_mut_ptr(),
                    crows.max(1) as i32,
                    probe.as_mut_ptr(),
                    -1,
                    &mut info,
                );
            }
            translate_factor("ormqr", info)?;
            let lwork = super::lapack::lwork_from_probe("ormqr", probe[0])?;
            let mut work = vec![T::zero(); lwork];
            unsafe {
                T::ormqr(
                    side_flag,
                    trans.flag(),
                    crows as i32,
                    ccols as i32,
                    self.tau.len() as i32,
                    self.qr.as_slice().as_ptr(),
                    m.max(1) as i32,
                    self.tau.as_ptr(),
                    out.as_mut_slice().as_mut_ptr(),
                    crows.max(1) as i32,
                    work.as_mut_ptr(),
                    lwork as i32,
                    &mut info,
                );
            }
            translate_factor("ormqr", info)?
        };

        #[cfg(not(feature = "lapack"))]
        let outcome = {
            let (crows, ccols) = (c.rows(), c.cols());
            super::naive::apply_q(
                self.qr.as_slice(),
                m,
                &self.tau,
                out.as_mut_slice(),
                crows,
                ccols,
                matches!(side, Side::Left),
                matches!(trans, Trans::Transpose),
            );
            Outcome::Success
        };

        Ok((out, outcome))
    }

    /// The upper triangular factor `R` (`min(m, n) x n`).
    pub fn r(&self) -> DenseMatrix<T> {
        let (m, n) = (self.qr.rows(), self.qr.cols());
        let k = m.min(n);
        DenseMatrix::from_fn(k, n, |i, j| {
            if i <= j {
                self.qr[[i, j]]
            } else {
                T::zero()
            }
        })
    }

    pub fn tau(&self) -> &[T] {
        &self.tau
    }
}

//! Symmetric indefinite factorization and solve.

#[cfg(feature = "lapack")]
use num_traits::Zero;

use crate::dense::DenseMatrix;
use crate::{ExprError, Result};

use super::status::translate_factor;
use super::{FactorScalar, Outcome, Uplo};

/// Factors of a symmetric indefinite matrix, ready for repeated solves.
/// Owned pivot and factor storage lives only as long as the handle; it is
/// never shared across factorization calls.
#[derive(Debug, Clone)]
pub struct BunchKaufman<T> {
    factors: DenseMatrix<T>,
    pivots: Vec<i32>,
    uplo: Uplo,
}

/// Factor a symmetric matrix given by the `uplo` triangle of `a`.
///
/// A singular input surfaces as [`Outcome::RankDeficient`] with the
/// offending pivot position; the handle is still returned so the caller
/// can inspect the partial factors, but solving with it is meaningless.
pub fn factor_symmetric<T: FactorScalar>(
    a: &DenseMatrix<T>,
    uplo: Uplo,
) -> Result<(BunchKaufman<T>, Outcome)> {
    if !a.is_square() {
        return Err(ExprError::NonSquare {
            rows: a.rows(),
            cols: a.cols(),
        });
    }
    let n = a.rows();
    let mut factors = a.clone();

    #[cfg(feature = "lapack")]
    let (pivots, outcome) = {
        let mut pivots = vec![0i32; n];
        let mut info = 0i32;
        let lda = n.max(1) as i32;
        let mut probe = [T::zero()];
        unsafe {
            T::sytrf(
                uplo.flag(),
                n as i32,
                factors.as_mut_slice().as_mut_ptr(),
                lda,
                pivots.as_mut_ptr(),
                probe.as_mut_ptr(),
                -1,
                &mut info,
            );
        }
        translate_factor("sytrf", info)?;
        let lwork = super::lapack::lwork_from_probe("sytrf", probe[0])?;
        let mut work = vec![T::zero(); lwork];
        unsafe {
            T::sytrf(
                uplo.flag(),
                n as i32,
                factors.as_mut_slice().as_mut_ptr(),
                lda,
                pivots.as_mut_ptr(),
                work.as_mut_ptr(),
                lwork as i32,
                &mut info,
            );
        }
        (pivots, translate_factor("sytrf", info)?)
    };

    #[cfg(not(feature = "lapack"))]
    let (pivots, outcome) = {
        // the fallback works on the full matrix: mirror the stored
        // triangle, then factor without pivoting
        mirror(&mut factors, uplo);
        let info = super::naive::ldlt_factor(factors.as_mut_slice(), n);
        let pivots = (1..=n as i32).collect();
        (pivots, translate_factor("sytrf", info)?)
    };

    Ok((
        BunchKaufman {
            factors,
            pivots,
            uplo,
        },
        outcome,
    ))
}

impl<T: FactorScalar> BunchKaufman<T> {
    /// Solve `A X = B` using the stored factors. `B` is one column per
    /// right-hand side.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<(DenseMatrix<T>, Outcome)> {
        let n = self.factors.rows();
        if b.rows() != n {
            return Err(ExprError::DimensionMismatch(
                n,
                n,
                b.rows(),
                b.cols(),
            ));
        }
        let mut x = b.clone();
        let nrhs = b.cols();

        #[cfg(feature = "lapack")]
        let outcome = {
            let mut info = 0i32;
            unsafe {
                T::sytrs(
                    self.uplo.flag(),
                    n as i32,
                    nrhs as i32,
                    self.factors.as_slice().as_ptr(),
                    n.max(1) as i32,
                    self.pivots.as_ptr(),
                    x.as_mut_slice().as_mut_ptr(),
                    n.max(1) as i32,
                    &mut info,
                );
            }
            translate_factor("sytrs", info)?
        };

        #[cfg(not(feature = "lapack"))]
        let outcome = {
            super::naive::ldlt_solve(self.factors.as_slice(), n, x.as_mut_slice(), nrhs);
            Outcome::Success
        };

        Ok((x, outcome))
    }

    pub fn pivots(&self) -> &[i32] {
        &self.pivots
    }

    pub fn uplo(&self) -> Uplo {
        self.uplo
    }
}

#[cfg(not(feature = "lapack"))]
fn mirror<T: FactorScalar>(a: &mut DenseMatrix<T>, uplo: Uplo) {
    let n = a.rows();
    let f = a.as_mut_slice();
    for j in 0..n {
        for i in j + 1..n {
            match uplo {
                Uplo::Lower => f[j + i * n] = f[i + j * n],
                Uplo::Upper => f[i + j * n] = f[j + i * n],
            }
        }
    }
}

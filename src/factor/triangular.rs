//! Triangular solve after factorization.

use crate::dense::DenseMatrix;
use crate::expr::Expression;
use crate::tag::Structure;
use crate::{ExprError, Result};

use super::status::translate_factor;
use super::{FactorScalar, Outcome, Trans, Uplo};

/// Solve `op(A) X = B` for a triangular `A`.
///
/// A zero on the diagonal of a non-unit triangle is a singular system and
/// surfaces as [`Outcome::RankDeficient`] with the diagonal position; the
/// returned matrix is then unmodified input.
pub fn triangular_solve<T: FactorScalar>(
    a: &DenseMatrix<T>,
    b: &DenseMatrix<T>,
    uplo: Uplo,
    trans: Trans,
    unit: bool,
) -> Result<(DenseMatrix<T>, Outcome)> {
    if !a.is_square() {
        return Err(ExprError::NonSquare {
            rows: a.rows(),
            cols: a.cols(),
        });
    }
    let n = a.rows();
    if b.rows() != n {
        return Err(ExprError::DimensionMismatch(n, n, b.rows(), b.cols()));
    }
    let mut x = b.clone();
    let nrhs = b.cols();

    #[cfg(feature = "lapack")]
    let outcome = {
        let diag = if unit { b'U' } else { b'N' };
        let mut info = 0i32;
        unsafe {
            T::trtrs(
                uplo.flag(),
                trans.flag(),
                diag,
                n as i32,
                nrhs as i32,
                a.as_slice().as_ptr(),
                n.max(1) as i32,
                x.as_mut_slice().as_mut_ptr(),
                n.max(1) as i32,
                &mut info,
            );
        }
        translate_factor("trtrs", info)?
    };

    #[cfg(not(feature = "lapack"))]
    let outcome = {
        let info = super::naive::tri_solve(
            a.as_slice(),
            n,
            x.as_mut_slice(),
            nrhs,
            matches!(uplo, Uplo::Lower),
            matches!(trans, Trans::Transpose),
            unit,
        );
        translate_factor("trtrs", info)?
    };

    if !outcome.is_success() {
        // singular triangle: hand back the untouched right-hand side
        return Ok((b.clone(), outcome));
    }
    Ok((x, outcome))
}

/// Triangular solve with the flags read off a structural tag.
///
/// The coefficient expression must carry a triangular tag (declared or
/// deduced); its uplo and unit-diagonal flags drive the routine, so a
/// `declare_unit_lower` coefficient never has its diagonal read.
pub fn triangular_solve_tagged<E, T>(
    a: &E,
    b: &DenseMatrix<T>,
    trans: Trans,
) -> Result<(DenseMatrix<T>, Outcome)>
where
    T: FactorScalar,
    E: Expression<Elem = T>,
{
    let uplo = if <E::Tag as Structure>::IS_LOWER {
        Uplo::Lower
    } else if <E::Tag as Structure>::IS_UPPER {
        Uplo::Upper
    } else {
        return Err(ExprError::BadArgument {
            routine: "trtrs",
            position: 1,
        });
    };
    let unit = <E::Tag as Structure>::IS_UNIT_DIAGONAL;
    let coeffs = a.eval();
    triangular_solve(&coeffs, b, uplo, trans, unit)
}

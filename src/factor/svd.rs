//! Singular value decomposition.

use num_traits::Zero;

use crate::dense::DenseMatrix;
use crate::Result;

use super::status::translate_iterative;
use super::{FactorScalar, Outcome};

/// Result of a singular value decomposition: `A = U diag(s) Vᵀ` with the
/// singular values in descending order. `u` and `vt` are present only
/// when they were requested (economy-size: `U` is `m x k`, `Vᵀ` is
/// `k x n`, `k = min(m, n)`).
#[derive(Debug, Clone)]
pub struct Svd<T> {
    pub singular: Vec<T>,
    pub u: Option<DenseMatrix<T>>,
    pub vt: Option<DenseMatrix<T>>,
}

/// Compute the SVD of `a`, optionally with the singular vector factors.
///
/// Non-convergence of the iteration is an [`Outcome::NotConverged`] and
/// the decomposition fields must not be used.
pub fn svd<T: FactorScalar>(a: &DenseMatrix<T>, want_uv: bool) -> Result<(Svd<T>, Outcome)> {
    let (m, n) = (a.rows(), a.cols());
    let k = m.min(n);

    #[cfg(feature = "lapack")]
    {
        let mut work_a = a.clone();
        let mut s = vec![T::zero(); k];
        let (jobu, jobvt, ldu, ldvt, ulen, vtlen) = if want_uv {
            (b'S', b'S', m.max(1), k.max(1), m * k, k * n)
        } else {
            (b'N', b'N', 1, 1, 1, 1)
        };
        let mut u = vec![T::zero(); ulen.max(1)];
        let mut vt = vec![T::zero(); vtlen.max(1)];
        let mut info = 0i32;
        let mut probe = [T::zero()];
        unsafe {
            T::gesvd(
                jobu,
                jobvt,
                m as i32,
                n as i32,
                work_a.as_mut_slice().as_mut_ptr(),
                m.max(1) as i32,
                s.as_mut_ptr(),
                u.as_mut_ptr(),
                ldu as i32,
                vt.as_mut_ptr(),
                ldvt as i32,
                probe.as_mut_ptr(),
                -1,
                &mut info,
            );
        }
        translate_iterative("gesvd", info)?;
        let lwork = super::lapack::lwork_from_probe("gesvd", probe[0])?;
        let mut work = vec![T::zero(); lwork];
        unsafe {
            T::gesvd(
                jobu,
                jobvt,
                m as i32,
                n as i32,
                work_a.as_mut_slice().as_mut_ptr(),
                m.max(1) as i32,
                s.as_mut_ptr(),
                u.as_mut_ptr(),
                ldu as i32,
                vt.as_mut_ptr(),
                ldvt as i32,
                work.as_mut_ptr(),
                lwork as i32,
                &mut info,
            );
        }
        let outcome = translate_iterative("gesvd", info)?;
        let (u, vt) = if want_uv {
            (
                Some(DenseMatrix::from_col_major(u, m, k)?),
                Some(DenseMatrix::from_col_major(vt, k, n)?),
            )
        } else {
            (None, None)
        };
        Ok((
            Svd {
                singular: s,
                u,
                vt,
            },
            outcome,
        ))
    }

    #[cfg(not(feature = "lapack"))]
    {
        // the one-sided Jacobi fallback wants the tall orientation; for a
        // wide input factor the transpose and swap the roles of U and V
        let transposed = m < n;
        let (mm, nn) = if transposed { (n, m) } else { (m, n) };
        let mut cols = vec![T::zero(); mm * nn];
        for j in 0..nn {
            for i in 0..mm {
                cols[i + j * mm] = if transposed { a[[j, i]] } else { a[[i, j]] };
            }
        }
        let mut v = vec![T::zero(); nn * nn];
        let info = super::naive::jacobi_svd(&mut cols, mm, nn, &mut v);
        let outcome = translate_iterative("gesvd", info)?;

        // singular values are the rotated column norms, descending
        let mut order: Vec<usize> = (0..nn).collect();
        let norms: Vec<T> = (0..nn)
            .map(|j| {
                let mut acc = T::zero();
                for i in 0..mm {
                    let x = cols[i + j * mm];
                    acc = acc + x * x;
                }
                num_traits::Float::sqrt(acc)
            })
            .collect();
        order.sort_by(|&p, &q| {
            norms[q]
                .partial_cmp(&norms[p])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let singular: Vec<T> = order.iter().map(|&j| norms[j]).collect();

        let (u, vt) = if want_uv {
            debug_assert_eq!(k, nn);
            // left vectors: normalized rotated columns; right vectors:
            // accumulated rotations
            let left = DenseMatrix::from_fn(mm, nn, |i, r| {
                let j = order[r];
                if norms[j] == T::zero() {
                    T::zero()
                } else {
                    cols[i + j * mm] / norms[j]
                }
            });
            let right = DenseMatrix::from_fn(nn, nn, |i, r| v[i + order[r] * nn]);
            if transposed {
                // the transpose was factored, so the roles swap back
                let u = right;
                let vt = DenseMatrix::from_fn(nn, mm, |i, j| left[[j, i]]);
                (Some(u), Some(vt))
            } else {
                let vt = DenseMatrix::from_fn(nn, nn, |i, j| right[[j, i]]);
                (Some(left), Some(vt))
            }
        } else {
            (None, None)
        };

        Ok((Svd { singular, u, vt }, outcome))
    }
}

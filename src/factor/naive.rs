//! Built-in fallback routines used when no external LAPACK is linked.
//!
//! These exist to honor the adapter status-code contract, not to compete
//! with a tuned LAPACK. They follow the same conventions as the Fortran
//! routines they stand in for: column-major buffers, in-place factors,
//! and an `info` code (0 success, positive = deficiency at that one-based
//! position or sweep count).

use num_traits::Float;

use crate::scalar::Scalar;

#[inline]
fn at(i: usize, j: usize, ld: usize) -> usize {
    i + j * ld
}

/// Unpivoted LDLᵀ of a full symmetric column-major matrix, lower storage:
/// unit `L` below the diagonal, `D` on it. Returns the one-based index of
/// the first zero pivot, or 0.
pub(super) fn ldlt_factor<T: Scalar + Float>(a: &mut [T], n: usize) -> i32 {
    for j in 0..n {
        let mut d = a[at(j, j, n)];
        for k in 0..j {
            let l = a[at(j, k, n)];
            d = d - l * l * a[at(k, k, n)];
        }
        if d == T::zero() {
            return (j + 1) as i32;
        }
        a[at(j, j, n)] = d;
        for i in j + 1..n {
            let mut v = a[at(i, j, n)];
            for k in 0..j {
                v = v - a[at(i, k, n)] * a[at(j, k, n)] * a[at(k, k, n)];
            }
            a[at(i, j, n)] = v / d;
        }
    }
    0
}

/// Solve with LDLᵀ factors: forward with unit `L`, scale by `D`, back
/// with `Lᵀ`. `b` is `n x nrhs`.
pub(super) fn ldlt_solve<T: Scalar + Float>(f: &[T], n: usize, b: &mut [T], nrhs: usize) {
    for col in 0..nrhs {
        let x = &mut b[col * n..(col + 1) * n];
        for i in 0..n {
            for j in 0..i {
                let lij = f[at(i, j, n)];
                x[i] = x[i] - lij * x[j];
            }
        }
        for i in 0..n {
            x[i] = x[i] / f[at(i, i, n)];
        }
        for i in (0..n).rev() {
            for j in i + 1..n {
                let lji = f[at(j, i, n)];
                x[i] = x[i] - lji * x[j];
            }
        }
    }
}

/// Householder QR of an `m x n` column-major matrix, LAPACK storage:
/// `R` in the upper triangle, reflector tails below the diagonal, scaling
/// factors in `tau` (length `min(m, n)`).
pub(super) fn householder_qr<T: Scalar + Float>(a: &mut [T], m: usize, n: usize, tau: &mut [T]) {
    for k in 0..m.min(n) {
        let mut norm_sq = T::zero();
        for i in k..m {
            let v = a[at(i, k, m)];
            norm_sq = norm_sq + v * v;
        }
        let norm = norm_sq.sqrt();
        if norm == T::zero() {
            tau[k] = T::zero();
            continue;
        }
        let x0 = a[at(k, k, m)];
        let beta = if x0 >= T::zero() { -norm } else { norm };
        tau[k] = (beta - x0) / beta;
        let scale = T::one() / (x0 - beta);
        for i in k + 1..m {
            a[at(i, k, m)] = a[at(i, k, m)] * scale;
        }
        a[at(k, k, m)] = beta;

        // apply I - tau v vᵀ to the trailing columns, v0 = 1
        for j in k + 1..n {
            let mut w = a[at(k, j, m)];
            for i in k + 1..m {
                w = w + a[at(i, k, m)] * a[at(i, j, m)];
            }
            w = w * tau[k];
            a[at(k, j, m)] = a[at(k, j, m)] - w;
            for i in k + 1..m {
                let vi = a[at(i, k, m)];
                a[at(i, j, m)] = a[at(i, j, m)] - vi * w;
            }
        }
    }
}

/// Apply the orthogonal factor held in `qr`/`tau` to `c` (`crows x
/// ccols`), from the given side, optionally transposed. `m` is the row
/// count of the factored matrix.
#[allow(clippy::too_many_arguments)]
pub(super) fn apply_q<T: Scalar + Float>(
    qr: &[T],
    m: usize,
    tau: &[T],
    c: &mut [T],
    crows: usize,
    ccols: usize,
    left: bool,
    transpose: bool,
) {
    let k = tau.len();
    // Q = H_0 H_1 ... H_{k-1}; the application order follows from which
    // factor touches c first
    let order: Vec<usize> = if left != transpose {
        (0..k).rev().collect()
    } else {
        (0..k).collect()
    };
    for &r in &order {
        if tau[r] == T::zero() {
            continue;
        }
        if left {
            for col in 0..ccols {
                let cc = &mut c[col * crows..(col + 1) * crows];
                let mut w = cc[r];
                for i in r + 1..m {
                    w = w + qr[at(i, r, m)] * cc[i];
                }
                w = w * tau[r];
                cc[r] = cc[r] - w;
                for i in r + 1..m {
                    let vi = qr[at(i, r, m)];
                    cc[i] = cc[i] - vi * w;
                }
            }
        } else {
            for row in 0..crows {
                let mut w = c[at(row, r, crows)];
                for i in r + 1..m {
                    w = w + c[at(row, i, crows)] * qr[at(i, r, m)];
                }
                w = w * tau[r];
                c[at(row, r, crows)] = c[at(row, r, crows)] - w;
                for i in r + 1..m {
                    let vi = qr[at(i, r, m)];
                    c[at(row, i, crows)] = c[at(row, i, crows)] - w * vi;
                }
            }
        }
    }
}

/// Triangular solve `op(A) X = B` by substitution. `b` is `n x nrhs` and
/// is overwritten with the solution. Returns the one-based index of the
/// first zero diagonal entry (checked up front), or 0.
#[allow(clippy::too_many_arguments)]
pub(super) fn tri_solve<T: Scalar + Float>(
    a: &[T],
    n: usize,
    b: &mut [T],
    nrhs: usize,
    lower: bool,
    transpose: bool,
    unit: bool,
) -> i32 {
    if !unit {
        for i in 0..n {
            if a[at(i, i, n)] == T::zero() {
                return (i + 1) as i32;
            }
        }
    }
    // op(A) row i uses a[i][j] straight or a[j][i] transposed
    let coef = |i: usize, j: usize| {
        if transpose {
            a[at(j, i, n)]
        } else {
            a[at(i, j, n)]
        }
    };
    // transposing flips which substitution direction applies
    let forward = lower != transpose;
    for col in 0..nrhs {
        let x = &mut b[col * n..(col + 1) * n];
        if forward {
            for i in 0..n {
                let mut v = x[i];
                for j in 0..i {
                    v = v - coef(i, j) * x[j];
                }
                x[i] = if unit { v } else { v / coef(i, i) };
            }
        } else {
            for i in (0..n).rev() {
                let mut v = x[i];
                for j in i + 1..n {
                    v = v - coef(i, j) * x[j];
                }
                x[i] = if unit { v } else { v / coef(i, i) };
            }
        }
    }
    0
}

/// Maximum one-sided Jacobi sweeps before reporting non-convergence.
const JACOBI_SWEEPS: usize = 30;

/// One-sided Jacobi SVD of an `m x n` column-major matrix with `m >= n`.
/// On return `a` holds `U * diag(s)` column-wise, `v` (n x n) the
/// accumulated right rotations. Returns 0 or the sweep budget on
/// non-convergence.
pub(super) fn jacobi_svd<T: Scalar + Float>(a: &mut [T], m: usize, n: usize, v: &mut [T]) -> i32 {
    for j in 0..n {
        v[at(j, j, n)] = T::one();
    }
    let tol = T::epsilon() * T::from(m).unwrap_or_else(T::one).sqrt();
    for _sweep in 0..JACOBI_SWEEPS {
        let mut converged = true;
        for p in 0..n {
            for q in p + 1..n {
                let mut app = T::zero();
                let mut aqq = T::zero();
                let mut apq = T::zero();
                for i in 0..m {
                    let x = a[at(i, p, m)];
                    let y = a[at(i, q, m)];
                    app = app + x * x;
                    aqq = aqq + y * y;
                    apq = apq + x * y;
                }
                if apq.abs() <= tol * (app * aqq).sqrt() {
                    continue;
                }
                converged = false;
                // Jacobi rotation zeroing the (p, q) inner product
                let tau = (aqq - app) / (apq + apq);
                let t = {
                    let s = if tau >= T::zero() { T::one() } else { -T::one() };
                    s / (tau.abs() + (T::one() + tau * tau).sqrt())
                };
                let c = T::one() / (T::one() + t * t).sqrt();
                let s = c * t;
                for i in 0..m {
                    let x = a[at(i, p, m)];
                    let y = a[at(i, q, m)];
                    a[at(i, p, m)] = c * x - s * y;
                    a[at(i, q, m)] = s * x + c * y;
                }
                for i in 0..n {
                    let x = v[at(i, p, n)];
                    let y = v[at(i, q, n)];
                    v[at(i, p, n)] = c * x - s * y;
                    v[at(i, q, n)] = s * x + c * y;
                }
            }
        }
        if converged {
            return 0;
        }
    }
    JACOBI_SWEEPS as i32
}

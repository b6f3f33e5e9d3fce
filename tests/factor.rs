//! Adapter-layer behavior: shape validation, deficiency reporting and
//! numerical round trips through the factorization routines.

use approx::assert_relative_eq;
use matexpr::factor::{
    factor_qr, factor_symmetric, svd, triangular_solve, triangular_solve_tagged, Outcome, Side,
    Trans, Uplo,
};
use matexpr::{DenseMatrix, ExprError};

#[test]
fn symmetric_solve_round_trip() {
    // symmetric indefinite, well conditioned
    let a = DenseMatrix::from_rows(&[
        &[4.0, 1.0, -2.0],
        &[1.0, -3.0, 0.5],
        &[-2.0, 0.5, 5.0],
    ])
    .unwrap();
    let b = DenseMatrix::from_rows(&[&[1.0], &[2.0], &[-1.0]]).unwrap();

    let (factors, outcome) = factor_symmetric(&a, Uplo::Lower).unwrap();
    assert!(outcome.is_success());
    let (x, outcome) = factors.solve(&b).unwrap();
    assert!(outcome.is_success());

    // residual check: A x == b
    for i in 0..3 {
        let mut acc = 0.0;
        for k in 0..3 {
            acc += a[[i, k]] * x[[k, 0]];
        }
        assert_relative_eq!(acc, b[[i, 0]], epsilon = 1e-10);
    }
}

#[test]
fn singular_symmetric_input_is_reported() {
    let a = DenseMatrix::from_rows(&[&[1.0, 1.0], &[1.0, 1.0]]).unwrap();
    let (_, outcome) = factor_symmetric(&a, Uplo::Lower).unwrap();
    match outcome {
        Outcome::RankDeficient { position } => assert!(position >= 1 && position <= 2),
        other => panic!("singular input reported as {other:?}"),
    }
}

#[test]
fn factor_symmetric_rejects_non_square() {
    let a = DenseMatrix::<f64>::zeros(2, 3);
    let err = factor_symmetric(&a, Uplo::Upper).unwrap_err();
    assert!(matches!(err, ExprError::NonSquare { rows: 2, cols: 3 }));
}

#[test]
fn qr_reconstructs_the_input() {
    let a = DenseMatrix::from_fn(4, 3, |i, j| ((i * 3 + j) as f64 * 0.7 - 2.0).sin());
    let (h, outcome) = factor_qr(&a).unwrap();
    assert!(outcome.is_success());

    // A = Q [R; 0]
    let r = h.r();
    let mut padded = DenseMatrix::zeros(4, 3);
    for i in 0..3 {
        for j in 0..3 {
            padded[[i, j]] = r[[i, j]];
        }
    }
    let (qr_product, outcome) = h.apply_q(&padded, Side::Left, Trans::No).unwrap();
    assert!(outcome.is_success());
    for i in 0..4 {
        for j in 0..3 {
            assert_relative_eq!(qr_product[[i, j]], a[[i, j]], epsilon = 1e-10);
        }
    }
}

#[test]
fn orthogonal_apply_round_trip() {
    let a = DenseMatrix::from_fn(5, 3, |i, j| (i as f64 + 1.0) / (j as f64 + 2.0));
    let (h, _) = factor_qr(&a).unwrap();

    let c = DenseMatrix::from_fn(5, 2, |i, j| (i * 2 + j) as f64 - 4.0);
    let (qtc, _) = h.apply_q(&c, Side::Left, Trans::Transpose).unwrap();
    let (back, _) = h.apply_q(&qtc, Side::Left, Trans::No).unwrap();
    for i in 0..5 {
        for j in 0..2 {
            assert_relative_eq!(back[[i, j]], c[[i, j]], epsilon = 1e-10);
        }
    }
}

#[test]
fn triangular_solve_known_answer() {
    let l = DenseMatrix::from_rows(&[
        &[2.0, 0.0, 0.0],
        &[1.0, 3.0, 0.0],
        &[-1.0, 2.0, 4.0],
    ])
    .unwrap();
    // b = L * [1, 2, 3]^T
    let b = DenseMatrix::from_rows(&[&[2.0], &[7.0], &[15.0]]).unwrap();

    let (x, outcome) = triangular_solve(&l, &b, Uplo::Lower, Trans::No, false).unwrap();
    assert!(outcome.is_success());
    assert_relative_eq!(x[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(x[[1, 0]], 2.0, epsilon = 1e-12);
    assert_relative_eq!(x[[2, 0]], 3.0, epsilon = 1e-12);
}

#[test]
fn transposed_triangular_solve() {
    let l = DenseMatrix::from_rows(&[
        &[2.0, 0.0, 0.0],
        &[1.0, 3.0, 0.0],
        &[-1.0, 2.0, 4.0],
    ])
    .unwrap();
    // Lᵀ y = c with y = [1, 1, 1]: c = column sums of L
    let c = DenseMatrix::from_rows(&[&[2.0], &[5.0], &[4.0]]).unwrap();
    let (y, outcome) = triangular_solve(&l, &c, Uplo::Lower, Trans::Transpose, false).unwrap();
    assert!(outcome.is_success());
    for i in 0..3 {
        assert_relative_eq!(y[[i, 0]], 1.0, epsilon = 1e-12);
    }
}

#[test]
fn zero_diagonal_is_rank_deficient() {
    let l = DenseMatrix::from_rows(&[&[2.0, 0.0], &[5.0, 0.0]]).unwrap();
    let b = DenseMatrix::from_rows(&[&[1.0], &[1.0]]).unwrap();
    let (x, outcome) = triangular_solve(&l, &b, Uplo::Lower, Trans::No, false).unwrap();
    assert_eq!(outcome, Outcome::RankDeficient { position: 2 });
    // the right-hand side comes back untouched
    assert_eq!(x, b);
}

#[test]
fn tagged_solve_reads_flags_from_the_tag() {
    let l = DenseMatrix::from_rows(&[
        &[1.0, 0.0, 0.0],
        &[2.0, 1.0, 0.0],
        &[-1.0, 3.0, 1.0],
    ])
    .unwrap();
    // b = L * [1, -1, 2]^T with unit diagonal
    let b = DenseMatrix::from_rows(&[&[1.0], &[1.0], &[-2.0]]).unwrap();

    let (x, outcome) =
        triangular_solve_tagged(&l.as_expr().declare_unit_lower(), &b, Trans::No).unwrap();
    assert!(outcome.is_success());
    assert_relative_eq!(x[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(x[[1, 0]], -1.0, epsilon = 1e-12);
    assert_relative_eq!(x[[2, 0]], 2.0, epsilon = 1e-12);

    // a non-triangular tag is a programming error, not a deficiency
    let err = triangular_solve_tagged(&l.as_expr(), &b, Trans::No).unwrap_err();
    assert!(matches!(err, ExprError::BadArgument { .. }));
}

#[test]
fn svd_of_a_diagonal_rectangle() {
    let a = DenseMatrix::from_rows(&[&[3.0, 0.0], &[0.0, 2.0], &[0.0, 0.0]]).unwrap();
    let (result, outcome) = svd(&a, false).unwrap();
    assert!(outcome.is_success());
    assert_eq!(result.singular.len(), 2);
    assert_relative_eq!(result.singular[0], 3.0, epsilon = 1e-10);
    assert_relative_eq!(result.singular[1], 2.0, epsilon = 1e-10);
    assert!(result.u.is_none());
    assert!(result.vt.is_none());
}

#[test]
fn svd_reconstructs_the_input() {
    let a = DenseMatrix::from_fn(3, 4, |i, j| ((i + 2 * j) as f64 * 0.3).cos());
    let (result, outcome) = svd(&a, true).unwrap();
    assert!(outcome.is_success());
    let u = result.u.unwrap();
    let vt = result.vt.unwrap();
    assert_eq!(u.rows(), 3);
    assert_eq!(u.cols(), 3);
    assert_eq!(vt.rows(), 3);
    assert_eq!(vt.cols(), 4);

    // singular values descending
    for w in result.singular.windows(2) {
        assert!(w[0] >= w[1]);
    }

    // A == U diag(s) Vᵀ
    for i in 0..3 {
        for j in 0..4 {
            let mut acc = 0.0;
            for k in 0..3 {
                acc += u[[i, k]] * result.singular[k] * vt[[k, j]];
            }
            assert_relative_eq!(acc, a[[i, j]], epsilon = 1e-8);
        }
    }
}

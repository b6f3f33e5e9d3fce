//! Structural tag deduction through expression trees, and the region
//! restriction it buys during evaluation.

use std::any::TypeId;

use matexpr::tag::{
    Diagonal, General, Lower, Null, StrictLower, StrictUpper, Symmetric, UnitLower, Upper,
};
use matexpr::{schur, DenseMatrix, Expression, ZeroArg};

fn tag_of<E: Expression>(_: &E) -> TypeId {
    TypeId::of::<E::Tag>()
}

fn upper3() -> DenseMatrix<f64> {
    DenseMatrix::from_rows(&[
        &[2.0, -1.0, 3.0],
        &[0.0, 4.0, 1.0],
        &[0.0, 0.0, -2.0],
    ])
    .unwrap()
}

fn unit_lower3() -> DenseMatrix<f64> {
    DenseMatrix::from_rows(&[
        &[1.0, 0.0, 0.0],
        &[2.0, 1.0, 0.0],
        &[-1.0, 3.0, 1.0],
    ])
    .unwrap()
}

#[test]
fn product_tags_follow_the_table() {
    let u = upper3();
    let v = upper3();
    let l = unit_lower3();

    let uu = u.as_expr().declare_upper() * v.as_expr().declare_upper();
    assert_eq!(tag_of(&uu), TypeId::of::<Upper>());

    let ll = l.as_expr().declare_unit_lower() * l.as_expr().declare_unit_lower();
    assert_eq!(tag_of(&ll), TypeId::of::<UnitLower>());

    // a general factor forgets everything
    let gu = u.as_expr() * v.as_expr().declare_upper();
    assert_eq!(tag_of(&gu), TypeId::of::<General>());
}

#[test]
fn sum_and_join_tags() {
    let u = upper3();

    let sum = u.as_expr().declare_upper() + u.as_expr().declare_upper();
    assert_eq!(tag_of(&sum), TypeId::of::<Upper>());

    // symmetric joined with upper pins everything off-diagonal to zero
    let decl = u
        .as_expr()
        .declare_symmetric()
        .declare_upper();
    assert_eq!(tag_of(&decl), TypeId::of::<Diagonal>());
}

#[test]
fn transpose_flips_and_scale_degrades() {
    let u = upper3();
    let l = unit_lower3();

    let t = u.as_expr().declare_upper().t();
    assert_eq!(tag_of(&t), TypeId::of::<Lower>());

    let tt = u.as_expr().declare_upper().t().t();
    assert_eq!(tag_of(&tt), TypeId::of::<Upper>());

    // an unknown factor destroys the unit diagonal but not triangularity
    let scaled = l.as_expr().declare_unit_lower().scale(3.0);
    assert_eq!(tag_of(&scaled), TypeId::of::<Lower>());

    let zeroed = l.as_expr().declare_unit_lower().scale(ZeroArg);
    assert_eq!(tag_of(&zeroed), TypeId::of::<Null>());
}

#[test]
fn upper_product_skips_the_lower_region() {
    let u = upper3();
    let v = upper3();

    let p = (u.as_expr().declare_upper() * v.as_expr().declare_upper()).eval();

    // strictly-lower entries are exact zeros, written, never computed
    for i in 0..3 {
        for j in 0..i {
            assert_eq!(p[[i, j]], 0.0);
        }
    }
    // the kept region matches the full reference product
    for i in 0..3 {
        for j in i..3 {
            let mut acc = 0.0;
            for k in 0..3 {
                acc += u[[i, k]] * v[[k, j]];
            }
            assert_eq!(p[[i, j]], acc);
        }
    }
}

#[test]
fn unit_diagonal_is_pinned_to_one() {
    let l = unit_lower3();
    let p = (l.as_expr().declare_unit_lower() * l.as_expr().declare_unit_lower()).eval();
    for d in 0..3 {
        assert_eq!(p[[d, d]], 1.0);
    }
    // reference values below the diagonal
    for i in 0..3 {
        for j in 0..i {
            let mut acc = 0.0;
            for k in 0..3 {
                acc += l[[i, k]] * l[[k, j]];
            }
            assert_eq!(p[[i, j]], acc);
        }
    }
}

#[test]
fn strictly_upper_tag_zeroes_the_diagonal() {
    let b = DenseMatrix::from_rows(&[
        &[0.0, 1.0, 2.0],
        &[0.0, 0.0, 3.0],
        &[0.0, 0.0, 0.0],
    ])
    .unwrap();
    let e = b.as_expr().declare_strictly_upper();
    assert_eq!(tag_of(&e), TypeId::of::<StrictUpper>());
    let m = e.eval();
    for d in 0..3 {
        assert_eq!(m[[d, d]], 0.0);
    }
    assert_eq!(m, b);
}

#[test]
fn schur_with_one_symmetric_factor_stays_general() {
    let s = DenseMatrix::from_rows(&[
        &[2.0, 1.0, -1.0],
        &[1.0, 3.0, 0.5],
        &[-1.0, 0.5, 4.0],
    ])
    .unwrap();
    let b = DenseMatrix::from_rows(&[
        &[1.0, 10.0, 100.0],
        &[200.0, 2.0, 20.0],
        &[30.0, 300.0, 3.0],
    ])
    .unwrap();

    // symmetry of one factor proves nothing about the product
    let p = schur(s.as_expr().declare_symmetric(), &b);
    assert_eq!(tag_of(&p), TypeId::of::<General>());
    let p = p.eval();
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(p[[i, j]], s[[i, j]] * b[[i, j]]);
        }
    }
    // in particular [1,0] is its own product, not a mirror of [0,1]
    assert_eq!(p[[1, 0]], 200.0);
    assert_eq!(p[[0, 1]], 10.0);
}

#[test]
fn schur_diagonal_is_a_product_not_a_promise() {
    let l = DenseMatrix::from_rows(&[
        &[5.0, 0.0, 0.0],
        &[4.0, 6.0, 0.0],
        &[2.0, -3.0, 7.0],
    ])
    .unwrap();
    let ul = unit_lower3();

    // a unit diagonal survives only when both factors pin it
    let p = schur(l.as_expr().declare_lower(), ul.as_expr().declare_unit_lower());
    assert_eq!(tag_of(&p), TypeId::of::<Lower>());
    let p = p.eval();
    for d in 0..3 {
        assert_eq!(p[[d, d]], l[[d, d]]);
    }
    assert_eq!(p[[1, 0]], l[[1, 0]] * ul[[1, 0]]);
}

#[test]
fn schur_zero_diagonal_absorbs_a_unit_one() {
    let ul = unit_lower3();
    let sl = DenseMatrix::from_rows(&[
        &[0.0, 0.0, 0.0],
        &[6.0, 0.0, 0.0],
        &[-1.0, 4.0, 0.0],
    ])
    .unwrap();

    let q = schur(
        ul.as_expr().declare_unit_lower(),
        sl.as_expr().declare_strictly_lower(),
    );
    assert_eq!(tag_of(&q), TypeId::of::<StrictLower>());
    let q = q.eval();
    for d in 0..3 {
        assert_eq!(q[[d, d]], 0.0);
    }
    // sub-diagonal products survive the strict tag
    assert_eq!(q[[1, 0]], ul[[1, 0]] * sl[[1, 0]]);
    assert_eq!(q[[2, 1]], ul[[2, 1]] * sl[[2, 1]]);
}

#[test]
fn declaration_predicates_see_through_the_node_type() {
    fn strictly_upper<E: Expression>(_: &E) -> bool {
        matexpr::tag::is_strictly_upper_declaration::<E>()
    }
    fn unit_lower<E: Expression>(_: &E) -> bool {
        matexpr::tag::is_unit_lower_declaration::<E>()
    }

    let b = upper3();
    let su = b.as_expr().declare_strictly_upper();
    assert!(strictly_upper(&su));
    assert!(!strictly_upper(&b.as_expr()));

    let l = unit_lower3();
    let ul = l.as_expr().declare_unit_lower();
    assert!(unit_lower(&ul));
    // a product of declarations is structured but not itself a declaration
    let prod = l.as_expr().declare_unit_lower() * l.as_expr().declare_unit_lower();
    assert!(!unit_lower(&prod));
}

#[cfg(feature = "validate-tags")]
#[test]
#[should_panic(expected = "structural declaration violated")]
fn false_declaration_panics_under_validation() {
    let a = DenseMatrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]).unwrap();
    let mut out = DenseMatrix::zeros(2, 2);
    matexpr::assign(&mut out, &a.as_expr().declare_symmetric());
}

#[cfg(feature = "validate-tags")]
#[test]
fn honest_declaration_passes_validation() {
    let u = upper3();
    let mut out = DenseMatrix::zeros(3, 3);
    matexpr::assign(&mut out, &u.as_expr().declare_upper());
    assert_eq!(out, u);
}

#[test]
fn symmetric_declaration_mirrors_on_evaluation() {
    let s = DenseMatrix::from_rows(&[
        &[2.0, 1.0, -1.0],
        &[1.0, 3.0, 0.5],
        &[-1.0, 0.5, 4.0],
    ])
    .unwrap();
    let e = s.as_expr().declare_symmetric();
    assert_eq!(tag_of(&e), TypeId::of::<Symmetric>());
    let m = (e + s.as_expr().declare_symmetric()).eval();
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(m[[i, j]], 2.0 * s[[i, j]]);
            assert_eq!(m[[i, j]], m[[j, i]]);
        }
    }
}

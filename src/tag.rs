//! Structural tags: compile-time promises about the runtime values of an
//! expression.
//!
//! A tag attached to an expression means "the materialized values of this
//! expression always satisfy this predicate". Tags are zero-sized marker
//! types forming a closed set, composed through explicit type-level
//! tables rather than first-match rules:
//!
//! - [`JoinWith`]: both promises hold simultaneously (used by declaration
//!   nodes). The table resolves to the most specific joint tag, e.g.
//!   `Symmetric ∧ Upper = Diagonal`.
//! - [`AddWith`]: tag of a sum or difference.
//! - [`MulWith`]: tag of a matrix product, e.g. `Upper × Upper = Upper`,
//!   `StrictLower × Lower = StrictLower`.
//! - [`SchurWith`]: tag of an entrywise product. The zero pattern is the
//!   intersection of the operand patterns, a zero diagonal absorbs a unit
//!   one, and symmetry carries over only when both operands share it.
//!
//! Every table entry must be provably correct for *all* operand values,
//! never merely likely; where no specific tag can be proven the entry
//! falls back to [`General`]. Contradictory joins (e.g. a unit diagonal
//! that is also strictly triangular) resolve to [`Null`], the tag of the
//! zero matrix, which satisfies every predicate vacuously.

use num_traits::{One, Zero};

use crate::expr::Expression;
use crate::scalar::Scalar;

/// Runtime classification of the structurally nonzero region of a tag.
///
/// The evaluation engine matches on this constant to restrict its write
/// loops; the match is resolved at compile time since `REGION` is an
/// associated const.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// No restriction.
    Full,
    /// Entries above the diagonal are zero. `strict` additionally pins the
    /// diagonal to zero, `unit` pins it to one.
    Lower { strict: bool, unit: bool },
    /// Entries below the diagonal are zero.
    Upper { strict: bool, unit: bool },
    /// Off-diagonal entries are zero.
    Diagonal { unit: bool },
    /// Every entry is zero.
    Zero,
}

/// Compile-time structural tag.
///
/// The associated consts are the static introspection surface: an external
/// conformance suite can query them for any expression type via
/// `E::Tag::IS_UPPER` etc. without instantiating data.
pub trait Structure: Copy + Default + std::fmt::Debug + 'static {
    /// Human-readable tag name, used in validation panics.
    const NAME: &'static str;
    /// Structurally nonzero region certified by this tag.
    const REGION: Region;

    const IS_GENERAL: bool = false;
    const IS_SYMMETRIC: bool = false;
    const IS_HERMITIAN: bool = false;
    const IS_LOWER: bool = false;
    const IS_UPPER: bool = false;
    const IS_STRICTLY_TRIANGULAR: bool = false;
    const IS_UNIT_DIAGONAL: bool = false;
    const IS_DIAGONAL: bool = false;
    const IS_ZERO: bool = false;

    /// Tag of the transposed expression.
    type Transposed: Structure;
    /// Tag after multiplication by an arbitrary runtime scalar. Unit
    /// diagonals and Hermitian structure do not survive an unknown factor.
    type Scaled: Structure;
}

/// Tag combination: both promises hold at once.
pub trait JoinWith<B: Structure>: Structure {
    type Output: Structure;
}

/// Tag of `A + B` (and `A - B`).
pub trait AddWith<B: Structure>: Structure {
    type Output: Structure;
}

/// Tag of the matrix product `A * B`.
pub trait MulWith<B: Structure>: Structure {
    type Output: Structure;
}

/// Tag of the entrywise (Schur) product `A ⊙ B`.
///
/// Distinct from [`JoinWith`]: a join asserts that both promises hold for
/// the *same* values, while a Schur product multiplies two independent
/// matrices. `p[i][j] = a[i][j] * b[i][j]` is zero wherever either factor
/// is structurally zero, is one on the diagonal only when both factors
/// are, and is symmetric only when both factors are.
pub trait SchurWith<B: Structure>: Structure {
    type Output: Structure;
}

// ============================================================================
// The tag set
// ============================================================================

/// No structural promise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct General;

/// `a[i][j] == a[j][i]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Symmetric;

/// `a[i][j] == conj(a[j][i])`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hermitian;

/// Zero above the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lower;

/// Zero above and on the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrictLower;

/// Zero above the diagonal, ones on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitLower;

/// Zero below the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Upper;

/// Zero below and on the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrictUpper;

/// Zero below the diagonal, ones on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitUpper;

/// Zero off the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagonal;

/// The zero matrix. Satisfies every structural predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Null;

macro_rules! structure {
    ($ty:ident, $name:literal, $region:expr, $transposed:ty, $scaled:ty,
     [$($flag:ident),*]) => {
        impl Structure for $ty {
            const NAME: &'static str = $name;
            const REGION: Region = $region;
            $(const $flag: bool = true;)*
            type Transposed = $transposed;
            type Scaled = $scaled;
        }
    };
}

structure!(General, "general", Region::Full, General, General, [IS_GENERAL]);
structure!(
    Symmetric,
    "symmetric",
    Region::Full,
    Symmetric,
    Symmetric,
    [IS_SYMMETRIC]
);
structure!(
    Hermitian,
    "hermitian",
    Region::Full,
    Hermitian,
    General,
    [IS_HERMITIAN]
);
structure!(
    Lower,
    "lower",
    Region::Lower {
        strict: false,
        unit: false
    },
    Upper,
    Lower,
    [IS_LOWER]
);
structure!(
    StrictLower,
    "strictly lower",
    Region::Lower {
        strict: true,
        unit: false
    },
    StrictUpper,
    StrictLower,
    [IS_LOWER, IS_STRICTLY_TRIANGULAR]
);
structure!(
    UnitLower,
    "unit lower",
    Region::Lower {
        strict: false,
        unit: true
    },
    UnitUpper,
    Lower,
    [IS_LOWER, IS_UNIT_DIAGONAL]
);
structure!(
    Upper,
    "upper",
    Region::Upper {
        strict: false,
        unit: false
    },
    Lower,
    Upper,
    [IS_UPPER]
);
structure!(
    StrictUpper,
    "strictly upper",
    Region::Upper {
        strict: true,
        unit: false
    },
    StrictLower,
    StrictUpper,
    [IS_UPPER, IS_STRICTLY_TRIANGULAR]
);
structure!(
    UnitUpper,
    "unit upper",
    Region::Upper {
        strict: false,
        unit: true
    },
    UnitLower,
    Upper,
    [IS_UPPER, IS_UNIT_DIAGONAL]
);
structure!(
    Diagonal,
    "diagonal",
    Region::Diagonal { unit: false },
    Diagonal,
    Diagonal,
    [IS_SYMMETRIC, IS_LOWER, IS_UPPER, IS_DIAGONAL]
);
structure!(
    Null,
    "null",
    Region::Zero,
    Null,
    Null,
    [
        IS_SYMMETRIC,
        IS_HERMITIAN,
        IS_LOWER,
        IS_UPPER,
        IS_STRICTLY_TRIANGULAR,
        IS_DIAGONAL,
        IS_ZERO
    ]
);

// ============================================================================
// Combination tables
// ============================================================================

macro_rules! combine_table {
    ($table:ident => { $( ($a:ty, $b:ty) => $out:ty; )* }) => {
        $(
            impl $table<$b> for $a {
                type Output = $out;
            }
        )*
    };
}

combine_table!(JoinWith => {
    (General, General) => General;
    (General, Symmetric) => Symmetric;
    (General, Hermitian) => Hermitian;
    (General, Lower) => Lower;
    (General, StrictLower) => StrictLower;
    (General, UnitLower) => UnitLower;
    (General, Upper) => Upper;
    (General, StrictUpper) => StrictUpper;
    (General, UnitUpper) => UnitUpper;
    (General, Diagonal) => Diagonal;
    (General, Null) => Null;

    (Symmetric, General) => Symmetric;
    (Symmetric, Symmetric) => Symmetric;
    (Symmetric, Hermitian) => Symmetric;
    (Symmetric, Lower) => Diagonal;
    (Symmetric, StrictLower) => Null;
    (Symmetric, UnitLower) => Diagonal;
    (Symmetric, Upper) => Diagonal;
    (Symmetric, StrictUpper) => Null;
    (Symmetric, UnitUpper) => Diagonal;
    (Symmetric, Diagonal) => Diagonal;
    (Symmetric, Null) => Null;

    (Hermitian, General) => Hermitian;
    (Hermitian, Symmetric) => Symmetric;
    (Hermitian, Hermitian) => Hermitian;
    (Hermitian, Lower) => Diagonal;
    (Hermitian, StrictLower) => Null;
    (Hermitian, UnitLower) => Diagonal;
    (Hermitian, Upper) => Diagonal;
    (Hermitian, StrictUpper) => Null;
    (Hermitian, UnitUpper) => Diagonal;
    (Hermitian, Diagonal) => Diagonal;
    (Hermitian, Null) => Null;

    (Lower, General) => Lower;
    (Lower, Symmetric) => Diagonal;
    (Lower, Hermitian) => Diagonal;
    (Lower, Lower) => Lower;
    (Lower, StrictLower) => StrictLower;
    (Lower, UnitLower) => UnitLower;
    (Lower, Upper) => Diagonal;
    (Lower, StrictUpper) => Null;
    (Lower, UnitUpper) => Diagonal;
    (Lower, Diagonal) => Diagonal;
    (Lower, Null) => Null;

    (StrictLower, General) => StrictLower;
    (StrictLower, Symmetric) => Null;
    (StrictLower, Hermitian) => Null;
    (StrictLower, Lower) => StrictLower;
    (StrictLower, StrictLower) => StrictLower;
    (StrictLower, UnitLower) => Null;
    (StrictLower, Upper) => Null;
    (StrictLower, StrictUpper) => Null;
    (StrictLower, UnitUpper) => Null;
    (StrictLower, Diagonal) => Null;
    (StrictLower, Null) => Null;

    (UnitLower, General) => UnitLower;
    (UnitLower, Symmetric) => Diagonal;
    (UnitLower, Hermitian) => Diagonal;
    (UnitLower, Lower) => UnitLower;
    (UnitLower, StrictLower) => Null;
    (UnitLower, UnitLower) => UnitLower;
    (UnitLower, Upper) => Diagonal;
    (UnitLower, StrictUpper) => Null;
    (UnitLower, UnitUpper) => Diagonal;
    (UnitLower, Diagonal) => Diagonal;
    (UnitLower, Null) => Null;

    (Upper, General) => Upper;
    (Upper, Symmetric) => Diagonal;
    (Upper, Hermitian) => Diagonal;
    (Upper, Lower) => Diagonal;
    (Upper, StrictLower) => Null;
    (Upper, UnitLower) => Diagonal;
    (Upper, Upper) => Upper;
    (Upper, StrictUpper) => StrictUpper;
    (Upper, UnitUpper) => UnitUpper;
    (Upper, Diagonal) => Diagonal;
    (Upper, Null) => Null;

    (StrictUpper, General) => StrictUpper;
    (StrictUpper, Symmetric) => Null;
    (StrictUpper, Hermitian) => Null;
    (StrictUpper, Lower) => Null;
    (StrictUpper, StrictLower) => Null;
    (StrictUpper, UnitLower) => Null;
    (StrictUpper, Upper) => StrictUpper;
    (StrictUpper, StrictUpper) => StrictUpper;
    (StrictUpper, UnitUpper) => Null;
    (StrictUpper, Diagonal) => Null;
    (StrictUpper, Null) => Null;

    (UnitUpper, General) => UnitUpper;
    (UnitUpper, Symmetric) => Diagonal;
    (UnitUpper, Hermitian) => Diagonal;
    (UnitUpper, Lower) => Diagonal;
    (UnitUpper, StrictLower) => Null;
    (UnitUpper, UnitLower) => Diagonal;
    (UnitUpper, Upper) => UnitUpper;
    (UnitUpper, StrictUpper) => Null;
    (UnitUpper, UnitUpper) => UnitUpper;
    (UnitUpper, Diagonal) => Diagonal;
    (UnitUpper, Null) => Null;

    (Diagonal, General) => Diagonal;
    (Diagonal, Symmetric) => Diagonal;
    (Diagonal, Hermitian) => Diagonal;
    (Diagonal, Lower) => Diagonal;
    (Diagonal, StrictLower) => Null;
    (Diagonal, UnitLower) => Diagonal;
    (Diagonal, Upper) => Diagonal;
    (Diagonal, StrictUpper) => Null;
    (Diagonal, UnitUpper) => Diagonal;
    (Diagonal, Diagonal) => Diagonal;
    (Diagonal, Null) => Null;

    (Null, General) => Null;
    (Null, Symmetric) => Null;
    (Null, Hermitian) => Null;
    (Null, Lower) => Null;
    (Null, StrictLower) => Null;
    (Null, UnitLower) => Null;
    (Null, Upper) => Null;
    (Null, StrictUpper) => Null;
    (Null, UnitUpper) => Null;
    (Null, Diagonal) => Null;
    (Null, Null) => Null;
});

combine_table!(AddWith => {
    (General, General) => General;
    (General, Symmetric) => General;
    (General, Hermitian) => General;
    (General, Lower) => General;
    (General, StrictLower) => General;
    (General, UnitLower) => General;
    (General, Upper) => General;
    (General, StrictUpper) => General;
    (General, UnitUpper) => General;
    (General, Diagonal) => General;
    (General, Null) => General;

    (Symmetric, General) => General;
    (Symmetric, Symmetric) => Symmetric;
    (Symmetric, Hermitian) => General;
    (Symmetric, Lower) => General;
    (Symmetric, StrictLower) => General;
    (Symmetric, UnitLower) => General;
    (Symmetric, Upper) => General;
    (Symmetric, StrictUpper) => General;
    (Symmetric, UnitUpper) => General;
    (Symmetric, Diagonal) => Symmetric;
    (Symmetric, Null) => Symmetric;

    (Hermitian, General) => General;
    (Hermitian, Symmetric) => General;
    (Hermitian, Hermitian) => Hermitian;
    (Hermitian, Lower) => General;
    (Hermitian, StrictLower) => General;
    (Hermitian, UnitLower) => General;
    (Hermitian, Upper) => General;
    (Hermitian, StrictUpper) => General;
    (Hermitian, UnitUpper) => General;
    (Hermitian, Diagonal) => General;
    (Hermitian, Null) => Hermitian;

    (Lower, General) => General;
    (Lower, Symmetric) => General;
    (Lower, Hermitian) => General;
    (Lower, Lower) => Lower;
    (Lower, StrictLower) => Lower;
    (Lower, UnitLower) => Lower;
    (Lower, Upper) => General;
    (Lower, StrictUpper) => General;
    (Lower, UnitUpper) => General;
    (Lower, Diagonal) => Lower;
    (Lower, Null) => Lower;

    (StrictLower, General) => General;
    (StrictLower, Symmetric) => General;
    (StrictLower, Hermitian) => General;
    (StrictLower, Lower) => Lower;
    (StrictLower, StrictLower) => StrictLower;
    (StrictLower, UnitLower) => UnitLower;
    (StrictLower, Upper) => General;
    (StrictLower, StrictUpper) => General;
    (StrictLower, UnitUpper) => General;
    (StrictLower, Diagonal) => Lower;
    (StrictLower, Null) => StrictLower;

    (UnitLower, General) => General;
    (UnitLower, Symmetric) => General;
    (UnitLower, Hermitian) => General;
    (UnitLower, Lower) => Lower;
    (UnitLower, StrictLower) => UnitLower;
    (UnitLower, UnitLower) => Lower;
    (UnitLower, Upper) => General;
    (UnitLower, StrictUpper) => General;
    (UnitLower, UnitUpper) => General;
    (UnitLower, Diagonal) => Lower;
    (UnitLower, Null) => UnitLower;

    (Upper, General) => General;
    (Upper, Symmetric) => General;
    (Upper, Hermitian) => General;
    (Upper, Lower) => General;
    (Upper, StrictLower) => General;
    (Upper, UnitLower) => General;
    (Upper, Upper) => Upper;
    (Upper, StrictUpper) => Upper;
    (Upper, UnitUpper) => Upper;
    (Upper, Diagonal) => Upper;
    (Upper, Null) => Upper;

    (StrictUpper, General) => General;
    (StrictUpper, Symmetric) => General;
    (StrictUpper, Hermitian) => General;
    (StrictUpper, Lower) => General;
    (StrictUpper, StrictLower) => General;
    (StrictUpper, UnitLower) => General;
    (StrictUpper, Upper) => Upper;
    (StrictUpper, StrictUpper) => StrictUpper;
    (StrictUpper, UnitUpper) => UnitUpper;
    (StrictUpper, Diagonal) => Upper;
    (StrictUpper, Null) => StrictUpper;

    (UnitUpper, General) => General;
    (UnitUpper, Symmetric) => General;
    (UnitUpper, Hermitian) => General;
    (UnitUpper, Lower) => General;
    (UnitUpper, StrictLower) => General;
    (UnitUpper, UnitLower) => General;
    (UnitUpper, Upper) => Upper;
    (UnitUpper, StrictUpper) => UnitUpper;
    (UnitUpper, UnitUpper) => Upper;
    (UnitUpper, Diagonal) => Upper;
    (UnitUpper, Null) => UnitUpper;

    (Diagonal, General) => General;
    (Diagonal, Symmetric) => Symmetric;
    (Diagonal, Hermitian) => General;
    (Diagonal, Lower) => Lower;
    (Diagonal, StrictLower) => Lower;
    (Diagonal, UnitLower) => Lower;
    (Diagonal, Upper) => Upper;
    (Diagonal, StrictUpper) => Upper;
    (Diagonal, UnitUpper) => Upper;
    (Diagonal, Diagonal) => Diagonal;
    (Diagonal, Null) => Diagonal;

    (Null, General) => General;
    (Null, Symmetric) => Symmetric;
    (Null, Hermitian) => Hermitian;
    (Null, Lower) => Lower;
    (Null, StrictLower) => StrictLower;
    (Null, UnitLower) => UnitLower;
    (Null, Upper) => Upper;
    (Null, StrictUpper) => StrictUpper;
    (Null, UnitUpper) => UnitUpper;
    (Null, Diagonal) => Diagonal;
    (Null, Null) => Null;
});

combine_table!(MulWith => {
    (General, General) => General;
    (General, Symmetric) => General;
    (General, Hermitian) => General;
    (General, Lower) => General;
    (General, StrictLower) => General;
    (General, UnitLower) => General;
    (General, Upper) => General;
    (General, StrictUpper) => General;
    (General, UnitUpper) => General;
    (General, Diagonal) => General;
    (General, Null) => Null;

    (Symmetric, General) => General;
    (Symmetric, Symmetric) => General;
    (Symmetric, Hermitian) => General;
    (Symmetric, Lower) => General;
    (Symmetric, StrictLower) => General;
    (Symmetric, UnitLower) => General;
    (Symmetric, Upper) => General;
    (Symmetric, StrictUpper) => General;
    (Symmetric, UnitUpper) => General;
    (Symmetric, Diagonal) => General;
    (Symmetric, Null) => Null;

    (Hermitian, General) => General;
    (Hermitian, Symmetric) => General;
    (Hermitian, Hermitian) => General;
    (Hermitian, Lower) => General;
    (Hermitian, StrictLower) => General;
    (Hermitian, UnitLower) => General;
    (Hermitian, Upper) => General;
    (Hermitian, StrictUpper) => General;
    (Hermitian, UnitUpper) => General;
    (Hermitian, Diagonal) => General;
    (Hermitian, Null) => Null;

    (Lower, General) => General;
    (Lower, Symmetric) => General;
    (Lower, Hermitian) => General;
    (Lower, Lower) => Lower;
    (Lower, StrictLower) => StrictLower;
    (Lower, UnitLower) => Lower;
    (Lower, Upper) => General;
    (Lower, StrictUpper) => General;
    (Lower, UnitUpper) => General;
    (Lower, Diagonal) => Lower;
    (Lower, Null) => Null;

    (StrictLower, General) => General;
    (StrictLower, Symmetric) => General;
    (StrictLower, Hermitian) => General;
    (StrictLower, Lower) => StrictLower;
    (StrictLower, StrictLower) => StrictLower;
    (StrictLower, UnitLower) => StrictLower;
    (StrictLower, Upper) => General;
    (StrictLower, StrictUpper) => General;
    (StrictLower, UnitUpper) => General;
    (StrictLower, Diagonal) => StrictLower;
    (StrictLower, Null) => Null;

    (UnitLower, General) => General;
    (UnitLower, Symmetric) => General;
    (UnitLower, Hermitian) => General;
    (UnitLower, Lower) => Lower;
    (UnitLower, StrictLower) => StrictLower;
    (UnitLower, UnitLower) => UnitLower;
    (UnitLower, Upper) => General;
    (UnitLower, StrictUpper) => General;
    (UnitLower, UnitUpper) => General;
    (UnitLower, Diagonal) => Lower;
    (UnitLower, Null) => Null;

    (Upper, General) => General;
    (Upper, Symmetric) => General;
    (Upper, Hermitian) => General;
    (Upper, Lower) => General;
    (Upper, StrictLower) => General;
    (Upper, UnitLower) => General;
    (Upper, Upper) => Upper;
    (Upper, StrictUpper) => StrictUpper;
    (Upper, UnitUpper) => Upper;
    (Upper, Diagonal) => Upper;
    (Upper, Null) => Null;

    (StrictUpper, General) => General;
    (StrictUpper, Symmetric) => General;
    (StrictUpper, Hermitian) => General;
    (StrictUpper, Lower) => General;
    (StrictUpper, StrictLower) => General;
    (StrictUpper, UnitLower) => General;
    (StrictUpper, Upper) => StrictUpper;
    (StrictUpper, StrictUpper) => StrictUpper;
    (StrictUpper, UnitUpper) => StrictUpper;
    (StrictUpper, Diagonal) => StrictUpper;
    (StrictUpper, Null) => Null;

    (UnitUpper, General) => General;
    (UnitUpper, Symmetric) => General;
    (UnitUpper, Hermitian) => General;
    (UnitUpper, Lower) => General;
    (UnitUpper, StrictLower) => General;
    (UnitUpper, UnitLower) => General;
    (UnitUpper, Upper) => Upper;
    (UnitUpper, StrictUpper) => StrictUpper;
    (UnitUpper, UnitUpper) => UnitUpper;
    (UnitUpper, Diagonal) => Upper;
    (UnitUpper, Null) => Null;

    (Diagonal, General) => General;
    (Diagonal, Symmetric) => General;
    (Diagonal, Hermitian) => General;
    (Diagonal, Lower) => Lower;
    (Diagonal, StrictLower) => StrictLower;
    (Diagonal, UnitLower) => Lower;
    (Diagonal, Upper) => Upper;
    (Diagonal, StrictUpper) => StrictUpper;
    (Diagonal, UnitUpper) => Upper;
    (Diagonal, Diagonal) => Diagonal;
    (Diagonal, Null) => Null;

    (Null, General) => Null;
    (Null, Symmetric) => Null;
    (Null, Hermitian) => Null;
    (Null, Lower) => Null;
    (Null, StrictLower) => Null;
    (Null, UnitLower) => Null;
    (Null, Upper) => Null;
    (Null, StrictUpper) => Null;
    (Null, UnitUpper) => Null;
    (Null, Diagonal) => Null;
    (Null, Null) => Null;
});

combine_table!(SchurWith => {
    (General, General) => General;
    (General, Symmetric) => General;
    (General, Hermitian) => General;
    (General, Lower) => Lower;
    (General, StrictLower) => StrictLower;
    (General, UnitLower) => Lower;
    (General, Upper) => Upper;
    (General, StrictUpper) => StrictUpper;
    (General, UnitUpper) => Upper;
    (General, Diagonal) => Diagonal;
    (General, Null) => Null;

    (Symmetric, General) => General;
    (Symmetric, Symmetric) => Symmetric;
    (Symmetric, Hermitian) => General;
    (Symmetric, Lower) => Lower;
    (Symmetric, StrictLower) => StrictLower;
    (Symmetric, UnitLower) => Lower;
    (Symmetric, Upper) => Upper;
    (Symmetric, StrictUpper) => StrictUpper;
    (Symmetric, UnitUpper) => Upper;
    (Symmetric, Diagonal) => Diagonal;
    (Symmetric, Null) => Null;

    (Hermitian, General) => General;
    (Hermitian, Symmetric) => General;
    (Hermitian, Hermitian) => Hermitian;
    (Hermitian, Lower) => Lower;
    (Hermitian, StrictLower) => StrictLower;
    (Hermitian, UnitLower) => Lower;
    (Hermitian, Upper) => Upper;
    (Hermitian, StrictUpper) => StrictUpper;
    (Hermitian, UnitUpper) => Upper;
    (Hermitian, Diagonal) => Diagonal;
    (Hermitian, Null) => Null;

    (Lower, General) => Lower;
    (Lower, Symmetric) => Lower;
    (Lower, Hermitian) => Lower;
    (Lower, Lower) => Lower;
    (Lower, StrictLower) => StrictLower;
    (Lower, UnitLower) => Lower;
    (Lower, Upper) => Diagonal;
    (Lower, StrictUpper) => Null;
    (Lower, UnitUpper) => Diagonal;
    (Lower, Diagonal) => Diagonal;
    (Lower, Null) => Null;

    (StrictLower, General) => StrictLower;
    (StrictLower, Symmetric) => StrictLower;
    (StrictLower, Hermitian) => StrictLower;
    (StrictLower, Lower) => StrictLower;
    (StrictLower, StrictLower) => StrictLower;
    (StrictLower, UnitLower) => StrictLower;
    (StrictLower, Upper) => Null;
    (StrictLower, StrictUpper) => Null;
    (StrictLower, UnitUpper) => Null;
    (StrictLower, Diagonal) => Null;
    (StrictLower, Null) => Null;

    (UnitLower, General) => Lower;
    (UnitLower, Symmetric) => Lower;
    (UnitLower, Hermitian) => Lower;
    (UnitLower, Lower) => Lower;
    (UnitLower, StrictLower) => StrictLower;
    (UnitLower, UnitLower) => UnitLower;
    (UnitLower, Upper) => Diagonal;
    (UnitLower, StrictUpper) => Null;
    (UnitLower, UnitUpper) => Diagonal;
    (UnitLower, Diagonal) => Diagonal;
    (UnitLower, Null) => Null;

    (Upper, General) => Upper;
    (Upper, Symmetric) => Upper;
    (Upper, Hermitian) => Upper;
    (Upper, Lower) => Diagonal;
    (Upper, StrictLower) => Null;
    (Upper, UnitLower) => Diagonal;
    (Upper, Upper) => Upper;
    (Upper, StrictUpper) => StrictUpper;
    (Upper, UnitUpper) => Upper;
    (Upper, Diagonal) => Diagonal;
    (Upper, Null) => Null;

    (StrictUpper, General) => StrictUpper;
    (StrictUpper, Symmetric) => StrictUpper;
    (StrictUpper, Hermitian) => StrictUpper;
    (StrictUpper, Lower) => Null;
    (StrictUpper, StrictLower) => Null;
    (StrictUpper, UnitLower) => Null;
    (StrictUpper, Upper) => StrictUpper;
    (StrictUpper, StrictUpper) => StrictUpper;
    (StrictUpper, UnitUpper) => StrictUpper;
    (StrictUpper, Diagonal) => Null;
    (StrictUpper, Null) => Null;

    (UnitUpper, General) => Upper;
    (UnitUpper, Symmetric) => Upper;
    (UnitUpper, Hermitian) => Upper;
    (UnitUpper, Lower) => Diagonal;
    (UnitUpper, StrictLower) => Null;
    (UnitUpper, UnitLower) => Diagonal;
    (UnitUpper, Upper) => Upper;
    (UnitUpper, StrictUpper) => StrictUpper;
    (UnitUpper, UnitUpper) => UnitUpper;
    (UnitUpper, Diagonal) => Diagonal;
    (UnitUpper, Null) => Null;

    (Diagonal, General) => Diagonal;
    (Diagonal, Symmetric) => Diagonal;
    (Diagonal, Hermitian) => Diagonal;
    (Diagonal, Lower) => Diagonal;
    (Diagonal, StrictLower) => Null;
    (Diagonal, UnitLower) => Diagonal;
    (Diagonal, Upper) => Diagonal;
    (Diagonal, StrictUpper) => Null;
    (Diagonal, UnitUpper) => Diagonal;
    (Diagonal, Diagonal) => Diagonal;
    (Diagonal, Null) => Null;

    (Null, General) => Null;
    (Null, Symmetric) => Null;
    (Null, Hermitian) => Null;
    (Null, Lower) => Null;
    (Null, StrictLower) => Null;
    (Null, UnitLower) => Null;
    (Null, Upper) => Null;
    (Null, StrictUpper) => Null;
    (Null, UnitUpper) => Null;
    (Null, Diagonal) => Null;
    (Null, Null) => Null;
});

// ============================================================================
// Expression-type predicates
// ============================================================================

/// Is `E` a declaration node promising strictly-lower structure?
pub fn is_strictly_lower_declaration<E: Expression>() -> bool {
    E::IS_DECLARATION && E::Tag::IS_LOWER && E::Tag::IS_STRICTLY_TRIANGULAR
}

/// Is `E` a declaration node promising unit-lower structure?
pub fn is_unit_lower_declaration<E: Expression>() -> bool {
    E::IS_DECLARATION && E::Tag::IS_LOWER && E::Tag::IS_UNIT_DIAGONAL
}

/// Is `E` a declaration node promising unit-upper structure?
pub fn is_unit_upper_declaration<E: Expression>() -> bool {
    E::IS_DECLARATION && E::Tag::IS_UPPER && E::Tag::IS_UNIT_DIAGONAL
}

/// Is `E` a declaration node promising strictly-upper structure?
pub fn is_strictly_upper_declaration<E: Expression>() -> bool {
    E::IS_DECLARATION && E::Tag::IS_UPPER && E::Tag::IS_STRICTLY_TRIANGULAR
}

/// Does evaluating `E` write back into one of its operands? Such nodes
/// force pessimistic alias analysis.
pub fn is_modification<E: Expression>() -> bool {
    E::MODIFIES_OPERAND
}

// ============================================================================
// Runtime validation (validate-tags feature and conformance tests)
// ============================================================================

/// Check a materialized column-major buffer against the promise of `S`.
///
/// Used by the `validate-tags` build to catch broken caller certificates;
/// the default build never calls this on the assignment path.
pub fn holds<S: Structure, T: Scalar>(data: &[T], rows: usize, cols: usize) -> bool {
    debug_assert_eq!(data.len(), rows * cols);
    let at = |i: usize, j: usize| data[i + j * rows];

    let region_ok = match S::REGION {
        Region::Full => true,
        Region::Lower { strict, unit } => (0..cols).all(|j| {
            (0..rows.min(j)).all(|i| at(i, j).is_zero())
                && (!strict || j >= rows || at(j, j).is_zero())
                && (!unit || j >= rows || at(j, j).is_one())
        }),
        Region::Upper { strict, unit } => (0..cols).all(|j| {
            ((j + 1)..rows).all(|i| at(i, j).is_zero())
                && (!strict || j >= rows || at(j, j).is_zero())
                && (!unit || j >= rows || at(j, j).is_one())
        }),
        Region::Diagonal { unit } => (0..cols).all(|j| {
            (0..rows).all(|i| i == j || at(i, j).is_zero())
                && (!unit || j >= rows || at(j, j).is_one())
        }),
        Region::Zero => data.iter().all(|v| v.is_zero()),
    };
    if !region_ok {
        return false;
    }

    if (S::IS_SYMMETRIC || S::IS_HERMITIAN) && rows != cols {
        return false;
    }
    if S::IS_SYMMETRIC && !(0..cols).all(|j| (0..rows).all(|i| at(i, j) == at(j, i))) {
        return false;
    }
    if S::IS_HERMITIAN && !(0..cols).all(|j| (0..rows).all(|i| at(i, j) == at(j, i).conj())) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same<A: Structure, B: Structure>() -> bool {
        std::any::TypeId::of::<A>() == std::any::TypeId::of::<B>()
    }

    #[test]
    fn join_resolves_to_most_specific() {
        assert!(same::<<Symmetric as JoinWith<Upper>>::Output, Diagonal>());
        assert!(same::<<Lower as JoinWith<Upper>>::Output, Diagonal>());
        assert!(same::<<StrictLower as JoinWith<Upper>>::Output, Null>());
        assert!(same::<<General as JoinWith<StrictUpper>>::Output, StrictUpper>());
        assert!(same::<<UnitLower as JoinWith<UnitUpper>>::Output, Diagonal>());
    }

    #[test]
    fn product_tags() {
        assert!(same::<<Upper as MulWith<Upper>>::Output, Upper>());
        assert!(same::<<StrictLower as MulWith<Lower>>::Output, StrictLower>());
        assert!(same::<<UnitLower as MulWith<UnitLower>>::Output, UnitLower>());
        assert!(same::<<General as MulWith<StrictUpper>>::Output, General>());
        assert!(same::<<Diagonal as MulWith<Diagonal>>::Output, Diagonal>());
        assert!(same::<<Upper as MulWith<Null>>::Output, Null>());
    }

    #[test]
    fn schur_tags_intersect_zero_patterns() {
        // Symmetry does not constrain the other factor.
        assert!(same::<<Symmetric as SchurWith<General>>::Output, General>());
        assert!(same::<<Symmetric as SchurWith<Symmetric>>::Output, Symmetric>());
        assert!(same::<<Hermitian as SchurWith<Hermitian>>::Output, Hermitian>());
        assert!(same::<<Symmetric as SchurWith<Hermitian>>::Output, General>());
        // A unit diagonal survives only when both factors pin it.
        assert!(same::<<Lower as SchurWith<UnitLower>>::Output, Lower>());
        assert!(same::<<UnitLower as SchurWith<UnitLower>>::Output, UnitLower>());
        // A zero diagonal absorbs a unit one; off-diagonal products survive.
        assert!(same::<<UnitLower as SchurWith<StrictLower>>::Output, StrictLower>());
        // Opposite triangles leave at most the diagonal.
        assert!(same::<<Lower as SchurWith<Upper>>::Output, Diagonal>());
        assert!(same::<<StrictLower as SchurWith<Upper>>::Output, Null>());
        assert!(same::<<Diagonal as SchurWith<StrictUpper>>::Output, Null>());
    }

    #[test]
    fn sum_tags() {
        assert!(same::<<Upper as AddWith<Upper>>::Output, Upper>());
        assert!(same::<<UnitLower as AddWith<UnitLower>>::Output, Lower>());
        assert!(same::<<StrictLower as AddWith<UnitLower>>::Output, UnitLower>());
        assert!(same::<<Lower as AddWith<Upper>>::Output, General>());
        assert!(same::<<Null as AddWith<Hermitian>>::Output, Hermitian>());
    }

    #[test]
    fn transpose_is_an_involution() {
        fn involutive<S: Structure>() -> bool {
            same::<<S::Transposed as Structure>::Transposed, S>()
        }
        assert!(involutive::<General>());
        assert!(involutive::<Symmetric>());
        assert!(involutive::<Hermitian>());
        assert!(involutive::<Lower>());
        assert!(involutive::<StrictLower>());
        assert!(involutive::<UnitLower>());
        assert!(involutive::<Upper>());
        assert!(involutive::<StrictUpper>());
        assert!(involutive::<UnitUpper>());
        assert!(involutive::<Diagonal>());
        assert!(involutive::<Null>());
    }

    #[test]
    fn holds_checks_regions() {
        // 2x2 column-major: [a00, a10, a01, a11]
        let upper = [1.0f64, 0.0, 2.0, 3.0];
        assert!(holds::<Upper, f64>(&upper, 2, 2));
        assert!(!holds::<Lower, f64>(&upper, 2, 2));
        assert!(!holds::<StrictUpper, f64>(&upper, 2, 2));

        let unit_lower = [1.0f64, 5.0, 0.0, 1.0];
        assert!(holds::<UnitLower, f64>(&unit_lower, 2, 2));
        assert!(!holds::<UnitUpper, f64>(&unit_lower, 2, 2));

        let sym = [1.0f64, 7.0, 7.0, 2.0];
        assert!(holds::<Symmetric, f64>(&sym, 2, 2));

        let zero = [0.0f64; 4];
        assert!(holds::<Null, f64>(&zero, 2, 2));
        assert!(holds::<StrictLower, f64>(&zero, 2, 2));
    }
}

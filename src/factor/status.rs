//! The single decode point for LAPACK-style `info` codes.
//!
//! The convention: `0` is success, `-i` means argument `i` was invalid
//! (a programming error in the adapter, surfaced as `Err`), and `+i`
//! carries a routine-specific deficiency (surfaced as a non-success
//! [`Outcome`]). The built-in fallbacks report through the same codes.

use crate::{ExprError, Result};

use super::Outcome;

/// Decode `info` from a direct factorization or solve, where a positive
/// code points at the singular pivot or diagonal entry.
pub(crate) fn translate_factor(routine: &'static str, info: i32) -> Result<Outcome> {
    match info {
        0 => Ok(Outcome::Success),
        i if i < 0 => Err(ExprError::BadArgument {
            routine,
            position: (-i) as usize,
        }),
        i => Ok(Outcome::RankDeficient {
            position: i as usize,
        }),
    }
}

/// Decode `info` from an iterative decomposition, where a positive code
/// counts unconverged quantities or exhausted sweeps.
pub(crate) fn translate_iterative(routine: &'static str, info: i32) -> Result<Outcome> {
    match info {
        0 => Ok(Outcome::Success),
        i if i < 0 => Err(ExprError::BadArgument {
            routine,
            position: (-i) as usize,
        }),
        i => Ok(Outcome::NotConverged { sweeps: i as usize }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert_eq!(translate_factor("dsytrf", 0).unwrap(), Outcome::Success);
        assert_eq!(translate_iterative("dgesvd", 0).unwrap(), Outcome::Success);
    }

    #[test]
    fn negative_is_bad_argument() {
        let err = translate_factor("dsytrf", -3).unwrap_err();
        match err {
            ExprError::BadArgument { routine, position } => {
                assert_eq!(routine, "dsytrf");
                assert_eq!(position, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn positive_is_deficiency() {
        assert_eq!(
            translate_factor("dsytrf", 2).unwrap(),
            Outcome::RankDeficient { position: 2 }
        );
        assert_eq!(
            translate_iterative("dgesvd", 5).unwrap(),
            Outcome::NotConverged { sweeps: 5 }
        );
    }
}

//! Field-pair equality check.
//!
//! Policy for one member read on both providers:
//! - both succeed: the values must be equal;
//! - both fail with the same failure kind: pass;
//! - both fail with different kinds: mismatch;
//! - exactly one fails: mismatch naming the side that failed.

use dtfj_model::Access;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{Mismatch, Side};

/// Applies the failure policy and hands back both values when both sides
/// succeeded. `Ok(None)` means both failed with the same kind.
pub fn pair_access<'a, T>(
    path: &str,
    ddr: &'a Access<T>,
    reference: &'a Access<T>,
) -> Result<Option<(&'a T, &'a T)>, Mismatch> {
    match (ddr, reference) {
        (Ok(d), Ok(r)) => Ok(Some((d, r))),
        (Err(d), Err(r)) if d.kind() == r.kind() => {
            debug!(path, kind = %d.kind(), ddr = %d, reference = %r, "both providers failed alike");
            Ok(None)
        }
        (Err(d), Err(r)) => {
            let m = Mismatch::ErrorKind {
                path: path.to_string(),
                ddr: d.kind(),
                reference: r.kind(),
            };
            warn!(%m, "field check failed");
            Err(m)
        }
        (Err(e), Ok(_)) => {
            let m = Mismatch::OneSided {
                path: path.to_string(),
                side: Side::Ddr,
                error: e.clone(),
            };
            warn!(%m, "field check failed");
            Err(m)
        }
        (Ok(_), Err(e)) => {
            let m = Mismatch::OneSided {
                path: path.to_string(),
                side: Side::Reference,
                error: e.clone(),
            };
            warn!(%m, "field check failed");
            Err(m)
        }
    }
}

/// Equality of two values that were already read successfully.
pub fn check_value<T: PartialEq + Debug>(path: &str, ddr: &T, reference: &T) -> Result<(), Mismatch> {
    if ddr == reference {
        return Ok(());
    }
    let m = Mismatch::Value {
        path: path.to_string(),
        ddr: format!("{ddr:?}"),
        reference: format!("{reference:?}"),
    };
    warn!(%m, "field check failed");
    Err(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtfj_model::{DataError, DataErrorKind};

    #[test]
    fn both_values_are_handed_back() {
        let a: Access<u32> = Ok(0x21);
        let b: Access<u32> = Ok(0x21);
        assert_eq!(pair_access("JavaClass.MODIFIERS", &a, &b), Ok(Some((&0x21, &0x21))));
        assert_eq!(check_value("JavaClass.MODIFIERS", &0x21, &0x21), Ok(()));
    }

    #[test]
    fn same_failure_kind_passes_even_with_different_detail() {
        let d: Access<String> = Err(DataError::corrupt("ddr detail"));
        let r: Access<String> = Err(DataError::corrupt("jextract detail"));
        assert_eq!(pair_access("JavaClass.NAME", &d, &r), Ok(None));
    }

    #[test]
    fn different_failure_kinds_fail() {
        let d: Access<String> = Err(DataError::corrupt(""));
        let r: Access<String> = Err(DataError::memory(0x40));
        let err = pair_access("JavaClass.NAME", &d, &r).unwrap_err();
        assert_eq!(
            err,
            Mismatch::ErrorKind {
                path: "JavaClass.NAME".to_string(),
                ddr: DataErrorKind::CorruptData,
                reference: DataErrorKind::MemoryAccess,
            }
        );
    }

    #[test]
    fn one_sided_failure_names_the_side() {
        let ok: Access<i32> = Ok(5);
        let bad: Access<i32> = Err(DataError::unavailable("no jni env"));

        match pair_access("JavaThread.PRIORITY", &bad, &ok).unwrap_err() {
            Mismatch::OneSided { side, .. } => assert_eq!(side, Side::Ddr),
            other => panic!("unexpected {other:?}"),
        }
        match pair_access("JavaThread.PRIORITY", &ok, &bad).unwrap_err() {
            Mismatch::OneSided { side, .. } => assert_eq!(side, Side::Reference),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unequal_values_report_both_renderings() {
        let d = "java/lang/Object".to_string();
        let r = "java/lang/String".to_string();
        match check_value("JavaClass.NAME", &d, &r).unwrap_err() {
            Mismatch::Value { ddr, reference, .. } => {
                assert_eq!(ddr, "\"java/lang/Object\"");
                assert_eq!(reference, "\"java/lang/String\"");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

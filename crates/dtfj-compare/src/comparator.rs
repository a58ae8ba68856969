use bitflags::Flags;
use dtfj_model::Access;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt::Debug;
use tracing::warn;

use crate::{CompareContext, Mismatch, VisitKey};

/// Checks one member of an entity pair.
pub type MemberCheck<E> = fn(&mut CompareContext<'_>, &E, &E) -> Result<(), Mismatch>;

/// Compares one DTFJ entity type across two providers.
///
/// `MEMBERS` is the dispatch table: one entry per flag of `Members`, in the
/// order members are checked. `test_equals` walks the table and stops at the
/// first divergence.
pub trait Comparator {
    type Entity: 'static;
    type Members: Flags + Copy + Debug + 'static;

    const ENTITY: &'static str;
    const MEMBERS: &'static [(Self::Members, MemberCheck<Self::Entity>)];

    /// Recommended members to check.
    fn default_mask() -> Self::Members {
        Self::Members::all()
    }

    /// Members compared when the pair was already entered in this invocation
    /// or the recursion limit was reached.
    fn identity_mask() -> Self::Members {
        Self::Members::all()
    }

    /// Entities that can be reached again through back-references return a
    /// key; value-like entities return `None`.
    fn visit_key(_ddr: &Self::Entity, _reference: &Self::Entity) -> Option<VisitKey> {
        None
    }

    fn test_equals(
        cx: &mut CompareContext<'_>,
        ddr: &Self::Entity,
        reference: &Self::Entity,
        mask: Self::Members,
    ) -> Result<(), Mismatch> {
        let fresh = match Self::visit_key(ddr, reference) {
            Some(key) => cx.enter(key),
            None => true,
        };
        let mask = if !fresh {
            cx.note_shallow();
            mask.intersection(Self::identity_mask())
        } else if cx.too_deep() {
            warn!(entity = Self::ENTITY, path = %cx.path(), "recursion limit reached, comparing identity only");
            cx.note_shallow();
            mask.intersection(Self::identity_mask())
        } else {
            mask
        };

        cx.descend(|cx| {
            for (member, check) in Self::MEMBERS {
                if !mask.contains(*member) {
                    continue;
                }
                let segment = format!("{}.{}", Self::ENTITY, member_name::<Self>(*member));
                cx.scoped(segment, |cx| check(cx, ddr, reference))?;
            }
            Ok(())
        })
    }
}

/// Flag name of a single member.
pub fn member_name<C: Comparator + ?Sized>(member: C::Members) -> &'static str {
    C::Members::FLAGS
        .iter()
        .find(|f| f.value().bits() == member.bits())
        .map(|f| f.name())
        .unwrap_or("?")
}

/// Compares a pair with the configured mask for `C`.
pub fn delegate<C: Comparator>(
    cx: &mut CompareContext<'_>,
    ddr: &C::Entity,
    reference: &C::Entity,
) -> Result<(), Mismatch> {
    let mask = cx.mask_for::<C>();
    C::test_equals(cx, ddr, reference, mask)
}

/// Applies the failure policy to a composite member, then delegates.
pub fn delegate_access<C: Comparator, T: Borrow<C::Entity>>(
    cx: &mut CompareContext<'_>,
    ddr: &Access<T>,
    reference: &Access<T>,
) -> Result<(), Mismatch> {
    if let Some((d, r)) = cx.pair(ddr, reference)? {
        delegate::<C>(cx, d.borrow(), r.borrow())?;
    }
    Ok(())
}

/// Optional links (superclass, owner, ...): both absent passes, one absent is
/// a value mismatch, both present goes to `f`.
pub fn compare_optional<T: Debug>(
    cx: &mut CompareContext<'_>,
    ddr: &Access<Option<T>>,
    reference: &Access<Option<T>>,
    f: impl FnOnce(&mut CompareContext<'_>, &T, &T) -> Result<(), Mismatch>,
) -> Result<(), Mismatch> {
    match cx.pair(ddr, reference)? {
        None | Some((None, None)) => Ok(()),
        Some((Some(d), Some(r))) => f(cx, d, r),
        Some((d, r)) => {
            let m = Mismatch::Value {
                path: cx.path(),
                ddr: format!("{d:?}"),
                reference: format!("{r:?}"),
            };
            warn!(%m, "field check failed");
            Err(m)
        }
    }
}

/// Member names of one comparator, for `dtfj members` and option validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberCatalog {
    pub entity: &'static str,
    pub members: Vec<&'static str>,
    pub default: Vec<&'static str>,
    /// Members left out of the default mask.
    pub omitted: Vec<&'static str>,
    pub identity: Vec<&'static str>,
}

pub fn catalog_entry<C: Comparator>() -> MemberCatalog {
    let names = |mask: C::Members| -> Vec<&'static str> {
        C::Members::FLAGS
            .iter()
            .filter(|f| mask.contains(*f.value()))
            .map(|f| f.name())
            .collect()
    };
    let default = C::default_mask();
    MemberCatalog {
        entity: C::ENTITY,
        members: names(C::Members::all()),
        default: names(default),
        omitted: names(C::Members::all().difference(default)),
        identity: names(C::identity_mask()),
    }
}

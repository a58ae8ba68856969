//! One comparator per DTFJ entity type.
//!
//! Each comparator declares its members as a `bitflags` set and a dispatch
//! table mapping every flag to the check for that member. Links to other
//! entities (by id) are resolved in both snapshots and compared with the
//! target entity's comparator.

mod class;
mod image;
mod object;
mod runtime;
mod thread;

pub use class::{
    JavaClassComparator, JavaClassMembers, JavaFieldComparator, JavaFieldMembers,
    JavaMethodComparator, JavaMethodMembers,
};
pub use image::{
    ImageAddressSpaceComparator, ImageAddressSpaceMembers, ImagePointerComparator,
    ImagePointerMembers, ImageProcessComparator, ImageProcessMembers, ImageSectionComparator,
    ImageSectionMembers, ImageStackFrameComparator, ImageStackFrameMembers, ImageThreadComparator,
    ImageThreadMembers,
};
pub use object::{
    JavaObjectComparator, JavaObjectMembers, JavaReferenceComparator, JavaReferenceMembers,
};
pub use runtime::{JavaHeapComparator, JavaHeapMembers, JavaRuntimeComparator, JavaRuntimeMembers};
pub use thread::{
    JavaLocationComparator, JavaLocationMembers, JavaMonitorComparator, JavaMonitorMembers,
    JavaStackFrameComparator, JavaStackFrameMembers, JavaThreadComparator, JavaThreadMembers,
};

use dtfj_model::{ClassId, JavaReference, ObjectId, ReferenceType, Referent, RootType, ThreadId};
use std::cmp::Ordering;
use tracing::warn;

use crate::{delegate_access, CompareContext, Comparator, Mismatch, VisitKey};

pub(crate) fn compare_class_ids(
    cx: &mut CompareContext<'_>,
    ddr: &ClassId,
    reference: &ClassId,
) -> Result<(), Mismatch> {
    let d = cx.ddr().class(*ddr);
    let r = cx.reference().class(*reference);
    delegate_access::<JavaClassComparator, _>(cx, &d, &r)
}

pub(crate) fn compare_object_ids(
    cx: &mut CompareContext<'_>,
    ddr: &ObjectId,
    reference: &ObjectId,
) -> Result<(), Mismatch> {
    let d = cx.ddr().object(*ddr);
    let r = cx.reference().object(*reference);
    delegate_access::<JavaObjectComparator, _>(cx, &d, &r)
}

pub(crate) fn compare_thread_ids(
    cx: &mut CompareContext<'_>,
    ddr: &ThreadId,
    reference: &ThreadId,
) -> Result<(), Mismatch> {
    let d = cx.ddr().thread(*ddr);
    let r = cx.reference().thread(*reference);
    delegate_access::<JavaThreadComparator, _>(cx, &d, &r)
}

/// Both ends must be the same kind of referent; then the referents
/// themselves are compared.
pub(crate) fn compare_referent(
    cx: &mut CompareContext<'_>,
    ddr: &Referent,
    reference: &Referent,
) -> Result<(), Mismatch> {
    match (ddr, reference) {
        (Referent::Class(d), Referent::Class(r)) => compare_class_ids(cx, d, r),
        (Referent::Object(d), Referent::Object(r)) => compare_object_ids(cx, d, r),
        (Referent::StackFrame(d), Referent::StackFrame(r)) => {
            let df = cx.ddr().stack_frame(*d);
            let rf = cx.reference().stack_frame(*r);
            let Some((df, rf)) = cx.pair(&df, &rf)? else {
                return Ok(());
            };
            let mut mask = cx.mask_for::<JavaStackFrameComparator>();
            if !cx.enter(VisitKey::Frame(*d, *r)) {
                cx.note_shallow();
                mask = mask.intersection(JavaStackFrameComparator::identity_mask());
            }
            JavaStackFrameComparator::test_equals(cx, df, rf, mask)
        }
        _ => {
            let m = Mismatch::Value {
                path: cx.path(),
                ddr: format!("{} {ddr}", ddr.kind_name()),
                reference: format!("{} {reference}", reference.kind_name()),
            };
            warn!(%m, "field check failed");
            Err(m)
        }
    }
}

/// Pairing order for reference lists: target, then source, then type.
pub(crate) fn reference_order(a: &JavaReference, b: &JavaReference) -> Ordering {
    type Key<'a> = (
        Option<&'a Referent>,
        Option<&'a Referent>,
        Option<&'a ReferenceType>,
        Option<&'a Option<RootType>>,
    );
    fn key(r: &JavaReference) -> Key<'_> {
        (
            r.target.as_ref().ok(),
            r.source.as_ref().ok(),
            r.reference_type.as_ref().ok(),
            r.root_type.as_ref().ok(),
        )
    }
    key(a).cmp(&key(b))
}

use bitflags::bitflags;
use dtfj_model::{JavaObject, JavaReference};

use crate::reconcile::{compare_sections, reconcile_sorted};
use crate::{delegate, Comparator, MemberCheck, VisitKey};

use super::{compare_class_ids, compare_referent, reference_order, ImagePointerComparator};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaObjectMembers: u32 {
        const ID = 1 << 0;
        const JAVA_CLASS = 1 << 1;
        const SIZE = 1 << 2;
        const HASHCODE = 1 << 3;
        const PERSISTENT_HASHCODE = 1 << 4;
        const IS_ARRAY = 1 << 5;
        const ARRAY_SIZE = 1 << 6;
        const FIELD_VALUES = 1 << 7;
        const REFERENCES = 1 << 8;
        const HEAP = 1 << 9;
        const SECTIONS = 1 << 10;
        const POINTER = 1 << 11;
    }
}

pub struct JavaObjectComparator;

impl Comparator for JavaObjectComparator {
    type Entity = JavaObject;
    type Members = JavaObjectMembers;

    const ENTITY: &'static str = "JavaObject";
    const MEMBERS: &'static [(JavaObjectMembers, MemberCheck<JavaObject>)] = &[
        (JavaObjectMembers::ID, |cx, d, r| cx.check_value(&d.id, &r.id)),
        (JavaObjectMembers::POINTER, |cx, d, r| {
            delegate::<ImagePointerComparator>(cx, &d.pointer, &r.pointer)
        }),
        (JavaObjectMembers::JAVA_CLASS, |cx, d, r| {
            cx.check_then(&d.java_class, &r.java_class, |cx, d, r| compare_class_ids(cx, d, r))
        }),
        (JavaObjectMembers::SIZE, |cx, d, r| cx.check(&d.size, &r.size)),
        (JavaObjectMembers::HASHCODE, |cx, d, r| cx.check(&d.hashcode, &r.hashcode)),
        (JavaObjectMembers::PERSISTENT_HASHCODE, |cx, d, r| {
            cx.check(&d.persistent_hashcode, &r.persistent_hashcode)
        }),
        (JavaObjectMembers::IS_ARRAY, |cx, d, r| cx.check(&d.is_array, &r.is_array)),
        (JavaObjectMembers::ARRAY_SIZE, |cx, d, r| cx.check(&d.array_size, &r.array_size)),
        // Object-valued fields compare by address; the targets are reached
        // through REFERENCES.
        (JavaObjectMembers::FIELD_VALUES, |cx, d, r| {
            cx.check(&d.field_values, &r.field_values)
        }),
        (JavaObjectMembers::REFERENCES, |cx, d, r| {
            cx.check_then(&d.references, &r.references, |cx, d, r| {
                reconcile_sorted(
                    cx,
                    d,
                    r,
                    |a: &JavaReference, b: &JavaReference| reference_order(a, b),
                    delegate::<JavaReferenceComparator>,
                )
            })
        }),
        (JavaObjectMembers::HEAP, |cx, d, r| cx.check(&d.heap, &r.heap)),
        (JavaObjectMembers::SECTIONS, |cx, d, r| {
            cx.check_then(&d.sections, &r.sections, |cx, d, r| compare_sections(cx, d, r))
        }),
    ];

    fn identity_mask() -> JavaObjectMembers {
        JavaObjectMembers::ID
    }

    fn visit_key(d: &JavaObject, r: &JavaObject) -> Option<VisitKey> {
        Some(VisitKey::Object(d.id, r.id))
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaReferenceMembers: u32 {
        const DESCRIPTION = 1 << 0;
        const REACHABILITY = 1 << 1;
        const REFERENCE_TYPE = 1 << 2;
        const ROOT_TYPE = 1 << 3;
        const SOURCE = 1 << 4;
        const TARGET = 1 << 5;
    }
}

pub struct JavaReferenceComparator;

impl Comparator for JavaReferenceComparator {
    type Entity = JavaReference;
    type Members = JavaReferenceMembers;

    const ENTITY: &'static str = "JavaReference";
    const MEMBERS: &'static [(JavaReferenceMembers, MemberCheck<JavaReference>)] = &[
        (JavaReferenceMembers::DESCRIPTION, |cx, d, r| {
            cx.check(&d.description, &r.description)
        }),
        (JavaReferenceMembers::REACHABILITY, |cx, d, r| {
            cx.check(&d.reachability, &r.reachability)
        }),
        (JavaReferenceMembers::REFERENCE_TYPE, |cx, d, r| {
            cx.check(&d.reference_type, &r.reference_type)
        }),
        (JavaReferenceMembers::ROOT_TYPE, |cx, d, r| cx.check(&d.root_type, &r.root_type)),
        (JavaReferenceMembers::SOURCE, |cx, d, r| {
            cx.check_then(&d.source, &r.source, |cx, d, r| compare_referent(cx, d, r))
        }),
        (JavaReferenceMembers::TARGET, |cx, d, r| {
            cx.check_then(&d.target, &r.target, |cx, d, r| compare_referent(cx, d, r))
        }),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompareContext, CompareOptions, Mismatch};
    use dtfj_model::{
        AddressSpaceId, ClassId, ImagePointer, ObjectId, ProviderKind, Reachability,
        ReferenceType, Referent, Snapshot, SnapshotIndex,
    };
    use std::collections::BTreeMap;

    fn object(id: u64, class: u64) -> JavaObject {
        JavaObject {
            id: ObjectId(id),
            pointer: ImagePointer::plain(AddressSpaceId(0), id),
            java_class: Ok(ClassId(class)),
            size: Ok(16),
            hashcode: Ok(7),
            persistent_hashcode: Ok(7),
            is_array: Ok(false),
            array_size: Err(dtfj_model::DataError::unavailable("not an array")),
            field_values: Ok(BTreeMap::new()),
            references: Ok(Vec::new()),
            heap: Ok("default".to_string()),
            sections: Ok(Vec::new()),
        }
    }

    fn reference(source: Referent, target: Referent) -> JavaReference {
        JavaReference {
            description: Ok("field".to_string()),
            reachability: Ok(Reachability::Strong),
            reference_type: Ok(ReferenceType::Field),
            root_type: Ok(None),
            source: Ok(source),
            target: Ok(target),
        }
    }

    #[test]
    fn referent_kind_mismatch_is_a_value_mismatch() {
        let mut a = Snapshot::empty(ProviderKind::Ddr);
        let mut b = Snapshot::empty(ProviderKind::Jextract);
        a.objects.push(object(0x100, 0x10));
        b.objects.push(object(0x100, 0x10));
        let (a, b) = (SnapshotIndex::new(&a), SnapshotIndex::new(&b));
        let opts = CompareOptions::default();
        let mut cx = CompareContext::new(&a, &b, &opts);

        let d = reference(Referent::Object(ObjectId(0x100)), Referent::Class(ClassId(0x10)));
        let r = reference(Referent::Object(ObjectId(0x100)), Referent::Object(ObjectId(0x100)));
        let mut mask = JavaReferenceComparator::default_mask();
        // SOURCE would walk into the object and its class.
        mask.remove(JavaReferenceMembers::SOURCE);
        match JavaReferenceComparator::test_equals(&mut cx, &d, &r, mask).unwrap_err() {
            Mismatch::Value { path, ddr, reference } => {
                assert_eq!(path, "JavaReference.TARGET");
                assert_eq!(ddr, "class class@0x10");
                assert_eq!(reference, "object object@0x100");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

use bitflags::bitflags;
use dtfj_model::{JavaClass, JavaField, JavaMethod, JavaReference};

use crate::reconcile::{compare_compiled_sections, compare_sections, reconcile_sorted};
use crate::{compare_optional, delegate, Comparator, MemberCheck, VisitKey};

use super::{
    compare_class_ids, compare_object_ids, reference_order, ImagePointerComparator,
    JavaReferenceComparator,
};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaClassMembers: u32 {
        const ID = 1 << 0;
        const NAME = 1 << 1;
        const MODIFIERS = 1 << 2;
        const SUPERCLASS = 1 << 3;
        const CLASS_LOADER = 1 << 4;
        const COMPONENT_TYPE = 1 << 5;
        const IS_ARRAY = 1 << 6;
        const INSTANCE_SIZE = 1 << 7;
        const OBJECT = 1 << 8;
        const DECLARED_FIELDS = 1 << 9;
        const DECLARED_METHODS = 1 << 10;
        const INTERFACES = 1 << 11;
        const REFERENCES = 1 << 12;
        const PROTECTION_DOMAIN = 1 << 13;
        const POINTER = 1 << 14;
    }
}

pub struct JavaClassComparator;

impl Comparator for JavaClassComparator {
    type Entity = JavaClass;
    type Members = JavaClassMembers;

    const ENTITY: &'static str = "JavaClass";
    const MEMBERS: &'static [(JavaClassMembers, MemberCheck<JavaClass>)] = &[
        (JavaClassMembers::ID, |cx, d, r| cx.check_value(&d.id, &r.id)),
        (JavaClassMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (JavaClassMembers::POINTER, |cx, d, r| {
            delegate::<ImagePointerComparator>(cx, &d.pointer, &r.pointer)
        }),
        (JavaClassMembers::MODIFIERS, |cx, d, r| cx.check(&d.modifiers, &r.modifiers)),
        (JavaClassMembers::SUPERCLASS, |cx, d, r| {
            compare_optional(cx, &d.superclass, &r.superclass, compare_class_ids)
        }),
        (JavaClassMembers::CLASS_LOADER, |cx, d, r| {
            compare_optional(cx, &d.class_loader, &r.class_loader, compare_object_ids)
        }),
        (JavaClassMembers::COMPONENT_TYPE, |cx, d, r| {
            compare_optional(cx, &d.component_type, &r.component_type, compare_class_ids)
        }),
        (JavaClassMembers::IS_ARRAY, |cx, d, r| cx.check(&d.is_array, &r.is_array)),
        (JavaClassMembers::INSTANCE_SIZE, |cx, d, r| {
            cx.check(&d.instance_size, &r.instance_size)
        }),
        (JavaClassMembers::OBJECT, |cx, d, r| {
            compare_optional(cx, &d.object, &r.object, compare_object_ids)
        }),
        (JavaClassMembers::DECLARED_FIELDS, |cx, d, r| {
            cx.check_then(&d.declared_fields, &r.declared_fields, |cx, d, r| {
                reconcile_sorted(
                    cx,
                    d,
                    r,
                    |a: &JavaField, b: &JavaField| a.name.as_ref().ok().cmp(&b.name.as_ref().ok()),
                    delegate::<JavaFieldComparator>,
                )
            })
        }),
        (JavaClassMembers::DECLARED_METHODS, |cx, d, r| {
            cx.check_then(&d.declared_methods, &r.declared_methods, |cx, d, r| {
                reconcile_sorted(cx, d, r, method_order, delegate::<JavaMethodComparator>)
            })
        }),
        (JavaClassMembers::INTERFACES, |cx, d, r| {
            cx.check_then(&d.interfaces, &r.interfaces, |cx, d, r| {
                reconcile_sorted(cx, d, r, |a: &String, b: &String| a.cmp(b), |cx, a, b| {
                    cx.check_value(a, b)
                })
            })
        }),
        (JavaClassMembers::REFERENCES, |cx, d, r| {
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
        (JavaClassMembers::PROTECTION_DOMAIN, |cx, d, r| {
            compare_optional(cx, &d.protection_domain, &r.protection_domain, compare_object_ids)
        }),
    ];

    fn identity_mask() -> JavaClassMembers {
        JavaClassMembers::ID | JavaClassMembers::NAME
    }

    fn visit_key(d: &JavaClass, r: &JavaClass) -> Option<VisitKey> {
        Some(VisitKey::Class(d.id, r.id))
    }
}

fn method_order(a: &JavaMethod, b: &JavaMethod) -> std::cmp::Ordering {
    (a.name.as_ref().ok(), a.signature.as_ref().ok())
        .cmp(&(b.name.as_ref().ok(), b.signature.as_ref().ok()))
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaFieldMembers: u32 {
        const NAME = 1 << 0;
        const SIGNATURE = 1 << 1;
        const MODIFIERS = 1 << 2;
        const DECLARING_CLASS = 1 << 3;
    }
}

pub struct JavaFieldComparator;

impl Comparator for JavaFieldComparator {
    type Entity = JavaField;
    type Members = JavaFieldMembers;

    const ENTITY: &'static str = "JavaField";
    const MEMBERS: &'static [(JavaFieldMembers, MemberCheck<JavaField>)] = &[
        (JavaFieldMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (JavaFieldMembers::SIGNATURE, |cx, d, r| cx.check(&d.signature, &r.signature)),
        (JavaFieldMembers::MODIFIERS, |cx, d, r| cx.check(&d.modifiers, &r.modifiers)),
        (JavaFieldMembers::DECLARING_CLASS, |cx, d, r| {
            cx.check_then(&d.declaring_class, &r.declaring_class, |cx, d, r| {
                compare_class_ids(cx, d, r)
            })
        }),
    ];
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaMethodMembers: u32 {
        const NAME = 1 << 0;
        const SIGNATURE = 1 << 1;
        const MODIFIERS = 1 << 2;
        const DECLARING_CLASS = 1 << 3;
        const BYTECODE_SECTIONS = 1 << 4;
        const COMPILED_SECTIONS = 1 << 5;
    }
}

pub struct JavaMethodComparator;

impl Comparator for JavaMethodComparator {
    type Entity = JavaMethod;
    type Members = JavaMethodMembers;

    const ENTITY: &'static str = "JavaMethod";
    const MEMBERS: &'static [(JavaMethodMembers, MemberCheck<JavaMethod>)] = &[
        (JavaMethodMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (JavaMethodMembers::SIGNATURE, |cx, d, r| cx.check(&d.signature, &r.signature)),
        (JavaMethodMembers::MODIFIERS, |cx, d, r| cx.check(&d.modifiers, &r.modifiers)),
        (JavaMethodMembers::DECLARING_CLASS, |cx, d, r| {
            cx.check_then(&d.declaring_class, &r.declaring_class, |cx, d, r| {
                compare_class_ids(cx, d, r)
            })
        }),
        (JavaMethodMembers::BYTECODE_SECTIONS, |cx, d, r| {
            cx.check_then(&d.bytecode_sections, &r.bytecode_sections, |cx, d, r| {
                compare_sections(cx, d, r)
            })
        }),
        (JavaMethodMembers::COMPILED_SECTIONS, |cx, d, r| {
            cx.check_then(&d.compiled_sections, &r.compiled_sections, |cx, d, r| {
                compare_compiled_sections(cx, d, r)
            })
        }),
    ];
}

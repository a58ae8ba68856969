use bitflags::bitflags;
use dtfj_model::{JavaClass, JavaHeap, JavaMonitor, JavaRuntime, JavaThread};

use crate::reconcile::{compare_sections, reconcile_sorted};
use crate::{delegate, delegate_access, Comparator, MemberCheck, VisitKey};

use super::{
    ImagePointerComparator, JavaClassComparator, JavaMonitorComparator, JavaThreadComparator,
};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaRuntimeMembers: u32 {
        const FULL_VERSION = 1 << 0;
        const VERSION = 1 << 1;
        const JAVA_VM = 1 << 2;
        const THREADS = 1 << 3;
        const MONITORS = 1 << 4;
        const CLASSES = 1 << 5;
        const HEAPS = 1 << 6;
    }
}

/// The runtime is a singleton per snapshot; its collections live on the
/// snapshot and are paired by id.
pub struct JavaRuntimeComparator;

impl Comparator for JavaRuntimeComparator {
    type Entity = JavaRuntime;
    type Members = JavaRuntimeMembers;

    const ENTITY: &'static str = "JavaRuntime";
    const MEMBERS: &'static [(JavaRuntimeMembers, MemberCheck<JavaRuntime>)] = &[
        (JavaRuntimeMembers::FULL_VERSION, |cx, d, r| {
            cx.check(&d.full_version, &r.full_version)
        }),
        (JavaRuntimeMembers::VERSION, |cx, d, r| cx.check(&d.version, &r.version)),
        (JavaRuntimeMembers::JAVA_VM, |cx, d, r| {
            delegate_access::<ImagePointerComparator, _>(cx, &d.java_vm, &r.java_vm)
        }),
        (JavaRuntimeMembers::THREADS, |cx, _, _| {
            let (d, r) = (cx.ddr().snapshot(), cx.reference().snapshot());
            reconcile_sorted(
                cx,
                &d.threads,
                &r.threads,
                |a: &JavaThread, b: &JavaThread| a.id.cmp(&b.id),
                delegate::<JavaThreadComparator>,
            )
        }),
        (JavaRuntimeMembers::MONITORS, |cx, _, _| {
            let (d, r) = (cx.ddr().snapshot(), cx.reference().snapshot());
            reconcile_sorted(
                cx,
                &d.monitors,
                &r.monitors,
                |a: &JavaMonitor, b: &JavaMonitor| a.id.cmp(&b.id),
                delegate::<JavaMonitorComparator>,
            )
        }),
        (JavaRuntimeMembers::CLASSES, |cx, _, _| {
            let (d, r) = (cx.ddr().snapshot(), cx.reference().snapshot());
            reconcile_sorted(
                cx,
                &d.classes,
                &r.classes,
                |a: &JavaClass, b: &JavaClass| a.id.cmp(&b.id),
                delegate::<JavaClassComparator>,
            )
        }),
        (JavaRuntimeMembers::HEAPS, |cx, _, _| {
            let (d, r) = (cx.ddr().snapshot(), cx.reference().snapshot());
            reconcile_sorted(
                cx,
                &d.heaps,
                &r.heaps,
                |a: &JavaHeap, b: &JavaHeap| a.name.as_ref().ok().cmp(&b.name.as_ref().ok()),
                delegate::<JavaHeapComparator>,
            )
        }),
    ];

    fn identity_mask() -> JavaRuntimeMembers {
        JavaRuntimeMembers::FULL_VERSION | JavaRuntimeMembers::VERSION
    }

    fn visit_key(_: &JavaRuntime, _: &JavaRuntime) -> Option<VisitKey> {
        Some(VisitKey::Runtime)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaHeapMembers: u32 {
        const NAME = 1 << 0;
        const SECTIONS = 1 << 1;
    }
}

pub struct JavaHeapComparator;

impl Comparator for JavaHeapComparator {
    type Entity = JavaHeap;
    type Members = JavaHeapMembers;

    const ENTITY: &'static str = "JavaHeap";
    const MEMBERS: &'static [(JavaHeapMembers, MemberCheck<JavaHeap>)] = &[
        (JavaHeapMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (JavaHeapMembers::SECTIONS, |cx, d, r| {
            cx.check_then(&d.sections, &r.sections, |cx, d, r| compare_sections(cx, d, r))
        }),
    ];
}

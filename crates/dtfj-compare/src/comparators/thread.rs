use bitflags::bitflags;
use dtfj_model::{JavaLocation, JavaMonitor, JavaReference, JavaStackFrame, JavaThread, ThreadId};

use crate::reconcile::{compare_sections, reconcile_in_order, reconcile_sorted};
use crate::{
    compare_optional, delegate, delegate_access, Comparator, CompareContext, MemberCheck,
    Mismatch, VisitKey,
};

use super::{
    compare_object_ids, compare_thread_ids, reference_order, ImagePointerComparator,
    JavaMethodComparator, JavaReferenceComparator,
};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaThreadMembers: u32 {
        const NAME = 1 << 0;
        const OBJECT = 1 << 1;
        const PRIORITY = 1 << 2;
        const STATE = 1 << 3;
        const JNI_ENV = 1 << 4;
        const IMAGE_THREAD = 1 << 5;
        const STACK_FRAMES = 1 << 6;
        const STACK_SECTIONS = 1 << 7;
        const BLOCKING_OBJECT = 1 << 8;
    }
}

impl JavaThreadMembers {
    /// Reported incorrectly by the jextract reader; left out of the default
    /// mask.
    pub const REFERENCE_KNOWN_BAD: Self = Self::IMAGE_THREAD;
}

pub struct JavaThreadComparator;

impl Comparator for JavaThreadComparator {
    type Entity = JavaThread;
    type Members = JavaThreadMembers;

    const ENTITY: &'static str = "JavaThread";
    const MEMBERS: &'static [(JavaThreadMembers, MemberCheck<JavaThread>)] = &[
        (JavaThreadMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (JavaThreadMembers::OBJECT, |cx, d, r| {
            compare_optional(cx, &d.object, &r.object, compare_object_ids)
        }),
        (JavaThreadMembers::PRIORITY, |cx, d, r| cx.check(&d.priority, &r.priority)),
        (JavaThreadMembers::STATE, |cx, d, r| cx.check(&d.state, &r.state)),
        (JavaThreadMembers::JNI_ENV, |cx, d, r| {
            delegate_access::<ImagePointerComparator, _>(cx, &d.jni_env, &r.jni_env)
        }),
        (JavaThreadMembers::IMAGE_THREAD, |cx, d, r| {
            cx.check(&d.image_thread, &r.image_thread)
        }),
        // Frames are positional: innermost first on both sides.
        (JavaThreadMembers::STACK_FRAMES, |cx, d, r| {
            cx.check_then(&d.stack_frames, &r.stack_frames, |cx, d, r| {
                reconcile_in_order(cx, d, r, delegate::<JavaStackFrameComparator>)
            })
        }),
        (JavaThreadMembers::STACK_SECTIONS, |cx, d, r| {
            cx.check_then(&d.stack_sections, &r.stack_sections, |cx, d, r| {
                compare_sections(cx, d, r)
            })
        }),
        (JavaThreadMembers::BLOCKING_OBJECT, |cx, d, r| {
            compare_optional(cx, &d.blocking_object, &r.blocking_object, compare_object_ids)
        }),
    ];

    fn default_mask() -> JavaThreadMembers {
        JavaThreadMembers::all().difference(JavaThreadMembers::REFERENCE_KNOWN_BAD)
    }

    fn identity_mask() -> JavaThreadMembers {
        JavaThreadMembers::NAME
    }

    fn visit_key(d: &JavaThread, r: &JavaThread) -> Option<VisitKey> {
        Some(VisitKey::Thread(d.id, r.id))
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaStackFrameMembers: u32 {
        const BASE_POINTER = 1 << 0;
        const LOCATION = 1 << 1;
        const HEAP_ROOTS = 1 << 2;
    }
}

pub struct JavaStackFrameComparator;

impl Comparator for JavaStackFrameComparator {
    type Entity = JavaStackFrame;
    type Members = JavaStackFrameMembers;

    const ENTITY: &'static str = "JavaStackFrame";
    const MEMBERS: &'static [(JavaStackFrameMembers, MemberCheck<JavaStackFrame>)] = &[
        (JavaStackFrameMembers::BASE_POINTER, |cx, d, r| {
            delegate_access::<ImagePointerComparator, _>(cx, &d.base_pointer, &r.base_pointer)
        }),
        (JavaStackFrameMembers::LOCATION, |cx, d, r| {
            delegate_access::<JavaLocationComparator, _>(cx, &d.location, &r.location)
        }),
        (JavaStackFrameMembers::HEAP_ROOTS, |cx, d, r| {
            cx.check_then(&d.heap_roots, &r.heap_roots, |cx, d, r| {
                reconcile_sorted(
                    cx,
                    d,
                    r,
                    |a: &JavaReference, b: &JavaReference| reference_order(a, b),
                    delegate::<JavaReferenceComparator>,
                )
            })
        }),
    ];

    fn identity_mask() -> JavaStackFrameMembers {
        JavaStackFrameMembers::BASE_POINTER
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaLocationMembers: u32 {
        const ADDRESS = 1 << 0;
        const LINE_NUMBER = 1 << 1;
        const FILENAME = 1 << 2;
        const COMPILATION_LEVEL = 1 << 3;
        const METHOD = 1 << 4;
    }
}

impl JavaLocationMembers {
    /// Reported incorrectly by the jextract reader; left out of the default
    /// mask.
    pub const REFERENCE_KNOWN_BAD: Self = Self::COMPILATION_LEVEL;
}

pub struct JavaLocationComparator;

impl Comparator for JavaLocationComparator {
    type Entity = JavaLocation;
    type Members = JavaLocationMembers;

    const ENTITY: &'static str = "JavaLocation";
    const MEMBERS: &'static [(JavaLocationMembers, MemberCheck<JavaLocation>)] = &[
        (JavaLocationMembers::ADDRESS, |cx, d, r| {
            delegate_access::<ImagePointerComparator, _>(cx, &d.address, &r.address)
        }),
        (JavaLocationMembers::LINE_NUMBER, |cx, d, r| {
            cx.check(&d.line_number, &r.line_number)
        }),
        (JavaLocationMembers::FILENAME, |cx, d, r| cx.check(&d.filename, &r.filename)),
        (JavaLocationMembers::COMPILATION_LEVEL, |cx, d, r| {
            cx.check(&d.compilation_level, &r.compilation_level)
        }),
        (JavaLocationMembers::METHOD, |cx, d, r| {
            cx.check_then(&d.method, &r.method, |cx, d, r| {
                let dm = cx.ddr().method(d);
                let rm = cx.reference().method(r);
                delegate_access::<JavaMethodComparator, _>(cx, &dm, &rm)
            })
        }),
    ];

    fn default_mask() -> JavaLocationMembers {
        JavaLocationMembers::all().difference(JavaLocationMembers::REFERENCE_KNOWN_BAD)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct JavaMonitorMembers: u32 {
        const ID = 1 << 0;
        const NAME = 1 << 1;
        const OBJECT = 1 << 2;
        const OWNER = 1 << 3;
        const ENTER_WAITERS = 1 << 4;
        const NOTIFY_WAITERS = 1 << 5;
    }
}

pub struct JavaMonitorComparator;

impl Comparator for JavaMonitorComparator {
    type Entity = JavaMonitor;
    type Members = JavaMonitorMembers;

    const ENTITY: &'static str = "JavaMonitor";
    const MEMBERS: &'static [(JavaMonitorMembers, MemberCheck<JavaMonitor>)] = &[
        (JavaMonitorMembers::ID, |cx, d, r| cx.check_value(&d.id, &r.id)),
        (JavaMonitorMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (JavaMonitorMembers::OBJECT, |cx, d, r| {
            compare_optional(cx, &d.object, &r.object, compare_object_ids)
        }),
        (JavaMonitorMembers::OWNER, |cx, d, r| {
            compare_optional(cx, &d.owner, &r.owner, compare_thread_ids)
        }),
        (JavaMonitorMembers::ENTER_WAITERS, |cx, d, r| {
            cx.check_then(&d.enter_waiters, &r.enter_waiters, |cx, d, r| compare_waiters(cx, d, r))
        }),
        (JavaMonitorMembers::NOTIFY_WAITERS, |cx, d, r| {
            cx.check_then(&d.notify_waiters, &r.notify_waiters, |cx, d, r| {
                compare_waiters(cx, d, r)
            })
        }),
    ];

    fn identity_mask() -> JavaMonitorMembers {
        JavaMonitorMembers::ID | JavaMonitorMembers::NAME
    }

    fn visit_key(d: &JavaMonitor, r: &JavaMonitor) -> Option<VisitKey> {
        Some(VisitKey::Monitor(d.id, r.id))
    }
}

/// Waiter queues have no defined order across providers.
fn compare_waiters(
    cx: &mut CompareContext<'_>,
    ddr: &[ThreadId],
    reference: &[ThreadId],
) -> Result<(), Mismatch> {
    reconcile_sorted(cx, ddr, reference, |a: &ThreadId, b: &ThreadId| a.cmp(b), compare_thread_ids)
}

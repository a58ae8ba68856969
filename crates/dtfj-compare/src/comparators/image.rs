use bitflags::bitflags;
use dtfj_model::{
    ImageAddressSpace, ImagePointer, ImageProcess, ImageSection, ImageStackFrame, ImageThread,
};

use crate::reconcile::{compare_sections, reconcile_in_order, reconcile_sorted};
use crate::{compare_optional, delegate, delegate_access, Comparator, MemberCheck, VisitKey};

use super::JavaRuntimeComparator;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImagePointerMembers: u32 {
        const ADDRESS = 1 << 0;
        const ADDRESS_SPACE = 1 << 1;
        const EXECUTABLE = 1 << 2;
        const READ_ONLY = 1 << 3;
        const SHARED = 1 << 4;
    }
}

pub struct ImagePointerComparator;

impl Comparator for ImagePointerComparator {
    type Entity = ImagePointer;
    type Members = ImagePointerMembers;

    const ENTITY: &'static str = "ImagePointer";
    const MEMBERS: &'static [(ImagePointerMembers, MemberCheck<ImagePointer>)] = &[
        (ImagePointerMembers::ADDRESS, |cx, d, r| {
            cx.check_value(&d.address, &r.address)
        }),
        (ImagePointerMembers::ADDRESS_SPACE, |cx, d, r| {
            let ds = cx.ddr().address_space(d.address_space);
            let rs = cx.reference().address_space(r.address_space);
            delegate_access::<ImageAddressSpaceComparator, _>(cx, &ds, &rs)
        }),
        (ImagePointerMembers::EXECUTABLE, |cx, d, r| {
            cx.check(&d.executable, &r.executable)
        }),
        (ImagePointerMembers::READ_ONLY, |cx, d, r| {
            cx.check(&d.read_only, &r.read_only)
        }),
        (ImagePointerMembers::SHARED, |cx, d, r| cx.check(&d.shared, &r.shared)),
    ];
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImageSectionMembers: u32 {
        const NAME = 1 << 0;
        const BASE_ADDRESS = 1 << 1;
        const SIZE = 1 << 2;
        const EXECUTABLE = 1 << 3;
        const READ_ONLY = 1 << 4;
        const SHARED = 1 << 5;
    }
}

pub struct ImageSectionComparator;

impl Comparator for ImageSectionComparator {
    type Entity = ImageSection;
    type Members = ImageSectionMembers;

    const ENTITY: &'static str = "ImageSection";
    const MEMBERS: &'static [(ImageSectionMembers, MemberCheck<ImageSection>)] = &[
        (ImageSectionMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (ImageSectionMembers::BASE_ADDRESS, |cx, d, r| {
            delegate::<ImagePointerComparator>(cx, &d.base, &r.base)
        }),
        (ImageSectionMembers::SIZE, |cx, d, r| cx.check(&d.size, &r.size)),
        (ImageSectionMembers::EXECUTABLE, |cx, d, r| {
            cx.check(&d.executable, &r.executable)
        }),
        (ImageSectionMembers::READ_ONLY, |cx, d, r| {
            cx.check(&d.read_only, &r.read_only)
        }),
        (ImageSectionMembers::SHARED, |cx, d, r| cx.check(&d.shared, &r.shared)),
    ];
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImageAddressSpaceMembers: u32 {
        const ID = 1 << 0;
        const NAME = 1 << 1;
        const POINTER_SIZE = 1 << 2;
        const SECTIONS = 1 << 3;
        const PROCESS = 1 << 4;
    }
}

pub struct ImageAddressSpaceComparator;

impl Comparator for ImageAddressSpaceComparator {
    type Entity = ImageAddressSpace;
    type Members = ImageAddressSpaceMembers;

    const ENTITY: &'static str = "ImageAddressSpace";
    const MEMBERS: &'static [(ImageAddressSpaceMembers, MemberCheck<ImageAddressSpace>)] = &[
        (ImageAddressSpaceMembers::ID, |cx, d, r| cx.check_value(&d.id, &r.id)),
        (ImageAddressSpaceMembers::NAME, |cx, d, r| cx.check(&d.name, &r.name)),
        (ImageAddressSpaceMembers::POINTER_SIZE, |cx, d, r| {
            cx.check(&d.pointer_size, &r.pointer_size)
        }),
        (ImageAddressSpaceMembers::SECTIONS, |cx, d, r| {
            cx.check_then(&d.sections, &r.sections, |cx, d, r| compare_sections(cx, d, r))
        }),
        (ImageAddressSpaceMembers::PROCESS, |cx, d, r| {
            compare_optional(cx, &d.process, &r.process, |cx, dp, rp| {
                cx.check_value(dp, rp)?;
                let ddr = cx.ddr().snapshot();
                let reference = cx.reference().snapshot();
                delegate_access::<ImageProcessComparator, _>(cx, &ddr.process, &reference.process)
            })
        }),
    ];

    /// Address spaces are walked from every pointer; the process edge is
    /// only followed on request.
    fn default_mask() -> ImageAddressSpaceMembers {
        ImageAddressSpaceMembers::all().difference(ImageAddressSpaceMembers::PROCESS)
    }

    fn identity_mask() -> ImageAddressSpaceMembers {
        ImageAddressSpaceMembers::ID
            | ImageAddressSpaceMembers::NAME
            | ImageAddressSpaceMembers::POINTER_SIZE
    }

    fn visit_key(d: &ImageAddressSpace, r: &ImageAddressSpace) -> Option<VisitKey> {
        Some(VisitKey::AddressSpace(d.id, r.id))
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImageProcessMembers: u32 {
        const ID = 1 << 0;
        const COMMAND_LINE = 1 << 1;
        const ENVIRONMENT = 1 << 2;
        const POINTER_SIZE = 1 << 3;
        const ADDRESS_SPACE = 1 << 4;
        const THREADS = 1 << 5;
        const RUNTIME = 1 << 6;
    }
}

pub struct ImageProcessComparator;

impl Comparator for ImageProcessComparator {
    type Entity = ImageProcess;
    type Members = ImageProcessMembers;

    const ENTITY: &'static str = "ImageProcess";
    const MEMBERS: &'static [(ImageProcessMembers, MemberCheck<ImageProcess>)] = &[
        (ImageProcessMembers::ID, |cx, d, r| cx.check(&d.id, &r.id)),
        (ImageProcessMembers::COMMAND_LINE, |cx, d, r| {
            cx.check(&d.command_line, &r.command_line)
        }),
        (ImageProcessMembers::ENVIRONMENT, |cx, d, r| {
            cx.check(&d.environment, &r.environment)
        }),
        (ImageProcessMembers::POINTER_SIZE, |cx, d, r| {
            cx.check(&d.pointer_size, &r.pointer_size)
        }),
        (ImageProcessMembers::ADDRESS_SPACE, |cx, d, r| {
            let ds = cx.ddr().address_space(d.address_space);
            let rs = cx.reference().address_space(r.address_space);
            delegate_access::<ImageAddressSpaceComparator, _>(cx, &ds, &rs)
        }),
        (ImageProcessMembers::THREADS, |cx, d, r| {
            cx.check_then(&d.threads, &r.threads, |cx, d, r| {
                reconcile_sorted(
                    cx,
                    d,
                    r,
                    |a: &ImageThread, b: &ImageThread| a.id.as_ref().ok().cmp(&b.id.as_ref().ok()),
                    delegate::<ImageThreadComparator>,
                )
            })
        }),
        (ImageProcessMembers::RUNTIME, |cx, _, _| {
            let ddr = cx.ddr().snapshot();
            let reference = cx.reference().snapshot();
            delegate_access::<JavaRuntimeComparator, _>(cx, &ddr.runtime, &reference.runtime)
        }),
    ];

    fn identity_mask() -> ImageProcessMembers {
        ImageProcessMembers::ID | ImageProcessMembers::POINTER_SIZE
    }

    fn visit_key(_: &ImageProcess, _: &ImageProcess) -> Option<VisitKey> {
        Some(VisitKey::Process)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImageThreadMembers: u32 {
        const ID = 1 << 0;
        const PROPERTIES = 1 << 1;
        const REGISTERS = 1 << 2;
        const STACK_FRAMES = 1 << 3;
    }
}

pub struct ImageThreadComparator;

impl Comparator for ImageThreadComparator {
    type Entity = ImageThread;
    type Members = ImageThreadMembers;

    const ENTITY: &'static str = "ImageThread";
    const MEMBERS: &'static [(ImageThreadMembers, MemberCheck<ImageThread>)] = &[
        (ImageThreadMembers::ID, |cx, d, r| cx.check(&d.id, &r.id)),
        (ImageThreadMembers::PROPERTIES, |cx, d, r| {
            cx.check(&d.properties, &r.properties)
        }),
        (ImageThreadMembers::REGISTERS, |cx, d, r| {
            cx.check(&d.registers, &r.registers)
        }),
        (ImageThreadMembers::STACK_FRAMES, |cx, d, r| {
            cx.check_then(&d.stack_frames, &r.stack_frames, |cx, d, r| {
                reconcile_in_order(cx, d, r, delegate::<ImageStackFrameComparator>)
            })
        }),
    ];
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ImageStackFrameMembers: u32 {
        const PROCEDURE_ADDRESS = 1 << 0;
        const PROCEDURE_NAME = 1 << 1;
        const BASE_POINTER = 1 << 2;
    }
}

pub struct ImageStackFrameComparator;

impl Comparator for ImageStackFrameComparator {
    type Entity = ImageStackFrame;
    type Members = ImageStackFrameMembers;

    const ENTITY: &'static str = "ImageStackFrame";
    const MEMBERS: &'static [(ImageStackFrameMembers, MemberCheck<ImageStackFrame>)] = &[
        (ImageStackFrameMembers::PROCEDURE_ADDRESS, |cx, d, r| {
            delegate_access::<ImagePointerComparator, _>(cx, &d.procedure_address, &r.procedure_address)
        }),
        (ImageStackFrameMembers::PROCEDURE_NAME, |cx, d, r| {
            cx.check(&d.procedure_name, &r.procedure_name)
        }),
        (ImageStackFrameMembers::BASE_POINTER, |cx, d, r| {
            delegate_access::<ImagePointerComparator, _>(cx, &d.base_pointer, &r.base_pointer)
        }),
    ];
}

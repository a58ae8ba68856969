//! dtfj-testkit
//!
//! Snapshot fixtures for scenario tests: entity builders with every member
//! readable, a small but complete sample dump as each provider reads it,
//! and monitor wait-for graphs built from edge lists.

use anyhow::Result;
use dtfj_model::{
    write_snapshot, AddressSpaceId, ClassId, FieldValue, FrameId, ImageAddressSpace,
    ImagePointer, ImageProcess, ImageSection, ImageStackFrame, ImageThread, JavaClass, JavaField,
    JavaHeap, JavaLocation, JavaMethod, JavaMonitor, JavaObject, JavaReference, JavaRuntime,
    JavaStackFrame, JavaThread, MethodRef, MonitorId, ObjectId, ProviderKind, Reachability,
    ReferenceType, Referent, RootType, Snapshot, ThreadId,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;

pub const AS0: AddressSpaceId = AddressSpaceId(0);

pub const OBJECT_CLASS: ClassId = ClassId(0x100);
pub const CLASS_CLASS: ClassId = ClassId(0x200);
pub const MAIN_CLASS: ClassId = ClassId(0x300);

pub const MAIN_INSTANCE: ObjectId = ObjectId(0x1000_0400);
pub const MAIN_THREAD_OBJECT: ObjectId = ObjectId(0x1000_0500);

pub const MAIN_THREAD: ThreadId = ThreadId(0x9001);
pub const MAIN_LOCK: MonitorId = MonitorId(0xa001);

/// Instance of `java/lang/Class` describing `class`.
pub fn class_object_id(class: ClassId) -> ObjectId {
    ObjectId(0x1000_0000 + class.0)
}

pub fn pointer(address: u64) -> ImagePointer {
    ImagePointer::plain(AS0, address)
}

pub fn section(name: &str, base: u64, size: u64) -> ImageSection {
    ImageSection {
        name: Ok(name.to_string()),
        base: pointer(base),
        size: Ok(size),
        executable: Ok(false),
        read_only: Ok(false),
        shared: Ok(false),
    }
}

pub fn code_section(name: &str, base: u64, size: u64) -> ImageSection {
    ImageSection {
        executable: Ok(true),
        read_only: Ok(true),
        ..section(name, base, size)
    }
}

pub fn address_space(id: u32) -> ImageAddressSpace {
    ImageAddressSpace {
        id: AddressSpaceId(id),
        name: Ok(format!("as{id}")),
        pointer_size: Ok(64),
        sections: Ok(vec![section("heap0", 0x1000_0000, 0x10_0000)]),
        process: Ok(Some("4242".to_string())),
    }
}

pub fn class(id: ClassId, name: &str, superclass: Option<ClassId>) -> JavaClass {
    JavaClass {
        id,
        pointer: pointer(id.0),
        name: Ok(name.to_string()),
        modifiers: Ok(0x21),
        superclass: Ok(superclass),
        class_loader: Ok(None),
        component_type: Ok(None),
        is_array: Ok(false),
        instance_size: Ok(16),
        object: Ok(Some(class_object_id(id))),
        declared_fields: Ok(Vec::new()),
        declared_methods: Ok(Vec::new()),
        interfaces: Ok(Vec::new()),
        references: Ok(Vec::new()),
        protection_domain: Ok(None),
    }
}

pub fn object(id: ObjectId, class: ClassId) -> JavaObject {
    JavaObject {
        id,
        pointer: pointer(id.0),
        java_class: Ok(class),
        size: Ok(24),
        hashcode: Ok((id.0 & 0x7fff_ffff) as i32),
        persistent_hashcode: Ok((id.0 & 0x7fff_ffff) as i32),
        is_array: Ok(false),
        array_size: Err(dtfj_model::DataError::unavailable("not an array")),
        field_values: Ok(BTreeMap::new()),
        references: Ok(vec![reference(
            Referent::Object(id),
            Referent::Class(class),
            ReferenceType::Class,
            None,
        )]),
        heap: Ok("default".to_string()),
        sections: Ok(vec![section("object", id.0, 24)]),
    }
}

pub fn reference(
    source: Referent,
    target: Referent,
    reference_type: ReferenceType,
    root_type: Option<RootType>,
) -> JavaReference {
    JavaReference {
        description: Ok(format!("{reference_type:?} reference")),
        reachability: Ok(Reachability::Strong),
        reference_type: Ok(reference_type),
        root_type: Ok(root_type),
        source: Ok(source),
        target: Ok(target),
    }
}

pub fn thread(id: ThreadId, name: &str) -> JavaThread {
    JavaThread {
        id,
        name: Ok(name.to_string()),
        object: Ok(None),
        priority: Ok(5),
        state: Ok(0x0004),
        jni_env: Ok(pointer(0x7100_0000 + id.0)),
        image_thread: Ok(format!("{}", id.0)),
        stack_frames: Ok(Vec::new()),
        stack_sections: Ok(vec![section("stack", 0x7200_0000 + id.0 * 0x1000, 0x1000)]),
        blocking_object: Ok(None),
    }
}

pub fn monitor(id: MonitorId, name: &str, object: Option<ObjectId>) -> JavaMonitor {
    JavaMonitor {
        id,
        name: Ok(name.to_string()),
        object: Ok(object),
        owner: Ok(None),
        enter_waiters: Ok(Vec::new()),
        notify_waiters: Ok(Vec::new()),
    }
}

fn main_run_method(provider: &ProviderKind) -> JavaMethod {
    let mut compiled = vec![code_section("Main.run()V warm", 0x6000_0000, 0x200)];
    // DDR also reports the cold split body of the JIT-compiled method.
    if *provider == ProviderKind::Ddr {
        compiled.push(code_section("Main.run()V cold", 0x6000_8000, 0x80));
    }
    JavaMethod {
        name: Ok("run".to_string()),
        signature: Ok("()V".to_string()),
        modifiers: Ok(0x1),
        declaring_class: Ok(MAIN_CLASS),
        bytecode_sections: Ok(vec![section("Main.run()V bytecode", 0x5000_0000, 0x40)]),
        compiled_sections: Ok(compiled),
    }
}

fn main_thread() -> JavaThread {
    let frame = JavaStackFrame {
        base_pointer: Ok(pointer(0x7200_9000)),
        location: Ok(JavaLocation {
            address: Ok(pointer(0x6000_0040)),
            line_number: Ok(12),
            filename: Ok("Main.java".to_string()),
            compilation_level: Ok(1),
            method: Ok(MethodRef {
                class: MAIN_CLASS,
                name: "run".to_string(),
                signature: "()V".to_string(),
            }),
        }),
        heap_roots: Ok(vec![reference(
            Referent::StackFrame(FrameId {
                thread: MAIN_THREAD,
                index: 0,
            }),
            Referent::Object(MAIN_INSTANCE),
            ReferenceType::Unknown,
            Some(RootType::StackLocal),
        )]),
    };
    JavaThread {
        object: Ok(Some(MAIN_THREAD_OBJECT)),
        stack_frames: Ok(vec![frame]),
        ..thread(MAIN_THREAD, "main")
    }
}

/// The same small dump as read by `provider`.
///
/// Both readings agree on every member, except that DDR additionally
/// reports a cold compiled section for `Main.run()V`. Class objects point
/// back to `java/lang/Class`, whose own class object closes a cycle.
pub fn sample_snapshot(provider: ProviderKind) -> Snapshot {
    let mut main = class(MAIN_CLASS, "Main", Some(OBJECT_CLASS));
    main.declared_fields = Ok(vec![JavaField {
        name: Ok("count".to_string()),
        signature: Ok("I".to_string()),
        modifiers: Ok(0x2),
        declaring_class: Ok(MAIN_CLASS),
    }]);
    main.declared_methods = Ok(vec![main_run_method(&provider)]);
    main.interfaces = Ok(vec!["java/lang/Runnable".to_string()]);
    main.references = Ok(vec![reference(
        Referent::Class(MAIN_CLASS),
        Referent::Class(OBJECT_CLASS),
        ReferenceType::Superclass,
        None,
    )]);

    let classes = vec![
        class(OBJECT_CLASS, "java/lang/Object", None),
        class(CLASS_CLASS, "java/lang/Class", Some(OBJECT_CLASS)),
        main,
    ];

    let mut objects: Vec<JavaObject> = classes
        .iter()
        .map(|c| object(class_object_id(c.id), CLASS_CLASS))
        .collect();
    let mut instance = object(MAIN_INSTANCE, MAIN_CLASS);
    instance.field_values = Ok(BTreeMap::from([("count".to_string(), FieldValue::Int(3))]));
    objects.push(instance);
    objects.push(object(MAIN_THREAD_OBJECT, OBJECT_CLASS));

    let mut lock = monitor(MAIN_LOCK, "Main lock", Some(MAIN_INSTANCE));
    lock.owner = Ok(Some(MAIN_THREAD));

    let process = ImageProcess {
        id: Ok("4242".to_string()),
        command_line: Ok("java -Xmx1g Main".to_string()),
        environment: Ok(BTreeMap::from([(
            "JAVA_HOME".to_string(),
            "/opt/java".to_string(),
        )])),
        pointer_size: Ok(64),
        address_space: AS0,
        threads: Ok(vec![ImageThread {
            id: Ok(format!("{}", MAIN_THREAD.0)),
            properties: Ok(BTreeMap::from([("priority".to_string(), "0".to_string())])),
            registers: Ok(BTreeMap::from([
                ("rip".to_string(), 0x6000_0040),
                ("rsp".to_string(), 0x7200_9000),
            ])),
            stack_frames: Ok(vec![ImageStackFrame {
                procedure_address: Ok(pointer(0x6000_0000)),
                procedure_name: Ok("Main.run()V".to_string()),
                base_pointer: Ok(pointer(0x7200_9000)),
            }]),
        }]),
    };

    Snapshot {
        provider,
        address_spaces: vec![address_space(0)],
        process: Ok(process),
        runtime: Ok(JavaRuntime {
            full_version: Ok("JRE 1.8.0 Linux amd64-64 (build 8.0.7.0)".to_string()),
            version: Ok("1.8.0".to_string()),
            java_vm: Ok(pointer(0x7000_0000)),
        }),
        classes,
        objects,
        threads: vec![main_thread()],
        monitors: vec![lock],
        heaps: vec![JavaHeap {
            name: Ok("default".to_string()),
            sections: Ok(vec![section("heap0", 0x1000_0000, 0x10_0000)]),
        }],
    }
}

/// First object of the chain added by [`append_reference_chain`].
pub const CHAIN_HEAD: ObjectId = ObjectId(0x2000_0000);

/// Appends `len` instances of `Main` to `snapshot`, each holding a field
/// reference to the next one.
pub fn append_reference_chain(snapshot: &mut Snapshot, len: u64) {
    let id = |i: u64| ObjectId(CHAIN_HEAD.0 + i * 0x20);
    for i in 0..len {
        let mut link = object(id(i), MAIN_CLASS);
        if i + 1 < len {
            if let Ok(refs) = link.references.as_mut() {
                refs.push(reference(
                    Referent::Object(id(i)),
                    Referent::Object(id(i + 1)),
                    ReferenceType::Field,
                    None,
                ));
            }
            link.field_values = Ok(BTreeMap::from([(
                "next".to_string(),
                FieldValue::Object(id(i + 1)),
            )]));
        }
        snapshot.objects.push(link);
    }
}

/// Monitor `n` of a wait-for graph; owned by thread `n`.
pub fn graph_monitor(n: u64) -> MonitorId {
    MonitorId(n * 0x100)
}

pub fn graph_thread(n: u64) -> ThreadId {
    ThreadId(n)
}

/// Builds a snapshot whose monitors form the given wait-for edges.
///
/// Every number mentioned in `edges` becomes monitor `graph_monitor(n)`,
/// named `M{n}`, owned by thread `T{n}`. An edge `(a, b)` makes thread `T{a}`
/// wait to enter monitor `M{b}`.
pub fn wait_for_graph(provider: ProviderKind, edges: &[(u64, u64)]) -> Snapshot {
    let mut ids: Vec<u64> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut snap = Snapshot::empty(provider);
    for &n in &ids {
        let obj = ObjectId(n * 0x100 + 0x10);
        let mut m = monitor(graph_monitor(n), &format!("M{n}"), Some(obj));
        m.owner = Ok(Some(graph_thread(n)));
        snap.monitors.push(m);
        snap.threads.push(thread(graph_thread(n), &format!("T{n}")));
    }
    for &(a, b) in edges {
        if let Some(m) = snap.monitors.iter_mut().find(|m| m.id == graph_monitor(b)) {
            if let Ok(waiters) = m.enter_waiters.as_mut() {
                waiters.push(graph_thread(a));
            }
        }
        if let Some(t) = snap.threads.iter_mut().find(|t| t.id == graph_thread(a)) {
            t.blocking_object = Ok(Some(ObjectId(b * 0x100 + 0x10)));
        }
    }
    snap
}

/// A DDR and a reference snapshot written to a temp dir.
pub struct SnapshotFiles {
    pub dir: TempDir,
    pub ddr: PathBuf,
    pub reference: PathBuf,
}

pub fn write_pair(ddr: &Snapshot, reference: &Snapshot) -> Result<SnapshotFiles> {
    let dir = tempfile::tempdir()?;
    let ddr_path = dir.path().join("ddr.json");
    let reference_path = dir.path().join("reference.json");
    write_snapshot(&ddr_path, ddr)?;
    write_snapshot(&reference_path, reference)?;
    Ok(SnapshotFiles {
        dir,
        ddr: ddr_path,
        reference: reference_path,
    })
}

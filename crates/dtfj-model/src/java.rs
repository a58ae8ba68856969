//! Java side of a snapshot: runtime, classes, objects, threads, monitors and
//! the references between them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{Access, ClassId, FrameId, ImagePointer, ImageSection, MonitorId, ObjectId, ThreadId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaRuntime {
    #[serde(default = "crate::not_captured")]
    pub full_version: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub version: Access<String>,
    /// Address of the VM structure; points back into the image graph.
    #[serde(default = "crate::not_captured")]
    pub java_vm: Access<ImagePointer>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaClass {
    pub id: ClassId,
    pub pointer: ImagePointer,
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub modifiers: Access<u32>,
    #[serde(default = "crate::not_captured")]
    pub superclass: Access<Option<ClassId>>,
    #[serde(default = "crate::not_captured")]
    pub class_loader: Access<Option<ObjectId>>,
    #[serde(default = "crate::not_captured")]
    pub component_type: Access<Option<ClassId>>,
    #[serde(default = "crate::not_captured")]
    pub is_array: Access<bool>,
    #[serde(default = "crate::not_captured")]
    pub instance_size: Access<u64>,
    /// The `java.lang.Class` instance for this class.
    #[serde(default = "crate::not_captured")]
    pub object: Access<Option<ObjectId>>,
    #[serde(default = "crate::not_captured")]
    pub declared_fields: Access<Vec<JavaField>>,
    #[serde(default = "crate::not_captured")]
    pub declared_methods: Access<Vec<JavaMethod>>,
    #[serde(default = "crate::not_captured")]
    pub interfaces: Access<Vec<String>>,
    #[serde(default = "crate::not_captured")]
    pub references: Access<Vec<JavaReference>>,
    #[serde(default = "crate::not_captured")]
    pub protection_domain: Access<Option<ObjectId>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaField {
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub signature: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub modifiers: Access<u32>,
    #[serde(default = "crate::not_captured")]
    pub declaring_class: Access<ClassId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaMethod {
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub signature: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub modifiers: Access<u32>,
    #[serde(default = "crate::not_captured")]
    pub declaring_class: Access<ClassId>,
    #[serde(default = "crate::not_captured")]
    pub bytecode_sections: Access<Vec<ImageSection>>,
    /// JIT-compiled code for this method, including warm/cold split bodies.
    #[serde(default = "crate::not_captured")]
    pub compiled_sections: Access<Vec<ImageSection>>,
}

/// Points at a method by its declaring class and name/signature pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub class: ClassId,
    pub name: String,
    pub signature: String,
}

/// A primitive or reference value read out of an object's field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Int(i64),
    Char(u16),
    /// IEEE-754 bits of a float or double, compared bitwise.
    Float(u64),
    Object(ObjectId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaObject {
    pub id: ObjectId,
    pub pointer: ImagePointer,
    #[serde(default = "crate::not_captured")]
    pub java_class: Access<ClassId>,
    #[serde(default = "crate::not_captured")]
    pub size: Access<u64>,
    #[serde(default = "crate::not_captured")]
    pub hashcode: Access<i32>,
    #[serde(default = "crate::not_captured")]
    pub persistent_hashcode: Access<i32>,
    #[serde(default = "crate::not_captured")]
    pub is_array: Access<bool>,
    #[serde(default = "crate::not_captured")]
    pub array_size: Access<u32>,
    #[serde(default = "crate::not_captured")]
    pub field_values: Access<BTreeMap<String, FieldValue>>,
    #[serde(default = "crate::not_captured")]
    pub references: Access<Vec<JavaReference>>,
    #[serde(default = "crate::not_captured")]
    pub heap: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub sections: Access<Vec<ImageSection>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaThread {
    pub id: ThreadId,
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    /// The `java.lang.Thread` instance.
    #[serde(default = "crate::not_captured")]
    pub object: Access<Option<ObjectId>>,
    #[serde(default = "crate::not_captured")]
    pub priority: Access<i32>,
    /// JVMTI-style thread state bits.
    #[serde(default = "crate::not_captured")]
    pub state: Access<u32>,
    #[serde(default = "crate::not_captured")]
    pub jni_env: Access<ImagePointer>,
    /// Id of the native thread backing this Java thread.
    #[serde(default = "crate::not_captured")]
    pub image_thread: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub stack_frames: Access<Vec<JavaStackFrame>>,
    #[serde(default = "crate::not_captured")]
    pub stack_sections: Access<Vec<ImageSection>>,
    #[serde(default = "crate::not_captured")]
    pub blocking_object: Access<Option<ObjectId>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaStackFrame {
    #[serde(default = "crate::not_captured")]
    pub base_pointer: Access<ImagePointer>,
    #[serde(default = "crate::not_captured")]
    pub location: Access<JavaLocation>,
    #[serde(default = "crate::not_captured")]
    pub heap_roots: Access<Vec<JavaReference>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaLocation {
    #[serde(default = "crate::not_captured")]
    pub address: Access<ImagePointer>,
    #[serde(default = "crate::not_captured")]
    pub line_number: Access<i32>,
    #[serde(default = "crate::not_captured")]
    pub filename: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub compilation_level: Access<i32>,
    #[serde(default = "crate::not_captured")]
    pub method: Access<MethodRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaMonitor {
    pub id: MonitorId,
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    /// Object this monitor guards; `None` for a raw (VM-internal) monitor.
    #[serde(default = "crate::not_captured")]
    pub object: Access<Option<ObjectId>>,
    #[serde(default = "crate::not_captured")]
    pub owner: Access<Option<ThreadId>>,
    /// Threads blocked trying to enter the monitor.
    #[serde(default = "crate::not_captured")]
    pub enter_waiters: Access<Vec<ThreadId>>,
    /// Threads parked in `wait()` on the monitor.
    #[serde(default = "crate::not_captured")]
    pub notify_waiters: Access<Vec<ThreadId>>,
}

impl JavaMonitor {
    pub fn is_raw(&self) -> bool {
        matches!(self.object, Ok(None))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaHeap {
    #[serde(default = "crate::not_captured")]
    pub name: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub sections: Access<Vec<ImageSection>>,
}

/// The closed set of things a reference may start or end at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Referent {
    Class(ClassId),
    Object(ObjectId),
    StackFrame(FrameId),
}

impl Referent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Object(_) => "object",
            Self::StackFrame(_) => "stack frame",
        }
    }
}

impl fmt::Display for Referent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "{id}"),
            Self::Object(id) => write!(f, "{id}"),
            Self::StackFrame(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    Unknown,
    Strong,
    Soft,
    Weak,
    Phantom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Unknown,
    Class,
    Field,
    ArrayElement,
    ClassLoader,
    Signers,
    ProtectionDomain,
    AssociatedClass,
    Superclass,
    Interface,
    StaticField,
    ConstantPool,
    ClassObject,
    LoadedClass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootType {
    Unknown,
    JniGlobal,
    JniLocal,
    JavaLocal,
    StackLocal,
    Thread,
    SystemClass,
    BusyMonitor,
    FinalizableObject,
    UnfinalizedObject,
    StringTable,
    ClassLoader,
    Other,
}

/// A heap reference edge, either between heap entities or from a GC root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaReference {
    #[serde(default = "crate::not_captured")]
    pub description: Access<String>,
    #[serde(default = "crate::not_captured")]
    pub reachability: Access<Reachability>,
    #[serde(default = "crate::not_captured")]
    pub reference_type: Access<ReferenceType>,
    /// `None` when the reference is not a root.
    #[serde(default = "crate::not_captured")]
    pub root_type: Access<Option<RootType>>,
    #[serde(default = "crate::not_captured")]
    pub source: Access<Referent>,
    #[serde(default = "crate::not_captured")]
    pub target: Access<Referent>,
}

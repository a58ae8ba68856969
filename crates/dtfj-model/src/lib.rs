//! dtfj-model
//!
//! Immutable snapshot of a captured Java process as read by one DTFJ
//! provider: the native image (address spaces, process, native threads,
//! sections) and the Java runtime (classes, objects, threads, monitors,
//! references).
//!
//! Every member a provider can fail to read is an [`Access`], so a snapshot
//! carries both values and typed failures. Entities refer to each other by
//! id; [`SnapshotIndex`] resolves ids. Pure data plus JSON loading, nothing else.

mod error;
mod ids;
mod image;
mod index;
mod java;
mod snapshot;

pub use error::{display_or_placeholder, not_captured, Access, DataError, DataErrorKind};
pub use ids::{AddressSpaceId, ClassId, FrameId, MonitorId, ObjectId, ThreadId};
pub use image::{
    ImageAddressSpace, ImagePointer, ImageProcess, ImageSection, ImageStackFrame, ImageThread,
};
pub use index::SnapshotIndex;
pub use java::{
    FieldValue, JavaClass, JavaField, JavaHeap, JavaLocation, JavaMethod, JavaMonitor,
    JavaObject, JavaReference, JavaRuntime, JavaStackFrame, JavaThread, MethodRef,
    Reachability, ReferenceType, Referent, RootType,
};
pub use snapshot::{load_snapshot, write_snapshot, ProviderKind, Snapshot};

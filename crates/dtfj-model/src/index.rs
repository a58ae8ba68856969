use std::collections::BTreeMap;

use crate::{
    Access, AddressSpaceId, ClassId, DataError, FrameId, ImageAddressSpace, JavaClass, JavaMethod,
    JavaMonitor, JavaObject, JavaStackFrame, JavaThread, MethodRef, MonitorId, ObjectId, Snapshot,
    ThreadId,
};

/// Id-keyed lookup tables over one [`Snapshot`], built once and shared by
/// every comparison or analysis that resolves references.
///
/// A dangling id resolves to corrupt data. When a snapshot lists the same id
/// twice the first entry wins.
#[derive(Clone, Debug)]
pub struct SnapshotIndex<'s> {
    snapshot: &'s Snapshot,
    address_spaces: BTreeMap<AddressSpaceId, &'s ImageAddressSpace>,
    classes: BTreeMap<ClassId, &'s JavaClass>,
    objects: BTreeMap<ObjectId, &'s JavaObject>,
    threads: BTreeMap<ThreadId, &'s JavaThread>,
    monitors: BTreeMap<MonitorId, &'s JavaMonitor>,
}

fn by_id<'s, K: Ord, T>(
    items: &'s [T],
    id: impl Fn(&T) -> K,
) -> BTreeMap<K, &'s T> {
    let mut map = BTreeMap::new();
    for item in items {
        map.entry(id(item)).or_insert(item);
    }
    map
}

fn dangling<T>(what: impl std::fmt::Display) -> Access<T> {
    Err(DataError::corrupt(format!("dangling reference to {what}")))
}

impl<'s> SnapshotIndex<'s> {
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self {
            snapshot,
            address_spaces: by_id(&snapshot.address_spaces, |a| a.id),
            classes: by_id(&snapshot.classes, |c| c.id),
            objects: by_id(&snapshot.objects, |o| o.id),
            threads: by_id(&snapshot.threads, |t| t.id),
            monitors: by_id(&snapshot.monitors, |m| m.id),
        }
    }

    pub fn snapshot(&self) -> &'s Snapshot {
        self.snapshot
    }

    pub fn address_space(&self, id: AddressSpaceId) -> Access<&'s ImageAddressSpace> {
        match self.address_spaces.get(&id) {
            Some(a) => Ok(*a),
            None => Err(DataError::corrupt(format!("dangling address space reference {id}"))),
        }
    }

    pub fn class(&self, id: ClassId) -> Access<&'s JavaClass> {
        self.classes.get(&id).copied().map_or_else(|| dangling(id), Ok)
    }

    pub fn object(&self, id: ObjectId) -> Access<&'s JavaObject> {
        self.objects.get(&id).copied().map_or_else(|| dangling(id), Ok)
    }

    pub fn thread(&self, id: ThreadId) -> Access<&'s JavaThread> {
        self.threads.get(&id).copied().map_or_else(|| dangling(id), Ok)
    }

    pub fn monitor(&self, id: MonitorId) -> Access<&'s JavaMonitor> {
        self.monitors.get(&id).copied().map_or_else(|| dangling(id), Ok)
    }

    /// Resolves a method through its declaring class's declared methods.
    pub fn method(&self, method: &MethodRef) -> Access<&'s JavaMethod> {
        let class = self.class(method.class)?;
        let methods = class.declared_methods.as_ref().map_err(Clone::clone)?;
        methods
            .iter()
            .find(|m| {
                matches!(&m.name, Ok(n) if *n == method.name)
                    && matches!(&m.signature, Ok(s) if *s == method.signature)
            })
            .map_or_else(
                || dangling(format!("{}.{}{}", method.class, method.name, method.signature)),
                Ok,
            )
    }

    /// Resolves a frame through its owning thread's captured stack.
    pub fn stack_frame(&self, id: FrameId) -> Access<&'s JavaStackFrame> {
        let thread = self.thread(id.thread)?;
        let frames = thread.stack_frames.as_ref().map_err(Clone::clone)?;
        frames
            .get(id.index as usize)
            .map_or_else(|| dangling(id), Ok)
    }

    /// Thread name for display, falling back to the failure placeholder.
    pub fn thread_name(&self, id: ThreadId) -> String {
        match self.thread(id) {
            Ok(t) => crate::display_or_placeholder(&t.name),
            Err(e) => e.placeholder().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataErrorKind, ImagePointer, ProviderKind};

    fn thread(id: u64, name: Access<String>) -> JavaThread {
        JavaThread {
            id: ThreadId(id),
            name,
            object: Ok(None),
            priority: Ok(5),
            state: Ok(0),
            jni_env: Ok(ImagePointer::plain(AddressSpaceId(0), 0x7000 + id)),
            image_thread: Ok(format!("{id}")),
            stack_frames: Ok(Vec::new()),
            stack_sections: Ok(Vec::new()),
            blocking_object: Ok(None),
        }
    }

    #[test]
    fn dangling_ids_resolve_to_corrupt_data() {
        let snap = Snapshot::empty(ProviderKind::Ddr);
        let index = SnapshotIndex::new(&snap);
        let err = index.class(ClassId(0x10)).unwrap_err();
        assert_eq!(err.kind(), DataErrorKind::CorruptData);
        let err = index.address_space(AddressSpaceId(3)).unwrap_err();
        assert_eq!(err.kind(), DataErrorKind::CorruptData);
        let frame = FrameId { thread: ThreadId(1), index: 0 };
        assert_eq!(index.stack_frame(frame).unwrap_err().kind(), DataErrorKind::CorruptData);
    }

    #[test]
    fn thread_name_uses_placeholders() {
        let mut snap = Snapshot::empty(ProviderKind::Ddr);
        snap.threads.push(thread(1, Ok("main".to_string())));
        snap.threads.push(thread(2, Err(DataError::corrupt("bad utf8"))));
        let index = SnapshotIndex::new(&snap);

        assert_eq!(index.thread_name(ThreadId(1)), "main");
        assert_eq!(index.thread_name(ThreadId(2)), "<corrupt data>");
        assert_eq!(index.thread_name(ThreadId(3)), "<corrupt data>");
    }

    #[test]
    fn duplicate_id_keeps_first_entry() {
        let mut snap = Snapshot::empty(ProviderKind::Ddr);
        snap.threads.push(thread(1, Ok("first".to_string())));
        snap.threads.push(thread(1, Ok("second".to_string())));
        let index = SnapshotIndex::new(&snap);
        assert_eq!(index.thread_name(ThreadId(1)), "first");
    }

    #[test]
    fn large_snapshot_resolves_every_id() {
        let mut snap = Snapshot::empty(ProviderKind::Ddr);
        for id in 0..5000 {
            snap.threads.push(thread(id, Ok(format!("t{id}"))));
        }
        let index = SnapshotIndex::new(&snap);
        for id in 0..5000 {
            assert_eq!(index.thread(ThreadId(id)).unwrap().id, ThreadId(id));
        }
        assert!(std::ptr::eq(index.snapshot(), &snap));
    }
}

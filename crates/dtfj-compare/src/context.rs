use bitflags::Flags;
use dtfj_model::{
    Access, AddressSpaceId, ClassId, FrameId, MonitorId, ObjectId, SnapshotIndex, ThreadId,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::ops::AddAssign;

use crate::field::{check_value, pair_access};
use crate::{Comparator, CompareOptions, Mismatch, MAX_DEPTH_LIMIT};

/// Identity of an entity pair already entered during one comparator
/// invocation. Re-entering a visited pair compares identity members only,
/// which is what breaks cycles such as
/// ImagePointer → AddressSpace → Process → Runtime → ImagePointer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum VisitKey {
    AddressSpace(AddressSpaceId, AddressSpaceId),
    Process,
    Runtime,
    Class(ClassId, ClassId),
    Object(ObjectId, ObjectId),
    Thread(ThreadId, ThreadId),
    Monitor(MonitorId, MonitorId),
    /// Frames are reached back through the heap roots they own.
    Frame(FrameId, FrameId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompareStats {
    pub members_checked: u64,
    /// Member reads where both providers failed with the same kind.
    pub same_failures: u64,
    /// Entity comparisons reduced to identity members (visited or too deep).
    pub shallow_visits: u64,
    /// Times the compiled-section carve-out was applied.
    pub carve_outs: u64,
}

impl AddAssign<&CompareStats> for CompareStats {
    fn add_assign(&mut self, rhs: &CompareStats) {
        self.members_checked += rhs.members_checked;
        self.same_failures += rhs.same_failures;
        self.shallow_visits += rhs.shallow_visits;
        self.carve_outs += rhs.carve_outs;
    }
}

/// State threaded through every comparator call of one invocation: both
/// snapshot indexes, the options, the visited set and the current member
/// path. The indexes are built once per run and shared by every case.
pub struct CompareContext<'s> {
    ddr: &'s SnapshotIndex<'s>,
    reference: &'s SnapshotIndex<'s>,
    options: &'s CompareOptions,
    visited: BTreeSet<VisitKey>,
    depth: usize,
    path: Vec<String>,
    stats: CompareStats,
}

impl<'s> CompareContext<'s> {
    pub fn new(
        ddr: &'s SnapshotIndex<'s>,
        reference: &'s SnapshotIndex<'s>,
        options: &'s CompareOptions,
    ) -> Self {
        Self {
            ddr,
            reference,
            options,
            visited: BTreeSet::new(),
            depth: 0,
            path: Vec::new(),
            stats: CompareStats::default(),
        }
    }

    pub fn ddr(&self) -> &'s SnapshotIndex<'s> {
        self.ddr
    }

    pub fn reference(&self) -> &'s SnapshotIndex<'s> {
        self.reference
    }

    pub fn stats(&self) -> &CompareStats {
        &self.stats
    }

    /// Member chain leading to the current position.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for seg in &self.path {
            if !out.is_empty() && !seg.starts_with('[') {
                out.push_str(" > ");
            }
            out.push_str(seg);
        }
        out
    }

    /// Runs `f` with `segment` appended to the path.
    pub fn scoped<R>(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment.into());
        let out = f(self);
        self.path.pop();
        out
    }

    /// Field-pair check of the member at the current path.
    pub fn check<T: PartialEq + Debug>(
        &mut self,
        ddr: &Access<T>,
        reference: &Access<T>,
    ) -> Result<(), Mismatch> {
        match self.pair(ddr, reference)? {
            Some((d, r)) if d != r => check_value(&self.path(), d, r),
            _ => Ok(()),
        }
    }

    /// Failure policy only; both values are returned when both sides read
    /// successfully, `None` when both failed alike.
    pub fn pair<'a, T>(
        &mut self,
        ddr: &'a Access<T>,
        reference: &'a Access<T>,
    ) -> Result<Option<(&'a T, &'a T)>, Mismatch> {
        self.stats.members_checked += 1;
        // The path is only rendered when the pair needs the failure policy.
        if let (Ok(d), Ok(r)) = (ddr, reference) {
            return Ok(Some((d, r)));
        }
        let path = self.path();
        let paired = pair_access(&path, ddr, reference)?;
        if paired.is_none() {
            self.stats.same_failures += 1;
        }
        Ok(paired)
    }

    /// Failure policy, then `f` on both values when both sides succeeded.
    pub fn check_then<T>(
        &mut self,
        ddr: &Access<T>,
        reference: &Access<T>,
        f: impl FnOnce(&mut Self, &T, &T) -> Result<(), Mismatch>,
    ) -> Result<(), Mismatch> {
        match self.pair(ddr, reference)? {
            Some((d, r)) => f(self, d, r),
            None => Ok(()),
        }
    }

    /// Equality of values both sides already produced.
    pub fn check_value<T: PartialEq + Debug>(&mut self, ddr: &T, reference: &T) -> Result<(), Mismatch> {
        self.stats.members_checked += 1;
        if ddr == reference {
            return Ok(());
        }
        check_value(&self.path(), ddr, reference)
    }

    /// Mask to use for `C` after applying configured overrides.
    pub fn mask_for<C: Comparator>(&self) -> C::Members {
        let mut mask = C::default_mask();
        if let Some(ov) = self.options.masks.get(C::ENTITY) {
            for name in &ov.include {
                if let Some(flag) = C::Members::from_name(name) {
                    mask = mask.union(flag);
                }
            }
            for name in &ov.exclude {
                if let Some(flag) = C::Members::from_name(name) {
                    mask = mask.difference(flag);
                }
            }
        }
        mask
    }

    /// Marks a pair as entered. Returns false when it was already visited.
    pub(crate) fn enter(&mut self, key: VisitKey) -> bool {
        self.visited.insert(key)
    }

    /// Options that skipped validation are still held to the limit.
    pub(crate) fn too_deep(&self) -> bool {
        self.depth >= self.options.max_depth.min(MAX_DEPTH_LIMIT)
    }

    pub(crate) fn descend<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    pub(crate) fn note_shallow(&mut self) {
        self.stats.shallow_visits += 1;
    }

    pub(crate) fn note_carve_out(&mut self) {
        self.stats.carve_outs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtfj_model::{DataError, ProviderKind, Snapshot};

    #[test]
    fn path_joins_members_and_indexes() {
        let a = Snapshot::empty(ProviderKind::Ddr);
        let b = Snapshot::empty(ProviderKind::Jextract);
        let (a, b) = (SnapshotIndex::new(&a), SnapshotIndex::new(&b));
        let opts = CompareOptions::default();
        let mut cx = CompareContext::new(&a, &b, &opts);

        let p = cx.scoped("JavaThread.STACK_FRAMES", |cx| {
            cx.scoped("[2]", |cx| cx.scoped("JavaStackFrame.LOCATION", |cx| cx.path()))
        });
        assert_eq!(p, "JavaThread.STACK_FRAMES[2] > JavaStackFrame.LOCATION");
        assert_eq!(cx.path(), "");
    }

    #[test]
    fn same_failures_are_counted() {
        let a = Snapshot::empty(ProviderKind::Ddr);
        let b = Snapshot::empty(ProviderKind::Jextract);
        let (a, b) = (SnapshotIndex::new(&a), SnapshotIndex::new(&b));
        let opts = CompareOptions::default();
        let mut cx = CompareContext::new(&a, &b, &opts);

        let d: Access<u32> = Err(DataError::unavailable("x"));
        let r: Access<u32> = Err(DataError::unavailable("y"));
        cx.check(&d, &r).unwrap();
        cx.check(&Ok(1u32), &Ok(1u32)).unwrap();

        assert_eq!(cx.stats().members_checked, 2);
        assert_eq!(cx.stats().same_failures, 1);
    }

    #[test]
    fn visited_pairs_are_entered_once() {
        let a = Snapshot::empty(ProviderKind::Ddr);
        let b = Snapshot::empty(ProviderKind::Jextract);
        let (a, b) = (SnapshotIndex::new(&a), SnapshotIndex::new(&b));
        let opts = CompareOptions::default();
        let mut cx = CompareContext::new(&a, &b, &opts);

        assert!(cx.enter(VisitKey::Class(ClassId(1), ClassId(1))));
        assert!(!cx.enter(VisitKey::Class(ClassId(1), ClassId(1))));
        assert!(cx.enter(VisitKey::Class(ClassId(1), ClassId(2))));
    }
}

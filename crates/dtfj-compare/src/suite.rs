//! Suite runner: one case per top-level entity pair.
//!
//! Every case gets a fresh [`CompareContext`], so the visited set never leaks
//! between cases and one failing entity does not hide the others. The id
//! indexes of both snapshots are built once per run and shared by all cases.

use dtfj_model::{Snapshot, SnapshotIndex};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

use crate::comparators::{
    ImageAddressSpaceComparator, ImageProcessComparator, ImageProcessMembers, JavaClassComparator,
    JavaMonitorComparator, JavaObjectComparator, JavaRuntimeComparator, JavaRuntimeMembers,
    JavaThreadComparator,
};
use crate::{
    delegate, CaseOutcome, CaseResult, CompareContext, CompareOptions, CompareReport,
    CompareStats, Comparator, Mismatch, Side,
};

struct Runner<'s> {
    ddr: &'s SnapshotIndex<'s>,
    reference: &'s SnapshotIndex<'s>,
    options: &'s CompareOptions,
    cases: Vec<CaseResult>,
    stats: CompareStats,
}

impl<'s> Runner<'s> {
    fn case(
        &mut self,
        name: String,
        f: impl FnOnce(&mut CompareContext<'s>) -> Result<(), Mismatch>,
    ) {
        let mut cx = CompareContext::new(self.ddr, self.reference, self.options);
        let result = f(&mut cx);
        self.stats += cx.stats();
        self.record(name, result);
    }

    fn record(&mut self, name: String, result: Result<(), Mismatch>) {
        let outcome = match result {
            Ok(()) => {
                debug!(case = %name, "passed");
                CaseOutcome::Passed
            }
            Err(mismatch) => {
                warn!(case = %name, %mismatch, "failed");
                CaseOutcome::Failed { mismatch }
            }
        };
        self.cases.push(CaseResult { name, outcome });
    }

    /// Pairs two entity collections by id: one cardinality case, one case
    /// per id present on both sides, one unpaired case per id present on
    /// one side only.
    fn group<T, K>(
        &mut self,
        path: &str,
        entity: &str,
        ddr: &'s [T],
        reference: &'s [T],
        key: impl Fn(&T) -> K,
        compare: impl Fn(&mut CompareContext<'s>, &T, &T) -> Result<(), Mismatch>,
    ) where
        K: Ord + fmt::Display,
    {
        let count = if ddr.len() == reference.len() {
            Ok(())
        } else {
            Err(Mismatch::Cardinality {
                path: path.to_string(),
                ddr: ddr.len(),
                reference: reference.len(),
            })
        };
        self.record(format!("{path} count"), count);

        let d: BTreeMap<K, &T> = ddr.iter().map(|t| (key(t), t)).collect();
        let r: BTreeMap<K, &T> = reference.iter().map(|t| (key(t), t)).collect();
        let ids: BTreeSet<&K> = d.keys().chain(r.keys()).collect();

        for id in ids {
            let name = format!("{entity} {id}");
            match (d.get(id), r.get(id)) {
                (Some(a), Some(b)) => self.case(name, |cx| compare(cx, *a, *b)),
                (Some(_), None) => self.record(name, Err(unpaired(path, Side::Ddr, id))),
                (None, Some(_)) => self.record(name, Err(unpaired(path, Side::Reference, id))),
                (None, None) => {}
            }
        }
    }
}

fn unpaired(path: &str, side: Side, id: &impl fmt::Display) -> Mismatch {
    Mismatch::Unpaired {
        path: path.to_string(),
        side,
        id: id.to_string(),
    }
}

/// Compares two snapshots of the same dump.
pub fn run_suite(ddr: &Snapshot, reference: &Snapshot, options: &CompareOptions) -> CompareReport {
    let ddr_index = SnapshotIndex::new(ddr);
    let reference_index = SnapshotIndex::new(reference);
    let mut runner = Runner {
        ddr: &ddr_index,
        reference: &reference_index,
        options,
        cases: Vec::new(),
        stats: CompareStats::default(),
    };

    runner.group(
        "Snapshot.ADDRESS_SPACES",
        ImageAddressSpaceComparator::ENTITY,
        &ddr.address_spaces,
        &reference.address_spaces,
        |a| a.id,
        delegate::<ImageAddressSpaceComparator>,
    );

    // The runtime has its own case.
    runner.case(ImageProcessComparator::ENTITY.to_string(), |cx| {
        let Some((d, r)) = cx.scoped("ImageProcess", |cx| cx.pair(&ddr.process, &reference.process))?
        else {
            return Ok(());
        };
        let mask = cx.mask_for::<ImageProcessComparator>();
        ImageProcessComparator::test_equals(cx, d, r, mask.difference(ImageProcessMembers::RUNTIME))
    });

    // Threads, monitors and classes are reported per entity below instead
    // of as one runtime case.
    let split = JavaRuntimeMembers::THREADS | JavaRuntimeMembers::MONITORS | JavaRuntimeMembers::CLASSES;
    let runtime_mask =
        CompareContext::new(&ddr_index, &reference_index, options).mask_for::<JavaRuntimeComparator>();
    runner.case(JavaRuntimeComparator::ENTITY.to_string(), |cx| {
        let Some((d, r)) = cx.scoped("JavaRuntime", |cx| cx.pair(&ddr.runtime, &reference.runtime))?
        else {
            return Ok(());
        };
        JavaRuntimeComparator::test_equals(cx, d, r, runtime_mask.difference(split))
    });

    if runtime_mask.contains(JavaRuntimeMembers::CLASSES) {
        runner.group(
            "JavaRuntime.CLASSES",
            JavaClassComparator::ENTITY,
            &ddr.classes,
            &reference.classes,
            |c| c.id,
            delegate::<JavaClassComparator>,
        );
    }
    if runtime_mask.contains(JavaRuntimeMembers::THREADS) {
        runner.group(
            "JavaRuntime.THREADS",
            JavaThreadComparator::ENTITY,
            &ddr.threads,
            &reference.threads,
            |t| t.id,
            delegate::<JavaThreadComparator>,
        );
    }
    if runtime_mask.contains(JavaRuntimeMembers::MONITORS) {
        runner.group(
            "JavaRuntime.MONITORS",
            JavaMonitorComparator::ENTITY,
            &ddr.monitors,
            &reference.monitors,
            |m| m.id,
            delegate::<JavaMonitorComparator>,
        );
    }
    runner.group(
        "Snapshot.OBJECTS",
        JavaObjectComparator::ENTITY,
        &ddr.objects,
        &reference.objects,
        |o| o.id,
        delegate::<JavaObjectComparator>,
    );

    let report = CompareReport {
        ddr_provider: ddr.provider.clone(),
        reference_provider: reference.provider.clone(),
        cases: runner.cases,
        stats: runner.stats,
    };
    info!(
        cases = report.cases.len(),
        passed = report.passed(),
        failed = report.failed(),
        members_checked = report.stats.members_checked,
        "compare suite finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtfj_model::ProviderKind;

    #[test]
    fn empty_snapshots_compare_clean() {
        let a = Snapshot::empty(ProviderKind::Ddr);
        let b = Snapshot::empty(ProviderKind::Jextract);
        let report = run_suite(&a, &b, &CompareOptions::default());
        assert!(report.is_clean(), "{report}");
        assert_eq!(report.stats.same_failures, 2);
    }
}

use dtfj_compare::{run_suite, CompareOptions, Mismatch, Side};
use dtfj_model::{DataError, ProviderKind};
use dtfj_testkit::{sample_snapshot, MAIN_CLASS};

#[test]
fn scenario_one_sided_failure_names_the_throwing_side() {
    let mut ddr = sample_snapshot(ProviderKind::Ddr);
    let reference = sample_snapshot(ProviderKind::Jextract);
    ddr.classes
        .iter_mut()
        .find(|c| c.id == MAIN_CLASS)
        .unwrap()
        .modifiers = Err(DataError::corrupt("bad romclass"));

    let report = run_suite(&ddr, &reference, &CompareOptions::default());
    let case = report
        .cases
        .iter()
        .find(|c| c.name == "JavaClass class@0x300")
        .unwrap();
    match case.mismatch() {
        Some(Mismatch::OneSided { path, side, .. }) => {
            assert_eq!(path, "JavaClass.MODIFIERS");
            assert_eq!(*side, Side::Ddr);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn scenario_same_failure_kind_on_both_sides_passes() {
    let mut ddr = sample_snapshot(ProviderKind::Ddr);
    let mut reference = sample_snapshot(ProviderKind::Jextract);
    let clean = run_suite(&ddr, &reference, &CompareOptions::default());

    for snap in [&mut ddr, &mut reference] {
        snap.threads[0].priority = Err(DataError::memory(0x9001));
    }
    let report = run_suite(&ddr, &reference, &CompareOptions::default());
    assert!(report.is_clean(), "{report}");
    assert!(report.stats.same_failures > clean.stats.same_failures);
}

#[test]
fn scenario_different_failure_kinds_fail() {
    let mut ddr = sample_snapshot(ProviderKind::Ddr);
    let mut reference = sample_snapshot(ProviderKind::Jextract);
    ddr.threads[0].priority = Err(DataError::memory(0x9001));
    reference.threads[0].priority = Err(DataError::corrupt("bad slot"));

    let report = run_suite(&ddr, &reference, &CompareOptions::default());
    let case = report
        .cases
        .iter()
        .find(|c| c.name == "JavaThread thread@0x9001")
        .unwrap();
    assert!(matches!(case.mismatch(), Some(Mismatch::ErrorKind { .. })));
}

use dtfj_compare::{
    comparators::JavaClassComparator, delegate, run_suite, CompareContext, CompareOptions,
};
use dtfj_model::{ProviderKind, SnapshotIndex};
use dtfj_testkit::{sample_snapshot, CLASS_CLASS};

#[test]
fn scenario_class_and_class_object_cycle_terminates() {
    let ddr = sample_snapshot(ProviderKind::Ddr);
    let reference = sample_snapshot(ProviderKind::Jextract);
    let (ddr, reference) = (SnapshotIndex::new(&ddr), SnapshotIndex::new(&reference));
    let opts = CompareOptions::default();
    let mut cx = CompareContext::new(&ddr, &reference, &opts);

    // java/lang/Class -> its class object -> java/lang/Class again.
    let d = ddr.class(CLASS_CLASS).unwrap();
    let r = reference.class(CLASS_CLASS).unwrap();
    delegate::<JavaClassComparator>(&mut cx, d, r).unwrap();
    assert!(cx.stats().shallow_visits > 0);
}

#[test]
fn scenario_depth_limit_degrades_to_identity_members() {
    let ddr = sample_snapshot(ProviderKind::Ddr);
    let mut reference = sample_snapshot(ProviderKind::Jextract);
    // From a class this section is only reachable through nested links.
    reference.address_spaces[0].sections.as_mut().unwrap()[0].size = Ok(1);

    let deep = run_suite(&ddr, &reference, &CompareOptions::default());
    assert!(!deep.is_clean());

    let shallow_opts = CompareOptions {
        max_depth: 1,
        ..CompareOptions::default()
    };
    let shallow = run_suite(&ddr, &reference, &shallow_opts);
    let class_case = shallow
        .cases
        .iter()
        .find(|c| c.name == "JavaClass class@0x300")
        .unwrap();
    assert!(class_case.passed(), "{shallow}");
    assert!(shallow.stats.members_checked < deep.stats.members_checked);
}

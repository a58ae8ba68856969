use dtfj_compare::{run_suite, CompareOptions};
use dtfj_model::ProviderKind;
use dtfj_testkit::sample_snapshot;

#[test]
fn scenario_sample_dump_compares_clean_against_jextract() {
    let ddr = sample_snapshot(ProviderKind::Ddr);
    let reference = sample_snapshot(ProviderKind::Jextract);

    let report = run_suite(&ddr, &reference, &CompareOptions::default());
    assert!(report.is_clean(), "{report}");
    assert_eq!(report.cases.len(), 18);
    // Main.run()V is reached from its class and from the main thread's frame.
    assert!(report.stats.carve_outs >= 2, "{:?}", report.stats);
    assert!(report.stats.shallow_visits > 0);
}

#[test]
fn scenario_case_order_is_deterministic() {
    let ddr = sample_snapshot(ProviderKind::Ddr);
    let reference = sample_snapshot(ProviderKind::Jextract);
    let opts = CompareOptions::default();

    let a = run_suite(&ddr, &reference, &opts);
    let b = run_suite(&ddr, &reference, &opts);
    assert_eq!(a, b);

    let names: Vec<&str> = a.cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names[0], "Snapshot.ADDRESS_SPACES count");
    assert_eq!(names[2], "ImageProcess");
    assert_eq!(names[3], "JavaRuntime");
    assert_eq!(names[4], "JavaRuntime.CLASSES count");
    assert_eq!(names[5], "JavaClass class@0x100");
}

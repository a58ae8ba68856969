use dtfj_compare::{run_suite, CompareOptions, CompareReport, MAX_DEPTH_LIMIT};
use dtfj_model::{ProviderKind, Snapshot};
use dtfj_testkit::{append_reference_chain, sample_snapshot, CHAIN_HEAD};

fn chain_pair(len: u64) -> (Snapshot, Snapshot) {
    let mut ddr = sample_snapshot(ProviderKind::Ddr);
    let mut reference = sample_snapshot(ProviderKind::Jextract);
    append_reference_chain(&mut ddr, len);
    append_reference_chain(&mut reference, len);
    (ddr, reference)
}

/// Runs the suite on a thread with the stack a CLI main thread gets.
fn run_on_main_sized_stack(
    ddr: Snapshot,
    reference: Snapshot,
    opts: CompareOptions,
) -> CompareReport {
    std::thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(move || run_suite(&ddr, &reference, &opts))
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn scenario_two_thousand_object_chain_compares_clean() {
    let (ddr, reference) = chain_pair(2000);
    let objects = ddr.objects.len();

    let report = run_suite(&ddr, &reference, &CompareOptions::default());
    assert!(report.is_clean(), "{report}");
    let object_cases = report
        .cases
        .iter()
        .filter(|c| c.name.starts_with("JavaObject "))
        .count();
    assert_eq!(object_cases, objects);
    assert!(report.stats.shallow_visits > 0);
}

#[test]
fn scenario_divergence_beyond_depth_is_not_reported_from_the_head() {
    let (ddr, mut reference) = chain_pair(200);
    let tail = reference.objects.last_mut().unwrap();
    tail.hashcode = Ok(-1);
    let tail = format!("JavaObject {}", tail.id);

    // Each link costs two levels (object, then reference), so the default
    // depth reaches 32 links down the chain.
    let report = run_suite(&ddr, &reference, &CompareOptions::default());
    let head = format!("JavaObject {CHAIN_HEAD}");
    let head_case = report.cases.iter().find(|c| c.name == head).unwrap();
    assert!(head_case.passed(), "{report}");
    let tail_case = report.cases.iter().find(|c| c.name == tail).unwrap();
    assert!(!tail_case.passed());
    assert!(report.failed() < 100, "{report}");
}

#[test]
fn scenario_unvalidated_depth_is_held_to_the_limit() {
    let (ddr, reference) = chain_pair(600);
    let opts = CompareOptions {
        max_depth: 500,
        ..CompareOptions::default()
    };
    assert!(opts.validate().is_err());

    let report = run_on_main_sized_stack(ddr, reference, opts);
    assert!(report.is_clean(), "{report}");

    let (ddr, reference) = chain_pair(600);
    let capped = run_on_main_sized_stack(
        ddr,
        reference,
        CompareOptions {
            max_depth: MAX_DEPTH_LIMIT,
            ..CompareOptions::default()
        },
    );
    assert_eq!(capped.stats, report.stats);
}

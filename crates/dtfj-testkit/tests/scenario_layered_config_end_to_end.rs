//! Config layers -> options -> snapshot files -> compare + deadlock.

use dtfj_compare::{run_suite, CompareOptions, Mismatch};
use dtfj_config::{load_layered_yaml_from_strings, report_unused_keys, ConfigUse, UnusedKeyPolicy};
use dtfj_deadlock::{analyze, AnalysisOptions};
use dtfj_model::{load_snapshot, ProviderKind};
use dtfj_testkit::{sample_snapshot, wait_for_graph, write_pair};

const BASE: &str = r#"
compare:
  max_depth: 64
deadlock:
  include_branches: true
"#;

const SITE: &str = r#"
compare:
  masks:
    JavaThread:
      include: [IMAGE_THREAD]
deadlock:
  include_branches: false
"#;

#[test]
fn overlay_reenables_known_bad_member_through_files() -> anyhow::Result<()> {
    let cfg = load_layered_yaml_from_strings(&[BASE, SITE])?;
    let options = CompareOptions::from_config_json(&cfg.config_json)?;

    let ddr = sample_snapshot(ProviderKind::Ddr);
    let mut reference = sample_snapshot(ProviderKind::Jextract);
    reference.threads[0].image_thread = Ok("0".to_string());
    let files = write_pair(&ddr, &reference)?;

    let ddr = load_snapshot(&files.ddr)?;
    let reference = load_snapshot(&files.reference)?;

    assert!(run_suite(&ddr, &reference, &CompareOptions::default()).is_clean());

    let report = run_suite(&ddr, &reference, &options);
    let mismatch = report
        .failures()
        .find(|c| c.name == "JavaThread thread@0x9001")
        .and_then(|c| c.mismatch().cloned());
    assert!(matches!(
        mismatch,
        Some(Mismatch::Value { ref path, .. }) if path == "JavaThread.IMAGE_THREAD"
    ));
    Ok(())
}

#[test]
fn same_layers_drive_the_deadlock_analyzer() -> anyhow::Result<()> {
    let cfg = load_layered_yaml_from_strings(&[BASE, SITE])?;
    let options = AnalysisOptions::from_config_json(&cfg.config_json)?;
    assert!(!options.include_branches);

    let report = analyze(
        &wait_for_graph(ProviderKind::Ddr, &[(1, 2), (2, 1), (3, 2)]),
        &options,
    );
    assert!(report.has_deadlock());
    assert!(report.branches.is_empty());
    Ok(())
}

#[test]
fn every_shipped_key_is_consumed_by_some_command() -> anyhow::Result<()> {
    let cfg = load_layered_yaml_from_strings(&[BASE, SITE])?;
    let compare = report_unused_keys(ConfigUse::Compare, &cfg.config_json, UnusedKeyPolicy::Warn)?;
    let deadlock = report_unused_keys(ConfigUse::Deadlock, &cfg.config_json, UnusedKeyPolicy::Warn)?;

    for leaf in &compare.unused_leaf_pointers {
        assert!(
            !deadlock.unused_leaf_pointers.contains(leaf),
            "{leaf} is read by neither command"
        );
    }
    Ok(())
}

#[test]
fn sample_dump_has_no_deadlock() {
    let report = analyze(&sample_snapshot(ProviderKind::Ddr), &AnalysisOptions::default());
    assert!(!report.has_deadlock(), "{report}");
}

use dtfj_config::{load_layered_yaml_from_strings, report_unused_keys, ConfigUse, UnusedKeyPolicy};

const YAML: &str = r#"
compare:
  max_depth: 16
  maks:
    JavaThread:
      include: [IMAGE_THREAD]
deadlock:
  include_branches: false
"#;

#[test]
fn warn_reports_misspelled_section() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let report =
        report_unused_keys(ConfigUse::Compare, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();

    assert_eq!(
        report.unused_leaf_pointers,
        vec![
            "/compare/maks/JavaThread/include/0".to_string(),
            "/deadlock/include_branches".to_string(),
        ]
    );
}

#[test]
fn fail_errors_on_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let err = report_unused_keys(ConfigUse::Compare, &loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS (used_by=COMPARE)"));
}

#[test]
fn each_command_consumes_only_its_section() {
    let loaded = load_layered_yaml_from_strings(&["deadlock:\n  include_branches: true\n"]).unwrap();
    let deadlock =
        report_unused_keys(ConfigUse::Deadlock, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(deadlock.is_clean());

    let compare =
        report_unused_keys(ConfigUse::Compare, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert!(!compare.is_clean());
}

//! Config hash stability: same content, any key order, same hash.

use dtfj_config::{load_layered_yaml, load_layered_yaml_from_strings};

const BASE_YAML: &str = r#"
compare:
  max_depth: 64
  masks:
    JavaThread:
      include: [IMAGE_THREAD]
      exclude: []
deadlock:
  include_branches: true
"#;

const BASE_YAML_REORDERED: &str = r#"
deadlock:
  include_branches: true
compare:
  masks:
    JavaThread:
      exclude: []
      include: [IMAGE_THREAD]
  max_depth: 64
"#;

const OVERLAY_YAML: &str = r#"
compare:
  max_depth: 8
"#;

#[test]
fn reordered_keys_produce_same_hash() {
    let original = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let reordered = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();

    assert_eq!(original.config_hash, reordered.config_hash);
    assert_eq!(original.canonical_json, reordered.canonical_json);
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_wins_and_keeps_the_rest() {
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(
        merged
            .config_json
            .pointer("/compare/max_depth")
            .and_then(|v| v.as_u64()),
        Some(8)
    );
    assert_eq!(
        merged
            .config_json
            .pointer("/compare/masks/JavaThread/include/0")
            .and_then(|v| v.as_str()),
        Some("IMAGE_THREAD")
    );
}

#[test]
fn hash_is_64_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn files_hash_like_strings() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::write(&base, BASE_YAML).unwrap();
    std::fs::write(&overlay, OVERLAY_YAML).unwrap();

    let from_files = load_layered_yaml(&[&base, &overlay]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);
}

#[test]
fn missing_file_names_the_path() {
    let err = load_layered_yaml(&["/nonexistent/dtfj.yaml"]).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/dtfj.yaml"));
}
